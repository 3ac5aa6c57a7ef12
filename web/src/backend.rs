//! Contracts of the external backend this crate talks to.
//!
//! The Postgres implementation lives in `db::repository`; tests use in-memory
//! fakes.

use async_trait::async_trait;
use chrono::NaiveDate;
use shared_types::{
    AvailabilityRow, BackendError, ClientProfileUpdate, ConsentUpdate, CreateBookingParams,
    EditBookingParams, PetSummary, ServicePricing, ServiceSummary, StaffSummary,
};

pub type BackendResult<T> = Result<T, BackendError>;

#[async_trait]
pub trait AvailabilitySource: Send + Sync {
    /// Raw rows for `date`, restricted to `staff_ids`.
    async fn fetch_availability(
        &self,
        date: NaiveDate,
        staff_ids: &[String],
    ) -> BackendResult<Vec<AvailabilityRow>>;
}

#[async_trait]
pub trait CatalogSource: Send + Sync {
    async fn fetch_services(&self) -> BackendResult<Vec<ServiceSummary>>;
    async fn fetch_staff(&self) -> BackendResult<Vec<StaffSummary>>;
    async fn fetch_pets(&self, user_id: &str) -> BackendResult<Vec<PetSummary>>;
    async fn fetch_pricing(&self) -> BackendResult<Vec<ServicePricing>>;
}

#[async_trait]
pub trait BookingBackend: Send + Sync {
    /// Atomic create; returns the new appointment id.
    async fn create_booking(&self, params: &CreateBookingParams) -> BackendResult<String>;
    async fn edit_booking(&self, params: &EditBookingParams) -> BackendResult<()>;
}

#[async_trait]
pub trait ProfileBackend: Send + Sync {
    async fn update_profile(&self, update: &ClientProfileUpdate) -> BackendResult<()>;
    async fn update_consent(&self, update: &ConsentUpdate) -> BackendResult<()>;
    async fn complete_onboarding(&self, user_id: &str) -> BackendResult<()>;
}

#[async_trait]
pub trait AvailabilityAdmin: Send + Sync {
    /// Admin override of a single row's `available` flag.
    async fn set_slot_availability(&self, row: &AvailabilityRow) -> BackendResult<()>;
}

/// Everything the HTTP layer needs from one backend handle.
pub trait Backend:
    AvailabilitySource + CatalogSource + BookingBackend + ProfileBackend + AvailabilityAdmin
{
}

impl<T> Backend for T where
    T: AvailabilitySource + CatalogSource + BookingBackend + ProfileBackend + AvailabilityAdmin
{
}
