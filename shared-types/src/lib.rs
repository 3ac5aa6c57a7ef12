use serde::{Deserialize, Serialize};
use thiserror::Error;

/// One row of staff availability as stored by the backend, at 10-minute
/// resolution.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct AvailabilityRow {
    pub staff_profile_id: String,
    /// `HH:MM:SS`
    pub time_slot: String,
    pub available: bool,
    /// `YYYY-MM-DD`
    pub date: String,
}

/// A client-visible 30-minute slot as rendered by the booking wizard.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct TimeSlot {
    pub id: String,
    /// `HH:MM`
    pub time: String,
    pub available: bool,
}

/// Arguments of the atomic create-booking procedure.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct CreateBookingParams {
    pub user_id: String,
    pub pet_id: String,
    pub service_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub secondary_service_id: Option<String>,
    pub provider_ids: Vec<String>,
    /// `YYYY-MM-DD`
    pub booking_date: String,
    /// `HH:MM:SS`
    pub time_slot: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

/// Arguments of the admin edit-booking procedure.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct EditBookingParams {
    /// Taken from the request path when sent over HTTP.
    #[serde(default)]
    pub appointment_id: String,
    pub new_date: String,
    pub new_time_slot: String,
    #[serde(default)]
    pub extra_fee: Option<f64>,
    #[serde(default)]
    pub admin_notes: Option<String>,
    #[serde(default)]
    pub force_override: bool,
    pub edited_by: String,
}

/// Structured error returned by the backend's remote procedures.
#[derive(Debug, Error, Serialize, Deserialize, Clone, PartialEq, Eq)]
#[error("{message}")]
pub struct BackendError {
    pub message: String,
    #[serde(default)]
    pub details: Option<String>,
    #[serde(default)]
    pub hint: Option<String>,
    #[serde(default)]
    pub code: Option<String>,
}

impl BackendError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            details: None,
            hint: None,
            code: None,
        }
    }

    pub fn with_code(mut self, code: impl Into<String>) -> Self {
        self.code = Some(code.into());
        self
    }
}

#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum ServiceType {
    Bath,
    Grooming,
    Veterinary,
    Other,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct ServiceSummary {
    pub id: String,
    pub name: String,
    pub service_type: ServiceType,
    pub default_duration: u32,
    pub base_price: f64,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct StaffSummary {
    pub id: String,
    pub name: String,
    pub can_bathe: bool,
    pub can_groom: bool,
    pub can_vet: bool,
}

impl StaffSummary {
    pub fn can_perform(&self, service_type: ServiceType) -> bool {
        match service_type {
            ServiceType::Bath => self.can_bathe,
            ServiceType::Grooming => self.can_groom,
            ServiceType::Veterinary => self.can_vet,
            ServiceType::Other => true,
        }
    }
}

#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum PetSize {
    Small,
    Medium,
    Large,
    ExtraLarge,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct PetSummary {
    pub id: String,
    pub name: String,
    pub breed: Option<String>,
    pub size: PetSize,
}

/// Price and duration of a service for a given pet size.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct ServicePricing {
    pub service_id: String,
    pub size: PetSize,
    pub price: f64,
    pub duration_minutes: u32,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct ClientProfileUpdate {
    pub user_id: String,
    pub name: String,
    pub phone: Option<String>,
    pub address: Option<String>,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct ConsentUpdate {
    pub user_id: String,
    pub consent_type: String,
    pub granted: bool,
}
