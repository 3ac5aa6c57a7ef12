//! In-memory stand-in for the Postgres backend.

#![allow(dead_code)]

use std::sync::Mutex;

use async_trait::async_trait;
use chrono::NaiveDate;
use shared_types::{
    AvailabilityRow, BackendError, ClientProfileUpdate, ConsentUpdate, CreateBookingParams,
    EditBookingParams, PetSize, PetSummary, ServicePricing, ServiceSummary, ServiceType,
    StaffSummary,
};
use web::backend::{
    AvailabilityAdmin, AvailabilitySource, BackendResult, BookingBackend, CatalogSource,
    ProfileBackend,
};
use web::utils::time::{
    format_backend_time, format_date, minutes_of_day, parse_slot_time, time_from_minutes,
};

pub fn monday() -> NaiveDate {
    NaiveDate::from_ymd_opt(2026, 10, 19).unwrap()
}

#[derive(Default)]
pub struct InMemoryBackend {
    services: Vec<ServiceSummary>,
    staff: Vec<StaffSummary>,
    pets: Vec<PetSummary>,
    pricing: Vec<ServicePricing>,
    availability: Mutex<Vec<AvailabilityRow>>,
    bookings: Mutex<Vec<CreateBookingParams>>,
    edits: Mutex<Vec<EditBookingParams>>,
    profile_calls: Mutex<Vec<String>>,
    reject_next: Mutex<Option<BackendError>>,
}

impl InMemoryBackend {
    /// Bath (30 min, 80/60 min for large pets) and grooming (20 min);
    /// Ana bathes, Bruno grooms; Mia is small, Rex is large.
    pub fn seeded() -> Self {
        Self {
            services: vec![
                ServiceSummary {
                    id: "bath".into(),
                    name: "Banho".into(),
                    service_type: ServiceType::Bath,
                    default_duration: 30,
                    base_price: 50.0,
                },
                ServiceSummary {
                    id: "groom".into(),
                    name: "Tosa".into(),
                    service_type: ServiceType::Grooming,
                    default_duration: 20,
                    base_price: 40.0,
                },
            ],
            staff: vec![
                StaffSummary {
                    id: "A".into(),
                    name: "Ana".into(),
                    can_bathe: true,
                    can_groom: false,
                    can_vet: false,
                },
                StaffSummary {
                    id: "B".into(),
                    name: "Bruno".into(),
                    can_bathe: false,
                    can_groom: true,
                    can_vet: false,
                },
            ],
            pets: vec![
                PetSummary {
                    id: "mia".into(),
                    name: "Mia".into(),
                    breed: Some("Poodle".into()),
                    size: PetSize::Small,
                },
                PetSummary {
                    id: "rex".into(),
                    name: "Rex".into(),
                    breed: None,
                    size: PetSize::Large,
                },
            ],
            pricing: vec![ServicePricing {
                service_id: "bath".into(),
                size: PetSize::Large,
                price: 80.0,
                duration_minutes: 60,
            }],
            ..Default::default()
        }
    }

    /// Mark every 10-minute tick in `[from, to)` open for `staff_id`.
    pub fn open(&self, staff_id: &str, date: NaiveDate, from: &str, to: &str) {
        let start = minutes_of_day(parse_slot_time(from).unwrap());
        let end = minutes_of_day(parse_slot_time(to).unwrap());
        let mut rows = self.availability.lock().unwrap();
        for minutes in (start..end).step_by(10) {
            rows.push(AvailabilityRow {
                staff_profile_id: staff_id.into(),
                time_slot: format_backend_time(time_from_minutes(minutes).unwrap()),
                available: true,
                date: format_date(date),
            });
        }
    }

    /// Fail the next write with `err`.
    pub fn reject_next(&self, err: BackendError) {
        *self.reject_next.lock().unwrap() = Some(err);
    }

    pub fn bookings(&self) -> Vec<CreateBookingParams> {
        self.bookings.lock().unwrap().clone()
    }

    pub fn edits(&self) -> Vec<EditBookingParams> {
        self.edits.lock().unwrap().clone()
    }

    pub fn profile_calls(&self) -> Vec<String> {
        self.profile_calls.lock().unwrap().clone()
    }

    fn take_rejection(&self) -> BackendResult<()> {
        match self.reject_next.lock().unwrap().take() {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }
}

#[async_trait]
impl AvailabilitySource for InMemoryBackend {
    async fn fetch_availability(
        &self,
        date: NaiveDate,
        staff_ids: &[String],
    ) -> BackendResult<Vec<AvailabilityRow>> {
        let date = format_date(date);
        Ok(self
            .availability
            .lock()
            .unwrap()
            .iter()
            .filter(|row| row.date == date && staff_ids.contains(&row.staff_profile_id))
            .cloned()
            .collect())
    }
}

#[async_trait]
impl CatalogSource for InMemoryBackend {
    async fn fetch_services(&self) -> BackendResult<Vec<ServiceSummary>> {
        Ok(self.services.clone())
    }

    async fn fetch_staff(&self) -> BackendResult<Vec<StaffSummary>> {
        Ok(self.staff.clone())
    }

    async fn fetch_pets(&self, _user_id: &str) -> BackendResult<Vec<PetSummary>> {
        Ok(self.pets.clone())
    }

    async fn fetch_pricing(&self) -> BackendResult<Vec<ServicePricing>> {
        Ok(self.pricing.clone())
    }
}

#[async_trait]
impl BookingBackend for InMemoryBackend {
    async fn create_booking(&self, params: &CreateBookingParams) -> BackendResult<String> {
        self.take_rejection()?;
        let mut bookings = self.bookings.lock().unwrap();
        let clash = bookings.iter().any(|existing| {
            existing.booking_date == params.booking_date
                && existing.time_slot == params.time_slot
                && existing
                    .provider_ids
                    .iter()
                    .any(|id| params.provider_ids.contains(id))
        });
        if clash {
            return Err(BackendError::new("Provider not available at this time"));
        }
        bookings.push(params.clone());
        Ok(format!("appt-{}", bookings.len()))
    }

    async fn edit_booking(&self, params: &EditBookingParams) -> BackendResult<()> {
        self.take_rejection()?;
        self.edits.lock().unwrap().push(params.clone());
        Ok(())
    }
}

#[async_trait]
impl ProfileBackend for InMemoryBackend {
    async fn update_profile(&self, update: &ClientProfileUpdate) -> BackendResult<()> {
        self.take_rejection()?;
        self.profile_calls
            .lock()
            .unwrap()
            .push(format!("profile:{}", update.user_id));
        Ok(())
    }

    async fn update_consent(&self, update: &ConsentUpdate) -> BackendResult<()> {
        self.take_rejection()?;
        self.profile_calls
            .lock()
            .unwrap()
            .push(format!("consent:{}", update.consent_type));
        Ok(())
    }

    async fn complete_onboarding(&self, user_id: &str) -> BackendResult<()> {
        self.take_rejection()?;
        self.profile_calls
            .lock()
            .unwrap()
            .push(format!("onboarding:{user_id}"));
        Ok(())
    }
}

#[async_trait]
impl AvailabilityAdmin for InMemoryBackend {
    async fn set_slot_availability(&self, row: &AvailabilityRow) -> BackendResult<()> {
        self.take_rejection()?;
        let mut rows = self.availability.lock().unwrap();
        match rows.iter_mut().find(|existing| {
            existing.staff_profile_id == row.staff_profile_id
                && existing.date == row.date
                && existing.time_slot == row.time_slot
        }) {
            Some(existing) => existing.available = row.available,
            None => rows.push(row.clone()),
        }
        Ok(())
    }
}
