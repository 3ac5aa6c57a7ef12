use chrono::NaiveTime;
use serde::{Deserialize, Serialize};
use shared_types::{AvailabilityRow, CreateBookingParams, TimeSlot};

use crate::availability::{evaluate_day, AvailabilityMatrix, BusinessHours, SlotQuery};
use crate::utils::time::{format_backend_time, format_client_time, format_date, parse_date, parse_slot_time};

/// The most recent availability fetch that was applied, with the parameters
/// it was fetched for and the slot list derived from it.
///
/// Held by the form controller and handed to the submitter explicitly.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AvailabilitySnapshot {
    pub query: SlotQuery,
    pub rows: Vec<AvailabilityRow>,
    pub slots: Vec<TimeSlot>,
}

impl AvailabilitySnapshot {
    pub fn new(query: SlotQuery, rows: Vec<AvailabilityRow>, hours: &BusinessHours) -> Self {
        let matrix = AvailabilityMatrix::build(query.date, &query.request.staff_ids(), &rows, hours);
        let slots = evaluate_day(&query.request, &matrix, hours);
        Self { query, rows, slots }
    }

    pub fn matrix(&self, hours: &BusinessHours) -> AvailabilityMatrix {
        AvailabilityMatrix::build(
            self.query.date,
            &self.query.request.staff_ids(),
            &self.rows,
            hours,
        )
    }

    /// Whether the raw payload carries a row for `staff_id` at `tick` on the
    /// snapshot's date, whatever its availability.
    pub fn contains_tick(&self, staff_id: &str, tick: NaiveTime) -> bool {
        self.rows.iter().any(|row| {
            row.staff_profile_id == staff_id
                && parse_date(&row.date) == Some(self.query.date)
                && parse_slot_time(&row.time_slot) == Some(tick)
        })
    }

    pub fn slot(&self, time: NaiveTime) -> Option<&TimeSlot> {
        let time = format_client_time(time);
        self.slots.iter().find(|slot| slot.time == time)
    }
}

/// A booking ready for submission.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BookingDraft {
    pub user_id: String,
    pub pet_id: String,
    #[serde(default)]
    pub secondary_service_id: Option<String>,
    pub query: SlotQuery,
    pub time: NaiveTime,
    #[serde(default)]
    pub notes: Option<String>,
}

impl BookingDraft {
    pub fn to_params(&self) -> CreateBookingParams {
        CreateBookingParams {
            user_id: self.user_id.clone(),
            pet_id: self.pet_id.clone(),
            service_id: self.query.service_id.clone(),
            secondary_service_id: self.secondary_service_id.clone(),
            provider_ids: self.query.request.provider_ids(),
            booking_date: format_date(self.query.date),
            time_slot: format_backend_time(self.time),
            notes: self
                .notes
                .as_ref()
                .map(|n| n.trim().to_string())
                .filter(|n| !n.is_empty()),
        }
    }
}
