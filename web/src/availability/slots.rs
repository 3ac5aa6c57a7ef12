//! Slot generation at backend (10 min) and client (30 min) resolution.
//!
//! Everything here is a pure function of its bounds.

use chrono::NaiveTime;

use super::hours::{BusinessHours, BACKEND_SLOT_MINUTES, CLIENT_SLOT_MINUTES};
use crate::utils::time::{minutes_of_day, time_from_minutes};

/// Every `interval_minutes` tick in `[start_hour, end_hour)`.
///
/// A trailing interval that does not fit before `end_hour` still gets its
/// start tick; no tick at or after `end_hour` is ever emitted.
pub fn generate_slots(start_hour: u32, end_hour: u32, interval_minutes: u32) -> Vec<NaiveTime> {
    if interval_minutes == 0 {
        return Vec::new();
    }
    let end = end_hour.min(24) * 60;
    (start_hour * 60..end)
        .step_by(interval_minutes as usize)
        .filter_map(time_from_minutes)
        .collect()
}

pub fn generate_backend_slots(start_hour: u32, end_hour: u32) -> Vec<NaiveTime> {
    generate_slots(start_hour, end_hour, BACKEND_SLOT_MINUTES)
}

pub fn generate_client_slots(hours: &BusinessHours, saturday: bool) -> Vec<NaiveTime> {
    generate_slots(
        hours.opening_hour,
        hours.closing_hour(saturday),
        CLIENT_SLOT_MINUTES,
    )
}

/// Backend ticks a service of `duration_minutes` occupies when it starts at
/// `start`.
///
/// Truncate-at-close: ticks at or after `closing_hour` are dropped instead of
/// rejecting the service, so a service that overruns closing time only has
/// its in-hours ticks checked.
pub fn required_backend_slots(
    start: NaiveTime,
    duration_minutes: u32,
    closing_hour: u32,
) -> Vec<NaiveTime> {
    let start = minutes_of_day(start);
    let close = closing_hour.min(24) * 60;
    (0..duration_minutes)
        .step_by(BACKEND_SLOT_MINUTES as usize)
        .map(|offset| start.saturating_add(offset))
        .take_while(|minutes| *minutes < close)
        .filter_map(time_from_minutes)
        .collect()
}
