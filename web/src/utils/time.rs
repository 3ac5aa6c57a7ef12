//! Time and date helpers for the wire formats the booking backend speaks.

use chrono::{Datelike, NaiveDate, NaiveTime, Timelike, Weekday};

/// Parse a slot time in either `HH:MM` or `HH:MM:SS` form.
pub fn parse_slot_time(value: &str) -> Option<NaiveTime> {
    let value = value.trim();
    NaiveTime::parse_from_str(value, "%H:%M:%S")
        .or_else(|_| NaiveTime::parse_from_str(value, "%H:%M"))
        .ok()
}

/// Parse a `YYYY-MM-DD` date.
pub fn parse_date(value: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(value.trim(), "%Y-%m-%d").ok()
}

/// Backend tick format, `HH:MM:SS`.
pub fn format_backend_time(time: NaiveTime) -> String {
    format!("{:02}:{:02}:00", time.hour(), time.minute())
}

/// Client slot format, `HH:MM`.
pub fn format_client_time(time: NaiveTime) -> String {
    format!("{:02}:{:02}", time.hour(), time.minute())
}

pub fn format_date(date: NaiveDate) -> String {
    date.format("%Y-%m-%d").to_string()
}

/// Format a date for the confirmation view (`dd/mm/yyyy`)
pub fn format_date_for_booking(date: NaiveDate) -> String {
    date.format("%d/%m/%Y").to_string()
}

pub fn is_saturday(date: NaiveDate) -> bool {
    date.weekday() == Weekday::Sat
}

/// Minutes since midnight.
pub fn minutes_of_day(time: NaiveTime) -> u32 {
    time.hour() * 60 + time.minute()
}

/// Inverse of [`minutes_of_day`]; `None` at or past midnight.
pub fn time_from_minutes(minutes: u32) -> Option<NaiveTime> {
    NaiveTime::from_hms_opt(minutes / 60, minutes % 60, 0)
}
