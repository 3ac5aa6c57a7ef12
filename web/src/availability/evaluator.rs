//! Bookability of client slots for one or two sequential service segments.

use chrono::NaiveTime;
use shared_types::TimeSlot;

use super::hours::BusinessHours;
use super::matrix::AvailabilityMatrix;
use super::query::ServiceRequest;
use super::slots::{generate_client_slots, required_backend_slots};
use crate::utils::time::{format_client_time, format_date, is_saturday};

/// Backend ticks each segment needs for a given start.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct SegmentTicks {
    pub primary: Vec<NaiveTime>,
    pub secondary: Vec<NaiveTime>,
}

/// First tick that fails, with the staff member it failed for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TickFailure {
    pub staff_id: String,
    pub tick: NaiveTime,
}

/// Ticks for both segments starting at `client_slot`.
///
/// The secondary segment is the suffix of the combined-duration tick list
/// after the primary ticks, so it begins on the tick right after the primary
/// segment's last one. Both lists are truncated at `closing_hour`.
pub fn segment_ticks(
    client_slot: NaiveTime,
    request: &ServiceRequest,
    closing_hour: u32,
) -> SegmentTicks {
    let primary_duration = request.primary.duration_minutes;
    let primary = required_backend_slots(client_slot, primary_duration, closing_hour);
    let secondary = match &request.secondary {
        Some(segment) => {
            let combined = required_backend_slots(
                client_slot,
                primary_duration.saturating_add(segment.duration_minutes),
                closing_hour,
            );
            combined.into_iter().skip(primary.len()).collect()
        }
        None => Vec::new(),
    };
    SegmentTicks { primary, secondary }
}

/// The first required tick that is not open, or `None` when the whole
/// request fits.
///
/// A segment with zero duration is never bookable and reports the client
/// slot itself as the failing tick. A secondary segment cut to nothing by
/// closing time passes.
pub fn first_unavailable_tick(
    client_slot: NaiveTime,
    request: &ServiceRequest,
    matrix: &AvailabilityMatrix,
    hours: &BusinessHours,
) -> Option<TickFailure> {
    let zero_length = std::iter::once(&request.primary)
        .chain(request.secondary.as_ref())
        .find(|segment| segment.duration_minutes == 0);
    if let Some(segment) = zero_length {
        return Some(TickFailure {
            staff_id: segment.staff_id.clone(),
            tick: client_slot,
        });
    }

    let closing_hour = hours.closing_hour_on(matrix.date());
    let ticks = segment_ticks(client_slot, request, closing_hour);
    if ticks.primary.is_empty() {
        return Some(TickFailure {
            staff_id: request.primary.staff_id.clone(),
            tick: client_slot,
        });
    }

    let primary = ticks
        .primary
        .iter()
        .map(|tick| (&request.primary.staff_id, *tick));
    let secondary = request.secondary.iter().flat_map(|segment| {
        ticks
            .secondary
            .iter()
            .map(move |tick| (&segment.staff_id, *tick))
    });

    primary
        .chain(secondary)
        .find(|(staff_id, tick)| !matrix.is_available(*tick, staff_id))
        .map(|(staff_id, tick)| TickFailure {
            staff_id: staff_id.clone(),
            tick,
        })
}

/// All-or-nothing: every tick of every segment must be open.
pub fn is_slot_available(
    client_slot: NaiveTime,
    request: &ServiceRequest,
    matrix: &AvailabilityMatrix,
    hours: &BusinessHours,
) -> bool {
    first_unavailable_tick(client_slot, request, matrix, hours).is_none()
}

/// The full client slot list for the matrix's date, in chronological order.
pub fn evaluate_day(
    request: &ServiceRequest,
    matrix: &AvailabilityMatrix,
    hours: &BusinessHours,
) -> Vec<TimeSlot> {
    let date = matrix.date();
    let day = format_date(date);
    generate_client_slots(hours, is_saturday(date))
        .into_iter()
        .map(|slot| {
            let time = format_client_time(slot);
            TimeSlot {
                id: format!("{day}T{time}"),
                available: is_slot_available(slot, request, matrix, hours),
                time,
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::utils::time::format_backend_time;
    use chrono::NaiveDate;
    use shared_types::AvailabilityRow;

    fn t(h: u32, m: u32) -> NaiveTime {
        NaiveTime::from_hms_opt(h, m, 0).unwrap()
    }

    fn monday() -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 10, 19).unwrap()
    }

    fn open_rows(staff: &str, from: NaiveTime, to: NaiveTime) -> Vec<AvailabilityRow> {
        let mut rows = Vec::new();
        let mut tick = from;
        while tick <= to {
            rows.push(AvailabilityRow {
                staff_profile_id: staff.into(),
                time_slot: format_backend_time(tick),
                available: true,
                date: "2026-10-19".into(),
            });
            tick += chrono::Duration::minutes(10);
        }
        rows
    }

    fn matrix(staff: &[&str], rows: &[AvailabilityRow]) -> AvailabilityMatrix {
        let staff: Vec<String> = staff.iter().map(|s| s.to_string()).collect();
        AvailabilityMatrix::build(monday(), &staff, rows, &BusinessHours::default())
    }

    #[test]
    fn primary_only_scenario() {
        let rows = open_rows("A", t(9, 0), t(9, 50));
        let matrix = matrix(&["A"], &rows);
        let request = ServiceRequest::single("A", 30);
        let hours = BusinessHours::default();

        assert!(is_slot_available(t(9, 0), &request, &matrix, &hours));
        assert_eq!(
            first_unavailable_tick(t(9, 40), &request, &matrix, &hours),
            Some(TickFailure {
                staff_id: "A".into(),
                tick: t(10, 0)
            })
        );
    }

    #[test]
    fn one_closed_tick_fails_the_whole_slot() {
        let mut rows = open_rows("A", t(9, 0), t(11, 0));
        rows.iter_mut()
            .find(|r| r.time_slot == "09:40:00")
            .unwrap()
            .available = false;
        let matrix = matrix(&["A"], &rows);
        let request = ServiceRequest::single("A", 60);
        let hours = BusinessHours::default();

        assert!(!is_slot_available(t(9, 0), &request, &matrix, &hours));
        assert!(!is_slot_available(t(9, 30), &request, &matrix, &hours));
        assert!(is_slot_available(t(10, 0), &request, &matrix, &hours));
    }

    #[test]
    fn secondary_segment_starts_when_primary_ends() {
        let request = ServiceRequest::single("A", 30).with_secondary("B", 20);
        let ticks = segment_ticks(t(9, 0), &request, 16);
        assert_eq!(ticks.primary, vec![t(9, 0), t(9, 10), t(9, 20)]);
        assert_eq!(ticks.secondary, vec![t(9, 30), t(9, 40)]);
    }

    #[test]
    fn huge_durations_stop_at_closing() {
        let request = ServiceRequest::single("A", u32::MAX).with_secondary("B", 10);
        let ticks = segment_ticks(t(15, 30), &request, 16);
        assert_eq!(ticks.primary, vec![t(15, 30), t(15, 40), t(15, 50)]);
        assert!(ticks.secondary.is_empty());

        let request = ServiceRequest::single("A", 10).with_secondary("B", u32::MAX);
        let ticks = segment_ticks(t(15, 40), &request, 16);
        assert_eq!(ticks.primary, vec![t(15, 40)]);
        assert_eq!(ticks.secondary, vec![t(15, 50)]);
    }

    #[test]
    fn closed_secondary_staff_fails_dual_booking() {
        let mut rows = open_rows("A", t(9, 0), t(9, 20));
        rows.push(AvailabilityRow {
            staff_profile_id: "B".into(),
            time_slot: "09:30:00".into(),
            available: false,
            date: "2026-10-19".into(),
        });
        rows.extend(open_rows("B", t(9, 40), t(10, 0)));
        let matrix = matrix(&["A", "B"], &rows);
        let request = ServiceRequest::single("A", 30).with_secondary("B", 20);
        let hours = BusinessHours::default();

        assert!(is_slot_available(
            t(9, 0),
            &ServiceRequest::single("A", 30),
            &matrix,
            &hours
        ));
        assert_eq!(
            first_unavailable_tick(t(9, 0), &request, &matrix, &hours),
            Some(TickFailure {
                staff_id: "B".into(),
                tick: t(9, 30)
            })
        );
    }

    #[test]
    fn dual_booking_passes_when_both_segments_open() {
        let mut rows = open_rows("A", t(9, 0), t(9, 20));
        rows.extend(open_rows("B", t(9, 30), t(9, 40)));
        let matrix = matrix(&["A", "B"], &rows);
        let request = ServiceRequest::single("A", 30).with_secondary("B", 20);
        assert!(is_slot_available(
            t(9, 0),
            &request,
            &matrix,
            &BusinessHours::default()
        ));
    }

    #[test]
    fn truncate_at_close_reports_partial_service_available() {
        let rows = open_rows("A", t(15, 30), t(15, 50));
        let matrix = matrix(&["A"], &rows);
        let request = ServiceRequest::single("A", 90).with_secondary("B", 30);
        assert!(is_slot_available(
            t(15, 30),
            &request,
            &matrix,
            &BusinessHours::default()
        ));
    }

    #[test]
    fn zero_duration_is_never_bookable() {
        let rows = open_rows("A", t(9, 0), t(15, 50));
        let matrix = matrix(&["A"], &rows);
        let hours = BusinessHours::default();
        assert!(!is_slot_available(
            t(9, 0),
            &ServiceRequest::single("A", 0),
            &matrix,
            &hours
        ));
        assert!(!is_slot_available(
            t(9, 0),
            &ServiceRequest::single("A", 30).with_secondary("A", 0),
            &matrix,
            &hours
        ));
    }

    #[test]
    fn evaluation_is_idempotent() {
        let rows = open_rows("A", t(9, 0), t(12, 0));
        let matrix = matrix(&["A"], &rows);
        let request = ServiceRequest::single("A", 40);
        let hours = BusinessHours::default();
        for slot in [t(9, 0), t(11, 30), t(14, 0)] {
            assert_eq!(
                is_slot_available(slot, &request, &matrix, &hours),
                is_slot_available(slot, &request, &matrix, &hours)
            );
        }
    }

    #[test]
    fn evaluate_day_lists_every_client_slot_in_order() {
        let rows = open_rows("A", t(9, 0), t(10, 50));
        let matrix = matrix(&["A"], &rows);
        let slots = evaluate_day(
            &ServiceRequest::single("A", 60),
            &matrix,
            &BusinessHours::default(),
        );
        assert_eq!(slots.len(), 14);
        assert_eq!(slots[0].id, "2026-10-19T09:00");
        let open: Vec<&str> = slots
            .iter()
            .filter(|s| s.available)
            .map(|s| s.time.as_str())
            .collect();
        assert_eq!(open, vec!["09:00", "09:30", "10:00"]);
    }
}
