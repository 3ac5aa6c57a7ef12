use std::collections::{BTreeSet, HashMap};

use chrono::{NaiveDate, NaiveTime};
use shared_types::AvailabilityRow;

use super::hours::BusinessHours;
use super::slots::generate_backend_slots;
use crate::utils::time::{parse_date, parse_slot_time};

/// `(tick, staff)` → available lookup for one date.
///
/// Every tick of the business day is materialized as unavailable for every
/// requested staff member before the fetched rows are overlaid, so a lookup
/// never distinguishes "missing" from "unavailable".
#[derive(Debug, Clone, PartialEq)]
pub struct AvailabilityMatrix {
    date: NaiveDate,
    staff_ids: Vec<String>,
    cells: HashMap<String, HashMap<NaiveTime, bool>>,
    ignored_rows: usize,
}

impl AvailabilityMatrix {
    pub fn build(
        date: NaiveDate,
        staff_ids: &[String],
        rows: &[AvailabilityRow],
        hours: &BusinessHours,
    ) -> Self {
        let staff_ids: Vec<String> = staff_ids
            .iter()
            .cloned()
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect();
        let window = generate_backend_slots(hours.opening_hour, hours.closing_hour_on(date));

        let mut cells: HashMap<String, HashMap<NaiveTime, bool>> = staff_ids
            .iter()
            .map(|id| (id.clone(), window.iter().map(|t| (*t, false)).collect()))
            .collect();

        let mut ignored_rows = 0;
        for row in rows {
            let Some(staff_cells) = cells.get_mut(&row.staff_profile_id) else {
                ignored_rows += 1;
                continue;
            };
            let same_day = parse_date(&row.date).is_some_and(|d| d == date);
            match (same_day, parse_slot_time(&row.time_slot)) {
                (true, Some(tick)) => {
                    staff_cells.insert(tick, row.available);
                }
                _ => ignored_rows += 1,
            }
        }

        Self {
            date,
            staff_ids,
            cells,
            ignored_rows,
        }
    }

    pub fn date(&self) -> NaiveDate {
        self.date
    }

    /// Deduplicated, sorted staff the matrix was built for.
    pub fn staff_ids(&self) -> &[String] {
        &self.staff_ids
    }

    /// Rows that named another staff member, another date or an unparseable
    /// time.
    pub fn ignored_rows(&self) -> usize {
        self.ignored_rows
    }

    pub fn is_available(&self, tick: NaiveTime, staff_id: &str) -> bool {
        self.cells
            .get(staff_id)
            .and_then(|staff_cells| staff_cells.get(&tick))
            .copied()
            .unwrap_or(false)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn t(h: u32, m: u32) -> NaiveTime {
        NaiveTime::from_hms_opt(h, m, 0).unwrap()
    }

    fn row(staff: &str, time: &str, available: bool) -> AvailabilityRow {
        AvailabilityRow {
            staff_profile_id: staff.into(),
            time_slot: time.into(),
            available,
            date: "2026-10-19".into(),
        }
    }

    fn monday() -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 10, 19).unwrap()
    }

    #[test]
    fn missing_pairs_are_unavailable() {
        let rows = vec![row("A", "09:00:00", true)];
        let matrix = AvailabilityMatrix::build(
            monday(),
            &["A".into(), "B".into()],
            &rows,
            &BusinessHours::default(),
        );
        assert!(matrix.is_available(t(9, 0), "A"));
        assert!(!matrix.is_available(t(9, 10), "A"));
        assert!(!matrix.is_available(t(9, 0), "B"));
        assert!(!matrix.is_available(t(9, 0), "nobody"));
        assert!(!matrix.is_available(t(20, 0), "A"));
    }

    #[test]
    fn rows_overlay_defaults_including_explicit_false() {
        let rows = vec![
            row("A", "10:00:00", true),
            row("A", "10:10:00", false),
            row("A", "10:20", true),
        ];
        let matrix =
            AvailabilityMatrix::build(monday(), &["A".into()], &rows, &BusinessHours::default());
        assert!(matrix.is_available(t(10, 0), "A"));
        assert!(!matrix.is_available(t(10, 10), "A"));
        assert!(matrix.is_available(t(10, 20), "A"));
    }

    #[test]
    fn foreign_rows_are_ignored() {
        let mut other_day = row("A", "09:00:00", true);
        other_day.date = "2026-10-20".into();
        let rows = vec![
            other_day,
            row("C", "09:00:00", true),
            row("A", "nine", true),
        ];
        let matrix =
            AvailabilityMatrix::build(monday(), &["A".into()], &rows, &BusinessHours::default());
        assert_eq!(matrix.ignored_rows(), 3);
        assert!(!matrix.is_available(t(9, 0), "A"));
        assert!(!matrix.is_available(t(9, 0), "C"));
    }

    #[test]
    fn staff_ids_are_deduplicated() {
        let matrix = AvailabilityMatrix::build(
            monday(),
            &["B".into(), "A".into(), "B".into()],
            &[],
            &BusinessHours::default(),
        );
        assert_eq!(matrix.staff_ids(), &["A".to_string(), "B".to_string()]);
        assert!(!matrix.is_available(t(9, 0), "A"));
    }
}
