use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Longest service request that can be booked, primary plus secondary.
pub const MAX_SERVICE_MINUTES: u32 = 24 * 60;

/// The part of a service performed by one staff member.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ServiceSegment {
    pub staff_id: String,
    pub duration_minutes: u32,
}

/// Primary segment plus an optional secondary segment that starts exactly
/// when the primary one ends.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ServiceRequest {
    pub primary: ServiceSegment,
    #[serde(default)]
    pub secondary: Option<ServiceSegment>,
}

impl ServiceRequest {
    pub fn single(staff_id: impl Into<String>, duration_minutes: u32) -> Self {
        Self {
            primary: ServiceSegment {
                staff_id: staff_id.into(),
                duration_minutes,
            },
            secondary: None,
        }
    }

    pub fn with_secondary(mut self, staff_id: impl Into<String>, duration_minutes: u32) -> Self {
        self.secondary = Some(ServiceSegment {
            staff_id: staff_id.into(),
            duration_minutes,
        });
        self
    }

    /// Provider ids in segment order, as the booking procedure expects them.
    pub fn provider_ids(&self) -> Vec<String> {
        let mut ids = vec![self.primary.staff_id.clone()];
        if let Some(secondary) = &self.secondary {
            ids.push(secondary.staff_id.clone());
        }
        ids
    }

    /// Total duration of both segments.
    pub fn total_minutes(&self) -> u32 {
        let secondary = self
            .secondary
            .as_ref()
            .map_or(0, |segment| segment.duration_minutes);
        self.primary.duration_minutes.saturating_add(secondary)
    }

    pub fn fits_in_day(&self) -> bool {
        self.total_minutes() <= MAX_SERVICE_MINUTES
    }

    /// Sorted, deduplicated staff ids to fetch availability for.
    pub fn staff_ids(&self) -> Vec<String> {
        let mut ids = self.provider_ids();
        ids.sort();
        ids.dedup();
        ids
    }
}

/// Everything a slot list depends on.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SlotQuery {
    pub date: NaiveDate,
    pub service_id: String,
    pub request: ServiceRequest,
}

impl SlotQuery {
    pub fn cache_key(&self) -> SlotCacheKey {
        SlotCacheKey {
            date: self.date,
            staff_ids: self.request.staff_ids(),
            service_id: self.service_id.clone(),
            durations: (
                self.request.primary.duration_minutes,
                self.request
                    .secondary
                    .as_ref()
                    .map(|segment| segment.duration_minutes),
            ),
        }
    }
}

/// Date + sorted staff + service + duration pair.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SlotCacheKey {
    pub date: NaiveDate,
    pub staff_ids: Vec<String>,
    pub service_id: String,
    pub durations: (u32, Option<u32>),
}
