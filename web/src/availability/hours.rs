use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::utils::time::is_saturday;

/// Resolution of the backend availability table.
pub const BACKEND_SLOT_MINUTES: u32 = 10;
/// Resolution of the slots offered to clients.
pub const CLIENT_SLOT_MINUTES: u32 = 30;

/// Opening policy shared by every slot computation.
///
/// A single closing hour per day drives the client slot list, the matrix
/// window and truncate-at-close, so the three can never disagree.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BusinessHours {
    pub opening_hour: u32,
    pub weekday_closing_hour: u32,
    pub saturday_closing_hour: u32,
}

impl Default for BusinessHours {
    fn default() -> Self {
        Self {
            opening_hour: 9,
            weekday_closing_hour: 16,
            saturday_closing_hour: 12,
        }
    }
}

impl BusinessHours {
    pub fn closing_hour(&self, saturday: bool) -> u32 {
        if saturday {
            self.saturday_closing_hour
        } else {
            self.weekday_closing_hour
        }
    }

    pub fn closing_hour_on(&self, date: NaiveDate) -> u32 {
        self.closing_hour(is_saturday(date))
    }

    /// Hours are valid when opening precedes every closing time and nothing
    /// runs past midnight.
    pub fn is_valid(&self) -> bool {
        self.opening_hour < self.weekday_closing_hour
            && self.opening_hour < self.saturday_closing_hour
            && self.weekday_closing_hour <= 24
            && self.saturday_closing_hour <= 24
    }
}
