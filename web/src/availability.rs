//! Client-side availability reconciliation.
//!
//! Advisory only: the backend's atomic booking procedure is the authority on
//! conflicts. These computations exist so the wizard can show bookable slots
//! without a round trip per slot.

pub mod evaluator;
pub mod hours;
pub mod matrix;
pub mod query;
pub mod slots;

pub use evaluator::{evaluate_day, first_unavailable_tick, is_slot_available, TickFailure};
pub use hours::BusinessHours;
pub use matrix::AvailabilityMatrix;
pub use query::{ServiceRequest, ServiceSegment, SlotCacheKey, SlotQuery, MAX_SERVICE_MINUTES};
