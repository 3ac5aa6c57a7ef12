//! The booking wizard and the path from a picked slot to an appointment.

pub mod form_state;
pub mod messages;
pub mod profile;
pub mod snapshot;
pub mod submitter;

pub use form_state::{
    AppointmentFormState, BookingConfirmation, BookingStep, FetchOutcome, FormError, SlotFetch,
    WizardError,
};
pub use messages::{user_message, RejectionKind};
pub use snapshot::{AvailabilitySnapshot, BookingDraft};
pub use submitter::{BookingSubmitter, SubmitError};
