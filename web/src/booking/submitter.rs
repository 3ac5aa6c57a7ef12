//! Final gate in front of the backend's atomic booking procedure.
//!
//! The checks here duplicate what the backend enforces. They exist to fail
//! fast on a stale slot list; a booking that passes them can still be
//! rejected remotely.

use std::sync::Arc;

use shared_types::{BackendError, EditBookingParams};
use thiserror::Error;

use super::messages::{user_message, RejectionKind};
use super::snapshot::{AvailabilitySnapshot, BookingDraft};
use crate::availability::{first_unavailable_tick, BusinessHours};
use crate::backend::BookingBackend;
use crate::utils::time::{format_backend_time, format_client_time};

#[derive(Debug, Error)]
pub enum SubmitError {
    #[error("no availability has been fetched for this booking")]
    NoSnapshot,

    #[error("fetched availability is for a different selection")]
    StaleSnapshot,

    #[error("slot {time} not in fetched snapshot")]
    SlotNotInSnapshot { time: String },

    #[error("slot {time} is not available")]
    SlotNotAvailable { time: String },

    #[error("tick {tick} unavailable for staff {staff_id}")]
    TickUnavailable { staff_id: String, tick: String },

    #[error("backend rejected booking: {source}")]
    Rejected {
        kind: RejectionKind,
        #[source]
        source: BackendError,
    },
}

impl SubmitError {
    /// Local failures never reached the backend.
    pub fn is_local(&self) -> bool {
        !matches!(self, Self::Rejected { .. })
    }

    pub fn user_message(&self) -> String {
        match self {
            Self::NoSnapshot | Self::StaleSnapshot => {
                "Os horários exibidos estão desatualizados. Atualize a lista e tente novamente."
                    .to_string()
            }
            Self::SlotNotInSnapshot { time } | Self::SlotNotAvailable { time } => {
                format!("O horário {time} não está mais disponível. Escolha outro horário.")
            }
            Self::TickUnavailable { .. } => {
                "O serviço não cabe no horário escolhido. Escolha outro horário.".to_string()
            }
            Self::Rejected { source, .. } => user_message(source),
        }
    }
}

pub struct BookingSubmitter<B: ?Sized> {
    backend: Arc<B>,
    hours: BusinessHours,
}

impl<B: ?Sized> Clone for BookingSubmitter<B> {
    fn clone(&self) -> Self {
        Self {
            backend: Arc::clone(&self.backend),
            hours: self.hours,
        }
    }
}

impl<B> BookingSubmitter<B>
where
    B: BookingBackend + ?Sized,
{
    pub fn new(backend: Arc<B>, hours: BusinessHours) -> Self {
        Self { backend, hours }
    }

    /// Re-check `draft` against the latest fetched availability.
    pub fn validate(
        &self,
        draft: &BookingDraft,
        snapshot: Option<&AvailabilitySnapshot>,
    ) -> Result<(), SubmitError> {
        let snapshot = snapshot.ok_or(SubmitError::NoSnapshot)?;
        if snapshot.query != draft.query {
            return Err(SubmitError::StaleSnapshot);
        }

        let request = &draft.query.request;
        if !snapshot.contains_tick(&request.primary.staff_id, draft.time) {
            return Err(SubmitError::SlotNotInSnapshot {
                time: format_client_time(draft.time),
            });
        }

        let shown_available = snapshot
            .slot(draft.time)
            .is_some_and(|slot| slot.available);
        if !shown_available {
            return Err(SubmitError::SlotNotAvailable {
                time: format_client_time(draft.time),
            });
        }

        let matrix = snapshot.matrix(&self.hours);
        if let Some(failure) = first_unavailable_tick(draft.time, request, &matrix, &self.hours) {
            return Err(SubmitError::TickUnavailable {
                staff_id: failure.staff_id,
                tick: format_backend_time(failure.tick),
            });
        }
        Ok(())
    }

    /// Validate locally, then call the atomic create-booking procedure.
    /// Returns the new appointment id.
    pub async fn submit(
        &self,
        draft: &BookingDraft,
        snapshot: Option<&AvailabilitySnapshot>,
    ) -> Result<String, SubmitError> {
        if let Err(err) = self.validate(draft, snapshot) {
            tracing::warn!(
                user_id = %draft.user_id,
                date = %draft.query.date,
                time = %format_client_time(draft.time),
                error = %err,
                "booking rejected locally"
            );
            return Err(err);
        }

        let params = draft.to_params();
        match self.backend.create_booking(&params).await {
            Ok(appointment_id) => {
                tracing::info!(
                    appointment_id = %appointment_id,
                    date = %params.booking_date,
                    time = %params.time_slot,
                    providers = ?params.provider_ids,
                    "booking created"
                );
                Ok(appointment_id)
            }
            Err(source) => Err(rejection("create booking", source)),
        }
    }

    pub async fn edit_booking(&self, params: &EditBookingParams) -> Result<(), SubmitError> {
        self.backend
            .edit_booking(params)
            .await
            .map(|()| {
                tracing::info!(
                    appointment_id = %params.appointment_id,
                    force_override = params.force_override,
                    "booking edited"
                );
            })
            .map_err(|source| rejection("edit booking", source))
    }
}

fn rejection(operation: &str, source: BackendError) -> SubmitError {
    let kind = RejectionKind::classify(&source);
    tracing::error!(
        operation,
        kind = ?kind,
        message = %source.message,
        details = ?source.details,
        hint = ?source.hint,
        code = ?source.code,
        "backend rejected request"
    );
    SubmitError::Rejected { kind, source }
}
