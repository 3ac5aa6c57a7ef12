//! Client profile, consent and onboarding updates.
//!
//! Failures are logged and reported as `false`; the caller decides whether
//! to show a toast.

use shared_types::{BackendError, ClientProfileUpdate, ConsentUpdate};

use crate::backend::ProfileBackend;

pub async fn update_profile<B>(backend: &B, update: &ClientProfileUpdate) -> bool
where
    B: ProfileBackend + ?Sized,
{
    match backend.update_profile(update).await {
        Ok(()) => {
            tracing::info!(user_id = %update.user_id, "client profile updated");
            true
        }
        Err(err) => {
            log_failure("update profile", &update.user_id, &err);
            false
        }
    }
}

pub async fn update_consent<B>(backend: &B, update: &ConsentUpdate) -> bool
where
    B: ProfileBackend + ?Sized,
{
    match backend.update_consent(update).await {
        Ok(()) => {
            tracing::info!(
                user_id = %update.user_id,
                consent_type = %update.consent_type,
                granted = update.granted,
                "consent recorded"
            );
            true
        }
        Err(err) => {
            log_failure("update consent", &update.user_id, &err);
            false
        }
    }
}

pub async fn complete_onboarding<B>(backend: &B, user_id: &str) -> bool
where
    B: ProfileBackend + ?Sized,
{
    match backend.complete_onboarding(user_id).await {
        Ok(()) => {
            tracing::info!(user_id, "onboarding completed");
            true
        }
        Err(err) => {
            log_failure("complete onboarding", user_id, &err);
            false
        }
    }
}

fn log_failure(operation: &str, user_id: &str, err: &BackendError) {
    tracing::error!(
        operation,
        user_id,
        message = %err.message,
        details = ?err.details,
        hint = ?err.hint,
        code = ?err.code,
        "profile operation failed"
    );
}
