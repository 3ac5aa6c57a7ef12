use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use shared_types::BackendError;
use thiserror::Error;

use crate::booking::{user_message, RejectionKind, SubmitError};

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Backend error: {0}")]
    Backend(#[from] BackendError),

    #[error("Booking error: {0}")]
    Submit(#[from] SubmitError),
}

impl ApiError {
    fn status(&self) -> StatusCode {
        match self {
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::Backend(err) => status_for(RejectionKind::classify(err)),
            ApiError::Submit(SubmitError::Rejected { kind, .. }) => status_for(*kind),
            ApiError::Submit(_) => StatusCode::CONFLICT,
        }
    }

    fn user_message(&self) -> String {
        match self {
            ApiError::BadRequest(message) => message.clone(),
            ApiError::Backend(err) => user_message(err),
            ApiError::Submit(err) => err.user_message(),
        }
    }
}

fn status_for(kind: RejectionKind) -> StatusCode {
    match kind {
        RejectionKind::ProviderUnavailable
        | RejectionKind::BathCapacityExceeded
        | RejectionKind::ConflictingAppointment => StatusCode::CONFLICT,
        RejectionKind::PermissionDenied => StatusCode::FORBIDDEN,
        RejectionKind::ValidationFailed => StatusCode::UNPROCESSABLE_ENTITY,
        RejectionKind::Other => StatusCode::BAD_GATEWAY,
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let body = Json(json!({
            "error": {
                "message": self.user_message(),
                "details": self.to_string(),
            }
        }));

        (status, body).into_response()
    }
}

pub type ApiResult<T> = Result<T, ApiError>;
