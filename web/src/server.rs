//! JSON handlers over the booking core.

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use serde::{Deserialize, Serialize};
use shared_types::{
    AvailabilityRow, ClientProfileUpdate, ConsentUpdate, EditBookingParams, PetSummary,
    ServiceSummary, StaffSummary, TimeSlot,
};

use crate::app::AppState;
use crate::availability::{SlotQuery, MAX_SERVICE_MINUTES};
use crate::backend::{AvailabilityAdmin, AvailabilitySource, CatalogSource};
use crate::booking::{profile, AvailabilitySnapshot, BookingDraft};
use crate::error::{ApiError, ApiResult};
use crate::utils::time::parse_date;

#[derive(Debug, Deserialize)]
pub struct PetsParams {
    pub user_id: String,
}

#[derive(Debug, Deserialize)]
pub struct AvailabilityParams {
    pub date: String,
    /// Comma separated staff profile ids.
    pub staff_ids: String,
}

#[derive(Debug, Deserialize)]
pub struct OnboardingRequest {
    pub user_id: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct BookingCreated {
    pub appointment_id: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct UpdateOutcome {
    pub success: bool,
}

pub async fn list_services(State(state): State<AppState>) -> ApiResult<Json<Vec<ServiceSummary>>> {
    Ok(Json(state.backend.fetch_services().await?))
}

pub async fn list_staff(State(state): State<AppState>) -> ApiResult<Json<Vec<StaffSummary>>> {
    Ok(Json(state.backend.fetch_staff().await?))
}

pub async fn list_pets(
    State(state): State<AppState>,
    Query(params): Query<PetsParams>,
) -> ApiResult<Json<Vec<PetSummary>>> {
    Ok(Json(state.backend.fetch_pets(&params.user_id).await?))
}

/// Raw availability rows, as stored.
pub async fn get_availability(
    State(state): State<AppState>,
    Query(params): Query<AvailabilityParams>,
) -> ApiResult<Json<Vec<AvailabilityRow>>> {
    let date = parse_date(&params.date)
        .ok_or_else(|| ApiError::BadRequest(format!("invalid date: {}", params.date)))?;
    let staff_ids: Vec<String> = params
        .staff_ids
        .split(',')
        .map(str::trim)
        .filter(|id| !id.is_empty())
        .map(str::to_string)
        .collect();
    if staff_ids.is_empty() {
        return Err(ApiError::BadRequest("staff_ids is required".to_string()));
    }

    Ok(Json(state.backend.fetch_availability(date, &staff_ids).await?))
}

/// Client slot list for a date/staff/duration selection.
pub async fn time_slots(
    State(state): State<AppState>,
    Json(query): Json<SlotQuery>,
) -> ApiResult<Json<Vec<TimeSlot>>> {
    check_duration(&query)?;
    let snapshot = fresh_snapshot(&state, query).await?;
    Ok(Json(snapshot.slots))
}

/// Re-validate the draft against availability fetched now, then create.
pub async fn create_booking(
    State(state): State<AppState>,
    Json(draft): Json<BookingDraft>,
) -> ApiResult<(StatusCode, Json<BookingCreated>)> {
    check_duration(&draft.query)?;
    let snapshot = fresh_snapshot(&state, draft.query.clone()).await?;
    let appointment_id = state.submitter().submit(&draft, Some(&snapshot)).await?;

    Ok((StatusCode::CREATED, Json(BookingCreated { appointment_id })))
}

pub async fn edit_booking(
    State(state): State<AppState>,
    Path(appointment_id): Path<String>,
    Json(mut params): Json<EditBookingParams>,
) -> ApiResult<StatusCode> {
    params.appointment_id = appointment_id;
    state.submitter().edit_booking(&params).await?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn set_availability(
    State(state): State<AppState>,
    Json(row): Json<AvailabilityRow>,
) -> ApiResult<StatusCode> {
    state.backend.set_slot_availability(&row).await?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn update_profile(
    State(state): State<AppState>,
    Json(update): Json<ClientProfileUpdate>,
) -> Json<UpdateOutcome> {
    let success = profile::update_profile(state.backend.as_ref(), &update).await;
    Json(UpdateOutcome { success })
}

pub async fn update_consent(
    State(state): State<AppState>,
    Json(update): Json<ConsentUpdate>,
) -> Json<UpdateOutcome> {
    let success = profile::update_consent(state.backend.as_ref(), &update).await;
    Json(UpdateOutcome { success })
}

pub async fn complete_onboarding(
    State(state): State<AppState>,
    Json(request): Json<OnboardingRequest>,
) -> Json<UpdateOutcome> {
    let success = profile::complete_onboarding(state.backend.as_ref(), &request.user_id).await;
    Json(UpdateOutcome { success })
}

fn check_duration(query: &SlotQuery) -> ApiResult<()> {
    if query.request.fits_in_day() {
        Ok(())
    } else {
        Err(ApiError::BadRequest(format!(
            "invalid duration: {} minutes exceeds {MAX_SERVICE_MINUTES}",
            query.request.total_minutes()
        )))
    }
}

async fn fresh_snapshot(state: &AppState, query: SlotQuery) -> ApiResult<AvailabilitySnapshot> {
    let rows = state
        .backend
        .fetch_availability(query.date, &query.request.staff_ids())
        .await
        .map_err(|err| {
            tracing::error!(
                date = %query.date,
                message = %err.message,
                code = ?err.code,
                "availability fetch failed"
            );
            ApiError::from(err)
        })?;

    Ok(AvailabilitySnapshot::new(query, rows, &state.hours))
}
