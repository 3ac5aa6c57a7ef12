use std::sync::Arc;

use axum::{
    routing::{get, post, put},
    Json, Router,
};
use serde_json::json;

use crate::availability::BusinessHours;
use crate::backend::Backend;
use crate::booking::BookingSubmitter;
use crate::server;

#[derive(Clone)]
pub struct AppState {
    pub backend: Arc<dyn Backend>,
    pub hours: BusinessHours,
}

impl AppState {
    pub fn new(backend: Arc<dyn Backend>, hours: BusinessHours) -> Self {
        Self { backend, hours }
    }

    pub fn submitter(&self) -> BookingSubmitter<dyn Backend> {
        BookingSubmitter::new(Arc::clone(&self.backend), self.hours)
    }
}

pub fn create_router(state: AppState) -> Router {
    let api = Router::new()
        .route("/services", get(server::list_services))
        .route("/staff", get(server::list_staff))
        .route("/pets", get(server::list_pets))
        .route("/availability", get(server::get_availability))
        .route("/time-slots", post(server::time_slots))
        .route("/bookings", post(server::create_booking))
        .route("/admin/bookings/:id", put(server::edit_booking))
        .route("/admin/availability", put(server::set_availability))
        .route("/profile", post(server::update_profile))
        .route("/profile/consent", post(server::update_consent))
        .route("/onboarding/complete", post(server::complete_onboarding));

    Router::new()
        .route("/health", get(health_check))
        .nest("/api", api)
        .with_state(state)
}

async fn health_check() -> Json<serde_json::Value> {
    Json(json!({
        "status": "ok",
        "version": env!("CARGO_PKG_VERSION"),
    }))
}
