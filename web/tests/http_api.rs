//! Router-level tests: requests go through axum with an in-memory backend.

#![cfg(feature = "ssr")]

mod common;

use std::sync::Arc;

use axum::{
    body::{to_bytes, Body},
    http::{Request, StatusCode},
    Router,
};
use common::{monday, InMemoryBackend};
use serde_json::{json, Value};
use tower::ServiceExt;
use web::app::{create_router, AppState};
use web::availability::BusinessHours;

fn router(backend: Arc<InMemoryBackend>) -> Router {
    create_router(AppState::new(backend, BusinessHours::default()))
}

async fn send(app: Router, method: &str, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
    let request = Request::builder()
        .method(method)
        .uri(uri)
        .header("content-type", "application/json");
    let request = match body {
        Some(body) => request.body(Body::from(body.to_string())).unwrap(),
        None => request.body(Body::empty()).unwrap(),
    };

    let response = app.oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let value = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, value)
}

fn bath_query() -> Value {
    json!({
        "date": "2026-10-19",
        "service_id": "bath",
        "request": {
            "primary": { "staff_id": "A", "duration_minutes": 30 }
        }
    })
}

fn draft(time: &str) -> Value {
    json!({
        "user_id": "user-1",
        "pet_id": "mia",
        "query": bath_query(),
        "time": time,
    })
}

#[tokio::test]
async fn health_reports_ok() {
    let (status, body) = send(
        router(Arc::new(InMemoryBackend::seeded())),
        "GET",
        "/health",
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");
}

#[tokio::test]
async fn time_slots_are_evaluated_server_side() {
    let backend = Arc::new(InMemoryBackend::seeded());
    backend.open("A", monday(), "09:00", "09:30");

    let (status, body) = send(router(backend), "POST", "/api/time-slots", Some(bath_query())).await;
    assert_eq!(status, StatusCode::OK);

    let slots = body.as_array().unwrap();
    // Monday runs 09:00 to 16:00 in 30-minute steps.
    assert_eq!(slots.len(), 14);
    assert_eq!(slots[0]["time"], "09:00");
    assert_eq!(slots[0]["available"], true);
    assert!(slots[1..].iter().all(|slot| slot["available"] == false));
}

#[tokio::test]
async fn booking_is_revalidated_before_creation() {
    let backend = Arc::new(InMemoryBackend::seeded());
    backend.open("A", monday(), "09:00", "09:30");

    let (status, body) = send(
        router(Arc::clone(&backend)),
        "POST",
        "/api/bookings",
        Some(draft("09:00:00")),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["appointment_id"], "appt-1");

    let (status, body) = send(
        router(Arc::clone(&backend)),
        "POST",
        "/api/bookings",
        Some(draft("09:30:00")),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert!(body["error"]["message"]
        .as_str()
        .unwrap()
        .contains("09:30"));
    assert_eq!(backend.bookings().len(), 1);
}

#[tokio::test]
async fn admin_override_changes_what_is_bookable() {
    let backend = Arc::new(InMemoryBackend::seeded());
    backend.open("A", monday(), "09:00", "09:30");

    let (status, _) = send(
        router(Arc::clone(&backend)),
        "PUT",
        "/api/admin/availability",
        Some(json!({
            "staff_profile_id": "A",
            "time_slot": "09:10:00",
            "available": false,
            "date": "2026-10-19"
        })),
    )
    .await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let (_, body) = send(router(backend), "POST", "/api/time-slots", Some(bath_query())).await;
    assert_eq!(body[0]["available"], false);
}

#[tokio::test]
async fn admin_edit_takes_the_id_from_the_path() {
    let backend = Arc::new(InMemoryBackend::seeded());
    let (status, _) = send(
        router(Arc::clone(&backend)),
        "PUT",
        "/api/admin/bookings/appt-7",
        Some(json!({
            "new_date": "2026-10-20",
            "new_time_slot": "10:00:00",
            "extra_fee": 15.0,
            "force_override": true,
            "edited_by": "admin-1"
        })),
    )
    .await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let edits = backend.edits();
    assert_eq!(edits[0].appointment_id, "appt-7");
    assert!(edits[0].force_override);
}

#[tokio::test]
async fn invalid_availability_query_is_a_bad_request() {
    let app = router(Arc::new(InMemoryBackend::seeded()));
    let (status, body) = send(app, "GET", "/api/availability?date=19/10/2026&staff_ids=A", None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"]["message"], "invalid date: 19/10/2026");
}

#[tokio::test]
async fn oversized_duration_is_a_bad_request() {
    let backend = Arc::new(InMemoryBackend::seeded());
    backend.open("A", monday(), "09:00", "09:30");

    let mut query = bath_query();
    query["request"]["secondary"] = json!({ "staff_id": "A", "duration_minutes": 4294967295u32 });
    let (status, body) = send(
        router(Arc::clone(&backend)),
        "POST",
        "/api/time-slots",
        Some(query.clone()),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"]["message"]
        .as_str()
        .unwrap()
        .starts_with("invalid duration"));

    let mut booking = draft("09:00:00");
    booking["query"] = query;
    let (status, _) = send(router(Arc::clone(&backend)), "POST", "/api/bookings", Some(booking)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(backend.bookings().is_empty());
}

#[tokio::test]
async fn profile_updates_report_success_flag() {
    let backend = Arc::new(InMemoryBackend::seeded());
    let (status, body) = send(
        router(Arc::clone(&backend)),
        "POST",
        "/api/onboarding/complete",
        Some(json!({ "user_id": "user-1" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], true);

    backend.reject_next(shared_types::BackendError::new("permission denied"));
    let (_, body) = send(
        router(Arc::clone(&backend)),
        "POST",
        "/api/profile/consent",
        Some(json!({ "user_id": "user-1", "consent_type": "marketing", "granted": true })),
    )
    .await;
    assert_eq!(body["success"], false);
    assert_eq!(backend.profile_calls(), vec!["onboarding:user-1".to_string()]);
}
