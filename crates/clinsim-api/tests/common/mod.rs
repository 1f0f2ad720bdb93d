//! Shared test helpers for API integration tests.
#![allow(dead_code)]

use std::path::PathBuf;
use std::sync::Arc;

use axum::Router;
use axum::body::Body;
use axum::http::{Request, StatusCode};
use clinsim_cases::CaseCatalog;
use clinsim_core::clock::Clock;
use clinsim_event_store::InMemoryEventRepository;
use clinsim_test_support::FixedClock;
use http_body_util::BodyExt;
use tower::ServiceExt;

use clinsim_api::routes;
use clinsim_api::state::AppState;

/// Fixed timestamp used across all integration tests.
fn fixed_clock() -> Arc<dyn Clock> {
    Arc::new(FixedClock(
        chrono::TimeZone::with_ymd_and_hms(&chrono::Utc, 2026, 1, 15, 10, 0, 0).unwrap(),
    ))
}

/// Path of the CSV fixture holding the "Chest Pain", "Sepsis" and "Trauma"
/// cases. "Trauma" step 2 is malformed.
pub fn fixture_path() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("tests/fixtures/clinical_cases.csv")
}

/// Build state over the fixture with an empty in-memory event store.
/// Clone it to send several requests against the same sessions.
pub fn build_test_state() -> AppState {
    build_test_state_for(fixture_path())
}

/// Build state reading cases from `cases_path`.
pub fn build_test_state_for(cases_path: PathBuf) -> AppState {
    AppState::new(
        fixed_clock(),
        Arc::new(InMemoryEventRepository::new()),
        Arc::new(CaseCatalog::new(false)),
        cases_path,
    )
}

/// Build the full app router. Uses the same route structure as `main.rs`.
pub fn build_test_app(state: AppState) -> Router {
    routes::app(state)
}

async fn send(app: Router, request: Request<Body>) -> (StatusCode, serde_json::Value) {
    let response = app.oneshot(request).await.unwrap();
    let status = response.status();
    let body_bytes = response.into_body().collect().await.unwrap().to_bytes();
    let json = if body_bytes.is_empty() {
        serde_json::Value::Null
    } else {
        serde_json::from_slice(&body_bytes).unwrap()
    };

    (status, json)
}

/// Send a POST request with a JSON body and return the response.
pub async fn post_json(
    state: &AppState,
    uri: &str,
    body: &serde_json::Value,
) -> (StatusCode, serde_json::Value) {
    let request = Request::builder()
        .method("POST")
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(serde_json::to_vec(body).unwrap()))
        .unwrap();

    send(build_test_app(state.clone()), request).await
}

/// Send a GET request and return the response.
pub async fn get_json(state: &AppState, uri: &str) -> (StatusCode, serde_json::Value) {
    let request = Request::builder()
        .method("GET")
        .uri(uri)
        .body(Body::empty())
        .unwrap();

    send(build_test_app(state.clone()), request).await
}

/// Start a session on `case_id` and return its ID.
pub async fn start_session(state: &AppState, case_id: &str) -> String {
    let (status, json) = post_json(
        state,
        "/api/v1/sessions/start-session",
        &serde_json::json!({ "case_id": case_id }),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    json["aggregate_id"].as_str().unwrap().to_owned()
}

/// Choose `option_index` on the session's current step.
pub async fn choose(
    state: &AppState,
    session_id: &str,
    option_index: usize,
) -> (StatusCode, serde_json::Value) {
    post_json(
        state,
        "/api/v1/sessions/choose-option",
        &serde_json::json!({ "session_id": session_id, "option_index": option_index }),
    )
    .await
}

/// Fetch the session view.
pub async fn view(state: &AppState, session_id: &str) -> serde_json::Value {
    let (status, json) = get_json(state, &format!("/api/v1/sessions/{session_id}")).await;
    assert_eq!(status, StatusCode::OK);
    json
}
