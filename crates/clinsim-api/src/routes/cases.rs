//! Routes for the case repository.

use axum::extract::{Path, State};
use axum::routing::{get, post};
use axum::{Json, Router};
use clinsim_cases::application::query_handlers::{
    self, CaseListView, CaseStepsView, StepView, TableStatusView,
};
use tracing::{info, instrument};

use crate::error::ApiError;
use crate::state::AppState;

/// GET /
#[instrument(skip(state))]
async fn list_cases(State(state): State<AppState>) -> Result<Json<CaseListView>, ApiError> {
    let table = state.case_table()?;
    Ok(Json(query_handlers::list_cases(&table)))
}

/// GET /{case_id}/steps
#[instrument(skip(state))]
async fn get_case_steps(
    State(state): State<AppState>,
    Path(case_id): Path<String>,
) -> Result<Json<CaseStepsView>, ApiError> {
    let table = state.case_table()?;
    let view = query_handlers::get_case_steps(&table, &case_id)?;
    Ok(Json(view))
}

/// GET /{case_id}/steps/{step_id}
#[instrument(skip(state))]
async fn get_step(
    State(state): State<AppState>,
    Path((case_id, step_id)): Path<(String, String)>,
) -> Result<Json<StepView>, ApiError> {
    let table = state.case_table()?;
    let view = query_handlers::get_step(&table, &case_id, &step_id)?;
    Ok(Json(view))
}

/// POST /reload
#[instrument(skip(state))]
async fn reload_cases(State(state): State<AppState>) -> Result<Json<TableStatusView>, ApiError> {
    let table = state.catalog.reload(state.cases_path())?;
    info!(
        cases = table.list_cases().len(),
        malformed = table.diagnostics().len(),
        "case source reloaded on request"
    );
    Ok(Json(query_handlers::table_status(&table)))
}

/// Returns the router for the case repository.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_cases))
        .route("/reload", post(reload_cases))
        .route("/{case_id}/steps", get(get_case_steps))
        .route("/{case_id}/steps/{step_id}", get(get_step))
}

#[cfg(test)]
mod tests {
    use super::*;

    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use serde_json::Value;
    use tower::ServiceExt;

    use crate::routes::test_state;

    async fn send(app: Router, method: &str, uri: &str) -> (StatusCode, Value) {
        let request = Request::builder()
            .method(method)
            .uri(uri)
            .body(Body::empty())
            .unwrap();

        let response = app.oneshot(request).await.unwrap();
        let status = response.status();
        let body_bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        (status, serde_json::from_slice(&body_bytes).unwrap())
    }

    #[tokio::test]
    async fn test_list_cases_returns_cases_in_table_order() {
        // Arrange
        let app = router().with_state(test_state::fixture_state());

        // Act
        let (status, json) = send(app, "GET", "/").await;

        // Assert
        assert_eq!(status, StatusCode::OK);
        assert_eq!(
            json["cases"],
            serde_json::json!(["Chest Pain", "Sepsis", "Trauma"])
        );
        assert_eq!(json["version_hash"].as_str().unwrap().len(), 64);
    }

    #[tokio::test]
    async fn test_get_step_returns_labels_without_answers() {
        // Arrange
        let app = router().with_state(test_state::fixture_state());

        // Act
        let (status, json) = send(app, "GET", "/Chest%20Pain/steps/1").await;

        // Assert
        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["step_id"], "1");
        assert_eq!(json["patient_status"], "BP 90/60, HR 110");
        assert_eq!(json["options"][0]["label"], "Order CBC");
        assert_eq!(json["options"][1]["index"], 1);
        assert!(json["options"][0].get("is_correct").is_none());
    }

    #[tokio::test]
    async fn test_get_step_returns_404_for_unknown_step() {
        let app = router().with_state(test_state::fixture_state());

        let (status, json) = send(app, "GET", "/Sepsis/steps/9").await;

        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(json["error"], "step_not_found");
    }

    #[tokio::test]
    async fn test_get_step_returns_422_for_malformed_step() {
        let app = router().with_state(test_state::fixture_state());

        let (status, json) = send(app, "GET", "/Trauma/steps/2").await;

        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(json["error"], "step_data_error");
    }

    #[tokio::test]
    async fn test_get_case_steps_returns_404_for_unknown_case() {
        let app = router().with_state(test_state::fixture_state());

        let (status, json) = send(app, "GET", "/Stroke/steps").await;

        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(json["error"], "case_not_found");
    }

    #[tokio::test]
    async fn test_reload_reports_diagnostics() {
        // Arrange
        let app = router().with_state(test_state::fixture_state());

        // Act
        let (status, json) = send(app, "POST", "/reload").await;

        // Assert
        assert_eq!(status, StatusCode::OK);
        let diagnostics = json["diagnostics"].as_array().unwrap();
        assert_eq!(diagnostics.len(), 1);
        assert_eq!(diagnostics[0]["case_id"], "Trauma");
        assert_eq!(diagnostics[0]["step_id"], "2");
    }

    #[tokio::test]
    async fn test_list_cases_returns_500_when_source_is_missing() {
        let app = router().with_state(test_state::missing_source_state());

        let (status, json) = send(app, "GET", "/").await;

        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(json["error"], "infrastructure_error");
    }
}
