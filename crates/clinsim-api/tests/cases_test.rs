//! Integration tests for the case repository endpoints.

mod common;

use axum::http::StatusCode;
use uuid::Uuid;

#[tokio::test]
async fn test_list_cases_returns_fixture_cases() {
    let state = common::build_test_state();

    let (status, json) = common::get_json(&state, "/api/v1/cases").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        json["cases"],
        serde_json::json!(["Chest Pain", "Sepsis", "Trauma"])
    );
}

#[tokio::test]
async fn test_case_steps_flag_malformed_rows() {
    // Arrange
    let state = common::build_test_state();

    // Act
    let (status, json) = common::get_json(&state, "/api/v1/cases/Trauma/steps").await;

    // Assert
    assert_eq!(status, StatusCode::OK);
    let steps = json["steps"].as_array().unwrap();
    assert_eq!(steps.len(), 2);
    assert!(steps[0]["problem"].is_null());
    assert!(steps[1]["problem"].as_str().unwrap().contains("unequal"));
}

#[tokio::test]
async fn test_unknown_step_returns_404_and_leaves_sessions_untouched() {
    // Arrange
    let state = common::build_test_state();
    let session_id = common::start_session(&state, "Chest Pain").await;
    let before = common::view(&state, &session_id).await;

    // Act
    let (status, json) = common::get_json(&state, "/api/v1/cases/Chest%20Pain/steps/99").await;

    // Assert
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(json["error"], "step_not_found");
    let after = common::view(&state, &session_id).await;
    assert_eq!(before, after);
}

#[tokio::test]
async fn test_reload_picks_up_edited_source() {
    // Arrange
    let path = std::env::temp_dir().join(format!("clinsim-reload-{}.csv", Uuid::new_v4()));
    let original = std::fs::read_to_string(common::fixture_path()).unwrap();
    std::fs::write(&path, &original).unwrap();
    let state = common::build_test_state_for(path.clone());
    let (_, before) = common::get_json(&state, "/api/v1/cases").await;

    let edited = format!(
        "{original}Stroke,1,NIHSS 8,Sudden left-sided weakness. What first?,CT head,TRUE,Rule out bleeding.,END,10,-\n"
    );
    std::fs::write(&path, edited).unwrap();

    // Act
    let (cached_status, cached) = common::get_json(&state, "/api/v1/cases").await;
    let (status, reloaded) = common::post_json(
        &state,
        "/api/v1/cases/reload",
        &serde_json::json!({}),
    )
    .await;
    let (_, after) = common::get_json(&state, "/api/v1/cases").await;

    // Assert
    assert_eq!(cached_status, StatusCode::OK);
    assert_eq!(cached["cases"], before["cases"]);
    assert_eq!(status, StatusCode::OK);
    assert_eq!(reloaded["cases"].as_array().unwrap().len(), 4);
    assert_ne!(reloaded["version_hash"], before["version_hash"]);
    assert_eq!(after["cases"][3], "Stroke");

    std::fs::remove_file(&path).unwrap();
}

#[tokio::test]
async fn test_failed_reload_keeps_cached_table() {
    // Arrange
    let path = std::env::temp_dir().join(format!("clinsim-reload-{}.csv", Uuid::new_v4()));
    std::fs::copy(common::fixture_path(), &path).unwrap();
    let state = common::build_test_state_for(path.clone());
    let (_, before) = common::get_json(&state, "/api/v1/cases").await;
    std::fs::remove_file(&path).unwrap();

    // Act
    let (status, json) = common::post_json(
        &state,
        "/api/v1/cases/reload",
        &serde_json::json!({}),
    )
    .await;
    let (after_status, after) = common::get_json(&state, "/api/v1/cases").await;

    // Assert
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(json["error"], "infrastructure_error");
    assert_eq!(after_status, StatusCode::OK);
    assert_eq!(after, before);
}
