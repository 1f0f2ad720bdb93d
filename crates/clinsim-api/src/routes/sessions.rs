//! Routes for case sessions.

use axum::extract::{Path, State};
use axum::routing::{get, post};
use axum::{Json, Router};
use clinsim_session::application::command_handlers::{self, SessionCommandResult};
use clinsim_session::application::query_handlers::{self, SessionView};
use clinsim_session::domain::commands;
use serde::{Deserialize, Serialize};
use tracing::{info, instrument};
use uuid::Uuid;

use crate::error::ApiError;
use crate::state::AppState;

/// Request body for POST /start-session.
#[derive(Debug, Default, Deserialize)]
pub struct StartSessionRequest {
    /// Case to open; the first case of the table when omitted.
    #[serde(default)]
    pub case_id: Option<String>,
}

/// Request body for POST /select-case.
#[derive(Debug, Deserialize)]
pub struct SelectCaseRequest {
    /// The session.
    pub session_id: Uuid,
    /// Case to switch to.
    pub case_id: String,
}

/// Request body for POST /choose-option.
#[derive(Debug, Deserialize)]
pub struct ChooseOptionRequest {
    /// The session.
    pub session_id: Uuid,
    /// Position of the chosen option on the current step.
    pub option_index: usize,
}

/// Request body for session commands that carry no arguments.
#[derive(Debug, Deserialize)]
pub struct SessionRequest {
    /// The session.
    pub session_id: Uuid,
}

/// Response body returned after a command is successfully handled.
#[derive(Debug, Serialize)]
pub struct CommandResponse {
    /// The session the command applied to.
    pub aggregate_id: Uuid,
    /// IDs of the domain events produced and persisted.
    pub event_ids: Vec<Uuid>,
}

impl From<SessionCommandResult> for CommandResponse {
    fn from(result: SessionCommandResult) -> Self {
        Self {
            aggregate_id: result.aggregate_id,
            event_ids: result.stored_events.iter().map(|e| e.event_id).collect(),
        }
    }
}

/// POST /start-session
#[instrument(skip(state, request), fields(case_id = ?request.case_id))]
async fn start_session(
    State(state): State<AppState>,
    Json(request): Json<StartSessionRequest>,
) -> Result<Json<CommandResponse>, ApiError> {
    let table = state.case_table()?;
    let command = commands::StartSession {
        correlation_id: Uuid::new_v4(),
        case_id: request.case_id,
    };

    info!(correlation_id = %command.correlation_id, "handling start_session command");

    let result = command_handlers::handle_start_session(
        &command,
        &table,
        state.clock.as_ref(),
        &*state.event_repository,
    )
    .await?;

    Ok(Json(result.into()))
}

/// GET /{session_id}
#[instrument(skip(state))]
async fn get_session(
    State(state): State<AppState>,
    Path(session_id): Path<Uuid>,
) -> Result<Json<SessionView>, ApiError> {
    let table = state.case_table()?;
    let view = query_handlers::get_session_view(session_id, &table, &*state.event_repository)
        .await?;
    Ok(Json(view))
}

/// POST /select-case
#[instrument(skip(state, request), fields(session_id = %request.session_id))]
async fn select_case(
    State(state): State<AppState>,
    Json(request): Json<SelectCaseRequest>,
) -> Result<Json<CommandResponse>, ApiError> {
    let table = state.case_table()?;
    let command = commands::SelectCase {
        correlation_id: Uuid::new_v4(),
        session_id: request.session_id,
        case_id: request.case_id,
    };

    info!(correlation_id = %command.correlation_id, "handling select_case command");

    let result = command_handlers::handle_select_case(
        &command,
        &table,
        state.clock.as_ref(),
        &*state.event_repository,
    )
    .await?;

    Ok(Json(result.into()))
}

/// POST /choose-option
#[instrument(skip(state, request), fields(session_id = %request.session_id))]
async fn choose_option(
    State(state): State<AppState>,
    Json(request): Json<ChooseOptionRequest>,
) -> Result<Json<CommandResponse>, ApiError> {
    let table = state.case_table()?;
    let command = commands::ChooseOption {
        correlation_id: Uuid::new_v4(),
        session_id: request.session_id,
        option_index: request.option_index,
    };

    info!(correlation_id = %command.correlation_id, "handling choose_option command");

    let result = command_handlers::handle_choose_option(
        &command,
        &table,
        state.clock.as_ref(),
        &*state.event_repository,
    )
    .await?;

    Ok(Json(result.into()))
}

/// POST /acknowledge-result
#[instrument(skip(state, request), fields(session_id = %request.session_id))]
async fn acknowledge_result(
    State(state): State<AppState>,
    Json(request): Json<SessionRequest>,
) -> Result<Json<CommandResponse>, ApiError> {
    let command = commands::AcknowledgeResult {
        correlation_id: Uuid::new_v4(),
        session_id: request.session_id,
    };

    info!(correlation_id = %command.correlation_id, "handling acknowledge_result command");

    let result = command_handlers::handle_acknowledge_result(
        &command,
        state.clock.as_ref(),
        &*state.event_repository,
    )
    .await?;

    Ok(Json(result.into()))
}

/// POST /restart-case
#[instrument(skip(state, request), fields(session_id = %request.session_id))]
async fn restart_case(
    State(state): State<AppState>,
    Json(request): Json<SessionRequest>,
) -> Result<Json<CommandResponse>, ApiError> {
    let command = commands::RestartCase {
        correlation_id: Uuid::new_v4(),
        session_id: request.session_id,
    };

    info!(correlation_id = %command.correlation_id, "handling restart_case command");

    let result = command_handlers::handle_restart_case(
        &command,
        state.clock.as_ref(),
        &*state.event_repository,
    )
    .await?;

    Ok(Json(result.into()))
}

/// Returns the router for case sessions.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/start-session", post(start_session))
        .route("/select-case", post(select_case))
        .route("/choose-option", post(choose_option))
        .route("/acknowledge-result", post(acknowledge_result))
        .route("/restart-case", post(restart_case))
        .route("/{session_id}", get(get_session))
}
