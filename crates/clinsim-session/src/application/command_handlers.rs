//! Command handlers for the Session context.
//!
//! Each handler loads the session, executes the command against the case
//! table and persists the resulting events with optimistic concurrency.

use clinsim_cases::CaseTable;
use clinsim_core::aggregate::AggregateRoot;
use clinsim_core::clock::Clock;
use clinsim_core::command::Command;
use clinsim_core::error::DomainError;
use clinsim_core::event::EventMetadata;
use clinsim_core::repository::{EventRepository, StoredEvent};
use tracing::{debug, info};
use uuid::Uuid;

use crate::domain::aggregates::CaseSession;
use crate::domain::commands::{
    AcknowledgeResult, ChooseOption, RestartCase, SelectCase, StartSession,
};
use crate::domain::events::{SessionEvent, SessionEventKind};

/// Result of a successfully handled command.
#[derive(Debug)]
pub struct SessionCommandResult {
    /// The session affected or created by the command.
    pub aggregate_id: Uuid,
    /// The stored events produced and persisted. Empty for no-op commands.
    pub stored_events: Vec<StoredEvent>,
}

/// Reconstitutes a `CaseSession` from stored events.
///
/// # Errors
///
/// Returns `DomainError::Infrastructure` if event deserialization fails.
pub(crate) fn reconstitute(
    session_id: Uuid,
    existing_events: &[StoredEvent],
) -> Result<CaseSession, DomainError> {
    let mut session = CaseSession::new(session_id);
    for stored in existing_events {
        let kind: SessionEventKind =
            serde_json::from_value(stored.payload.clone()).map_err(|e| {
                DomainError::Infrastructure(format!("event deserialization failed: {e}"))
            })?;
        let event = SessionEvent {
            metadata: EventMetadata::from_stored(stored),
            kind,
        };
        session.apply(&event);
    }
    Ok(session)
}

/// Loads and reconstitutes an existing session.
///
/// # Errors
///
/// Returns `DomainError::AggregateNotFound` if the session has no events.
pub(crate) async fn load_session(
    session_id: Uuid,
    repo: &dyn EventRepository,
) -> Result<CaseSession, DomainError> {
    let existing_events = repo.load_events(session_id).await?;
    if existing_events.is_empty() {
        return Err(DomainError::AggregateNotFound(session_id));
    }
    reconstitute(session_id, &existing_events)
}

async fn commit(
    session: &mut CaseSession,
    repo: &dyn EventRepository,
) -> Result<SessionCommandResult, DomainError> {
    let stored_events: Vec<StoredEvent> = session
        .uncommitted_events()
        .iter()
        .map(StoredEvent::from_domain_event)
        .collect();

    if !stored_events.is_empty() {
        repo.append_events(session.id, session.version(), &stored_events)
            .await?;
        session.clear_uncommitted_events();
    }

    Ok(SessionCommandResult {
        aggregate_id: session.id,
        stored_events,
    })
}

/// Handles the `StartSession` command: creates a session and selects the
/// requested case, or the first case of the table when none is given.
///
/// # Errors
///
/// Returns `DomainError::CaseNotFound` for an unknown requested case,
/// `DomainError::Validation` if the table has no cases, or the repository
/// error if appending fails.
pub async fn handle_start_session(
    command: &StartSession,
    table: &CaseTable,
    clock: &dyn Clock,
    repo: &dyn EventRepository,
) -> Result<SessionCommandResult, DomainError> {
    let case_id = match &command.case_id {
        Some(case_id) => case_id.clone(),
        None => table
            .first_case()
            .map(str::to_owned)
            .ok_or_else(|| DomainError::Validation("the case table has no cases".to_owned()))?,
    };

    let session_id = Uuid::new_v4();
    let mut session = CaseSession::new(session_id);
    session.start(command.correlation_id, clock)?;
    session.select_case(table, &case_id, command.correlation_id, clock)?;

    let result = commit(&mut session, repo).await?;
    info!(
        %session_id,
        case_id = %case_id,
        command_type = command.command_type(),
        correlation_id = %command.correlation_id(),
        "session started"
    );
    Ok(result)
}

/// Handles the `SelectCase` command. Selecting the current case persists
/// nothing.
///
/// # Errors
///
/// Returns `DomainError::AggregateNotFound`, `DomainError::CaseNotFound`, or
/// the repository error.
pub async fn handle_select_case(
    command: &SelectCase,
    table: &CaseTable,
    clock: &dyn Clock,
    repo: &dyn EventRepository,
) -> Result<SessionCommandResult, DomainError> {
    let mut session = load_session(command.session_id, repo).await?;

    let changed = session.select_case(table, &command.case_id, command.correlation_id, clock)?;
    if !changed {
        debug!(
            session_id = %command.session_id,
            case_id = %command.case_id,
            command_type = command.command_type(),
            "case already selected, nothing to record"
        );
    }

    commit(&mut session, repo).await
}

/// Handles the `ChooseOption` command.
///
/// # Errors
///
/// Returns `DomainError::AggregateNotFound`, the step lookup error
/// (`StepNotFound`, `StepData`), `DomainError::Validation` for a rejected
/// choice, or the repository error.
pub async fn handle_choose_option(
    command: &ChooseOption,
    table: &CaseTable,
    clock: &dyn Clock,
    repo: &dyn EventRepository,
) -> Result<SessionCommandResult, DomainError> {
    let mut session = load_session(command.session_id, repo).await?;

    let outcome = session.choose_option(
        table,
        command.option_index,
        command.correlation_id,
        clock,
    )?;

    let result = commit(&mut session, repo).await?;
    info!(
        session_id = %command.session_id,
        option_index = command.option_index,
        correct = outcome.is_correct(),
        score_change = outcome.score_change(),
        score = session.score(),
        command_type = command.command_type(),
        correlation_id = %command.correlation_id(),
        "option chosen"
    );
    Ok(result)
}

/// Handles the `AcknowledgeResult` command.
///
/// # Errors
///
/// Returns `DomainError::AggregateNotFound`, `DomainError::Validation` if
/// nothing is pending, or the repository error.
pub async fn handle_acknowledge_result(
    command: &AcknowledgeResult,
    clock: &dyn Clock,
    repo: &dyn EventRepository,
) -> Result<SessionCommandResult, DomainError> {
    let mut session = load_session(command.session_id, repo).await?;
    session.acknowledge_result(command.correlation_id, clock)?;
    commit(&mut session, repo).await
}

/// Handles the `RestartCase` command.
///
/// # Errors
///
/// Returns `DomainError::AggregateNotFound`, `DomainError::Validation` unless
/// the case is complete, or the repository error.
pub async fn handle_restart_case(
    command: &RestartCase,
    clock: &dyn Clock,
    repo: &dyn EventRepository,
) -> Result<SessionCommandResult, DomainError> {
    let mut session = load_session(command.session_id, repo).await?;
    session.restart_case(command.correlation_id, clock)?;

    let result = commit(&mut session, repo).await?;
    info!(
        session_id = %command.session_id,
        command_type = command.command_type(),
        correlation_id = %command.correlation_id(),
        "case restarted"
    );
    Ok(result)
}
