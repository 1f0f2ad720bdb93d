//! Query handlers for the Session context.
//!
//! The session view is the render model of the simulator: everything a
//! client needs to draw the current screen.

use clinsim_cases::application::query_handlers::StepView;
use clinsim_cases::{CaseTable, StepRef};
use clinsim_core::aggregate::AggregateRoot;
use clinsim_core::error::DomainError;
use clinsim_core::repository::EventRepository;
use serde::Serialize;
use uuid::Uuid;

use crate::application::command_handlers;
use crate::domain::aggregates::CaseSession;
use crate::domain::interpreter::{ActionResult, HistoryEntry};

/// What the session shows right now.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Screen {
    /// No case has been selected.
    NoCase,
    /// A consequence awaits acknowledgment; the step stays hidden.
    PendingResult {
        /// The consequence and its feedback.
        result: ActionResult,
    },
    /// The case reached its end.
    Completed {
        /// Feedback of the last correct choice, if any.
        discharge_notes: Option<String>,
    },
    /// The current step with its options.
    Step {
        /// The step to render.
        step: StepView,
    },
}

/// Read-only view of a case session.
#[derive(Debug, Serialize)]
pub struct SessionView {
    /// The session identifier.
    pub session_id: Uuid,
    /// The case being played.
    pub selected_case: Option<String>,
    /// The current step, `"END"` once complete.
    pub current_step: StepRef,
    /// Cumulative score.
    pub score: i64,
    /// Correctly answered steps, oldest first.
    pub history: Vec<HistoryEntry>,
    /// The screen to draw.
    pub screen: Screen,
    /// Current version (event count).
    pub version: i64,
}

/// Picks the screen for `session`. A pending result takes precedence over
/// everything else.
///
/// # Errors
///
/// Returns the step lookup error if the current step cannot be rendered.
fn render_screen(session: &CaseSession, table: &CaseTable) -> Result<Screen, DomainError> {
    let Some(case_id) = session.selected_case() else {
        return Ok(Screen::NoCase);
    };

    if let Some(result) = session.pending_result() {
        return Ok(Screen::PendingResult {
            result: result.clone(),
        });
    }

    match session.current_step() {
        StepRef::Terminal => Ok(Screen::Completed {
            discharge_notes: session.discharge_notes().map(str::to_owned),
        }),
        StepRef::Ordinary(step_id) => {
            let step = table.get_step(case_id, step_id)?;
            Ok(Screen::Step {
                step: StepView::from(step),
            })
        }
    }
}

/// Retrieves the view of a session.
///
/// # Errors
///
/// Returns `DomainError::AggregateNotFound` if no events exist for the ID,
/// `DomainError::Infrastructure` if event deserialization fails, and the
/// step lookup error (`CaseNotFound`, `StepNotFound`, `StepData`) if the
/// current step cannot be rendered from `table`.
pub async fn get_session_view(
    session_id: Uuid,
    table: &CaseTable,
    repo: &dyn EventRepository,
) -> Result<SessionView, DomainError> {
    let session = command_handlers::load_session(session_id, repo).await?;
    let screen = render_screen(&session, table)?;

    Ok(SessionView {
        session_id,
        selected_case: session.selected_case().map(str::to_owned),
        current_step: session.current_step().clone(),
        score: session.score(),
        history: session.history().to_vec(),
        screen,
        version: session.version(),
    })
}
