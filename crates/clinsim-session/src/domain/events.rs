//! Domain events for the Session context.

use clinsim_cases::{StepId, StepRef};
use clinsim_core::event::{DomainEvent, EventMetadata};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::interpreter::{ActionResult, HistoryEntry};

/// Event type for [`SessionStarted`].
pub const SESSION_STARTED_EVENT_TYPE: &str = "session.started";
/// Event type for [`CaseSelected`].
pub const CASE_SELECTED_EVENT_TYPE: &str = "session.case_selected";
/// Event type for [`CorrectChoiceMade`].
pub const CORRECT_CHOICE_MADE_EVENT_TYPE: &str = "session.correct_choice_made";
/// Event type for [`IncorrectChoiceMade`].
pub const INCORRECT_CHOICE_MADE_EVENT_TYPE: &str = "session.incorrect_choice_made";
/// Event type for [`ActionResultAcknowledged`].
pub const ACTION_RESULT_ACKNOWLEDGED_EVENT_TYPE: &str = "session.action_result_acknowledged";
/// Event type for [`CaseRestarted`].
pub const CASE_RESTARTED_EVENT_TYPE: &str = "session.case_restarted";

/// Emitted when a session is created.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionStarted {
    /// The session identifier.
    pub session_id: Uuid,
}

/// Emitted when the user switches to a different case; resets progress.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CaseSelected {
    /// The session identifier.
    pub session_id: Uuid,
    /// The newly selected case.
    pub case_id: String,
}

/// Emitted when a correct option is chosen.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CorrectChoiceMade {
    /// The session identifier.
    pub session_id: Uuid,
    /// Step the choice was made on.
    pub step_id: StepId,
    /// Position of the chosen option.
    pub option_index: usize,
    /// Score delta of the option.
    pub score_change: i64,
    /// Where the session moves to.
    pub next_step: StepRef,
    /// Record appended to the history.
    pub entry: HistoryEntry,
}

/// Emitted when an incorrect option is chosen.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IncorrectChoiceMade {
    /// The session identifier.
    pub session_id: Uuid,
    /// Step the choice was made on.
    pub step_id: StepId,
    /// Position of the chosen option.
    pub option_index: usize,
    /// Score delta of the option.
    pub score_change: i64,
    /// Consequence shown until acknowledged.
    pub result: ActionResult,
}

/// Emitted when the user dismisses a consequence.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ActionResultAcknowledged {
    /// The session identifier.
    pub session_id: Uuid,
}

/// Emitted when a completed case is started over.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CaseRestarted {
    /// The session identifier.
    pub session_id: Uuid,
}

/// Event payload variants for the Session context.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum SessionEventKind {
    /// The session was created.
    SessionStarted(SessionStarted),
    /// A different case was selected.
    CaseSelected(CaseSelected),
    /// A correct option was chosen.
    CorrectChoiceMade(CorrectChoiceMade),
    /// An incorrect option was chosen.
    IncorrectChoiceMade(IncorrectChoiceMade),
    /// A pending consequence was dismissed.
    ActionResultAcknowledged(ActionResultAcknowledged),
    /// The completed case was restarted.
    CaseRestarted(CaseRestarted),
}

impl SessionEventKind {
    /// Event type name of this payload.
    #[must_use]
    pub fn event_type(&self) -> &'static str {
        match self {
            Self::SessionStarted(_) => SESSION_STARTED_EVENT_TYPE,
            Self::CaseSelected(_) => CASE_SELECTED_EVENT_TYPE,
            Self::CorrectChoiceMade(_) => CORRECT_CHOICE_MADE_EVENT_TYPE,
            Self::IncorrectChoiceMade(_) => INCORRECT_CHOICE_MADE_EVENT_TYPE,
            Self::ActionResultAcknowledged(_) => ACTION_RESULT_ACKNOWLEDGED_EVENT_TYPE,
            Self::CaseRestarted(_) => CASE_RESTARTED_EVENT_TYPE,
        }
    }
}

/// Domain event envelope for the Session context.
#[derive(Debug, Clone)]
pub struct SessionEvent {
    /// Event metadata.
    pub metadata: EventMetadata,
    /// Event-specific payload.
    pub kind: SessionEventKind,
}

impl DomainEvent for SessionEvent {
    fn event_type(&self) -> &'static str {
        self.kind.event_type()
    }

    fn to_payload(&self) -> serde_json::Value {
        // Serialization of derived Serialize types to Value is infallible.
        serde_json::to_value(&self.kind).expect("SessionEventKind serialization is infallible")
    }

    fn metadata(&self) -> &EventMetadata {
        &self.metadata
    }
}
