//! Commands for the Session context.

use clinsim_core::command::Command;
use uuid::Uuid;

/// Command to create a session, optionally on a specific case.
#[derive(Debug, Clone)]
pub struct StartSession {
    /// The correlation ID for tracing.
    pub correlation_id: Uuid,
    /// Case to open; the first case of the table when absent.
    pub case_id: Option<String>,
}

impl Command for StartSession {
    fn command_type(&self) -> &'static str {
        "session.start_session"
    }

    fn correlation_id(&self) -> Uuid {
        self.correlation_id
    }
}

/// Command to switch the session to a case.
#[derive(Debug, Clone)]
pub struct SelectCase {
    /// The correlation ID for tracing.
    pub correlation_id: Uuid,
    /// The session.
    pub session_id: Uuid,
    /// The case to switch to.
    pub case_id: String,
}

impl Command for SelectCase {
    fn command_type(&self) -> &'static str {
        "session.select_case"
    }

    fn correlation_id(&self) -> Uuid {
        self.correlation_id
    }
}

/// Command to choose an option on the current step.
#[derive(Debug, Clone)]
pub struct ChooseOption {
    /// The correlation ID for tracing.
    pub correlation_id: Uuid,
    /// The session.
    pub session_id: Uuid,
    /// Zero-based position of the chosen option.
    pub option_index: usize,
}

impl Command for ChooseOption {
    fn command_type(&self) -> &'static str {
        "session.choose_option"
    }

    fn correlation_id(&self) -> Uuid {
        self.correlation_id
    }
}

/// Command to dismiss the consequence of an incorrect choice.
#[derive(Debug, Clone)]
pub struct AcknowledgeResult {
    /// The correlation ID for tracing.
    pub correlation_id: Uuid,
    /// The session.
    pub session_id: Uuid,
}

impl Command for AcknowledgeResult {
    fn command_type(&self) -> &'static str {
        "session.acknowledge_result"
    }

    fn correlation_id(&self) -> Uuid {
        self.correlation_id
    }
}

/// Command to play a completed case again.
#[derive(Debug, Clone)]
pub struct RestartCase {
    /// The correlation ID for tracing.
    pub correlation_id: Uuid,
    /// The session.
    pub session_id: Uuid,
}

impl Command for RestartCase {
    fn command_type(&self) -> &'static str {
        "session.restart_case"
    }

    fn correlation_id(&self) -> Uuid {
        self.correlation_id
    }
}
