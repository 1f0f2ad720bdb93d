//! Step identifiers and next-step references.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Reserved `Next Step ID` token marking the end of a case.
pub const TERMINAL_TOKEN: &str = "END";

/// Step ID every case starts on.
pub const ENTRY_STEP: &str = "1";

/// Identifier of one step within a case.
///
/// Step IDs are free text; `"1"` and `"02"` are distinct.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct StepId(String);

impl StepId {
    /// Wraps a raw step identifier.
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// The entry step of every case.
    #[must_use]
    pub fn entry() -> Self {
        Self(ENTRY_STEP.to_owned())
    }

    /// Returns the identifier text.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for StepId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Where a step (or a session) points: an ordinary step or the end of the case.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum StepRef {
    /// A step row of the same case.
    Ordinary(StepId),
    /// The case is complete.
    Terminal,
}

impl StepRef {
    /// Resolves a raw token once; surrounding whitespace is ignored and only
    /// the exact token `END` is terminal.
    #[must_use]
    pub fn parse(raw: &str) -> Self {
        let token = raw.trim();
        if token == TERMINAL_TOKEN {
            Self::Terminal
        } else {
            Self::Ordinary(StepId::new(token))
        }
    }

    /// Reference to the entry step.
    #[must_use]
    pub fn entry() -> Self {
        Self::Ordinary(StepId::entry())
    }

    /// Whether this reference ends the case.
    #[must_use]
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Terminal)
    }

    /// The referenced step, if not terminal.
    #[must_use]
    pub fn step_id(&self) -> Option<&StepId> {
        match self {
            Self::Ordinary(id) => Some(id),
            Self::Terminal => None,
        }
    }
}

impl Default for StepRef {
    fn default() -> Self {
        Self::entry()
    }
}

impl fmt::Display for StepRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Ordinary(id) => id.fmt(f),
            Self::Terminal => f.write_str(TERMINAL_TOKEN),
        }
    }
}

impl From<String> for StepRef {
    fn from(raw: String) -> Self {
        Self::parse(&raw)
    }
}

impl From<StepRef> for String {
    fn from(step: StepRef) -> Self {
        step.to_string()
    }
}
