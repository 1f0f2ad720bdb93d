//! Step interpreter: turns one option choice into an outcome.
//!
//! The interpreter is pure. It reads the chosen option of a step and
//! describes what must happen to the session; the aggregate records the
//! outcome as an event and applies it.

use clinsim_cases::{Step, StepId, StepRef};
use clinsim_core::error::DomainError;
use serde::{Deserialize, Serialize};

/// A step the user answered correctly.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HistoryEntry {
    /// The answered step.
    pub step_id: StepId,
    /// Patient status shown on that step.
    pub patient_status: String,
    /// Scenario text of that step.
    pub scenario: String,
    /// Label of the option chosen.
    pub chosen_option: String,
    /// Feedback for the chosen option.
    pub feedback: String,
}

/// Kind tag of a pending action result.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActionResultKind {
    /// Outcome of an incorrect choice.
    Consequence,
}

/// Shown after an incorrect choice until the user acknowledges it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActionResult {
    /// Kind tag.
    pub kind: ActionResultKind,
    /// What happened to the patient.
    pub consequence: String,
    /// Why the choice was wrong.
    pub feedback: String,
}

/// What choosing an option does to a session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChoiceOutcome {
    /// Append `entry` to history and move to `next_step`.
    Correct {
        score_change: i64,
        next_step: StepRef,
        entry: HistoryEntry,
    },
    /// Stay on the step and show `result`.
    Incorrect {
        score_change: i64,
        result: ActionResult,
    },
}

impl ChoiceOutcome {
    /// Score delta, applied whether or not the choice was correct.
    #[must_use]
    pub fn score_change(&self) -> i64 {
        match self {
            Self::Correct { score_change, .. } | Self::Incorrect { score_change, .. } => {
                *score_change
            }
        }
    }

    /// Whether the choice advances the case.
    #[must_use]
    pub fn is_correct(&self) -> bool {
        matches!(self, Self::Correct { .. })
    }
}

/// Resolves choosing option `option_index` on `step`.
///
/// # Errors
///
/// Returns `DomainError::Validation` if `option_index` is out of range.
pub fn resolve_choice(step: &Step, option_index: usize) -> Result<ChoiceOutcome, DomainError> {
    let option = step.option(option_index).ok_or_else(|| {
        DomainError::Validation(format!(
            "option {option_index} does not exist on step '{}' ({} options)",
            step.step_id,
            step.options.len()
        ))
    })?;

    if option.is_correct {
        Ok(ChoiceOutcome::Correct {
            score_change: option.score_change,
            next_step: option.next_step.clone(),
            entry: HistoryEntry {
                step_id: step.step_id.clone(),
                patient_status: step.patient_status.clone(),
                scenario: step.scenario.clone(),
                chosen_option: option.label.clone(),
                feedback: option.feedback.clone(),
            },
        })
    } else {
        Ok(ChoiceOutcome::Incorrect {
            score_change: option.score_change,
            result: ActionResult {
                kind: ActionResultKind::Consequence,
                consequence: option.consequence.clone(),
                feedback: option.feedback.clone(),
            },
        })
    }
}
