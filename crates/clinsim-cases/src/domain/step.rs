//! A single step of a case and its parsed options.

use serde::Serialize;

use super::step_ref::{StepId, StepRef};
use crate::error::StepDataError;

/// Delimiter separating per-option entries within one cell.
pub const OPTION_DELIMITER: char = '|';

/// Text fields of one table row after cell coercion, before option parsing.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StepRow {
    pub case_id: String,
    pub step_id: String,
    pub patient_status: String,
    pub scenario: String,
    pub options: String,
    pub is_correct: String,
    pub feedback: String,
    pub next_step: String,
    pub score_change: String,
    pub consequence: String,
}

/// One selectable choice within a step.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StepOption {
    /// Button label shown to the user.
    pub label: String,
    /// Whether choosing this option advances the case.
    pub is_correct: bool,
    /// Explanation shown after choosing.
    pub feedback: String,
    /// Where a correct choice leads.
    pub next_step: StepRef,
    /// Applied to the score whether or not the option is correct.
    pub score_change: i64,
    /// What happens to the patient after an incorrect choice.
    pub consequence: String,
}

/// A well-formed step: every option field split into the same number of entries.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Step {
    pub case_id: String,
    pub step_id: StepId,
    pub patient_status: String,
    pub scenario: String,
    pub options: Vec<StepOption>,
}

impl Step {
    /// Parses the pipe-delimited option fields of a row.
    ///
    /// # Errors
    ///
    /// Returns `StepDataError::UnequalLengths` if the six fields split into
    /// differing counts and `StepDataError::InvalidScore` for a non-numeric
    /// score change.
    pub fn parse(row: &StepRow) -> Result<Self, StepDataError> {
        let labels = split_field(&row.options);
        let is_correct = split_field(&row.is_correct);
        let feedback = split_field(&row.feedback);
        let next_step = split_field(&row.next_step);
        let score_change = split_field(&row.score_change);
        let consequence = split_field(&row.consequence);

        let count = labels.len();
        if [
            is_correct.len(),
            feedback.len(),
            next_step.len(),
            score_change.len(),
            consequence.len(),
        ]
        .iter()
        .any(|&len| len != count)
        {
            return Err(StepDataError::UnequalLengths {
                options: count,
                is_correct: is_correct.len(),
                feedback: feedback.len(),
                next_step: next_step.len(),
                score_change: score_change.len(),
                consequence: consequence.len(),
            });
        }

        let mut options = Vec::with_capacity(count);
        for (index, label) in labels.into_iter().enumerate() {
            options.push(StepOption {
                label: label.to_owned(),
                is_correct: parse_is_correct(is_correct[index]),
                feedback: feedback[index].to_owned(),
                next_step: StepRef::parse(next_step[index]),
                score_change: parse_score_change(index, score_change[index])?,
                consequence: consequence[index].to_owned(),
            });
        }

        Ok(Self {
            case_id: row.case_id.clone(),
            step_id: StepId::new(row.step_id.trim()),
            patient_status: row.patient_status.clone(),
            scenario: row.scenario.clone(),
            options,
        })
    }

    /// Returns the option at `index`, if any.
    #[must_use]
    pub fn option(&self, index: usize) -> Option<&StepOption> {
        self.options.get(index)
    }
}

fn split_field(raw: &str) -> Vec<&str> {
    raw.split(OPTION_DELIMITER).map(str::trim).collect()
}

fn parse_is_correct(token: &str) -> bool {
    token.eq_ignore_ascii_case("TRUE")
}

/// `2^63` as a float; truncated values must lie in `[-2^63, 2^63)` to fit an `i64`.
const SCORE_LIMIT: f64 = 9_223_372_036_854_775_808.0;

/// Accepts anything that reads as a float and truncates toward zero, so
/// spreadsheet values such as `10.0` or `-5` both work. Values outside the
/// `i64` range are rejected rather than clamped.
#[allow(clippy::cast_possible_truncation)]
fn parse_score_change(index: usize, token: &str) -> Result<i64, StepDataError> {
    match token.parse::<f64>().map(f64::trunc) {
        Ok(value) if value >= -SCORE_LIMIT && value < SCORE_LIMIT => Ok(value as i64),
        _ => Err(StepDataError::InvalidScore {
            index,
            value: token.to_owned(),
        }),
    }
}
