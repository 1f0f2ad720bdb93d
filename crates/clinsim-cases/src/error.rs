//! Error types for case table loading and step parsing.

use std::path::PathBuf;

use clinsim_core::error::DomainError;
use thiserror::Error;

/// Failure to produce a case table from a source.
#[derive(Debug, Error)]
pub enum LoadError {
    /// The source file does not exist.
    #[error("case source '{}' was not found", .0.display())]
    NotFound(PathBuf),

    /// The source exists but could not be read or interpreted as a case table.
    #[error("case source '{}' could not be parsed: {reason}", .path.display())]
    ParseFailure {
        /// The offending source.
        path: PathBuf,
        /// What went wrong.
        reason: String,
    },
}

impl LoadError {
    pub(crate) fn parse(path: impl Into<PathBuf>, reason: impl Into<String>) -> Self {
        Self::ParseFailure {
            path: path.into(),
            reason: reason.into(),
        }
    }
}

impl From<LoadError> for DomainError {
    fn from(err: LoadError) -> Self {
        DomainError::Infrastructure(err.to_string())
    }
}

/// A step row whose option fields cannot be interpreted.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StepDataError {
    /// The six pipe-delimited fields do not split into the same number of entries.
    #[error(
        "option fields have unequal lengths (options {options}, is correct {is_correct}, \
         feedback {feedback}, next step {next_step}, score change {score_change}, \
         consequence {consequence})"
    )]
    UnequalLengths {
        /// Entries in `Options`.
        options: usize,
        /// Entries in `Is Correct`.
        is_correct: usize,
        /// Entries in `Feedback`.
        feedback: usize,
        /// Entries in `Next Step ID`.
        next_step: usize,
        /// Entries in `Score Change`.
        score_change: usize,
        /// Entries in `Consequence`.
        consequence: usize,
    },

    /// A `Score Change` entry is not a finite number.
    #[error("score change '{value}' for option {index} is not a number")]
    InvalidScore {
        /// Zero-based option position.
        index: usize,
        /// The raw token.
        value: String,
    },

    /// A `Next Step ID` entry names a step the case does not define.
    #[error("option {index} leads to step '{target}' which does not exist in this case")]
    DanglingReference {
        /// Zero-based option position.
        index: usize,
        /// The missing step.
        target: String,
    },
}
