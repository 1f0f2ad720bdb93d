//! Domain error types.

use thiserror::Error;
use uuid::Uuid;

/// Top-level domain error type.
#[derive(Debug, Error)]
pub enum DomainError {
    /// An aggregate (a case session) was not found.
    #[error("aggregate not found: {0}")]
    AggregateNotFound(Uuid),

    /// No row in the case table carries this Case ID.
    #[error("case not found: {0}")]
    CaseNotFound(String),

    /// A referenced step has no matching row.
    #[error("step '{step_id}' not found in case '{case_id}'")]
    StepNotFound {
        /// Case the lookup was scoped to.
        case_id: String,
        /// The missing step identifier.
        step_id: String,
    },

    /// The step exists but its option fields could not be parsed; it is never rendered.
    #[error("step '{step_id}' in case '{case_id}' is malformed: {reason}")]
    StepData {
        /// Case the step belongs to.
        case_id: String,
        /// The malformed step identifier.
        step_id: String,
        /// Load-time diagnostic.
        reason: String,
    },

    /// Optimistic concurrency conflict.
    #[error("concurrency conflict on aggregate {aggregate_id}: expected version {expected}, found {actual}")]
    ConcurrencyConflict {
        /// The aggregate that had the conflict.
        aggregate_id: Uuid,
        /// The expected version.
        expected: i64,
        /// The actual version found.
        actual: i64,
    },

    /// A command is not allowed in the current session state.
    #[error("validation error: {0}")]
    Validation(String),

    /// An infrastructure error (event store, case source).
    #[error("infrastructure error: {0}")]
    Infrastructure(String),
}
