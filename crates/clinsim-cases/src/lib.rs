//! Clinical case simulator: Case Repository.
//!
//! Responsible for reading branching scenario tables from spreadsheets or
//! CSV files, coercing their cells to text, parsing each step's pipe-delimited
//! option fields, validating next-step references, and serving per-case step
//! lookups from a load-once cache.

pub mod application;
pub mod catalog;
pub mod domain;
pub mod error;
pub mod source;

pub use catalog::CaseCatalog;
pub use domain::step::{Step, StepOption};
pub use domain::step_ref::{StepId, StepRef};
pub use domain::table::CaseTable;
pub use error::{LoadError, StepDataError};
