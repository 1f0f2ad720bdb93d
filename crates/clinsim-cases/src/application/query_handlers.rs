//! Query handlers for the Case Repository.
//!
//! These return read-only view DTOs for the presentation layer. Option
//! correctness, routing and scoring never leave the crate through a view.

use clinsim_core::error::DomainError;
use serde::Serialize;

use crate::domain::step::Step;
use crate::domain::step_ref::StepId;
use crate::domain::table::{CaseTable, StepDiagnostic, StepSummary};

/// The cases a user can pick from.
#[derive(Debug, Serialize)]
pub struct CaseListView {
    /// Case IDs in first-seen order.
    pub cases: Vec<String>,
    /// Version of the table the list was read from.
    pub version_hash: String,
}

/// A selectable option as shown to the user.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct OptionView {
    /// Position to submit when choosing this option.
    pub index: usize,
    /// Button label.
    pub label: String,
}

/// A step ready to render.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct StepView {
    /// Case the step belongs to.
    pub case_id: String,
    /// The step identifier.
    pub step_id: StepId,
    /// Patient status banner.
    pub patient_status: String,
    /// Scenario text / question.
    pub scenario: String,
    /// Options in display order.
    pub options: Vec<OptionView>,
}

impl From<&Step> for StepView {
    fn from(step: &Step) -> Self {
        Self {
            case_id: step.case_id.clone(),
            step_id: step.step_id.clone(),
            patient_status: step.patient_status.clone(),
            scenario: step.scenario.clone(),
            options: step
                .options
                .iter()
                .enumerate()
                .map(|(index, option)| OptionView {
                    index,
                    label: option.label.clone(),
                })
                .collect(),
        }
    }
}

/// All rows of one case, for authors checking their spreadsheet.
#[derive(Debug, Serialize)]
pub struct CaseStepsView {
    /// The case.
    pub case_id: String,
    /// Step rows in table order.
    pub steps: Vec<StepSummary>,
}

/// Result of (re)loading a case source.
#[derive(Debug, Serialize)]
pub struct TableStatusView {
    /// Case IDs in first-seen order.
    pub cases: Vec<String>,
    /// Version of the loaded table.
    pub version_hash: String,
    /// Steps that will refuse to render.
    pub diagnostics: Vec<StepDiagnostic>,
}

/// Lists the cases of `table`.
#[must_use]
pub fn list_cases(table: &CaseTable) -> CaseListView {
    CaseListView {
        cases: table.list_cases().to_vec(),
        version_hash: table.version_hash().to_owned(),
    }
}

/// Looks up one step for rendering.
///
/// # Errors
///
/// Returns `DomainError::CaseNotFound`, `DomainError::StepNotFound` or
/// `DomainError::StepData` as described on [`CaseTable::get_step`].
pub fn get_step(table: &CaseTable, case_id: &str, step_id: &str) -> Result<StepView, DomainError> {
    table
        .get_step(case_id, &StepId::new(step_id))
        .map(StepView::from)
}

/// Summarizes every row of a case.
///
/// # Errors
///
/// Returns `DomainError::CaseNotFound` for an unknown case.
pub fn get_case_steps(table: &CaseTable, case_id: &str) -> Result<CaseStepsView, DomainError> {
    Ok(CaseStepsView {
        case_id: case_id.to_owned(),
        steps: table.case_steps(case_id)?,
    })
}

/// Describes a freshly loaded table.
#[must_use]
pub fn table_status(table: &CaseTable) -> TableStatusView {
    TableStatusView {
        cases: table.list_cases().to_vec(),
        version_hash: table.version_hash().to_owned(),
        diagnostics: table.diagnostics().to_vec(),
    }
}
