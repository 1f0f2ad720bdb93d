//! The loaded case table: every step of every case, indexed for lookup.

use std::collections::HashMap;
use std::path::Path;

use clinsim_core::error::DomainError;
use serde::Serialize;
use sha2::{Digest, Sha256};
use tracing::{info, warn};

use super::step::{Step, StepRow};
use super::step_ref::{StepId, StepRef};
use crate::error::{LoadError, StepDataError};
use crate::source::{self, RawTable};

pub const COL_CASE_ID: &str = "Case ID";
pub const COL_STEP_ID: &str = "Step ID";
pub const COL_PATIENT_STATUS: &str = "Patient Status";
pub const COL_SCENARIO: &str = "Scenario/Question";
pub const COL_OPTIONS: &str = "Options";
pub const COL_IS_CORRECT: &str = "Is Correct";
pub const COL_FEEDBACK: &str = "Feedback";
pub const COL_NEXT_STEP: &str = "Next Step ID";
pub const COL_SCORE_CHANGE: &str = "Score Change";
pub const COL_CONSEQUENCE: &str = "Consequence";

/// Columns a case source must provide; any others are ignored.
pub const REQUIRED_COLUMNS: [&str; 10] = [
    COL_CASE_ID,
    COL_STEP_ID,
    COL_PATIENT_STATUS,
    COL_SCENARIO,
    COL_OPTIONS,
    COL_IS_CORRECT,
    COL_FEEDBACK,
    COL_NEXT_STEP,
    COL_SCORE_CHANGE,
    COL_CONSEQUENCE,
];

/// One row of the table after parsing.
#[derive(Debug, Clone)]
enum StepEntry {
    Ready(Step),
    Malformed {
        case_id: String,
        step_id: StepId,
        error: StepDataError,
    },
}

impl StepEntry {
    fn case_id(&self) -> &str {
        match self {
            Self::Ready(step) => &step.case_id,
            Self::Malformed { case_id, .. } => case_id,
        }
    }

    fn step_id(&self) -> &StepId {
        match self {
            Self::Ready(step) => &step.step_id,
            Self::Malformed { step_id, .. } => step_id,
        }
    }
}

/// A load-time problem with one step.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StepDiagnostic {
    /// Case the step belongs to.
    pub case_id: String,
    /// The affected step.
    pub step_id: StepId,
    /// Human-readable description.
    pub message: String,
}

/// Authoring summary of one step row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StepSummary {
    /// The step identifier.
    pub step_id: StepId,
    /// Number of options, zero when malformed.
    pub option_count: usize,
    /// Load-time problem, if the step cannot be rendered.
    pub problem: Option<String>,
}

/// Read-only table of cases and their steps.
#[derive(Debug, Clone)]
pub struct CaseTable {
    version_hash: String,
    cases: Vec<String>,
    entries: Vec<StepEntry>,
    /// case ID -> step ID -> position of the first matching row in `entries`.
    index: HashMap<String, HashMap<StepId, usize>>,
    diagnostics: Vec<StepDiagnostic>,
}

impl CaseTable {
    /// Reads, coerces and parses the case source at `path`.
    ///
    /// When `strict` is set any step diagnostic fails the load.
    ///
    /// # Errors
    ///
    /// Returns `LoadError::NotFound` if the file is missing and
    /// `LoadError::ParseFailure` if it is unreadable, lacks a required column,
    /// or (strict mode) contains a malformed step.
    pub fn load(path: &Path, strict: bool) -> Result<Self, LoadError> {
        let data = source::read_source(path)?;
        let table =
            Self::from_raw(data.table, data.version_hash).map_err(|r| LoadError::parse(path, r))?;

        for diagnostic in &table.diagnostics {
            warn!(
                case_id = %diagnostic.case_id,
                step_id = %diagnostic.step_id,
                "malformed step: {}",
                diagnostic.message
            );
        }

        if strict && !table.diagnostics.is_empty() {
            return Err(LoadError::parse(
                path,
                format!(
                    "{} malformed step(s), first: {}",
                    table.diagnostics.len(),
                    table.diagnostics[0].message
                ),
            ));
        }

        info!(
            path = %path.display(),
            cases = table.cases.len(),
            steps = table.entries.len(),
            malformed = table.diagnostics.len(),
            version_hash = %table.version_hash,
            "case table loaded"
        );
        Ok(table)
    }

    /// Builds a table from CSV text held in memory.
    ///
    /// # Errors
    ///
    /// Returns a description of the problem if the text is not valid CSV or
    /// lacks a required column.
    pub fn from_csv(text: &str) -> Result<Self, String> {
        let raw = source::parse_csv(text.as_bytes())?;
        Self::from_raw(raw, format!("{:x}", Sha256::digest(text.as_bytes())))
    }

    /// Builds a table from an already coerced cell grid.
    ///
    /// # Errors
    ///
    /// Returns a description of the problem if a required column is missing.
    pub fn from_raw(raw: RawTable, version_hash: String) -> Result<Self, String> {
        let headers: Vec<String> = raw
            .headers
            .iter()
            .map(|h| h.trim_start_matches('\u{feff}').trim().to_owned())
            .collect();

        let mut positions = [0usize; REQUIRED_COLUMNS.len()];
        let mut missing = Vec::new();
        for (slot, name) in positions.iter_mut().zip(REQUIRED_COLUMNS) {
            match headers.iter().position(|h| h == name) {
                Some(position) => *slot = position,
                None => missing.push(name),
            }
        }
        if !missing.is_empty() {
            return Err(format!("missing required column(s): {}", missing.join(", ")));
        }

        let mut table = Self {
            version_hash,
            cases: Vec::new(),
            entries: Vec::with_capacity(raw.rows.len()),
            index: HashMap::new(),
            diagnostics: Vec::new(),
        };

        for cells in &raw.rows {
            let cell = |column: usize| cells[positions[column]].clone();
            let row = StepRow {
                case_id: cell(0).trim().to_owned(),
                step_id: cell(1).trim().to_owned(),
                patient_status: cell(2),
                scenario: cell(3),
                options: cell(4),
                is_correct: cell(5),
                feedback: cell(6),
                next_step: cell(7),
                score_change: cell(8),
                consequence: cell(9),
            };

            if row.case_id.is_empty() {
                warn!(step_id = %row.step_id, "skipping row without a case ID");
                continue;
            }
            table.push(row);
        }

        table.check_references();
        Ok(table)
    }

    fn push(&mut self, row: StepRow) {
        if !self.cases.contains(&row.case_id) {
            self.cases.push(row.case_id.clone());
        }

        let entry = match Step::parse(&row) {
            Ok(step) => StepEntry::Ready(step),
            Err(error) => StepEntry::Malformed {
                case_id: row.case_id.clone(),
                step_id: StepId::new(row.step_id.as_str()),
                error,
            },
        };

        let position = self.entries.len();
        self.index
            .entry(row.case_id)
            .or_default()
            .entry(StepId::new(row.step_id))
            .or_insert(position);
        self.entries.push(entry);
    }

    /// Marks steps whose correct options lead to undefined steps as malformed
    /// and records a diagnostic for every malformed step. Incorrect options
    /// never transition, so their next step is not checked.
    fn check_references(&mut self) {
        for position in 0..self.entries.len() {
            let dangling = match &self.entries[position] {
                StepEntry::Ready(step) => {
                    step.options
                        .iter()
                        .enumerate()
                        .filter(|(_, option)| option.is_correct)
                        .find_map(|(index, option)| match &option.next_step {
                            StepRef::Ordinary(target)
                                if !self.contains_step(&step.case_id, target) =>
                            {
                                Some(StepDataError::DanglingReference {
                                    index,
                                    target: target.to_string(),
                                })
                            }
                            _ => None,
                        })
                }
                StepEntry::Malformed { .. } => None,
            };

            if let Some(error) = dangling {
                let case_id = self.entries[position].case_id().to_owned();
                let step_id = self.entries[position].step_id().clone();
                self.entries[position] = StepEntry::Malformed {
                    case_id,
                    step_id,
                    error,
                };
            }

            if let StepEntry::Malformed {
                case_id,
                step_id,
                error,
            } = &self.entries[position]
            {
                self.diagnostics.push(StepDiagnostic {
                    case_id: case_id.clone(),
                    step_id: step_id.clone(),
                    message: error.to_string(),
                });
            }
        }
    }

    fn contains_step(&self, case_id: &str, step_id: &StepId) -> bool {
        self.index
            .get(case_id)
            .is_some_and(|steps| steps.contains_key(step_id))
    }

    /// Case IDs in first-seen order, without duplicates.
    #[must_use]
    pub fn list_cases(&self) -> &[String] {
        &self.cases
    }

    /// The case a fresh session starts on.
    #[must_use]
    pub fn first_case(&self) -> Option<&str> {
        self.cases.first().map(String::as_str)
    }

    /// Whether any row carries `case_id`.
    #[must_use]
    pub fn has_case(&self, case_id: &str) -> bool {
        self.index.contains_key(case_id)
    }

    /// Returns the first row matching `case_id` and `step_id`.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::CaseNotFound` for an unknown case,
    /// `DomainError::StepNotFound` if the case has no such step, and
    /// `DomainError::StepData` if the step failed to parse.
    pub fn get_step(&self, case_id: &str, step_id: &StepId) -> Result<&Step, DomainError> {
        let steps = self
            .index
            .get(case_id)
            .ok_or_else(|| DomainError::CaseNotFound(case_id.to_owned()))?;

        let position = steps.get(step_id).ok_or_else(|| DomainError::StepNotFound {
            case_id: case_id.to_owned(),
            step_id: step_id.to_string(),
        })?;

        match &self.entries[*position] {
            StepEntry::Ready(step) => Ok(step),
            StepEntry::Malformed { error, .. } => Err(DomainError::StepData {
                case_id: case_id.to_owned(),
                step_id: step_id.to_string(),
                reason: error.to_string(),
            }),
        }
    }

    /// Every row of `case_id` in table order.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::CaseNotFound` for an unknown case.
    pub fn case_steps(&self, case_id: &str) -> Result<Vec<StepSummary>, DomainError> {
        if !self.has_case(case_id) {
            return Err(DomainError::CaseNotFound(case_id.to_owned()));
        }
        Ok(self
            .entries
            .iter()
            .filter(|entry| entry.case_id() == case_id)
            .map(|entry| match entry {
                StepEntry::Ready(step) => StepSummary {
                    step_id: step.step_id.clone(),
                    option_count: step.options.len(),
                    problem: None,
                },
                StepEntry::Malformed { step_id, error, .. } => StepSummary {
                    step_id: step_id.clone(),
                    option_count: 0,
                    problem: Some(error.to_string()),
                },
            })
            .collect())
    }

    /// Load-time problems, one per malformed step.
    #[must_use]
    pub fn diagnostics(&self) -> &[StepDiagnostic] {
        &self.diagnostics
    }

    /// SHA-256 of the source bytes this table was built from.
    #[must_use]
    pub fn version_hash(&self) -> &str {
        &self.version_hash
    }

    /// Total number of step rows.
    #[must_use]
    pub fn step_count(&self) -> usize {
        self.entries.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const HEADER: &str = "Case ID,Step ID,Patient Status,Scenario/Question,Options,Is Correct,Feedback,Next Step ID,Score Change,Consequence";

    fn table(rows: &[&str]) -> CaseTable {
        let mut text = HEADER.to_owned();
        for row in rows {
            text.push('\n');
            text.push_str(row);
        }
        CaseTable::from_csv(&text).unwrap()
    }

    #[test]
    fn test_list_cases_keeps_first_seen_order_without_duplicates() {
        // Arrange
        let table = table(&[
            "B,1,ok,q,Go,TRUE,fb,END,1,-",
            "A,1,ok,q,Go,TRUE,fb,END,1,-",
            "B,2,ok,q,Go,TRUE,fb,END,1,-",
        ]);

        // Act
        let cases = table.list_cases();

        // Assert
        assert_eq!(cases, ["B", "A"]);
        assert_eq!(table.first_case(), Some("B"));
        assert_eq!(table.step_count(), 3);
    }

    #[test]
    fn test_get_step_returns_first_matching_row() {
        // Arrange
        let table = table(&[
            "A,1,first,q,Go,TRUE,fb,END,1,-",
            "A,1,second,q,Go,TRUE,fb,END,1,-",
        ]);

        // Act
        let step = table.get_step("A", &StepId::entry()).unwrap();

        // Assert
        assert_eq!(step.patient_status, "first");
    }

    #[test]
    fn test_get_step_unknown_step_is_step_not_found() {
        // Arrange
        let table = table(&["A,1,ok,q,Go,TRUE,fb,END,1,-"]);

        // Act
        let result = table.get_step("A", &StepId::new("99"));

        // Assert
        match result.unwrap_err() {
            DomainError::StepNotFound { case_id, step_id } => {
                assert_eq!(case_id, "A");
                assert_eq!(step_id, "99");
            }
            other => panic!("expected StepNotFound, got {other:?}"),
        }
    }

    #[test]
    fn test_get_step_unknown_case_is_case_not_found() {
        let table = table(&["A,1,ok,q,Go,TRUE,fb,END,1,-"]);

        let result = table.get_step("Z", &StepId::entry());

        assert!(matches!(result, Err(DomainError::CaseNotFound(c)) if c == "Z"));
    }

    #[test]
    fn test_header_whitespace_is_stripped() {
        // Arrange
        let text = " Case ID ,Step ID, Patient Status,Scenario/Question,Options,Is Correct,Feedback,Next Step ID,Score Change ,Consequence\nA,1,ok,q,Go,TRUE,fb,END,1,-";

        // Act
        let table = CaseTable::from_csv(text).unwrap();

        // Assert
        assert!(table.get_step("A", &StepId::entry()).is_ok());
    }

    #[test]
    fn test_missing_column_is_rejected() {
        let text = "Case ID,Step ID,Options\nA,1,Go";

        let err = CaseTable::from_csv(text).unwrap_err();

        assert!(err.contains("Patient Status"));
        assert!(err.contains("Consequence"));
    }

    #[test]
    fn test_unequal_lengths_make_step_unrenderable() {
        // Arrange
        let table = table(&["A,1,ok,q,Go|Stay,TRUE,fb,END|1,1|0,-|-"]);

        // Act
        let result = table.get_step("A", &StepId::entry());

        // Assert
        assert!(matches!(result, Err(DomainError::StepData { .. })));
        assert_eq!(table.diagnostics().len(), 1);
    }

    #[test]
    fn test_dangling_next_step_is_flagged_at_load() {
        // Arrange
        let table = table(&["A,1,ok,q,Go|Stay,TRUE|FALSE,a|b,7|1,10|-5,-|worse"]);

        // Act
        let result = table.get_step("A", &StepId::entry());

        // Assert
        match result.unwrap_err() {
            DomainError::StepData { reason, .. } => assert!(reason.contains("'7'")),
            other => panic!("expected StepData, got {other:?}"),
        }
        assert_eq!(table.diagnostics()[0].step_id, StepId::entry());
    }

    #[test]
    fn test_incorrect_option_next_step_is_not_checked() {
        // Arrange: the incorrect option's next step is blank
        let table = table(&["A,1,ok,q,Go|Stay,TRUE|FALSE,a|b,END|,10|-5,-|worse"]);

        // Act
        let step = table.get_step("A", &StepId::entry()).unwrap();

        // Assert
        assert_eq!(step.options.len(), 2);
        assert!(table.diagnostics().is_empty());
    }

    #[test]
    fn test_reference_is_scoped_to_its_case() {
        // Step 2 exists only in case B.
        let table = table(&[
            "A,1,ok,q,Go,TRUE,fb,2,1,-",
            "B,2,ok,q,Go,TRUE,fb,END,1,-",
        ]);

        assert!(matches!(
            table.get_step("A", &StepId::entry()),
            Err(DomainError::StepData { .. })
        ));
    }

    #[test]
    fn test_case_steps_summarizes_rows_in_order() {
        // Arrange
        let table = table(&[
            "A,1,ok,q,Go|Stay,TRUE|FALSE,a|b,2|1,10|-5,-|worse",
            "A,2,ok,q,Go,TRUE,fb,END|END,1,-",
        ]);

        // Act
        let steps = table.case_steps("A").unwrap();

        // Assert
        assert_eq!(steps.len(), 2);
        assert_eq!(steps[0].step_id, StepId::entry());
        assert_eq!(steps[0].option_count, 2);
        assert!(steps[0].problem.is_none());
        assert_eq!(steps[1].option_count, 0);
        assert!(steps[1].problem.is_some());
    }

    #[test]
    fn test_rows_without_case_id_are_skipped() {
        let table = table(&[",1,ok,q,Go,TRUE,fb,END,1,-", "A,1,ok,q,Go,TRUE,fb,END,1,-"]);

        assert_eq!(table.list_cases(), ["A"]);
    }

    #[test]
    fn test_load_missing_file_is_not_found() {
        let result = CaseTable::load(Path::new("/no/such/clinical_cases.csv"), false);

        assert!(matches!(result, Err(LoadError::NotFound(_))));
    }
}
