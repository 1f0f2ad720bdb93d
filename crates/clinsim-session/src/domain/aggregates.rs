//! Aggregate roots for the Session context.

use clinsim_cases::{CaseTable, StepRef};
use clinsim_core::aggregate::AggregateRoot;
use clinsim_core::clock::Clock;
use clinsim_core::error::DomainError;
use clinsim_core::event::EventMetadata;
use uuid::Uuid;

use super::events::{
    ActionResultAcknowledged, CaseRestarted, CaseSelected, CorrectChoiceMade, IncorrectChoiceMade,
    SessionEvent, SessionEventKind, SessionStarted,
};
use super::interpreter::{ActionResult, ChoiceOutcome, HistoryEntry, resolve_choice};

/// One user's walk through the cases.
///
/// Command methods validate against the current state, record an event and
/// apply it immediately, so the aggregate always reflects its uncommitted
/// events as well as its history.
#[derive(Debug)]
pub struct CaseSession {
    /// Aggregate identifier.
    pub id: Uuid,
    /// Number of persisted events.
    pub(crate) version: i64,
    pub(crate) started: bool,
    /// Case being played, once one is selected.
    pub(crate) selected_case: Option<String>,
    pub(crate) current_step: StepRef,
    pub(crate) score: i64,
    /// Correctly answered steps, oldest first.
    pub(crate) history: Vec<HistoryEntry>,
    /// Consequence gating the step after an incorrect choice.
    pub(crate) pending_result: Option<ActionResult>,
    /// Uncommitted events pending persistence.
    uncommitted_events: Vec<SessionEvent>,
}

impl CaseSession {
    /// Creates an empty session.
    #[must_use]
    pub fn new(id: Uuid) -> Self {
        Self {
            id,
            version: 0,
            started: false,
            selected_case: None,
            current_step: StepRef::entry(),
            score: 0,
            history: Vec::new(),
            pending_result: None,
            uncommitted_events: Vec::new(),
        }
    }

    /// The selected case, if any.
    #[must_use]
    pub fn selected_case(&self) -> Option<&str> {
        self.selected_case.as_deref()
    }

    /// The step the session is on.
    #[must_use]
    pub fn current_step(&self) -> &StepRef {
        &self.current_step
    }

    /// Cumulative score.
    #[must_use]
    pub fn score(&self) -> i64 {
        self.score
    }

    /// Correctly answered steps, oldest first.
    #[must_use]
    pub fn history(&self) -> &[HistoryEntry] {
        &self.history
    }

    /// The unacknowledged consequence, if any.
    #[must_use]
    pub fn pending_result(&self) -> Option<&ActionResult> {
        self.pending_result.as_ref()
    }

    /// Feedback of the last correct choice, shown when the case is complete.
    #[must_use]
    pub fn discharge_notes(&self) -> Option<&str> {
        self.history.last().map(|entry| entry.feedback.as_str())
    }

    /// Creates the session, producing a `SessionStarted` event.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::Validation` if the session was already started.
    pub fn start(&mut self, correlation_id: Uuid, clock: &dyn Clock) -> Result<(), DomainError> {
        if self.started {
            return Err(DomainError::Validation(format!(
                "session {} has already been started",
                self.id
            )));
        }

        self.record(
            SessionEventKind::SessionStarted(SessionStarted {
                session_id: self.id,
            }),
            correlation_id,
            clock,
        );
        Ok(())
    }

    /// Switches to `case_id`, resetting step, score, history and any pending
    /// result. Selecting the case already selected changes nothing.
    ///
    /// Returns whether an event was produced.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::CaseNotFound` if the table has no such case.
    pub fn select_case(
        &mut self,
        table: &CaseTable,
        case_id: &str,
        correlation_id: Uuid,
        clock: &dyn Clock,
    ) -> Result<bool, DomainError> {
        if !table.has_case(case_id) {
            return Err(DomainError::CaseNotFound(case_id.to_owned()));
        }
        if self.selected_case.as_deref() == Some(case_id) {
            return Ok(false);
        }

        self.record(
            SessionEventKind::CaseSelected(CaseSelected {
                session_id: self.id,
                case_id: case_id.to_owned(),
            }),
            correlation_id,
            clock,
        );
        Ok(true)
    }

    /// Chooses option `option_index` on the current step.
    ///
    /// The score always moves by the option's score change. A correct choice
    /// appends to history and moves to the option's next step; an incorrect
    /// one leaves the step unchanged and sets the pending result.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::Validation` if no case is selected, a result is
    /// awaiting acknowledgment, the case is complete, or the option does not
    /// exist. Returns the lookup error (`StepNotFound`, `StepData`) if the
    /// current step, or the next step of a correct choice, cannot be rendered;
    /// the session is left unchanged in every error case.
    pub fn choose_option(
        &mut self,
        table: &CaseTable,
        option_index: usize,
        correlation_id: Uuid,
        clock: &dyn Clock,
    ) -> Result<ChoiceOutcome, DomainError> {
        let case_id = self
            .selected_case
            .clone()
            .ok_or_else(|| DomainError::Validation("no case is selected".to_owned()))?;

        if self.pending_result.is_some() {
            return Err(DomainError::Validation(
                "the previous consequence must be acknowledged first".to_owned(),
            ));
        }

        let StepRef::Ordinary(step_id) = &self.current_step else {
            return Err(DomainError::Validation(format!(
                "case '{case_id}' is complete; restart it to choose again"
            )));
        };

        let step = table.get_step(&case_id, step_id)?;
        let outcome = resolve_choice(step, option_index)?;

        let kind = match &outcome {
            ChoiceOutcome::Correct {
                score_change,
                next_step,
                entry,
            } => {
                if let StepRef::Ordinary(target) = next_step {
                    table.get_step(&case_id, target)?;
                }
                SessionEventKind::CorrectChoiceMade(CorrectChoiceMade {
                    session_id: self.id,
                    step_id: step.step_id.clone(),
                    option_index,
                    score_change: *score_change,
                    next_step: next_step.clone(),
                    entry: entry.clone(),
                })
            }
            ChoiceOutcome::Incorrect {
                score_change,
                result,
            } => SessionEventKind::IncorrectChoiceMade(IncorrectChoiceMade {
                session_id: self.id,
                step_id: step.step_id.clone(),
                option_index,
                score_change: *score_change,
                result: result.clone(),
            }),
        };

        self.record(kind, correlation_id, clock);
        Ok(outcome)
    }

    /// Dismisses the pending consequence; the step stays the same.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::Validation` if nothing is pending.
    pub fn acknowledge_result(
        &mut self,
        correlation_id: Uuid,
        clock: &dyn Clock,
    ) -> Result<(), DomainError> {
        if self.pending_result.is_none() {
            return Err(DomainError::Validation(
                "there is no consequence to acknowledge".to_owned(),
            ));
        }

        self.record(
            SessionEventKind::ActionResultAcknowledged(ActionResultAcknowledged {
                session_id: self.id,
            }),
            correlation_id,
            clock,
        );
        Ok(())
    }

    /// Starts the completed case over from its entry step with score and
    /// history cleared. The selected case is kept.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::Validation` unless the session is on the
    /// terminal step of a selected case.
    pub fn restart_case(
        &mut self,
        correlation_id: Uuid,
        clock: &dyn Clock,
    ) -> Result<(), DomainError> {
        if self.selected_case.is_none() {
            return Err(DomainError::Validation("no case is selected".to_owned()));
        }
        if !self.current_step.is_terminal() {
            return Err(DomainError::Validation(
                "only a completed case can be restarted".to_owned(),
            ));
        }

        self.record(
            SessionEventKind::CaseRestarted(CaseRestarted {
                session_id: self.id,
            }),
            correlation_id,
            clock,
        );
        Ok(())
    }

    fn record(&mut self, kind: SessionEventKind, correlation_id: Uuid, clock: &dyn Clock) {
        let event = SessionEvent {
            metadata: EventMetadata::for_command(
                kind.event_type(),
                self.id,
                self.next_sequence_number(),
                correlation_id,
                clock.now(),
            ),
            kind,
        };
        self.mutate(&event.kind);
        self.uncommitted_events.push(event);
    }

    fn mutate(&mut self, kind: &SessionEventKind) {
        match kind {
            SessionEventKind::SessionStarted(_) => {
                self.started = true;
            }
            SessionEventKind::CaseSelected(payload) => {
                self.selected_case = Some(payload.case_id.clone());
                self.reset_progress();
            }
            SessionEventKind::CorrectChoiceMade(payload) => {
                self.score = self.score.saturating_add(payload.score_change);
                self.history.push(payload.entry.clone());
                self.current_step = payload.next_step.clone();
                self.pending_result = None;
            }
            SessionEventKind::IncorrectChoiceMade(payload) => {
                self.score = self.score.saturating_add(payload.score_change);
                self.pending_result = Some(payload.result.clone());
            }
            SessionEventKind::ActionResultAcknowledged(_) => {
                self.pending_result = None;
            }
            SessionEventKind::CaseRestarted(_) => {
                self.reset_progress();
            }
        }
    }

    fn reset_progress(&mut self) {
        self.current_step = StepRef::entry();
        self.score = 0;
        self.history.clear();
        self.pending_result = None;
    }
}

impl AggregateRoot for CaseSession {
    type Event = SessionEvent;

    fn aggregate_id(&self) -> Uuid {
        self.id
    }

    fn version(&self) -> i64 {
        self.version
    }

    fn apply(&mut self, event: &Self::Event) {
        self.mutate(&event.kind);
        self.version += 1;
    }

    fn uncommitted_events(&self) -> &[Self::Event] {
        &self.uncommitted_events
    }

    /// Marks the uncommitted events as persisted; they count toward the
    /// version from here on.
    #[allow(clippy::cast_possible_wrap)]
    fn clear_uncommitted_events(&mut self) {
        self.version += self.uncommitted_events.len() as i64;
        self.uncommitted_events.clear();
    }
}
