//! Clinical case simulator: Session context.
//!
//! Responsible for the per-user walk through a case: which case is selected,
//! which step is current, the running score, the history of correctly
//! answered steps, and the consequence shown after an incorrect choice.
//! Sessions are event-sourced; the step interpreter turns one option choice
//! into exactly one session event.

pub mod application;
pub mod domain;
