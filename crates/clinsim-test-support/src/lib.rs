//! Shared test mocks and fixtures for the clinical case simulator.

mod clock;
mod fixtures;
mod repository;

pub use clock::FixedClock;
pub use fixtures::{SAMPLE_CASES_CSV, sample_case_table};
pub use repository::{
    AppendCall, EmptyEventRepository, FailingEventRepository, RecordingEventRepository,
};
