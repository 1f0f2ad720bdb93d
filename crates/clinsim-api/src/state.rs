//! Shared application state.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use clinsim_cases::{CaseCatalog, CaseTable, LoadError};
use clinsim_core::clock::Clock;
use clinsim_core::repository::EventRepository;

/// Application state shared across all request handlers.
#[derive(Clone)]
pub struct AppState {
    /// Timestamps for new session events.
    pub clock: Arc<dyn Clock>,
    /// Session event streams.
    pub event_repository: Arc<dyn EventRepository>,
    /// Load-once cache of case tables.
    pub catalog: Arc<CaseCatalog>,
    /// The case source every request reads from.
    pub cases_path: Arc<PathBuf>,
}

impl AppState {
    /// Create new application state.
    #[must_use]
    pub fn new(
        clock: Arc<dyn Clock>,
        event_repository: Arc<dyn EventRepository>,
        catalog: Arc<CaseCatalog>,
        cases_path: impl Into<PathBuf>,
    ) -> Self {
        Self {
            clock,
            event_repository,
            catalog,
            cases_path: Arc::new(cases_path.into()),
        }
    }

    /// The configured case source.
    #[must_use]
    pub fn cases_path(&self) -> &Path {
        &self.cases_path
    }

    /// The cached case table, loaded on first use.
    ///
    /// # Errors
    ///
    /// Returns the `LoadError` if the table is not cached and cannot be
    /// loaded.
    pub fn case_table(&self) -> Result<Arc<CaseTable>, LoadError> {
        self.catalog.get_or_load(&self.cases_path)
    }
}
