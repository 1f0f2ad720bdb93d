//! Process-wide cache of loaded case tables.
//!
//! A source is read once and the parsed table is shared read-only from then
//! on. Only an explicit [`CaseCatalog::reload`] replaces a cached table.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::{Arc, PoisonError, RwLock};

use tracing::{debug, info, warn};

use crate::domain::table::CaseTable;
use crate::error::LoadError;

/// Load-once cache of case tables keyed by source identity.
#[derive(Debug, Default)]
pub struct CaseCatalog {
    strict: bool,
    tables: RwLock<HashMap<PathBuf, Arc<CaseTable>>>,
}

impl CaseCatalog {
    /// Creates an empty catalog. With `strict` set, sources containing
    /// malformed steps fail to load.
    #[must_use]
    pub fn new(strict: bool) -> Self {
        Self {
            strict,
            tables: RwLock::new(HashMap::new()),
        }
    }

    /// Returns the cached table for `path`, loading it on first access.
    ///
    /// # Errors
    ///
    /// Returns the `LoadError` of the first load attempt; failures are not
    /// cached, so a later call tries again.
    pub fn get_or_load(&self, path: &Path) -> Result<Arc<CaseTable>, LoadError> {
        let key = source_key(path);
        if let Some(table) = self.cached_by_key(&key) {
            return Ok(table);
        }

        debug!(path = %key.display(), "case table not cached, loading");
        let loaded = Arc::new(CaseTable::load(path, self.strict)?);

        let mut tables = self.tables.write().unwrap_or_else(PoisonError::into_inner);
        Ok(Arc::clone(tables.entry(key).or_insert(loaded)))
    }

    /// Re-reads `path` and replaces the cached table.
    ///
    /// # Errors
    ///
    /// Returns the `LoadError` if the source cannot be loaded; the previously
    /// cached table, if any, stays in place.
    pub fn reload(&self, path: &Path) -> Result<Arc<CaseTable>, LoadError> {
        let key = source_key(path);
        let loaded = match CaseTable::load(path, self.strict) {
            Ok(table) => Arc::new(table),
            Err(err) => {
                warn!(path = %key.display(), error = %err, "reload failed, keeping cached table");
                return Err(err);
            }
        };

        let mut tables = self.tables.write().unwrap_or_else(PoisonError::into_inner);
        tables.insert(key.clone(), Arc::clone(&loaded));
        info!(path = %key.display(), version_hash = %loaded.version_hash(), "case table reloaded");
        Ok(loaded)
    }

    /// Returns the cached table for `path` without loading.
    #[must_use]
    pub fn cached(&self, path: &Path) -> Option<Arc<CaseTable>> {
        self.cached_by_key(&source_key(path))
    }

    fn cached_by_key(&self, key: &Path) -> Option<Arc<CaseTable>> {
        self.tables
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(key)
            .cloned()
    }
}

/// Two spellings of the same file share one cache entry.
fn source_key(path: &Path) -> PathBuf {
    path.canonicalize().unwrap_or_else(|_| path.to_path_buf())
}
