use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};

use log::{info, warn};

use super::table::ResolutionTable;
use crate::models::CatalogEntry;

/// Read-only handle to the currently published [`ResolutionTable`].
///
/// A table is only ever published after its builder has run to completion,
/// so readers never observe a partially built table. Publishing swaps the
/// whole table; callers that resolve several identifiers take one
/// [`snapshot`](Self::snapshot) and resolve against it without further
/// locking.
pub struct IdentifierResolver {
    current: RwLock<Arc<ResolutionTable>>,
}

impl IdentifierResolver {
    /// Starts with an empty table (every lookup falls back to the slug).
    pub fn new() -> Self {
        Self {
            current: RwLock::new(Arc::new(ResolutionTable::empty())),
        }
    }

    pub fn with_table(table: ResolutionTable) -> Self {
        Self {
            current: RwLock::new(Arc::new(table)),
        }
    }

    fn read(&self) -> RwLockReadGuard<'_, Arc<ResolutionTable>> {
        self.current.read().unwrap_or_else(|poisoned| {
            warn!("Resolver lock was poisoned, recovering");
            poisoned.into_inner()
        })
    }

    fn write(&self) -> RwLockWriteGuard<'_, Arc<ResolutionTable>> {
        self.current.write().unwrap_or_else(|poisoned| {
            warn!("Resolver lock was poisoned, recovering");
            poisoned.into_inner()
        })
    }

    /// Replaces the published table.
    pub fn publish(&self, table: ResolutionTable) {
        let keys = table.len();
        *self.write() = Arc::new(table);
        info!("Published resolution table with {} keys", keys);
    }

    /// Builds a table from `catalog` and publishes it.
    pub fn publish_catalog(&self, catalog: &[CatalogEntry]) {
        self.publish(ResolutionTable::build(catalog));
    }

    /// The table currently published.
    pub fn snapshot(&self) -> Arc<ResolutionTable> {
        Arc::clone(&self.read())
    }

    /// Resolves one identifier against the current table.
    pub fn resolve(&self, input: &str) -> String {
        self.snapshot().resolve(input)
    }

    pub fn is_loaded(&self) -> bool {
        !self.read().is_empty()
    }
}

impl Default for IdentifierResolver {
    fn default() -> Self {
        Self::new()
    }
}
