pub mod file_lock;
pub mod file_store;
pub mod in_memory_store;
pub mod migrations;
pub mod sqlite_store;

use std::time::Duration;

use crate::application::config::{StateBackend, StateConfig};
use crate::domain::ports::store::{StateStore, StoreError};

pub use file_store::FileStateStore;
pub use in_memory_store::InMemoryStore;
pub use sqlite_store::SqliteStore;

/// Build the configured state store.
///
/// # Errors
///
/// Returns `StoreError` if the `SQLite` database cannot be opened.
pub fn open_state_store(config: &StateConfig) -> Result<Box<dyn StateStore>, StoreError> {
    let lock_timeout = config
        .lock
        .then(|| Duration::from_millis(config.lock_timeout_ms));

    match config.backend {
        StateBackend::File => {
            tracing::debug!(dir = %config.dir, "using file state store");
            Ok(Box::new(FileStateStore::new(&config.dir, lock_timeout)))
        }
        StateBackend::Sqlite => {
            tracing::debug!(database = %config.database, "using sqlite state store");
            let store = SqliteStore::new(&config.database, lock_timeout)?;
            if let Err(e) = store.prune_stale(config.retention_hours) {
                tracing::warn!("failed to prune stale baselines: {e}");
            }
            Ok(Box::new(store))
        }
    }
}
