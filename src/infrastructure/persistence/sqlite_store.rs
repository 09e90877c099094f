use std::path::PathBuf;
use std::sync::Mutex;
use std::time::Duration;

use chrono::Utc;
use rusqlite::{Connection, OptionalExtension, params};

use crate::domain::ports::store::{StateLock, StateStore, StoreError, parse_stored_value};
use crate::domain::value_objects::state_key::StateKey;

use super::{file_lock, migrations};

/// SQLite-backed store, one row per state key.
pub struct SqliteStore {
    conn: Mutex<Connection>,
    lock_path: Option<PathBuf>,
    lock_timeout: Option<Duration>,
}

impl SqliteStore {
    /// Create a new `SQLite` store at the given path.
    ///
    /// Expands `~`, creates parent directories, opens connection,
    /// sets WAL mode and pragmas, and initializes schema.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::WriteFailed` if the database cannot be opened or initialized.
    pub fn new(path: &str, lock_timeout: Option<Duration>) -> Result<Self, StoreError> {
        let expanded = shellexpand::tilde(path);
        let db_path = PathBuf::from(expanded.as_ref());

        if let Some(parent) = db_path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| StoreError::WriteFailed(e.to_string()))?;
        }

        let conn =
            Connection::open(&db_path).map_err(|e| StoreError::WriteFailed(e.to_string()))?;
        let mut lock_name = db_path.clone().into_os_string();
        lock_name.push(".lock");

        Self::with_connection(conn, Some(PathBuf::from(lock_name)), lock_timeout)
    }

    /// Open a private in-memory database. Locking is a no-op.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::WriteFailed` if the schema cannot be created.
    pub fn in_memory() -> Result<Self, StoreError> {
        let conn =
            Connection::open_in_memory().map_err(|e| StoreError::WriteFailed(e.to_string()))?;
        Self::with_connection(conn, None, None)
    }

    fn with_connection(
        conn: Connection,
        lock_path: Option<PathBuf>,
        lock_timeout: Option<Duration>,
    ) -> Result<Self, StoreError> {
        conn.pragma_update(None, "journal_mode", "WAL")
            .map_err(|e| StoreError::WriteFailed(e.to_string()))?;
        conn.pragma_update(None, "synchronous", "NORMAL")
            .map_err(|e| StoreError::WriteFailed(e.to_string()))?;
        conn.pragma_update(None, "busy_timeout", 5000)
            .map_err(|e| StoreError::WriteFailed(e.to_string()))?;

        migrations::initialize_schema(&conn).map_err(|e| StoreError::WriteFailed(e.to_string()))?;

        Ok(Self {
            conn: Mutex::new(conn),
            lock_path,
            lock_timeout,
        })
    }

    /// Remove baselines not updated within the given retention period.
    ///
    /// Returns the number of keys removed.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::WriteFailed` if deletion fails.
    pub fn prune_stale(&self, retention_hours: u64) -> Result<usize, StoreError> {
        let hours =
            i64::try_from(retention_hours).map_err(|e| StoreError::WriteFailed(e.to_string()))?;
        let delta = chrono::TimeDelta::try_hours(hours)
            .ok_or_else(|| StoreError::WriteFailed("invalid retention hours".into()))?;
        let cutoff = (Utc::now() - delta).to_rfc3339();

        let conn = self
            .conn
            .lock()
            .map_err(|_| StoreError::WriteFailed("lock poisoned".into()))?;

        let removed = conn
            .execute(
                "DELETE FROM check_state WHERE updated_at < ?1",
                params![cutoff],
            )
            .map_err(|e| StoreError::WriteFailed(e.to_string()))?;

        drop(conn);
        if removed > 0 {
            tracing::info!(removed, retention_hours, "pruned stale baselines");
        }
        Ok(removed)
    }

    #[cfg(test)]
    fn insert_raw(&self, key: &str, value: &str, updated_at: &str) -> Result<(), StoreError> {
        let conn = self
            .conn
            .lock()
            .map_err(|_| StoreError::WriteFailed("lock poisoned".into()))?;
        conn.execute(
            "INSERT OR REPLACE INTO check_state (key, value, updated_at) VALUES (?1, ?2, ?3)",
            params![key, value, updated_at],
        )
        .map_err(|e| StoreError::WriteFailed(e.to_string()))?;
        Ok(())
    }
}

impl StateStore for SqliteStore {
    fn load(&self, key: &StateKey) -> Result<Option<u64>, StoreError> {
        let conn = self
            .conn
            .lock()
            .map_err(|_| StoreError::ReadFailed("lock poisoned".into()))?;

        let value: Option<String> = conn
            .query_row(
                "SELECT value FROM check_state WHERE key = ?1",
                params![key.as_str()],
                |row| row.get(0),
            )
            .optional()
            .map_err(|e| StoreError::ReadFailed(e.to_string()))?;
        drop(conn);

        value.map(|content| parse_stored_value(key, &content)).transpose()
    }

    fn store(&self, key: &StateKey, value: u64) -> Result<(), StoreError> {
        let conn = self
            .conn
            .lock()
            .map_err(|_| StoreError::WriteFailed("lock poisoned".into()))?;

        conn.execute(
            "INSERT INTO check_state (key, value, updated_at) VALUES (?1, ?2, ?3) \
             ON CONFLICT(key) DO UPDATE SET value = excluded.value, updated_at = excluded.updated_at",
            params![key.as_str(), value.to_string(), Utc::now().to_rfc3339()],
        )
        .map_err(|e| StoreError::WriteFailed(e.to_string()))?;

        drop(conn);
        Ok(())
    }

    fn lock(&self, _key: &StateKey) -> Result<StateLock, StoreError> {
        match (&self.lock_path, self.lock_timeout) {
            (Some(path), Some(timeout)) => file_lock::acquire(path, timeout),
            _ => Ok(StateLock::none()),
        }
    }
}
