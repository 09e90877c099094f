use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};
use std::time::Duration;

use tempfile::NamedTempFile;

use crate::domain::ports::store::{StateLock, StateStore, StoreError, parse_stored_value};
use crate::domain::value_objects::state_key::StateKey;

use super::file_lock;

/// One small text file per state key, holding the decimal baseline.
pub struct FileStateStore {
    dir: PathBuf,
    lock_timeout: Option<Duration>,
}

impl FileStateStore {
    /// Create a store rooted at `dir` (tilde-expanded). The directory is only
    /// created on first write.
    ///
    /// `lock_timeout` of `None` disables locking.
    #[must_use]
    pub fn new(dir: &str, lock_timeout: Option<Duration>) -> Self {
        let expanded = shellexpand::tilde(dir);
        Self {
            dir: PathBuf::from(expanded.as_ref()),
            lock_timeout,
        }
    }

    #[must_use]
    pub fn path_for(&self, key: &StateKey) -> PathBuf {
        self.dir.join(key.file_name())
    }

    fn lock_path_for(&self, key: &StateKey) -> PathBuf {
        self.dir.join(format!(".{}.lock", key.file_name()))
    }
}

impl StateStore for FileStateStore {
    fn load(&self, key: &StateKey) -> Result<Option<u64>, StoreError> {
        let path = self.path_for(key);
        match std::fs::read_to_string(&path) {
            Ok(content) => parse_stored_value(key, &content).map(Some),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) if e.kind() == ErrorKind::InvalidData => Err(StoreError::Corrupt {
                key: key.to_string(),
                content: "<binary data>".into(),
            }),
            Err(e) => Err(StoreError::ReadFailed(format!("{}: {e}", path.display()))),
        }
    }

    fn store(&self, key: &StateKey, value: u64) -> Result<(), StoreError> {
        let path = self.path_for(key);
        let write_err = |e: std::io::Error| StoreError::WriteFailed(format!("{}: {e}", path.display()));

        std::fs::create_dir_all(&self.dir).map_err(|e| {
            StoreError::WriteFailed(format!("cannot create {}: {e}", self.dir.display()))
        })?;

        // Same directory as the target so the rename stays on one filesystem.
        let mut tmp = NamedTempFile::new_in(&self.dir).map_err(write_err)?;
        writeln!(tmp, "{value}").map_err(write_err)?;
        tmp.as_file().sync_all().map_err(write_err)?;
        tmp.persist(&path).map_err(|e| write_err(e.error))?;

        tracing::trace!(key = %key, value, path = %path.display(), "baseline written");
        Ok(())
    }

    fn lock(&self, key: &StateKey) -> Result<StateLock, StoreError> {
        match self.lock_timeout {
            Some(timeout) => file_lock::acquire(&self.lock_path_for(key), timeout),
            None => Ok(StateLock::none()),
        }
    }
}
