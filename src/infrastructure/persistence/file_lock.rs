use std::fs::{File, OpenOptions};
use std::path::Path;
use std::thread;
use std::time::{Duration, Instant};

use fs2::FileExt;

use crate::domain::ports::store::{StateLock, StoreError};

const POLL_INTERVAL: Duration = Duration::from_millis(25);

/// Holds an advisory lock until dropped.
struct LockedFile {
    file: File,
}

impl Drop for LockedFile {
    fn drop(&mut self) {
        if let Err(e) = FileExt::unlock(&self.file) {
            tracing::debug!("failed to release state lock: {e}");
        }
    }
}

/// Take an exclusive advisory lock on `path`, polling for at most `timeout`.
///
/// Contention past the deadline yields an empty guard and a warning, so a
/// stuck peer can delay a check but never hang it.
///
/// # Errors
///
/// Returns `StoreError::WriteFailed` if the lock file cannot be opened or the
/// platform refuses the lock for a reason other than contention.
pub fn acquire(path: &Path, timeout: Duration) -> Result<StateLock, StoreError> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).map_err(|e| {
            StoreError::WriteFailed(format!("cannot create {}: {e}", parent.display()))
        })?;
    }
    let file = OpenOptions::new()
        .create(true)
        .truncate(false)
        .write(true)
        .open(path)
        .map_err(|e| {
            StoreError::WriteFailed(format!("cannot open lock file {}: {e}", path.display()))
        })?;

    let contended = fs2::lock_contended_error().raw_os_error();
    let deadline = Instant::now() + timeout;
    loop {
        match FileExt::try_lock_exclusive(&file) {
            Ok(()) => return Ok(StateLock::holding(LockedFile { file })),
            Err(e) if e.raw_os_error() == contended => {
                if Instant::now() >= deadline {
                    tracing::warn!(
                        lock = %path.display(),
                        timeout_ms = timeout.as_millis(),
                        "state lock still held elsewhere, proceeding without it"
                    );
                    return Ok(StateLock::none());
                }
                thread::sleep(POLL_INTERVAL);
            }
            Err(e) => {
                return Err(StoreError::WriteFailed(format!(
                    "cannot lock {}: {e}",
                    path.display()
                )));
            }
        }
    }
}
