use thiserror::Error;

use crate::domain::value_objects::state_key::StateKey;

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("storage read failed: {0}")]
    ReadFailed(String),
    #[error("storage write failed: {0}")]
    WriteFailed(String),
    #[error("state for '{key}' is not a valid counter: {content:?}")]
    Corrupt { key: String, content: String },
}

/// Guard returned by [`StateStore::lock`]. Whatever it holds is released on drop,
/// on every exit path.
#[must_use = "the lock is released as soon as the guard is dropped"]
pub struct StateLock {
    guard: Option<Box<dyn Send>>,
}

impl StateLock {
    /// A guard that holds nothing, for stores without locking.
    pub const fn none() -> Self {
        Self { guard: None }
    }

    pub fn holding(guard: impl Send + 'static) -> Self {
        Self {
            guard: Some(Box::new(guard)),
        }
    }

    #[must_use]
    pub const fn is_held(&self) -> bool {
        self.guard.is_some()
    }
}

impl std::fmt::Debug for StateLock {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StateLock")
            .field("held", &self.is_held())
            .finish()
    }
}

/// Key-value persistence for check baselines.
pub trait StateStore: Send + Sync {
    /// Read the baseline stored under `key`.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::Corrupt` if a value exists but is not an unsigned
    /// integer, or `StoreError::ReadFailed` if the backing store cannot be read.
    fn load(&self, key: &StateKey) -> Result<Option<u64>, StoreError>;

    /// Overwrite the baseline stored under `key`.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::WriteFailed` if the value cannot be persisted.
    fn store(&self, key: &StateKey, value: u64) -> Result<(), StoreError>;

    /// Take an exclusive lock around a read-modify-write of `key`.
    ///
    /// # Errors
    ///
    /// Returns `StoreError` if the lock cannot be set up at all. Contention
    /// past the store's wait budget is not an error; implementations return
    /// [`StateLock::none`] instead.
    fn lock(&self, _key: &StateKey) -> Result<StateLock, StoreError> {
        Ok(StateLock::none())
    }
}

/// Longest prefix of corrupt content quoted back in [`StoreError::Corrupt`].
pub const CORRUPT_EXCERPT_CHARS: usize = 32;

/// Parse persisted text into a counter, distinguishing corrupt content.
///
/// # Errors
///
/// Returns `StoreError::Corrupt` if `content` is not a decimal `u64`. The
/// error carries at most [`CORRUPT_EXCERPT_CHARS`] characters of it.
pub fn parse_stored_value(key: &StateKey, content: &str) -> Result<u64, StoreError> {
    content.trim().parse().map_err(|_| StoreError::Corrupt {
        key: key.to_string(),
        content: excerpt(content),
    })
}

fn excerpt(content: &str) -> String {
    let mut chars = content.chars();
    let mut head: String = chars.by_ref().take(CORRUPT_EXCERPT_CHARS).collect();
    if chars.next().is_some() {
        head.push_str("...");
    }
    head
}
