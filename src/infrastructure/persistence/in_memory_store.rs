use std::collections::HashMap;
use std::sync::Mutex;
use std::sync::atomic::{AtomicBool, Ordering};

use crate::domain::ports::store::{StateStore, StoreError, parse_stored_value};
use crate::domain::value_objects::state_key::StateKey;

/// In-memory store for testing purposes.
///
/// Values are kept as text, like the on-disk backends, so corrupt content
/// can be injected with [`InMemoryStore::insert_raw`].
pub struct InMemoryStore {
    values: Mutex<HashMap<String, String>>,
    fail_writes: AtomicBool,
}

impl InMemoryStore {
    #[must_use]
    pub fn new() -> Self {
        Self {
            values: Mutex::new(HashMap::new()),
            fail_writes: AtomicBool::new(false),
        }
    }

    /// Store arbitrary text under `key`, bypassing validation.
    pub fn insert_raw(&self, key: &StateKey, content: &str) {
        if let Ok(mut values) = self.values.lock() {
            values.insert(key.as_str().to_string(), content.to_string());
        }
    }

    /// Make every subsequent `store` call fail.
    pub fn fail_writes(&self, fail: bool) {
        self.fail_writes.store(fail, Ordering::SeqCst);
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.values.lock().map_or(true, |values| values.is_empty())
    }
}

impl Default for InMemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

impl StateStore for InMemoryStore {
    fn load(&self, key: &StateKey) -> Result<Option<u64>, StoreError> {
        let values = self
            .values
            .lock()
            .map_err(|_| StoreError::ReadFailed("lock poisoned".into()))?;
        values
            .get(key.as_str())
            .map(|content| parse_stored_value(key, content))
            .transpose()
    }

    fn store(&self, key: &StateKey, value: u64) -> Result<(), StoreError> {
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(StoreError::WriteFailed("simulated write failure".into()));
        }
        self.values
            .lock()
            .map_err(|_| StoreError::WriteFailed("lock poisoned".into()))?
            .insert(key.as_str().to_string(), value.to_string());
        Ok(())
    }
}
