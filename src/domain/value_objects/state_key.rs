use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("state key must not be empty")]
pub struct InvalidStateKey;

/// Identifies which persisted baseline a check reads and writes.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct StateKey(String);

impl StateKey {
    /// # Errors
    ///
    /// Returns `InvalidStateKey` if the key is empty after trimming.
    pub fn new(raw: impl AsRef<str>) -> Result<Self, InvalidStateKey> {
        let trimmed = raw.as_ref().trim();
        if trimmed.is_empty() {
            return Err(InvalidStateKey);
        }
        Ok(Self(trimmed.to_string()))
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// File-safe rendering of the key, distinct for distinct keys.
    ///
    /// `[A-Za-z0-9._-]` pass through; every other byte, and a leading `.`,
    /// is written as `%XX`. The result never starts with `.` and never
    /// contains a path separator.
    #[must_use]
    pub fn file_name(&self) -> String {
        let mut name = String::with_capacity(self.0.len());
        for (i, byte) in self.0.bytes().enumerate() {
            let passthrough = byte.is_ascii_alphanumeric()
                || matches!(byte, b'_' | b'-')
                || (byte == b'.' && i > 0);
            if passthrough {
                name.push(char::from(byte));
            } else {
                name.push_str(&format!("%{byte:02X}"));
            }
        }
        name
    }
}

impl std::fmt::Display for StateKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl TryFrom<String> for StateKey {
    type Error = InvalidStateKey;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<StateKey> for String {
    fn from(key: StateKey) -> Self {
        key.0
    }
}
