use chrono::{DateTime, Utc};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum SourceError {
    #[error("source unavailable: {0}")]
    Unavailable(String),
    #[error("source content malformed: {0}")]
    Malformed(String),
}

/// Produces the current value of a monotonic counter (swap-outs, bytes, ...).
pub trait CounterSource: Send + Sync {
    /// Human-readable origin, used in messages.
    fn describe(&self) -> String;

    /// Sample the counter.
    ///
    /// # Errors
    ///
    /// Returns `SourceError` if the counter cannot be read or parsed.
    fn read(&self) -> Result<u64, SourceError>;
}

/// Produces the time some external actor last reported progress.
pub trait TimestampSource: Send + Sync {
    fn describe(&self) -> String;

    /// # Errors
    ///
    /// Returns `SourceError::Unavailable` if the timestamp cannot be read and
    /// `SourceError::Malformed` if it is not a valid time value.
    fn last_update(&self) -> Result<DateTime<Utc>, SourceError>;
}

/// An explicit operator override that disables an age check.
pub trait DisableMarker: Send + Sync {
    fn describe(&self) -> String;

    fn is_disabled(&self) -> bool;
}
