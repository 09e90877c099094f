use std::io::ErrorKind;
use std::path::PathBuf;

use chrono::{DateTime, TimeZone, Utc};

use crate::domain::ports::source::{SourceError, TimestampSource};

/// A file holding the Unix time (whole seconds) of the last successful run,
/// as written by e.g. a config-management agent.
pub struct EpochFileSource {
    path: PathBuf,
}

impl EpochFileSource {
    #[must_use]
    pub fn new(path: &str) -> Self {
        Self {
            path: PathBuf::from(shellexpand::tilde(path).as_ref()),
        }
    }
}

impl TimestampSource for EpochFileSource {
    fn describe(&self) -> String {
        format!("statefile {}", self.path.display())
    }

    fn last_update(&self) -> Result<DateTime<Utc>, SourceError> {
        let content = std::fs::read_to_string(&self.path).map_err(|e| match e.kind() {
            ErrorKind::InvalidData => SourceError::Malformed("not valid text".into()),
            _ => SourceError::Unavailable(format!("cannot read: {e}")),
        })?;
        let trimmed = content.trim();
        let secs: i64 = trimmed
            .parse()
            .map_err(|_| SourceError::Malformed(format!("{trimmed:?} is not a Unix timestamp")))?;
        Utc.timestamp_opt(secs, 0)
            .single()
            .ok_or_else(|| SourceError::Malformed(format!("{secs} is out of range")))
    }
}

/// The modification time of a file.
pub struct MtimeSource {
    path: PathBuf,
}

impl MtimeSource {
    #[must_use]
    pub fn new(path: &str) -> Self {
        Self {
            path: PathBuf::from(shellexpand::tilde(path).as_ref()),
        }
    }
}

impl TimestampSource for MtimeSource {
    fn describe(&self) -> String {
        self.path.display().to_string()
    }

    fn last_update(&self) -> Result<DateTime<Utc>, SourceError> {
        let modified = std::fs::metadata(&self.path)
            .and_then(|meta| meta.modified())
            .map_err(|e| SourceError::Unavailable(format!("cannot stat: {e}")))?;
        Ok(DateTime::<Utc>::from(modified))
    }
}
