use std::path::{Path, PathBuf};

use crate::domain::ports::source::{CounterSource, SourceError};

fn read_text(path: &Path) -> Result<String, SourceError> {
    std::fs::read_to_string(path)
        .map_err(|e| SourceError::Unavailable(format!("{}: {e}", path.display())))
}

fn parse_counter(path: &Path, raw: &str) -> Result<u64, SourceError> {
    raw.trim().parse().map_err(|_| {
        SourceError::Malformed(format!("{}: {:?} is not a counter", path.display(), raw.trim()))
    })
}

/// A file whose whole content is one unsigned integer.
pub struct IntegerFileSource {
    path: PathBuf,
}

impl IntegerFileSource {
    #[must_use]
    pub fn new(path: &str) -> Self {
        Self {
            path: PathBuf::from(shellexpand::tilde(path).as_ref()),
        }
    }
}

impl CounterSource for IntegerFileSource {
    fn describe(&self) -> String {
        self.path.display().to_string()
    }

    fn read(&self) -> Result<u64, SourceError> {
        let content = read_text(&self.path)?;
        parse_counter(&self.path, &content)
    }
}

/// One field of a `name value` per-line file, such as `pswpout` in `/proc/vmstat`.
pub struct KeyedCounterSource {
    path: PathBuf,
    field: String,
}

impl KeyedCounterSource {
    #[must_use]
    pub fn new(path: &str, field: &str) -> Self {
        Self {
            path: PathBuf::from(shellexpand::tilde(path).as_ref()),
            field: field.to_string(),
        }
    }

    /// Swap pages written out, the counter behind swap-activity checks.
    #[must_use]
    pub fn vmstat_pswpout() -> Self {
        Self::new("/proc/vmstat", "pswpout")
    }
}

impl CounterSource for KeyedCounterSource {
    fn describe(&self) -> String {
        format!("{} [{}]", self.path.display(), self.field)
    }

    fn read(&self) -> Result<u64, SourceError> {
        let content = read_text(&self.path)?;
        let value = content
            .lines()
            .filter_map(|line| {
                let mut parts = line.split_whitespace();
                (parts.next() == Some(self.field.as_str())).then(|| parts.next())
            })
            .next()
            .ok_or_else(|| {
                SourceError::Unavailable(format!(
                    "{}: no field '{}'",
                    self.path.display(),
                    self.field
                ))
            })?
            .ok_or_else(|| {
                SourceError::Malformed(format!(
                    "{}: field '{}' has no value",
                    self.path.display(),
                    self.field
                ))
            })?;
        parse_counter(&self.path, value)
    }
}
