use serde::{Deserialize, Serialize};

use super::severity::Severity;

/// Warning and critical limits for one measured quantity.
///
/// Either level may be absent, in which case it never fires. Some checks only
/// ever raise one non-OK level, so no level is implied by the other.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Thresholds {
    #[serde(default)]
    pub warning: Option<u64>,
    #[serde(default)]
    pub critical: Option<u64>,
}

impl Thresholds {
    #[must_use]
    pub const fn new(warning: Option<u64>, critical: Option<u64>) -> Self {
        Self { warning, critical }
    }

    #[must_use]
    pub const fn warning_only(limit: u64) -> Self {
        Self::new(Some(limit), None)
    }

    #[must_use]
    pub const fn critical_only(limit: u64) -> Self {
        Self::new(None, Some(limit))
    }

    /// Classify a value. Limits are exclusive and CRITICAL is checked first,
    /// so inverted limits still produce a deterministic answer.
    #[must_use]
    pub fn classify(&self, value: u64) -> Severity {
        if self.critical.is_some_and(|limit| value > limit) {
            Severity::Critical
        } else if self.warning.is_some_and(|limit| value > limit) {
            Severity::Warning
        } else {
            Severity::Ok
        }
    }

    /// The limit that `severity` was raised against, if any.
    #[must_use]
    pub const fn limit_for(&self, severity: Severity) -> Option<u64> {
        match severity {
            Severity::Warning => self.warning,
            Severity::Critical => self.critical,
            Severity::Ok | Severity::Unknown => None,
        }
    }

    #[must_use]
    pub fn is_inverted(&self) -> bool {
        matches!((self.warning, self.critical), (Some(w), Some(c)) if w > c)
    }
}
