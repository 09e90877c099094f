use serde::{Deserialize, Serialize};

use crate::domain::value_objects::severity::Severity;
use crate::domain::value_objects::thresholds::Thresholds;

/// The quantity that drove a classification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "lowercase")]
pub enum Measurement {
    /// Counter increase since the previous invocation.
    Delta(u64),
    /// Seconds since the last update. Negative when the timestamp lies in the future.
    Age(i64),
}

impl Measurement {
    #[must_use]
    pub const fn label(&self) -> &'static str {
        match self {
            Self::Delta(_) => "delta",
            Self::Age(_) => "age",
        }
    }

    #[must_use]
    pub const fn unit(&self) -> &'static str {
        match self {
            Self::Delta(_) => "c",
            Self::Age(_) => "s",
        }
    }

    #[must_use]
    pub fn value_string(&self) -> String {
        match self {
            Self::Delta(v) => v.to_string(),
            Self::Age(v) => v.to_string(),
        }
    }
}

/// Operational failure that prevented a normal classification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FailureKind {
    SourceUnavailable,
    CorruptState,
    StateWriteFailed,
}

impl std::fmt::Display for FailureKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::SourceUnavailable => write!(f, "SourceUnavailable"),
            Self::CorruptState => write!(f, "CorruptState"),
            Self::StateWriteFailed => write!(f, "StateWriteFailed"),
        }
    }
}

/// Outcome of one evaluated check.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CheckResult {
    pub name: String,
    pub severity: Severity,
    pub message: String,
    /// Absent when evaluation did not get far enough to measure anything.
    pub measurement: Option<Measurement>,
    #[serde(default)]
    pub thresholds: Thresholds,
    /// Set only for UNKNOWN results.
    pub failure: Option<FailureKind>,
}

impl CheckResult {
    #[must_use]
    pub fn evaluated(
        name: impl Into<String>,
        severity: Severity,
        message: impl Into<String>,
        measurement: Measurement,
        thresholds: Thresholds,
    ) -> Self {
        Self {
            name: name.into(),
            severity,
            message: message.into(),
            measurement: Some(measurement),
            thresholds,
            failure: None,
        }
    }

    /// An UNKNOWN result. The message is prefixed with the failure kind so the
    /// single status line always names what went wrong.
    #[must_use]
    pub fn failed(name: impl Into<String>, failure: FailureKind, detail: &str) -> Self {
        Self {
            name: name.into(),
            severity: Severity::Unknown,
            message: format!("{failure}: {detail}"),
            measurement: None,
            thresholds: Thresholds::default(),
            failure: Some(failure),
        }
    }

    /// OK because an operator override switched the check off, not because a
    /// threshold was met.
    #[must_use]
    pub fn disabled(name: impl Into<String>, reason: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            severity: Severity::Ok,
            message: reason.into(),
            measurement: None,
            thresholds: Thresholds::default(),
            failure: None,
        }
    }

    #[must_use]
    pub fn with_measurement(mut self, measurement: Measurement) -> Self {
        self.measurement = Some(measurement);
        self
    }

    #[must_use]
    pub fn is_clock_skewed(&self) -> bool {
        matches!(self.measurement, Some(Measurement::Age(age)) if age < 0)
    }

    /// Message prefixed with the check name, as shown on the status line.
    #[must_use]
    pub fn line(&self) -> String {
        if self.name.is_empty() {
            self.message.clone()
        } else {
            format!("{}: {}", self.name, self.message)
        }
    }
}
