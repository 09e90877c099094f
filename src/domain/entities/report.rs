use serde::{Deserialize, Serialize};

use super::check_result::CheckResult;
use crate::domain::value_objects::severity::Severity;

/// Several check results folded into one status.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CheckReport {
    pub severity: Severity,
    pub summary: String,
    /// Worst first; ties keep evaluation order.
    pub results: Vec<CheckResult>,
}

impl CheckReport {
    /// The worst severity wins and its message leads the summary. The other
    /// messages are appended for context only.
    #[must_use]
    pub fn from_results(mut results: Vec<CheckResult>) -> Self {
        if results.is_empty() {
            return Self {
                severity: Severity::Unknown,
                summary: "no checks configured".to_string(),
                results,
            };
        }

        results.sort_by(|a, b| b.severity.rank().cmp(&a.severity.rank()));
        let severity = results
            .iter()
            .fold(Severity::Ok, |acc, r| acc.worst(r.severity));
        let summary = results
            .iter()
            .map(CheckResult::line)
            .collect::<Vec<_>>()
            .join("; ");

        Self {
            severity,
            summary,
            results,
        }
    }

    #[must_use]
    pub fn single(result: CheckResult) -> Self {
        Self::from_results(vec![result])
    }

    #[must_use]
    pub const fn exit_code(&self) -> i32 {
        self.severity.exit_code()
    }
}
