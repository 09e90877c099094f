use chrono::{DateTime, Utc};

use crate::domain::value_objects::severity::Severity;
use crate::domain::value_objects::thresholds::Thresholds;

/// Whole seconds between `last_update` and `now`. Negative when the
/// timestamp lies in the future.
#[must_use]
pub fn age_seconds(last_update: DateTime<Utc>, now: DateTime<Utc>) -> i64 {
    (now - last_update).num_seconds()
}

/// A future timestamp is never escalated; it is OK and flagged elsewhere.
#[must_use]
pub fn classify_age(age: i64, thresholds: &Thresholds) -> Severity {
    u64::try_from(age).map_or(Severity::Ok, |age| thresholds.classify(age))
}

#[must_use]
pub fn describe_age(age: i64, severity: Severity, thresholds: &Thresholds) -> String {
    if age < 0 {
        return format!(
            "last update lies {} seconds in the future, clock skew suspected",
            age.unsigned_abs()
        );
    }
    match thresholds.limit_for(severity) {
        Some(limit) => format!(
            "last update {age} seconds ago (above {} threshold {limit})",
            severity.label().to_lowercase()
        ),
        None => format!("last update {age} seconds ago"),
    }
}
