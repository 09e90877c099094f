use chrono::{DateTime, Utc};

use crate::domain::entities::check_result::{CheckResult, FailureKind, Measurement};
use crate::domain::ports::source::{CounterSource, DisableMarker, SourceError, TimestampSource};
use crate::domain::ports::store::{StateLock, StateStore, StoreError};
use crate::domain::rules::{DeltaReading, age_seconds, classify_age, describe_age};
use crate::domain::value_objects::state_key::StateKey;
use crate::domain::value_objects::thresholds::Thresholds;

/// Evaluates delta and age checks against thresholds, owning the
/// read-modify-write of delta baselines.
///
/// Every path returns a classified [`CheckResult`]; expected failures become
/// UNKNOWN results, never errors.
pub struct ThresholdEngine<'a> {
    store: &'a dyn StateStore,
}

impl<'a> ThresholdEngine<'a> {
    #[must_use]
    pub const fn new(store: &'a dyn StateStore) -> Self {
        Self { store }
    }

    /// Sample `source` and evaluate the change since the previous invocation.
    #[must_use]
    pub fn run_delta(
        &self,
        name: &str,
        key: &StateKey,
        source: &dyn CounterSource,
        thresholds: &Thresholds,
    ) -> CheckResult {
        match source.read() {
            Ok(current) => self.evaluate_delta(name, key, current, thresholds),
            Err(e) => {
                tracing::warn!(check = name, source = %source.describe(), "counter unreadable: {e}");
                CheckResult::failed(
                    name,
                    FailureKind::SourceUnavailable,
                    &format!("{}: {e}", source.describe()),
                )
            }
        }
    }

    /// Classify `current - baseline` and advance the baseline to `current`.
    ///
    /// The baseline is overwritten on every successful evaluation, whatever
    /// the severity, so the next run measures the change since this one.
    #[must_use]
    pub fn evaluate_delta(
        &self,
        name: &str,
        key: &StateKey,
        current: u64,
        thresholds: &Thresholds,
    ) -> CheckResult {
        if thresholds.is_inverted() {
            tracing::warn!(check = name, ?thresholds, "warning threshold above critical");
        }

        let _lock = self.acquire(key);

        let previous = match self.store.load(key) {
            Ok(previous) => previous,
            Err(e) => return self.rebaseline(name, key, current, &e),
        };

        let reading = DeltaReading::compute(previous, current);
        let severity = reading.classify(thresholds);
        if reading.is_reset() {
            tracing::info!(
                check = name,
                key = %key,
                previous = ?reading.previous,
                current,
                "counter went backwards, treating as reset"
            );
        }

        if let Err(e) = self.store.store(key, current) {
            tracing::error!(check = name, key = %key, "failed to persist baseline: {e}");
            return CheckResult::failed(
                name,
                FailureKind::StateWriteFailed,
                &format!(
                    "could not persist baseline for '{key}' ({e}); measured {} would be {severity}",
                    reading.delta
                ),
            )
            .with_measurement(Measurement::Delta(reading.delta));
        }

        tracing::debug!(
            check = name,
            key = %key,
            previous = ?reading.previous,
            current,
            delta = reading.delta,
            %severity,
            "delta evaluated"
        );

        CheckResult::evaluated(
            name,
            severity,
            reading.describe(severity, thresholds),
            Measurement::Delta(reading.delta),
            *thresholds,
        )
    }

    /// The result for a delta check whose state store could not even be
    /// opened. Nothing was evaluated and no baseline can be kept.
    #[must_use]
    pub fn store_unavailable(name: &str, cause: &StoreError) -> CheckResult {
        tracing::error!(check = name, "state store unavailable: {cause}");
        CheckResult::failed(
            name,
            FailureKind::StateWriteFailed,
            &format!("state store unavailable: {cause}"),
        )
    }

    /// Classify the time elapsed since `source` last reported an update.
    ///
    /// Read-only: the timestamp belongs to whoever produces it, so no store is
    /// involved.
    #[must_use]
    pub fn evaluate_age(
        name: &str,
        source: &dyn TimestampSource,
        marker: Option<&dyn DisableMarker>,
        now: DateTime<Utc>,
        thresholds: &Thresholds,
    ) -> CheckResult {
        if let Some(marker) = marker.filter(|m| m.is_disabled()) {
            tracing::info!(check = name, marker = %marker.describe(), "check disabled by marker");
            return CheckResult::disabled(
                name,
                format!("check skipped, disabled by {}", marker.describe()),
            );
        }

        let last_update = match source.last_update() {
            Ok(ts) => ts,
            Err(SourceError::Malformed(detail)) => {
                tracing::warn!(check = name, source = %source.describe(), "timestamp malformed");
                return CheckResult::failed(
                    name,
                    FailureKind::CorruptState,
                    &format!("{} holds no valid timestamp: {detail}", source.describe()),
                );
            }
            Err(e @ SourceError::Unavailable(_)) => {
                tracing::warn!(check = name, source = %source.describe(), "timestamp unreadable");
                return CheckResult::failed(
                    name,
                    FailureKind::SourceUnavailable,
                    &format!("{}: {e}", source.describe()),
                );
            }
        };

        let age = age_seconds(last_update, now);
        let severity = classify_age(age, thresholds);
        if age < 0 {
            tracing::warn!(
                check = name,
                %last_update,
                %now,
                "last update lies in the future, clock skew suspected"
            );
        }
        tracing::debug!(check = name, age, %severity, "age evaluated");

        CheckResult::evaluated(
            name,
            severity,
            describe_age(age, severity, thresholds),
            Measurement::Age(age),
            *thresholds,
        )
    }

    fn acquire(&self, key: &StateKey) -> StateLock {
        self.store.lock(key).unwrap_or_else(|e| {
            tracing::warn!(key = %key, "continuing without state lock: {e}");
            StateLock::none()
        })
    }

    /// The stored baseline cannot be used. Reset it to the current observation
    /// so the next run starts clean, and report this run as UNKNOWN.
    ///
    /// If the reset cannot be written either, the state location itself is
    /// unusable and the result is `StateWriteFailed`.
    fn rebaseline(&self, name: &str, key: &StateKey, current: u64, cause: &StoreError) -> CheckResult {
        tracing::warn!(check = name, key = %key, "discarding unusable baseline: {cause}");
        match self.store.store(key, current) {
            Ok(()) => CheckResult::failed(
                name,
                FailureKind::CorruptState,
                &format!("{cause}; baseline reset to {current}"),
            ),
            Err(e) => {
                tracing::error!(check = name, key = %key, "failed to reset baseline: {e}");
                CheckResult::failed(
                    name,
                    FailureKind::StateWriteFailed,
                    &format!("could not persist baseline for '{key}' ({e}); previous read failed: {cause}"),
                )
            }
        }
    }
}
