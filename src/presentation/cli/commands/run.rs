use anyhow::{Context, bail};
use chrono::{DateTime, Utc};

use crate::application::config::{AppConfig, CheckDefinition, CheckKind};
use crate::application::services::ThresholdEngine;
use crate::domain::entities::check_result::CheckResult;
use crate::domain::entities::report::CheckReport;
use crate::domain::ports::source::DisableMarker;
use crate::domain::ports::store::{StateStore, StoreError};
use crate::infrastructure::sources::{MarkerFile, create_counter_source, create_timestamp_source};

type OpenedStore = Result<Box<dyn StateStore>, StoreError>;

/// Evaluate configured checks and fold them into one worst-wins report.
///
/// `open_store` is called once, and only when a delta check is selected. If
/// it fails, each delta check reports `StateWriteFailed` and age checks are
/// still evaluated.
///
/// # Errors
///
/// Returns an error if a requested check is not configured or a definition
/// cannot be turned into a source.
pub fn run_checks(
    config: &AppConfig,
    open_store: impl FnOnce() -> OpenedStore,
    names: &[String],
    now: DateTime<Utc>,
) -> anyhow::Result<CheckReport> {
    let selected = config.select_checks(names)?;
    let store = selected
        .iter()
        .any(|check| check.kind == CheckKind::Delta)
        .then(open_store);

    let results = selected
        .into_iter()
        .map(|check| {
            evaluate(store.as_ref(), check, now).with_context(|| format!("Check '{}'", check.name))
        })
        .collect::<anyhow::Result<Vec<_>>>()?;

    let report = CheckReport::from_results(results);
    tracing::debug!(
        checks = report.results.len(),
        severity = %report.severity,
        "checks evaluated"
    );
    Ok(report)
}

fn evaluate(
    store: Option<&OpenedStore>,
    check: &CheckDefinition,
    now: DateTime<Utc>,
) -> anyhow::Result<CheckResult> {
    let thresholds = check.thresholds();
    match check.kind {
        CheckKind::Delta => {
            let key = check.state_key()?;
            let source = create_counter_source(&check.source)?;
            match store {
                Some(Ok(store)) => Ok(ThresholdEngine::new(store.as_ref()).run_delta(
                    &check.name,
                    &key,
                    source.as_ref(),
                    &thresholds,
                )),
                Some(Err(e)) => Ok(ThresholdEngine::store_unavailable(&check.name, e)),
                None => bail!("state store was never opened"),
            }
        }
        CheckKind::Age => {
            let source = create_timestamp_source(&check.source)?;
            let marker = check.disable_marker.as_deref().map(MarkerFile::new);
            Ok(ThresholdEngine::evaluate_age(
                &check.name,
                source.as_ref(),
                marker.as_ref().map(|m| m as &dyn DisableMarker),
                now,
                &thresholds,
            ))
        }
    }
}
