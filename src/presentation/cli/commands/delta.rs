use anyhow::{Context, bail};

use crate::application::config::SourceConfig;
use crate::application::services::ThresholdEngine;
use crate::domain::entities::report::CheckReport;
use crate::domain::ports::store::StateStore;
use crate::domain::value_objects::state_key::StateKey;
use crate::domain::value_objects::thresholds::Thresholds;
use crate::infrastructure::sources::create_counter_source;

/// Turn the mutually exclusive `--counter-file` / `--keyed-file --field`
/// options into a source definition.
///
/// # Errors
///
/// Returns an error if neither or both source forms are given.
pub fn counter_source_from_args(
    counter_file: Option<String>,
    keyed_file: Option<String>,
    field: Option<String>,
) -> anyhow::Result<SourceConfig> {
    match (counter_file, keyed_file, field) {
        (Some(path), None, None) => Ok(SourceConfig::CounterFile { path }),
        (None, Some(path), Some(field)) => Ok(SourceConfig::KeyedCounter { path, field }),
        _ => bail!("Give either --counter-file or --keyed-file with --field"),
    }
}

/// One delta check against `store`. Evaluation failures are part of the
/// report; only invalid input is an error.
///
/// # Errors
///
/// Returns an error if the key is empty or the source is not a counter.
pub fn run_delta(
    store: &dyn StateStore,
    name: Option<&str>,
    key: &str,
    source: &SourceConfig,
    thresholds: Thresholds,
) -> anyhow::Result<CheckReport> {
    let key = StateKey::new(key).context("Invalid --key")?;
    let source = create_counter_source(source)?;
    let name = name.unwrap_or(key.as_str());

    let engine = ThresholdEngine::new(store);
    let result = engine.run_delta(name, &key, source.as_ref(), &thresholds);
    Ok(CheckReport::single(result))
}
