use anyhow::bail;
use chrono::{DateTime, Utc};

use crate::application::config::SourceConfig;
use crate::application::services::ThresholdEngine;
use crate::domain::entities::report::CheckReport;
use crate::domain::ports::source::DisableMarker;
use crate::domain::value_objects::thresholds::Thresholds;
use crate::infrastructure::sources::{MarkerFile, create_timestamp_source};

/// Turn the mutually exclusive `--epoch-file` / `--mtime` options into a
/// source definition.
///
/// # Errors
///
/// Returns an error if neither or both are given.
pub fn timestamp_source_from_args(
    epoch_file: Option<String>,
    mtime: Option<String>,
) -> anyhow::Result<SourceConfig> {
    match (epoch_file, mtime) {
        (Some(path), None) => Ok(SourceConfig::EpochFile { path }),
        (None, Some(path)) => Ok(SourceConfig::Mtime { path }),
        _ => bail!("Give either --epoch-file or --mtime"),
    }
}

/// One age check. Never touches the state store. Without a `name` the
/// result is named after the source path.
///
/// # Errors
///
/// Returns an error if the source is not a timestamp source.
pub fn run_age(
    name: Option<&str>,
    source: &SourceConfig,
    disable_marker: Option<&str>,
    thresholds: Thresholds,
    now: DateTime<Utc>,
) -> anyhow::Result<CheckReport> {
    let name = name.unwrap_or(source.path());
    let source = create_timestamp_source(source)?;
    let marker = disable_marker.map(MarkerFile::new);

    let result = ThresholdEngine::evaluate_age(
        name,
        source.as_ref(),
        marker.as_ref().map(|m| m as &dyn DisableMarker),
        now,
        &thresholds,
    );
    Ok(CheckReport::single(result))
}
