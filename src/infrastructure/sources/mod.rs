pub mod counter_file;
pub mod marker;
pub mod timestamp_file;

use anyhow::{Result, bail};

use crate::application::config::SourceConfig;
use crate::domain::ports::source::{CounterSource, TimestampSource};

pub use counter_file::{IntegerFileSource, KeyedCounterSource};
pub use marker::MarkerFile;
pub use timestamp_file::{EpochFileSource, MtimeSource};

/// Factory: build a counter source from configuration.
///
/// # Errors
///
/// Returns an error if `config` describes a timestamp source.
pub fn create_counter_source(config: &SourceConfig) -> Result<Box<dyn CounterSource>> {
    match config {
        SourceConfig::CounterFile { path } => Ok(Box::new(IntegerFileSource::new(path))),
        SourceConfig::KeyedCounter { path, field } => {
            Ok(Box::new(KeyedCounterSource::new(path, field)))
        }
        SourceConfig::EpochFile { .. } | SourceConfig::Mtime { .. } => {
            bail!("'{}' is a timestamp source, not a counter", config.path())
        }
    }
}

/// Factory: build a timestamp source from configuration.
///
/// # Errors
///
/// Returns an error if `config` describes a counter source.
pub fn create_timestamp_source(config: &SourceConfig) -> Result<Box<dyn TimestampSource>> {
    match config {
        SourceConfig::EpochFile { path } => Ok(Box::new(EpochFileSource::new(path))),
        SourceConfig::Mtime { path } => Ok(Box::new(MtimeSource::new(path))),
        SourceConfig::CounterFile { .. } | SourceConfig::KeyedCounter { .. } => {
            bail!("'{}' is a counter source, not a timestamp", config.path())
        }
    }
}
