use std::path::Path;

use anyhow::bail;

use crate::application::config::AppConfig;

/// Show the effective configuration, or write a default one with `init`.
///
/// # Errors
///
/// Returns an error if the file exists and `force` is not set, or if
/// serialization or writing fails.
pub fn run_config(config: &AppConfig, path: &Path, init: bool, force: bool) -> anyhow::Result<String> {
    if !init {
        return config.to_toml();
    }
    if path.exists() && !force {
        bail!(
            "{} already exists, use --force to overwrite it",
            path.display()
        );
    }
    AppConfig::default().save_to(path)?;
    tracing::info!(path = %path.display(), "wrote default configuration");
    Ok(format!("Wrote default configuration to {}", path.display()))
}
