use std::collections::{HashMap, HashSet};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};
use serde::{Deserialize, Serialize};

use crate::domain::value_objects::state_key::StateKey;
use crate::domain::value_objects::thresholds::Thresholds;

/// Top-level application configuration loaded from TOML.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub general: GeneralConfig,
    #[serde(default)]
    pub state: StateConfig,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub checks: Vec<CheckDefinition>,
}

/// General settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeneralConfig {
    /// Log filter used when `--verbose` is not given and `RUST_LOG` is unset.
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StateBackend {
    #[default]
    File,
    Sqlite,
}

impl std::str::FromStr for StateBackend {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "file" => Ok(Self::File),
            "sqlite" => Ok(Self::Sqlite),
            other => bail!("Unknown state backend '{other}'. Valid backends: file, sqlite"),
        }
    }
}

/// Where baselines are persisted. Paths are tilde-expanded at point of use.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StateConfig {
    #[serde(default)]
    pub backend: StateBackend,
    #[serde(default = "default_state_dir")]
    pub dir: String,
    #[serde(default = "default_database_path")]
    pub database: String,
    #[serde(default = "default_true")]
    pub lock: bool,
    #[serde(default = "default_lock_timeout_ms")]
    pub lock_timeout_ms: u64,
    /// SQLite only: baselines untouched for longer than this are pruned.
    #[serde(default = "default_retention_hours")]
    pub retention_hours: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CheckKind {
    Delta,
    Age,
}

/// Where a check's observation comes from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "kebab-case")]
pub enum SourceConfig {
    /// A file holding a single integer counter.
    CounterFile { path: String },
    /// `name value` lines, e.g. `/proc/vmstat`.
    KeyedCounter { path: String, field: String },
    /// A file holding a Unix timestamp.
    EpochFile { path: String },
    /// The modification time of a file.
    Mtime { path: String },
}

impl SourceConfig {
    #[must_use]
    pub const fn is_counter(&self) -> bool {
        matches!(self, Self::CounterFile { .. } | Self::KeyedCounter { .. })
    }

    #[must_use]
    pub fn path(&self) -> &str {
        match self {
            Self::CounterFile { path }
            | Self::KeyedCounter { path, .. }
            | Self::EpochFile { path }
            | Self::Mtime { path } => path,
        }
    }
}

/// One named check in the `[[checks]]` array.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CheckDefinition {
    pub name: String,
    pub kind: CheckKind,
    pub source: SourceConfig,
    /// Delta checks only. Defaults to the check name.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub state_key: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub warning: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub critical: Option<u64>,
    /// Age checks only. The check reports OK while this path exists.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub disable_marker: Option<String>,
}

impl CheckDefinition {
    #[must_use]
    pub const fn thresholds(&self) -> Thresholds {
        Thresholds::new(self.warning, self.critical)
    }

    /// # Errors
    ///
    /// Returns an error if the resulting key is empty.
    pub fn state_key(&self) -> Result<StateKey> {
        let raw = self.state_key.as_deref().unwrap_or(&self.name);
        StateKey::new(raw).with_context(|| format!("Invalid state key for check '{}'", self.name))
    }

    /// # Errors
    ///
    /// Returns an error if the source type does not fit the check kind or an
    /// option is used with the wrong kind.
    pub fn validate(&self) -> Result<()> {
        if self.name.trim().is_empty() {
            bail!("Check names must not be empty");
        }
        match self.kind {
            CheckKind::Delta => {
                if !self.source.is_counter() {
                    bail!("Check '{}': delta checks need a counter source", self.name);
                }
                if self.disable_marker.is_some() {
                    bail!("Check '{}': disable_marker only applies to age checks", self.name);
                }
                self.state_key()?;
            }
            CheckKind::Age => {
                if self.source.is_counter() {
                    bail!("Check '{}': age checks need a timestamp source", self.name);
                }
                if self.state_key.is_some() {
                    bail!("Check '{}': age checks do not persist state", self.name);
                }
            }
        }
        Ok(())
    }
}

// --- Defaults ---

fn default_log_level() -> String {
    "warn".into()
}

// Raw strings with tilde, expanded with shellexpand at point of use.
fn default_state_dir() -> String {
    "~/.local/state/watchpost".into()
}

fn default_database_path() -> String {
    "~/.local/state/watchpost/state.db".into()
}

const fn default_true() -> bool {
    true
}

const fn default_lock_timeout_ms() -> u64 {
    2000
}

const fn default_retention_hours() -> u64 {
    24 * 30
}

// --- Default impls ---

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
        }
    }
}

impl Default for StateConfig {
    fn default() -> Self {
        Self {
            backend: StateBackend::default(),
            dir: default_state_dir(),
            database: default_database_path(),
            lock: default_true(),
            lock_timeout_ms: default_lock_timeout_ms(),
            retention_hours: default_retention_hours(),
        }
    }
}

// --- AppConfig methods ---

impl AppConfig {
    /// Load config from the default path, falling back to defaults when the
    /// file does not exist. Plugins never create files in the poller's home.
    ///
    /// # Errors
    ///
    /// Returns an error if the config directory cannot be determined,
    /// the file cannot be read, or its content is invalid.
    pub fn load() -> Result<Self> {
        let path = Self::config_path()?;
        if path.exists() {
            Self::load_from(&path)
        } else {
            tracing::debug!(path = %path.display(), "no config file, using defaults");
            Ok(Self::default())
        }
    }

    /// Load from a specific path and validate it.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read, the TOML content is
    /// invalid, or a check definition is inconsistent.
    pub fn load_from(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {}", path.display()))?;
        let config: Self = toml::from_str(&content).context("Failed to parse config file")?;
        config.validate()?;
        Ok(config)
    }

    /// Save config to a specific path, creating parent directories if needed.
    ///
    /// # Errors
    ///
    /// Returns an error if the directory cannot be created,
    /// serialization fails, or the file cannot be written.
    pub fn save_to(&self, path: &Path) -> Result<()> {
        let parent = path.parent().unwrap_or_else(|| Path::new("."));
        std::fs::create_dir_all(parent).context("Failed to create config directory")?;
        let content = self.to_toml()?;
        std::fs::write(path, content).context("Failed to write config file")?;
        Ok(())
    }

    /// # Errors
    ///
    /// Returns an error if serialization fails.
    pub fn to_toml(&self) -> Result<String> {
        toml::to_string_pretty(self).context("Failed to serialize config")
    }

    /// # Errors
    ///
    /// Returns an error if the platform config directory cannot be determined.
    pub fn config_path() -> Result<PathBuf> {
        let config_dir = dirs::config_dir().context("Could not determine config directory")?;
        Ok(config_dir.join("watchpost").join("config.toml"))
    }

    /// # Errors
    ///
    /// Returns an error on duplicate check names, two delta checks sharing
    /// one state key, or an invalid definition.
    pub fn validate(&self) -> Result<()> {
        let mut seen = HashSet::new();
        let mut keys: HashMap<StateKey, &str> = HashMap::new();
        for check in &self.checks {
            check.validate()?;
            if !seen.insert(check.name.as_str()) {
                bail!("Duplicate check name '{}'", check.name);
            }
            if check.kind == CheckKind::Delta {
                let key = check.state_key()?;
                if let Some(other) = keys.insert(key.clone(), check.name.as_str()) {
                    bail!(
                        "Checks '{other}' and '{}' share state key '{key}'",
                        check.name
                    );
                }
            }
        }
        Ok(())
    }

    /// Select checks by name, in the order requested. An empty selection
    /// means every configured check.
    ///
    /// # Errors
    ///
    /// Returns an error if a requested name is not configured.
    pub fn select_checks(&self, names: &[String]) -> Result<Vec<&CheckDefinition>> {
        if names.is_empty() {
            return Ok(self.checks.iter().collect());
        }
        names
            .iter()
            .map(|name| {
                self.checks
                    .iter()
                    .find(|c| &c.name == name)
                    .with_context(|| format!("No check named '{name}' in configuration"))
            })
            .collect()
    }
}
