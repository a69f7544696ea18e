//! TOML-based configuration for cubeplan.
//!
//! Supports a config file (cubeplan.toml) with environment variable expansion.
//!
//! Example configuration:
//! ```toml
//! [planner]
//! check_partitions = true
//!
//! [sql]
//! dialect = "duckdb"
//!
//! [partitions]
//! catalog = "${ANALYTICS_HOME}/partitions.db"
//!
//! [logging]
//! level = "debug"
//! ```

use serde::{Deserialize, Serialize};
use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use crate::sql::Dialect;

/// Environment variable naming an explicit config file.
pub const CONFIG_ENV_VAR: &str = "CUBEPLAN_CONFIG";

/// Error type for settings.
#[derive(Debug, thiserror::Error)]
pub enum SettingsError {
    #[error("Config file not found: {0}")]
    FileNotFound(PathBuf),

    #[error("Failed to read config file: {0}")]
    ReadError(#[from] std::io::Error),

    #[error("Failed to parse config file: {0}")]
    ParseError(#[from] toml::de::Error),

    #[error("Missing environment variable: {0}")]
    MissingEnvVar(String),
}

/// Root configuration structure.
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct Settings {
    pub planner: PlannerSettings,
    pub sql: SqlSettings,
    pub partitions: PartitionSettings,
    pub logging: LoggingSettings,
}

/// Planner configuration.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct PlannerSettings {
    /// Prune partitions without a backing table (needs a catalog).
    pub check_partitions: bool,
}

impl Default for PlannerSettings {
    fn default() -> Self {
        Self {
            check_partitions: true,
        }
    }
}

/// SQL generation settings.
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct SqlSettings {
    pub dialect: Dialect,
}

/// Partition catalog settings.
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct PartitionSettings {
    /// SQLite database listing the partition tables (supports ${ENV_VAR}).
    pub catalog: Option<String>,
}

impl PartitionSettings {
    /// The catalog path with environment variables expanded.
    pub fn resolved_catalog(&self) -> Result<Option<PathBuf>, SettingsError> {
        self.catalog
            .as_deref()
            .map(|c| expand_env_vars(c).map(PathBuf::from))
            .transpose()
    }
}

/// Logging settings.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct LoggingSettings {
    /// Default filter directive when `RUST_LOG` is unset.
    pub level: String,
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
        }
    }
}

impl Settings {
    /// Load settings from a TOML file.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, SettingsError> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(SettingsError::FileNotFound(path.to_path_buf()));
        }

        let content = fs::read_to_string(path)?;
        let settings: Settings = toml::from_str(&content)?;
        Ok(settings)
    }

    /// Load settings from the default config file locations.
    ///
    /// Searches in order:
    /// 1. Environment variable `CUBEPLAN_CONFIG`
    /// 2. `./cubeplan.toml`
    /// 3. `~/.config/cubeplan/config.toml`
    pub fn load() -> Result<Self, SettingsError> {
        if let Ok(path) = env::var(CONFIG_ENV_VAR) {
            return Self::from_file(&path);
        }

        let local_config = PathBuf::from("cubeplan.toml");
        if local_config.exists() {
            return Self::from_file(&local_config);
        }

        if let Some(config_dir) = dirs::config_dir() {
            let user_config = config_dir.join("cubeplan").join("config.toml");
            if user_config.exists() {
                return Self::from_file(&user_config);
            }
        }

        Ok(Settings::default())
    }

    /// Whether partitions should be probed against a catalog.
    pub fn probe_partitions(&self) -> bool {
        self.planner.check_partitions && self.partitions.catalog.is_some()
    }
}

/// Expand environment variables in a string.
///
/// Supports `${VAR}` and `$VAR` syntax.
pub fn expand_env_vars(s: &str) -> Result<String, SettingsError> {
    let mut result = String::with_capacity(s.len());
    let mut chars = s.chars().peekable();

    while let Some(c) = chars.next() {
        if c != '$' {
            result.push(c);
            continue;
        }

        let mut var_name = String::new();
        if chars.peek() == Some(&'{') {
            chars.next();
            for ch in chars.by_ref() {
                if ch == '}' {
                    break;
                }
                var_name.push(ch);
            }
        } else {
            while let Some(&ch) = chars.peek() {
                if !(ch.is_alphanumeric() || ch == '_') {
                    break;
                }
                var_name.push(ch);
                chars.next();
            }
            if var_name.is_empty() {
                // lone $
                result.push('$');
                continue;
            }
        }

        let value = env::var(&var_name).map_err(|_| SettingsError::MissingEnvVar(var_name.clone()))?;
        result.push_str(&value);
    }

    Ok(result)
}
