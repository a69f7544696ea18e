//! Configuration module for cubeplan.
//!
//! Handles the TOML settings file and environment variable expansion.

mod settings;

pub use settings::{
    expand_env_vars, LoggingSettings, PartitionSettings, PlannerSettings, Settings, SettingsError,
    SqlSettings, CONFIG_ENV_VAR,
};
