//! Process configuration.
//!
//! # Responsibility
//! - Collect runtime settings from environment variables.
//! - Reject malformed values at startup instead of at first use.
//!
//! # Invariants
//! - Every setting has a usable default; only present-but-invalid values fail.

use crate::logging::default_log_level;
use crate::owner::DEFAULT_OWNER_ID;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::path::PathBuf;

pub const ENV_DB_PATH: &str = "WORKDESK_DB_PATH";
pub const ENV_LOG_LEVEL: &str = "WORKDESK_LOG_LEVEL";
pub const ENV_LOG_DIR: &str = "WORKDESK_LOG_DIR";
pub const ENV_DEFAULT_OWNER: &str = "WORKDESK_DEFAULT_OWNER";

const DEFAULT_DB_FILE_NAME: &str = "workdesk.sqlite3";
const LOG_LEVELS: [&str; 5] = ["trace", "debug", "info", "warn", "error"];

/// Error for a configuration value that is present but unusable.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfigError {
    pub key: &'static str,
    pub message: String,
}

impl Display for ConfigError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "invalid `{}`: {}", self.key, self.message)
    }
}

impl Error for ConfigError {}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WorkdeskConfig {
    pub db_path: PathBuf,
    pub log_level: String,
    /// File logging is enabled only when a directory is configured.
    pub log_dir: Option<PathBuf>,
    pub default_owner_id: String,
}

impl Default for WorkdeskConfig {
    fn default() -> Self {
        Self {
            db_path: PathBuf::from(DEFAULT_DB_FILE_NAME),
            log_level: default_log_level().to_string(),
            log_dir: None,
            default_owner_id: DEFAULT_OWNER_ID.to_string(),
        }
    }
}

impl WorkdeskConfig {
    /// Reads settings from the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Reads settings through `lookup`, falling back to defaults.
    ///
    /// Blank values count as unset.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let read = |key: &str| {
            lookup(key)
                .map(|value| value.trim().to_string())
                .filter(|value| !value.is_empty())
        };
        let mut config = Self::default();

        if let Some(path) = read(ENV_DB_PATH) {
            config.db_path = PathBuf::from(path);
        }

        if let Some(level) = read(ENV_LOG_LEVEL) {
            let level = level.to_ascii_lowercase();
            if !LOG_LEVELS.contains(&level.as_str()) {
                return Err(ConfigError {
                    key: ENV_LOG_LEVEL,
                    message: format!("unsupported level `{level}`; expected trace|debug|info|warn|error"),
                });
            }
            config.log_level = level;
        }

        if let Some(dir) = read(ENV_LOG_DIR) {
            let dir = PathBuf::from(dir);
            if !dir.is_absolute() {
                return Err(ConfigError {
                    key: ENV_LOG_DIR,
                    message: format!("must be an absolute path, got `{}`", dir.display()),
                });
            }
            config.log_dir = Some(dir);
        }

        if let Some(owner) = read(ENV_DEFAULT_OWNER) {
            config.default_owner_id = owner;
        }

        Ok(config)
    }
}
