//! Repository configuration
//!
//! Which database a repository writes to, an optional collection override,
//! bulk write ordering, and the minimum log severity.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::observability::{log_event, Event, Logger, Severity};

/// Result type for configuration loading
pub type ConfigResult<T> = Result<T, ConfigError>;

/// Configuration loading errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid config: {0}")]
    Parse(#[from] serde_json::Error),
}

/// Repository configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RepositoryConfig {
    /// Database name (default: "aerorepo")
    #[serde(default = "default_database")]
    pub database: String,

    /// Collection name overriding the mapping's own
    #[serde(default)]
    pub collection: Option<String>,

    /// Stop bulk writes at the first failure (default: false)
    #[serde(default)]
    pub ordered_bulk_writes: bool,

    /// Minimum log severity (default: INFO)
    #[serde(default)]
    pub log_severity: Severity,
}

fn default_database() -> String {
    "aerorepo".to_string()
}

impl Default for RepositoryConfig {
    fn default() -> Self {
        Self {
            database: default_database(),
            collection: None,
            ordered_bulk_writes: false,
            log_severity: Severity::default(),
        }
    }
}

impl RepositoryConfig {
    /// Config for a database, other settings at their defaults
    pub fn with_database(database: impl Into<String>) -> Self {
        Self {
            database: database.into(),
            ..Default::default()
        }
    }

    pub fn from_json_str(json: &str) -> ConfigResult<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Reads a JSON config file
    pub fn load(path: impl AsRef<Path>) -> ConfigResult<Self> {
        let path = path.as_ref();
        let config = Self::from_json_str(&fs::read_to_string(path)?)?;
        log_event(
            Event::ConfigLoaded,
            &[
                ("database", config.database.as_str()),
                ("path", &path.display().to_string()),
            ],
        );
        Ok(config)
    }

    /// Applies the configured minimum log severity process-wide
    pub fn apply_logging(&self) {
        Logger::set_min_severity(self.log_severity);
    }
}
