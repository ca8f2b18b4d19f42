//! CLI configuration file
//!
//! ```json
//! { "schema_dir": "./schemas", "output_keys": "alias", "log_level": "info" }
//! ```
//!
//! Every key is optional. Unknown keys are rejected.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::observability::Severity;

use super::errors::{CliError, CliResult};

/// Which names key the fields of an accepted record in output
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputKeys {
    /// External aliases (the wire form)
    #[default]
    Alias,
    /// Canonical field names
    Canonical,
}

/// Configuration file structure
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Config {
    /// Directory scanned by the `schemas` command
    #[serde(default = "default_schema_dir")]
    pub schema_dir: String,

    /// Output key style for accepted records
    #[serde(default)]
    pub output_keys: OutputKeys,

    /// Minimum log severity: trace, info, warn, error
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

fn default_schema_dir() -> String {
    "./schemas".to_string()
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for Config {
    fn default() -> Self {
        Self {
            schema_dir: default_schema_dir(),
            output_keys: OutputKeys::default(),
            log_level: default_log_level(),
        }
    }
}

impl Config {
    /// Load configuration from file
    pub fn load(path: &Path) -> CliResult<Self> {
        let content = fs::read_to_string(path)
            .map_err(|e| CliError::config_error(format!("Failed to read config: {}", e)))?;

        let config: Config = serde_json::from_str(&content)
            .map_err(|e| CliError::config_error(format!("Invalid config JSON: {}", e)))?;

        config.validate()?;

        Ok(config)
    }

    /// Load from `path` when given, defaults otherwise
    pub fn load_or_default(path: Option<&Path>) -> CliResult<Self> {
        match path {
            Some(path) => Self::load(path),
            None => Ok(Self::default()),
        }
    }

    fn validate(&self) -> CliResult<()> {
        if self.schema_dir.trim().is_empty() {
            return Err(CliError::config_error("schema_dir must not be empty"));
        }

        self.min_severity()?;

        Ok(())
    }

    /// Parsed `log_level`
    pub fn min_severity(&self) -> CliResult<Severity> {
        self.log_level
            .parse()
            .map_err(|e: String| CliError::config_error(format!("Invalid log_level: {}", e)))
    }

    pub fn schema_path(&self) -> PathBuf {
        PathBuf::from(&self.schema_dir)
    }
}
