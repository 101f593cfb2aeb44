//! Suite configuration via `ftest.toml`
//!
//! Every field has a default, so an empty file (or no file) gives the
//! standard suite. Settle delays are derived from the checkpoint frequency:
//! `settle = checkpoint_frequency * settle_intervals`.

use ftest_core::{Error, Result, CONTROL_METADATA};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

/// Config file name looked up in the suite's working directory.
pub const CONFIG_FILE_NAME: &str = "ftest.toml";

/// Default IOR namespace used to write data in telemetry cases.
pub const DEFAULT_WRITE_NAMESPACE: &str = "/run/ior/*";

/// IOR settings.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct IorConfig {
    /// Namespace for the data write step of telemetry cases
    #[serde(default = "default_write_namespace")]
    pub write_namespace: String,
}

fn default_write_namespace() -> String {
    DEFAULT_WRITE_NAMESPACE.to_string()
}

impl Default for IorConfig {
    fn default() -> Self {
        Self {
            write_namespace: default_write_namespace(),
        }
    }
}

/// Suite configuration loaded from `ftest.toml`.
///
/// # Example
///
/// ```toml
/// metadata_flag = "control_metadata"
/// checkpoint_frequency_ms = 5000
/// settle_intervals = 2
/// log_level = "info"
///
/// [ior]
/// write_namespace = "/run/ior/*"
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SuiteConfig {
    /// Flag that selects WAL-backed metadata mode
    #[serde(default = "default_metadata_flag")]
    pub metadata_flag: String,
    /// Timed checkpoint interval for the checkpoint case, in milliseconds
    #[serde(default = "default_checkpoint_frequency_ms")]
    pub checkpoint_frequency_ms: u64,
    /// Checkpoint intervals to wait before sampling checkpoint metrics
    #[serde(default = "default_settle_intervals")]
    pub settle_intervals: u32,
    /// Maximum log level: trace, debug, info, warn, error
    #[serde(default = "default_log_level")]
    pub log_level: String,
    /// IOR settings
    #[serde(default)]
    pub ior: IorConfig,
}

fn default_metadata_flag() -> String {
    CONTROL_METADATA.to_string()
}

fn default_checkpoint_frequency_ms() -> u64 {
    5000
}

fn default_settle_intervals() -> u32 {
    2
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for SuiteConfig {
    fn default() -> Self {
        Self {
            metadata_flag: default_metadata_flag(),
            checkpoint_frequency_ms: default_checkpoint_frequency_ms(),
            settle_intervals: default_settle_intervals(),
            log_level: default_log_level(),
            ior: IorConfig::default(),
        }
    }
}

impl SuiteConfig {
    /// Timed checkpoint interval
    pub fn checkpoint_frequency(&self) -> Duration {
        Duration::from_millis(self.checkpoint_frequency_ms)
    }

    /// Delay before sampling checkpoint metrics
    ///
    /// Saturates at `Duration::MAX`; `validate` rejects configs that would.
    pub fn checkpoint_settle(&self) -> Duration {
        self.checkpoint_frequency().saturating_mul(self.settle_intervals)
    }

    /// Parsed log level.
    ///
    /// # Errors
    ///
    /// Returns an error if `log_level` is not a tracing level name.
    pub fn level(&self) -> Result<tracing::Level> {
        self.log_level.parse().map_err(|_| {
            Error::configuration(format!(
                "Invalid log_level '{}' in ftest.toml. Expected trace, debug, info, warn or error.",
                self.log_level
            ))
        })
    }

    /// Check field values.
    pub fn validate(&self) -> Result<()> {
        if self.metadata_flag.is_empty() {
            return Err(Error::configuration("metadata_flag must not be empty"));
        }
        if self.checkpoint_frequency_ms == 0 {
            return Err(Error::configuration(
                "checkpoint_frequency_ms must be greater than 0",
            ));
        }
        if self.settle_intervals == 0 {
            return Err(Error::configuration("settle_intervals must be at least 1"));
        }
        if self
            .checkpoint_frequency()
            .checked_mul(self.settle_intervals)
            .is_none()
        {
            return Err(Error::configuration(format!(
                "checkpoint_frequency_ms ({}) * settle_intervals ({}) overflows",
                self.checkpoint_frequency_ms, self.settle_intervals
            )));
        }
        self.level()?;
        Ok(())
    }

    /// Returns the default config file content with comments.
    pub fn default_toml() -> &'static str {
        r#"# ftest suite configuration
#
# Feature flag that selects WAL-backed metadata (metadata on SSD).
# When the flag is off, WAL metrics are expected to stay at zero.
metadata_flag = "control_metadata"

# Timed checkpoint interval used by the checkpoint case (milliseconds).
checkpoint_frequency_ms = 5000

# Checkpoint intervals to wait before sampling checkpoint metrics.
settle_intervals = 2

# Maximum log level: trace, debug, info, warn, error
log_level = "info"

[ior]
# Namespace for the data write step of telemetry cases
write_namespace = "/run/ior/*"
"#
    }

    /// Read and parse config from a file path.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read, parsed, or validated.
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            Error::configuration(format!(
                "Failed to read config file '{}': {}",
                path.display(),
                e
            ))
        })?;
        let config: SuiteConfig = toml::from_str(&content).map_err(|e| {
            Error::configuration(format!(
                "Failed to parse config file '{}': {}",
                path.display(),
                e
            ))
        })?;
        config.validate()?;
        Ok(config)
    }

    /// Write the default config file if it does not already exist.
    pub fn write_default_if_missing(path: &Path) -> Result<()> {
        if !path.exists() {
            std::fs::write(path, Self::default_toml())?;
        }
        Ok(())
    }

    /// Serialize this config to TOML and write it to the given path.
    pub fn write_to_file(&self, path: &Path) -> Result<()> {
        let content = toml::to_string_pretty(self)
            .map_err(|e| Error::configuration(format!("Failed to serialize config: {}", e)))?;
        std::fs::write(path, content)?;
        Ok(())
    }
}
