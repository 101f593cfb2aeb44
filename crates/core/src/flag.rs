//! Run-wide feature flags
//!
//! A flag is read once from the control plane at test setup and never
//! changes for the rest of the test.

use crate::error::{Error, Result};

/// Flag set when engines keep metadata on SSD behind a write-ahead log.
pub const CONTROL_METADATA: &str = "control_metadata";

/// Source of boolean configuration flags
pub trait FlagReader {
    /// Read the current value of the flag `name`
    fn read_feature_flag(&self, name: &str) -> Result<bool>;
}

/// A resolved, immutable flag value
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FeatureFlag {
    name: String,
    enabled: bool,
}

impl FeatureFlag {
    /// Wrap an already-known value
    pub fn new(name: impl Into<String>, enabled: bool) -> Self {
        FeatureFlag {
            name: name.into(),
            enabled,
        }
    }

    /// Read `name` once from `reader`
    ///
    /// Any failure to read surfaces as [`Error::Configuration`].
    pub fn resolve<R: FlagReader + ?Sized>(reader: &R, name: &str) -> Result<Self> {
        let enabled = reader.read_feature_flag(name).map_err(|e| match e {
            Error::Configuration(_) => e,
            other => Error::Configuration(format!(
                "failed to read feature flag '{}': {}",
                name, other
            )),
        })?;
        Ok(FeatureFlag::new(name, enabled))
    }

    /// Flag name
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Flag value
    pub fn is_enabled(&self) -> bool {
        self.enabled
    }
}
