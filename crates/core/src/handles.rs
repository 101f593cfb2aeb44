//! Opaque handles for pools, containers, and objects
//!
//! Handles are created by the control plane and only passed around by the
//! suite. Pool properties use the `key:value,key:value` syntax accepted by
//! pool creation, e.g. `checkpoint:timed,checkpoint_freq:5`.

use crate::error::{Error, Result};
use std::fmt;
use std::time::Duration;
use uuid::Uuid;

/// Default timed checkpoint interval when `checkpoint_freq` is not given
pub const DEFAULT_CHECKPOINT_FREQUENCY: Duration = Duration::from_secs(5);

/// Checkpoint policy of a pool
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CheckpointPolicy {
    /// Checkpoint every `frequency` when there are dirty commits
    Timed {
        /// Interval between checkpoint attempts
        frequency: Duration,
    },
    /// Checkpoint only under WAL space pressure
    Lazy,
    /// Never checkpoint
    Disabled,
}

/// Ordered `key:value` pool properties
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct PoolProperties {
    entries: Vec<(String, String)>,
}

impl PoolProperties {
    /// Parse `key:value` pairs separated by commas
    ///
    /// Empty input yields no properties.
    pub fn parse(spec: &str) -> Result<Self> {
        let mut entries = Vec::new();
        for item in spec.split(',').map(str::trim).filter(|s| !s.is_empty()) {
            let (key, value) = item.split_once(':').ok_or_else(|| {
                Error::configuration(format!("pool property '{}' is not key:value", item))
            })?;
            entries.push((key.trim().to_string(), value.trim().to_string()));
        }
        Ok(PoolProperties { entries })
    }

    /// Value of `key`; the last occurrence wins
    pub fn get(&self, key: &str) -> Option<&str> {
        self.entries
            .iter()
            .rev()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    /// Append a property (builder pattern)
    pub fn with(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.entries.push((key.into(), value.into()));
        self
    }

    /// Checkpoint policy described by `checkpoint` / `checkpoint_freq`
    pub fn checkpoint_policy(&self) -> Result<CheckpointPolicy> {
        match self.get("checkpoint") {
            None | Some("timed") => {
                let frequency = match self.get("checkpoint_freq") {
                    Some(raw) => parse_frequency(raw)?,
                    None => DEFAULT_CHECKPOINT_FREQUENCY,
                };
                Ok(CheckpointPolicy::Timed { frequency })
            }
            Some("lazy") => Ok(CheckpointPolicy::Lazy),
            Some("disabled") => Ok(CheckpointPolicy::Disabled),
            Some(other) => Err(Error::configuration(format!(
                "unknown checkpoint policy '{}'. Expected \"timed\", \"lazy\" or \"disabled\".",
                other
            ))),
        }
    }
}

impl fmt::Display for PoolProperties {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, (k, v)) in self.entries.iter().enumerate() {
            if i > 0 {
                f.write_str(",")?;
            }
            write!(f, "{}:{}", k, v)?;
        }
        Ok(())
    }
}

/// Render a checkpoint interval the way `checkpoint_freq` accepts it
///
/// Whole seconds print bare (`5`); anything else prints in milliseconds (`250ms`).
pub fn format_frequency(frequency: Duration) -> String {
    let millis = frequency.as_millis();
    if millis % 1000 == 0 {
        format!("{}", millis / 1000)
    } else {
        format!("{}ms", millis)
    }
}

/// Parse a `checkpoint_freq` value: bare seconds or an `ms` suffix
fn parse_frequency(raw: &str) -> Result<Duration> {
    let invalid = || Error::configuration(format!("invalid checkpoint_freq '{}'", raw));
    let frequency = match raw.strip_suffix("ms") {
        Some(ms) => Duration::from_millis(ms.parse().map_err(|_| invalid())?),
        None => Duration::from_secs(raw.parse().map_err(|_| invalid())?),
    };
    if frequency.is_zero() {
        return Err(invalid());
    }
    Ok(frequency)
}

/// Handle to a created pool
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PoolHandle {
    /// Pool UUID
    pub uuid: Uuid,
    /// Human readable label
    pub label: String,
    /// Properties the pool was created with
    pub properties: PoolProperties,
}

impl fmt::Display for PoolHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.label, self.uuid)
    }
}

/// Handle to a created container
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContainerHandle {
    /// Container UUID
    pub uuid: Uuid,
    /// UUID of the owning pool
    pub pool: Uuid,
}

/// 128-bit object identifier
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ObjectId {
    /// High bits (object class and metadata)
    pub hi: u64,
    /// Low bits (sequence)
    pub lo: u64,
}

impl fmt::Display for ObjectId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.hi, self.lo)
    }
}
