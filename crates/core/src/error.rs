//! Error types for the verification suite
//!
//! This module defines every error a verification call can raise.
//! We use `thiserror` for automatic `Display` and `Error` trait implementations.
//!
//! A metric that falls outside its expected range is NOT an error. It is
//! reported through a failed verdict and the caller decides what to do with it.

use std::io;
use thiserror::Error;

/// Result type alias for suite operations
pub type Result<T> = std::result::Result<T, Error>;

/// Error types for the verification suite
#[derive(Debug, Error)]
pub enum Error {
    /// Metrics source unreachable or returned a malformed response
    #[error("Transport error: {0}")]
    Transport(String),

    /// Feature flag or configuration file unreadable or invalid
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// Workload did not complete
    #[error("Workload error: {0}")]
    Workload(String),

    /// Pool or container lifecycle failure
    #[error("Control plane error: {0}")]
    ControlPlane(String),

    /// Object read/write failure
    #[error("Data path error: {0}")]
    DataPath(String),

    /// Range bounds are not ordered (or not numbers)
    #[error("Invalid range: minimum {min} must not exceed maximum {max}")]
    InvalidRange {
        /// Requested minimum
        min: f64,
        /// Requested maximum
        max: f64,
    },

    /// Settle delay was cancelled before it elapsed
    #[error("Settle delay cancelled")]
    Cancelled,

    /// I/O error (config files)
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
}

impl Error {
    /// Construct a transport error
    pub fn transport(msg: impl Into<String>) -> Self {
        Error::Transport(msg.into())
    }

    /// Construct a configuration error
    pub fn configuration(msg: impl Into<String>) -> Self {
        Error::Configuration(msg.into())
    }

    /// True if the metrics source could not be read
    pub fn is_transport(&self) -> bool {
        matches!(self, Error::Transport(_))
    }

    /// True if a flag or config value could not be resolved
    pub fn is_configuration(&self) -> bool {
        matches!(self, Error::Configuration(_))
    }
}
