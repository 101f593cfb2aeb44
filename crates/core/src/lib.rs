//! Core types for the telemetry verification suite
//!
//! This crate defines the data model shared by every other crate:
//! - MetricName / MetricValue / MetricSample: point-in-time counter values
//! - ExpectedRange: inclusive bounds a counter must satisfy
//! - FeatureFlag: run-wide boolean read once from the control plane
//! - Handles: pool, container, and object identifiers
//! - Error: error type hierarchy

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod error;
pub mod flag;
pub mod handles;
pub mod metric;
pub mod range;

pub use error::{Error, Result};
pub use flag::{FeatureFlag, FlagReader, CONTROL_METADATA};
pub use handles::{
    format_frequency, CheckpointPolicy, ContainerHandle, ObjectId, PoolHandle, PoolProperties,
    DEFAULT_CHECKPOINT_FREQUENCY,
};
pub use metric::{MetricName, MetricSample, MetricValue};
pub use range::ExpectedRange;
