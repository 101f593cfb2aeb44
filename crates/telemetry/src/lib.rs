//! Telemetry sampling and verification
//!
//! This crate holds the two stateless halves of metric verification:
//!
//! - Source: the [`MetricsSource`] read interface plus an in-memory registry
//! - Sampler: one point-in-time [`MetricSample`](ftest_core::MetricSample) per call
//! - Evaluator: pure range check producing a per-metric [`VerificationVerdict`]
//! - Catalog: engine metric name sets (dmabuff, rehydration, checkpoint)
//! - Display: tabular sample rendering for the test log

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod catalog;
pub mod display;
pub mod evaluator;
pub mod sampler;
pub mod source;

pub use display::render_sample;
pub use evaluator::{evaluate, MetricCheck, VerificationVerdict};
pub use sampler::MetricSampler;
pub use source::{InMemoryMetricsSource, MetricsSource};
