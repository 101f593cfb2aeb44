//! ftest - Functional regression suite for storage engine telemetry
//!
//! Test cases provision a pool and container, drive a workload, and assert
//! on exported engine counters.
//!
//! # Quick Start
//!
//! ```ignore
//! use ftest::{ExpectedRange, FeatureFlag, PhaseOrchestrator, TransitionPlan};
//!
//! let orchestrator = PhaseOrchestrator::new(&engine, FeatureFlag::new("control_metadata", true));
//! let names = ftest::catalog::wal_commit_metrics();
//! let plan = TransitionPlan::new(names, ExpectedRange::at_least(1.0));
//! let report = orchestrator.verify_transition(&plan, || runner.run(&container, &params))?;
//! assert!(report.ok(), "{}", report.after);
//! ```
//!
//! # Architecture
//!
//! - [`ftest_core`]: data model and errors
//! - [`ftest_telemetry`]: sampling and range evaluation
//! - [`ftest_harness`]: orchestration, collaborators, and the cases themselves

pub use ftest_core::*;
pub use ftest_harness::*;
pub use ftest_telemetry::*;
