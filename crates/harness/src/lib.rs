//! Test harness for telemetry-driven functional cases
//!
//! This crate sequences metric verification around workloads:
//!
//! - Orchestrator: baseline check, workload, settle delay, final check
//! - Settle: cancellable fixed wait for background activity
//! - Collaborators: control plane, workload runner, object data path
//! - Config: `ftest.toml` suite settings
//! - Logging: subscriber setup and numbered step banners
//! - Sim: in-process engine implementing every collaborator
//! - Cases: WAL commit/replay/checkpoint, array object, IOR performance

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod cases;
pub mod collaborators;
pub mod config;
pub mod logging;
pub mod orchestrator;
pub mod settle;
pub mod sim;

pub use cases::{
    array_object, run_ior_case, run_performance_ior, wal_checkpoint_metrics, wal_commit_metrics,
    wal_replay_metrics, CaseOutcome, IorCase, TestBed, IOR_EASY_CASES, IOR_HARD_CASES,
};
pub use collaborators::{
    Interception, IoPhase, IorApi, IorFlavor, ObjectDataPath, StorageControlPlane,
    WorkloadParams, WorkloadResult, WorkloadRunner,
};
pub use config::{IorConfig, SuiteConfig, CONFIG_FILE_NAME};
pub use logging::{init_logging, init_suite_logging, Steps};
pub use orchestrator::{resolve_range, PhaseOrchestrator, TransitionPlan, TransitionReport};
pub use settle::{CancelHandle, SettleTimer};
pub use sim::SimulatedEngine;
