//! Shared test utilities for all integration test suites.
//!
//! Import via `#[path = "../common/mod.rs"] mod common;` from a suite's main.rs.

#![allow(dead_code)]
#![allow(unused_imports)]

use std::sync::Once;
use std::time::Duration;

pub use ftest_core::{
    CheckpointPolicy, Error, ExpectedRange, FeatureFlag, MetricName, MetricValue, PoolProperties,
    CONTROL_METADATA,
};
pub use ftest_harness::{
    CaseOutcome, IoPhase, IorFlavor, PhaseOrchestrator, SimulatedEngine, StorageControlPlane,
    SuiteConfig, TestBed, TransitionPlan, WorkloadParams, WorkloadRunner,
};
pub use ftest_telemetry::{catalog, MetricsSource};

// ============================================================================
// Initialization
// ============================================================================

static INIT_LOGGING: Once = Once::new();

fn ensure_logging(config: &SuiteConfig) {
    INIT_LOGGING.call_once(|| ftest_harness::init_suite_logging(config).unwrap());
}

/// Suite config with a short checkpoint interval so checkpoint cases settle fast.
pub fn fast_config() -> SuiteConfig {
    SuiteConfig {
        checkpoint_frequency_ms: 50,
        log_level: "debug".to_string(),
        ..SuiteConfig::default()
    }
}

// ============================================================================
// TestEngine - simulated engine plus suite config
// ============================================================================

/// Simulated engine wrapper that hands out [`TestBed`]s.
pub struct TestEngine {
    pub engine: SimulatedEngine,
    pub config: SuiteConfig,
}

impl TestEngine {
    /// Engine with metadata on SSD.
    pub fn md_on_ssd() -> Self {
        Self::with_mode(true)
    }

    /// Engine with metadata kept in memory only.
    pub fn md_in_memory() -> Self {
        Self::with_mode(false)
    }

    pub fn with_mode(md_on_ssd: bool) -> Self {
        let config = fast_config();
        ensure_logging(&config);
        TestEngine {
            engine: SimulatedEngine::new(md_on_ssd),
            config,
        }
    }

    /// Replace the suite config.
    pub fn with_config(mut self, config: SuiteConfig) -> Self {
        self.config = config;
        self
    }

    /// Collaborators for a case, all backed by the simulated engine.
    pub fn bed(&self) -> TestBed<'_> {
        TestBed {
            control: &self.engine,
            runner: &self.engine,
            data: &self.engine,
            metrics: &self.engine,
            config: &self.config,
        }
    }

    /// Orchestrator over this engine with the flag resolved from it.
    pub fn orchestrator(&self) -> PhaseOrchestrator<'_> {
        let flag = FeatureFlag::resolve(&self.engine, CONTROL_METADATA).unwrap();
        PhaseOrchestrator::new(&self.engine, flag)
    }

    /// Current value of one metric, if the engine reports it.
    pub fn metric(&self, name: &str) -> Option<MetricValue> {
        self.engine
            .query(&[MetricName::from(name)])
            .unwrap()
            .get(name)
            .copied()
    }

    /// Run one easy IOR write into a fresh pool and container.
    pub fn write_once(&self) {
        let pool = self.engine.create_pool(&PoolProperties::default()).unwrap();
        let container = self.engine.create_container(&pool).unwrap();
        let params =
            WorkloadParams::from_namespace("/run/ior/*", IorFlavor::Easy, IoPhase::Write).unwrap();
        self.engine.run(&container, &params).unwrap();
    }
}

/// Assert a case passed, printing the failure reason otherwise.
pub fn assert_passed(outcome: &CaseOutcome) {
    assert!(outcome.passed(), "{}", outcome);
}

/// Longest a checkpoint case may take with [`fast_config`].
pub const CHECKPOINT_CASE_BUDGET: Duration = Duration::from_secs(5);
