//! WAL checkpoint metrics case

use crate::common::*;
use ftest_harness::wal_checkpoint_metrics;
use std::time::{Duration, Instant};

#[test]
fn passes_with_md_on_ssd() {
    let test = TestEngine::md_on_ssd();
    let start = Instant::now();
    assert_passed(&wal_checkpoint_metrics(&test.bed()).unwrap());

    let elapsed = start.elapsed();
    assert!(elapsed >= test.config.checkpoint_settle());
    assert!(elapsed < CHECKPOINT_CASE_BUDGET);
    assert!(test.metric("engine_pool_checkpoint_duration").is_some());
}

#[test]
fn passes_with_md_in_memory() {
    let test = TestEngine::md_in_memory();
    assert_passed(&wal_checkpoint_metrics(&test.bed()).unwrap());
    for name in catalog::wal_checkpoint_metrics() {
        assert_eq!(test.metric(name.as_str()), None, "{}", name);
    }
}

#[test]
fn settle_shorter_than_one_interval_misses_the_checkpoint() {
    let test = TestEngine::md_on_ssd();
    let properties = PoolProperties::default()
        .with("checkpoint", "timed")
        .with("checkpoint_freq", "2");
    let pool = test.engine.create_pool(&properties).unwrap();
    let container = test.engine.create_container(&pool).unwrap();
    let params =
        WorkloadParams::from_namespace("/run/ior/*", IorFlavor::Easy, IoPhase::Write).unwrap();

    let plan = TransitionPlan::new(catalog::wal_checkpoint_metrics(), ExpectedRange::at_least(1.0))
        .with_settle(Duration::from_millis(20));
    let report = test
        .orchestrator()
        .verify_transition(&plan, || test.engine.run(&container, &params))
        .unwrap();

    assert!(report.before.ok());
    assert!(!report.after.ok(), "checkpoint should not have run yet");
}

#[test]
fn invalid_config_is_rejected_before_provisioning() {
    let config = SuiteConfig {
        settle_intervals: 0,
        ..fast_config()
    };
    let test = TestEngine::md_on_ssd().with_config(config);
    let err = wal_checkpoint_metrics(&test.bed()).unwrap_err();
    assert!(err.is_configuration());
    assert_eq!(test.engine.container_count(), 0);
}
