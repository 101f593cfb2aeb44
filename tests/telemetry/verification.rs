//! Orchestrator behavior through the public API

use crate::common::*;
use ftest_harness::WorkloadResult;
use ftest_telemetry::InMemoryMetricsSource;
use std::thread;
use std::time::{Duration, Instant};

fn noop() -> ftest_core::Result<WorkloadResult> {
    Ok(WorkloadResult::completed("noop", Duration::ZERO))
}

#[test]
fn absent_metric_passes_zero_baseline() {
    let source = InMemoryMetricsSource::new();
    let orchestrator = PhaseOrchestrator::new(&source, FeatureFlag::new(CONTROL_METADATA, true));
    let verdict = orchestrator
        .verify(&[MetricName::from("wal_sz")], ExpectedRange::exactly_zero())
        .unwrap();
    assert!(verdict.ok());
    assert_eq!(verdict.check("wal_sz").unwrap().observed, None);
}

#[test]
fn flag_on_holds_after_sample_to_requested_range() {
    let source = InMemoryMetricsSource::new();
    let orchestrator = PhaseOrchestrator::new(&source, FeatureFlag::new(CONTROL_METADATA, true));
    let plan = TransitionPlan::new(["wal_sz"], ExpectedRange::at_least(1.0));

    let report = orchestrator
        .verify_transition(&plan, || {
            source.set("wal_sz", 42i64);
            noop()
        })
        .unwrap();
    assert!(report.ok());
    assert_eq!(
        report.after.check("wal_sz").unwrap().observed,
        Some(MetricValue::Integer(42))
    );
}

#[test]
fn flag_off_expects_zero_after_workload() {
    let source = InMemoryMetricsSource::new();
    let orchestrator = PhaseOrchestrator::new(&source, FeatureFlag::new(CONTROL_METADATA, false));
    let plan = TransitionPlan::new(["wal_sz"], ExpectedRange::at_least(1.0));

    let report = orchestrator
        .verify_transition(&plan, || {
            source.set("wal_sz", 42i64);
            noop()
        })
        .unwrap();
    assert!(report.before.ok());
    assert!(!report.after.ok());
    assert_eq!(report.effective_after, ExpectedRange::exactly_zero());

    let message = report.after.to_string();
    assert!(message.contains("[0, 0]"), "{}", message);
    assert!(message.contains("42"), "{}", message);
}

#[test]
fn per_metric_detail_separates_pass_and_fail() {
    let source = InMemoryMetricsSource::new();
    source.set("replay_count", 3i64);
    let orchestrator = PhaseOrchestrator::new(&source, FeatureFlag::new(CONTROL_METADATA, true));

    let verdict = orchestrator
        .verify(
            &[MetricName::from("replay_count"), MetricName::from("replay_size")],
            ExpectedRange::at_least(1.0),
        )
        .unwrap();
    assert!(!verdict.ok());
    assert!(verdict.check("replay_count").unwrap().passed);
    assert!(!verdict.check("replay_size").unwrap().passed);

    let failed: Vec<_> = verdict.failures().map(|c| c.name.as_str()).collect();
    assert_eq!(failed, vec!["replay_size"]);
}

#[test]
fn flag_resolved_from_engine_matches_mode() {
    for md_on_ssd in [true, false] {
        let test = TestEngine::with_mode(md_on_ssd);
        assert_eq!(test.orchestrator().flag().is_enabled(), md_on_ssd);
    }
}

#[test]
fn cancel_from_another_thread_ends_settle_early() {
    let test = TestEngine::md_on_ssd();
    let orchestrator = test.orchestrator();
    let handle = orchestrator.cancel_handle();
    let plan = TransitionPlan::new(catalog::wal_checkpoint_metrics(), ExpectedRange::at_least(1.0))
        .with_settle(Duration::from_secs(30));

    let canceller = thread::spawn(move || {
        thread::sleep(Duration::from_millis(20));
        handle.cancel();
    });

    let start = Instant::now();
    let err = orchestrator.verify_transition(&plan, noop).unwrap_err();
    canceller.join().unwrap();

    assert!(matches!(err, Error::Cancelled));
    assert!(start.elapsed() < Duration::from_secs(10));
}
