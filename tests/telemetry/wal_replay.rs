//! WAL replay metrics case

use crate::common::*;
use ftest_harness::wal_replay_metrics;

#[test]
fn passes_with_md_on_ssd() {
    let test = TestEngine::md_on_ssd();
    assert_passed(&wal_replay_metrics(&test.bed()).unwrap());
    assert!(test
        .metric("engine_pool_vos_rehydration_replay_count")
        .is_some());
}

#[test]
fn passes_with_md_in_memory() {
    let test = TestEngine::md_in_memory();
    assert_passed(&wal_replay_metrics(&test.bed()).unwrap());
    for name in catalog::wal_replay_metrics() {
        assert_eq!(test.metric(name.as_str()), None, "{}", name);
    }
}

#[test]
fn repeated_runs_fail_baseline_once_replay_counted() {
    let test = TestEngine::md_on_ssd();
    assert_passed(&wal_replay_metrics(&test.bed()).unwrap());

    // Counters are engine-wide, so a second pool starts from non-zero.
    let second = wal_replay_metrics(&test.bed()).unwrap();
    assert!(!second.passed());
}
