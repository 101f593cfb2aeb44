//! WAL commit metrics case

use crate::common::*;
use ftest_harness::wal_commit_metrics;

#[test]
fn passes_with_md_on_ssd() {
    let test = TestEngine::md_on_ssd();
    let outcome = wal_commit_metrics(&test.bed()).unwrap();
    assert_passed(&outcome);
    assert!(test.metric("engine_dmabuff_wal_sz").is_some());
}

#[test]
fn passes_with_md_in_memory() {
    let test = TestEngine::md_in_memory();
    let outcome = wal_commit_metrics(&test.bed()).unwrap();
    assert_passed(&outcome);
    assert_eq!(test.metric("engine_dmabuff_wal_sz"), None);
}

#[test]
fn fails_when_commits_happened_before_the_case() {
    let test = TestEngine::md_on_ssd();
    test.write_once();

    let outcome = wal_commit_metrics(&test.bed()).unwrap();
    match outcome {
        CaseOutcome::Failed(reason) => assert!(reason.contains("before writing data")),
        CaseOutcome::Passed => panic!("baseline should have failed"),
    }
}

#[test]
fn non_wal_dmabuff_metrics_are_not_checked() {
    let test = TestEngine::md_in_memory();
    assert!(test.metric("engine_dmabuff_total_chunks").is_some());
    assert!(catalog::wal_commit_metrics()
        .iter()
        .all(|name| name.as_str().contains("_wal_")));
    assert_passed(&wal_commit_metrics(&test.bed()).unwrap());
}

#[test]
fn unreachable_telemetry_is_an_error() {
    let test = TestEngine::md_on_ssd();
    test.engine.set_reachable(false);
    let err = wal_commit_metrics(&test.bed()).unwrap_err();
    assert!(err.is_transport());
}

#[test]
fn unreadable_flag_is_a_configuration_error() {
    let test = TestEngine::md_on_ssd();
    test.engine.set_flags_readable(false);
    let err = wal_commit_metrics(&test.bed()).unwrap_err();
    assert!(err.is_configuration());
    assert_eq!(test.engine.container_count(), 0, "nothing provisioned");
}
