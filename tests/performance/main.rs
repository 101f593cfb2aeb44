//! Integration tests for the IOR performance tables.

#[path = "../common/mod.rs"]
mod common;

use common::*;
use ftest_harness::{run_ior_case, run_performance_ior, IOR_EASY_CASES, IOR_HARD_CASES};

#[test]
fn every_easy_case_passes() {
    for case in IOR_EASY_CASES {
        let test = TestEngine::md_on_ssd();
        let outcome = run_ior_case(&test.bed(), IorFlavor::Easy, case).unwrap();
        assert!(outcome.passed(), "{}: {}", case.name, outcome);
    }
}

#[test]
fn every_hard_case_passes() {
    for case in IOR_HARD_CASES {
        let test = TestEngine::md_in_memory();
        let outcome = run_ior_case(&test.bed(), IorFlavor::Hard, case).unwrap();
        assert!(outcome.passed(), "{}: {}", case.name, outcome);
        assert_eq!(test.engine.stopped_ranks(), 0, "{}", case.name);
    }
}

#[test]
fn stop_cases_stop_one_rank() {
    for case in IOR_EASY_CASES.iter().filter(|c| c.name.contains("_stop_")) {
        let test = TestEngine::md_on_ssd();
        assert_passed(&run_ior_case(&test.bed(), IorFlavor::Easy, case).unwrap());
        assert_eq!(test.engine.stopped_ranks(), 1, "{}", case.name);
    }
}

#[test]
fn malformed_namespace_is_a_configuration_error() {
    let test = TestEngine::md_on_ssd();
    let err = run_performance_ior(&test.bed(), IorFlavor::Easy, "ior_dfs_sx", None, None)
        .unwrap_err();
    assert!(err.is_configuration());
}
