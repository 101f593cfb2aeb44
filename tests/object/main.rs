//! Integration tests for the array object case.

#[path = "../common/mod.rs"]
mod common;

use common::*;
use ftest_harness::array_object;

#[test]
fn array_round_trip_passes() {
    let test = TestEngine::md_on_ssd();
    assert_passed(&array_object(&test.bed()).unwrap());
}

#[test]
fn container_is_destroyed_after_the_case() {
    let test = TestEngine::md_in_memory();
    assert_passed(&array_object(&test.bed()).unwrap());
    assert_eq!(test.engine.container_count(), 0);
}

#[test]
fn array_write_is_a_local_transaction() {
    let test = TestEngine::md_on_ssd();
    assert_passed(&array_object(&test.bed()).unwrap());
    assert!(test.metric("engine_dmabuff_wal_sz").is_some());
}

#[test]
fn invalid_config_is_rejected() {
    let config = SuiteConfig {
        checkpoint_frequency_ms: 0,
        ..fast_config()
    };
    let test = TestEngine::md_on_ssd().with_config(config);
    assert!(array_object(&test.bed()).unwrap_err().is_configuration());
    assert_eq!(test.engine.container_count(), 0);
}
