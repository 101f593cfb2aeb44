//! Integration tests for the WAL telemetry cases.
//!
//! Each case runs end to end against the simulated engine, in both
//! metadata modes: with metadata on SSD the WAL counters must move, without
//! it they must stay at zero.

#[path = "../common/mod.rs"]
mod common;

mod verification;
mod wal_checkpoint;
mod wal_commit;
mod wal_replay;
