//! Engine metric catalogs
//!
//! Names as exported by the engine telemetry namespace, flattened with `_`.

use ftest_core::MetricName;

/// Per-engine DMA buffer metrics, including the WAL commit metrics
pub const ENGINE_DMABUFF_METRICS: &[&str] = &[
    "engine_dmabuff_total_chunks",
    "engine_dmabuff_used_chunks_io",
    "engine_dmabuff_used_chunks_local",
    "engine_dmabuff_used_chunks_rebuild",
    "engine_dmabuff_bulk_grps",
    "engine_dmabuff_active_reqs",
    "engine_dmabuff_queued_reqs",
    "engine_dmabuff_grab_errs",
    "engine_dmabuff_grab_retries",
    "engine_dmabuff_wal_sz",
    "engine_dmabuff_wal_qd",
    "engine_dmabuff_wal_waiters",
];

/// Per-pool WAL replay metrics, updated when pool targets are opened
pub const ENGINE_POOL_VOS_REHYDRATION_METRICS: &[&str] = &[
    "engine_pool_vos_rehydration_replay_size",
    "engine_pool_vos_rehydration_replay_time",
    "engine_pool_vos_rehydration_replay_entries",
    "engine_pool_vos_rehydration_replay_count",
    "engine_pool_vos_rehydration_replay_transactions",
];

/// Per-pool checkpoint metrics, updated when a checkpoint has work to do
pub const ENGINE_POOL_CHECKPOINT_METRICS: &[&str] = &[
    "engine_pool_checkpoint_duration",
    "engine_pool_checkpoint_dirty_pages",
    "engine_pool_checkpoint_dirty_chunks",
    "engine_pool_checkpoint_iovs_copied",
    "engine_pool_checkpoint_wal_purged",
];

/// Owned names for a catalog slice
pub fn names(catalog: &[&str]) -> Vec<MetricName> {
    catalog.iter().map(|n| MetricName::from(*n)).collect()
}

/// WAL commit metrics: the dmabuff metrics tracking WAL activity
pub fn wal_commit_metrics() -> Vec<MetricName> {
    ENGINE_DMABUFF_METRICS
        .iter()
        .filter(|n| n.contains("_wal_"))
        .map(|n| MetricName::from(*n))
        .collect()
}

/// WAL replay metrics
pub fn wal_replay_metrics() -> Vec<MetricName> {
    names(ENGINE_POOL_VOS_REHYDRATION_METRICS)
}

/// WAL checkpoint metrics
pub fn wal_checkpoint_metrics() -> Vec<MetricName> {
    names(ENGINE_POOL_CHECKPOINT_METRICS)
}
