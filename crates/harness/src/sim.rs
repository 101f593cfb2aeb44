//! In-process simulated engine
//!
//! Implements every collaborator trait plus [`MetricsSource`] so the test
//! cases can run without a cluster. Counters follow the engine's rules:
//!
//! - WAL commit metrics (`dmabuff_wal_*`) move on every local transaction,
//!   but only with metadata on SSD.
//! - WAL replay metrics move when a pool's targets are opened, which happens
//!   on the first container created in the pool.
//! - Checkpoint metrics move when a timed checkpoint finds dirty commits.
//!   Checkpoints are evaluated lazily whenever metrics are queried.
//! - Without metadata on SSD none of the WAL metrics move.

use crate::collaborators::{
    IoPhase, IorFlavor, ObjectDataPath, StorageControlPlane, WorkloadParams, WorkloadResult,
    WorkloadRunner,
};
use ftest_core::{
    CheckpointPolicy, ContainerHandle, Error, FlagReader, MetricName, MetricValue, ObjectId,
    PoolHandle, PoolProperties, Result, CONTROL_METADATA,
};
use ftest_telemetry::{InMemoryMetricsSource, MetricsSource};
use parking_lot::Mutex;
use std::collections::BTreeMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Instant;
use tracing::{debug, info};
use uuid::Uuid;

const WAL_SZ: &str = "engine_dmabuff_wal_sz";
const WAL_QD: &str = "engine_dmabuff_wal_qd";
const WAL_WAITERS: &str = "engine_dmabuff_wal_waiters";
const TOTAL_CHUNKS: &str = "engine_dmabuff_total_chunks";
const USED_CHUNKS_IO: &str = "engine_dmabuff_used_chunks_io";

const REPLAY_SIZE: &str = "engine_pool_vos_rehydration_replay_size";
const REPLAY_TIME: &str = "engine_pool_vos_rehydration_replay_time";
const REPLAY_ENTRIES: &str = "engine_pool_vos_rehydration_replay_entries";
const REPLAY_COUNT: &str = "engine_pool_vos_rehydration_replay_count";
const REPLAY_TRANSACTIONS: &str = "engine_pool_vos_rehydration_replay_transactions";

const CKPT_DURATION: &str = "engine_pool_checkpoint_duration";
const CKPT_DIRTY_PAGES: &str = "engine_pool_checkpoint_dirty_pages";
const CKPT_DIRTY_CHUNKS: &str = "engine_pool_checkpoint_dirty_chunks";
const CKPT_IOVS_COPIED: &str = "engine_pool_checkpoint_iovs_copied";
const CKPT_WAL_PURGED: &str = "engine_pool_checkpoint_wal_purged";

/// DMA buffer chunks reported at engine start
pub const SIM_TOTAL_CHUNKS: i64 = 1024;
/// Size of the pool-create record replayed when targets open
const POOL_CREATE_RECORD: i64 = 4096;
/// Records per IOR write phase (easy, hard)
const EASY_TRANSFERS: u32 = 16;
const HARD_TRANSFERS: u32 = 64;
/// Bytes per IOR transfer (easy, hard)
const EASY_TRANSFER_SIZE: i64 = 1 << 20;
const HARD_TRANSFER_SIZE: i64 = 47008;
const PAGE_SIZE: i64 = 4096;

struct SimPool {
    handle: PoolHandle,
    policy: CheckpointPolicy,
    targets_open: bool,
    dirty_commits: u64,
    dirty_bytes: i64,
    last_checkpoint: Instant,
}

type ArrayKey = (ObjectId, Vec<u8>, Vec<u8>);

struct SimContainer {
    handle: ContainerHandle,
    arrays: BTreeMap<ArrayKey, Vec<Vec<u8>>>,
}

#[derive(Default)]
struct SimState {
    pools: BTreeMap<Uuid, SimPool>,
    containers: BTreeMap<Uuid, SimContainer>,
    next_object: u64,
    stopped_ranks: u32,
}

/// In-process stand-in for a running engine
pub struct SimulatedEngine {
    md_on_ssd: bool,
    state: Mutex<SimState>,
    metrics: InMemoryMetricsSource,
    flags_readable: AtomicBool,
}

impl SimulatedEngine {
    /// Engine with metadata on SSD switched on (`true`) or off
    pub fn new(md_on_ssd: bool) -> Self {
        let metrics = InMemoryMetricsSource::new();
        metrics.set(TOTAL_CHUNKS, SIM_TOTAL_CHUNKS);
        SimulatedEngine {
            md_on_ssd,
            state: Mutex::new(SimState::default()),
            metrics,
            flags_readable: AtomicBool::new(true),
        }
    }

    /// Make metric queries fail with a transport error
    pub fn set_reachable(&self, reachable: bool) {
        self.metrics.set_reachable(reachable);
    }

    /// Make flag reads fail
    pub fn set_flags_readable(&self, readable: bool) {
        self.flags_readable.store(readable, Ordering::Release);
    }

    /// Ranks stopped by workloads so far
    pub fn stopped_ranks(&self) -> u32 {
        self.state.lock().stopped_ranks
    }

    /// Number of live containers
    pub fn container_count(&self) -> usize {
        self.state.lock().containers.len()
    }

    /// Record one local transaction of `bytes` against `pool`
    fn commit(&self, state: &mut SimState, pool: Uuid, bytes: i64) {
        self.metrics.increment(USED_CHUNKS_IO, 1i64);
        if !self.md_on_ssd {
            return;
        }
        self.metrics.increment(WAL_SZ, bytes);
        self.metrics.increment(WAL_QD, 1i64);
        self.metrics.increment(WAL_WAITERS, 1i64);
        if let Some(pool) = state.pools.get_mut(&pool) {
            pool.dirty_commits += 1;
            pool.dirty_bytes += bytes;
        }
    }

    fn open_targets(&self, pool: &mut SimPool) {
        if pool.targets_open {
            return;
        }
        pool.targets_open = true;
        if !self.md_on_ssd {
            return;
        }
        self.metrics.increment(REPLAY_COUNT, 1i64);
        self.metrics.increment(REPLAY_ENTRIES, 1i64);
        self.metrics.increment(REPLAY_TRANSACTIONS, 1i64);
        self.metrics.increment(REPLAY_SIZE, POOL_CREATE_RECORD);
        self.metrics.increment(REPLAY_TIME, 1i64);
        debug!(pool = %pool.handle.uuid, "Replayed WAL on target open");
    }

    fn run_due_checkpoints(&self, state: &mut SimState, now: Instant) {
        for pool in state.pools.values_mut() {
            let frequency = match pool.policy {
                CheckpointPolicy::Timed { frequency } => frequency,
                CheckpointPolicy::Lazy | CheckpointPolicy::Disabled => continue,
            };
            if pool.dirty_commits == 0 || now.duration_since(pool.last_checkpoint) < frequency {
                continue;
            }
            let pages = (pool.dirty_bytes + PAGE_SIZE - 1) / PAGE_SIZE;
            self.metrics.increment(CKPT_DURATION, 1i64);
            self.metrics.increment(CKPT_DIRTY_PAGES, pages.max(1));
            self.metrics.increment(CKPT_DIRTY_CHUNKS, 1i64);
            self.metrics
                .increment(CKPT_IOVS_COPIED, MetricValue::from(pool.dirty_commits));
            self.metrics.increment(CKPT_WAL_PURGED, pool.dirty_bytes);
            debug!(
                pool = %pool.handle.uuid,
                commits = pool.dirty_commits,
                "Checkpoint completed"
            );
            pool.dirty_commits = 0;
            pool.dirty_bytes = 0;
            pool.last_checkpoint = now;
        }
    }

    fn pool_of(state: &SimState, container: &ContainerHandle) -> Result<Uuid> {
        state
            .containers
            .get(&container.uuid)
            .map(|c| c.handle.pool)
            .ok_or_else(|| {
                Error::ControlPlane(format!("container {} does not exist", container.uuid))
            })
    }
}

impl FlagReader for SimulatedEngine {
    fn read_feature_flag(&self, name: &str) -> Result<bool> {
        if !self.flags_readable.load(Ordering::Acquire) {
            return Err(Error::configuration(format!(
                "server configuration unavailable while reading '{}'",
                name
            )));
        }
        match name {
            CONTROL_METADATA => Ok(self.md_on_ssd),
            other => Err(Error::configuration(format!("unknown feature flag '{}'", other))),
        }
    }
}

impl StorageControlPlane for SimulatedEngine {
    fn create_pool(&self, properties: &PoolProperties) -> Result<PoolHandle> {
        let policy = properties.checkpoint_policy()?;
        let mut state = self.state.lock();
        let handle = PoolHandle {
            uuid: Uuid::new_v4(),
            label: format!("pool{}", state.pools.len() + 1),
            properties: properties.clone(),
        };
        state.pools.insert(
            handle.uuid,
            SimPool {
                handle: handle.clone(),
                policy,
                targets_open: false,
                dirty_commits: 0,
                dirty_bytes: 0,
                last_checkpoint: Instant::now(),
            },
        );
        info!(pool = %handle, properties = %properties, "Created pool");
        Ok(handle)
    }

    fn create_container(&self, pool: &PoolHandle) -> Result<ContainerHandle> {
        let mut state = self.state.lock();
        let sim_pool = state
            .pools
            .get_mut(&pool.uuid)
            .ok_or_else(|| Error::ControlPlane(format!("pool {} does not exist", pool.uuid)))?;
        self.open_targets(sim_pool);

        let handle = ContainerHandle {
            uuid: Uuid::new_v4(),
            pool: pool.uuid,
        };
        state.containers.insert(
            handle.uuid,
            SimContainer {
                handle: handle.clone(),
                arrays: BTreeMap::new(),
            },
        );
        info!(container = %handle.uuid, pool = %pool.uuid, "Created container");
        Ok(handle)
    }

    fn destroy_container(&self, container: &ContainerHandle) -> Result<()> {
        let mut state = self.state.lock();
        state.containers.remove(&container.uuid).ok_or_else(|| {
            Error::ControlPlane(format!("container {} does not exist", container.uuid))
        })?;
        info!(container = %container.uuid, "Destroyed container");
        Ok(())
    }
}

impl WorkloadRunner for SimulatedEngine {
    fn run(
        &self,
        container: &ContainerHandle,
        params: &WorkloadParams,
    ) -> Result<WorkloadResult> {
        let start = Instant::now();
        let mut state = self.state.lock();
        let pool = Self::pool_of(&state, container)
            .map_err(|e| Error::Workload(format!("ior cannot start: {}", e)))?;

        let (transfers, transfer_size) = match params.flavor {
            IorFlavor::Easy => (EASY_TRANSFERS, EASY_TRANSFER_SIZE),
            IorFlavor::Hard => (HARD_TRANSFERS, HARD_TRANSFER_SIZE),
        };
        let stop_at = params.stop_rank_delay.map(|fraction| {
            let at = (f64::from(transfers) * fraction.clamp(0.0, 1.0)) as u32;
            at.min(transfers - 1)
        });

        for i in 0..transfers {
            if stop_at == Some(i) {
                state.stopped_ranks += 1;
                info!(transfer = i, "Stopped one engine rank during {}", params.phase);
            }
            match params.phase {
                IoPhase::Write => self.commit(&mut state, pool, transfer_size),
                IoPhase::Read => self.metrics.increment(USED_CHUNKS_IO, 1i64),
            }
        }

        let label = format!(
            "ior {:?} {:?} {} {} ({})",
            params.flavor, params.api, params.object_class, params.phase, params.namespace
        );
        Ok(WorkloadResult::completed(label, start.elapsed()))
    }
}

impl ObjectDataPath for SimulatedEngine {
    fn write_array(
        &self,
        container: &ContainerHandle,
        dkey: &[u8],
        akey: &[u8],
        values: &[Vec<u8>],
        obj_class: u32,
    ) -> Result<ObjectId> {
        let mut state = self.state.lock();
        let pool = Self::pool_of(&state, container)
            .map_err(|e| Error::DataPath(e.to_string()))?;
        state.next_object += 1;
        let oid = ObjectId {
            hi: u64::from(obj_class) << 32,
            lo: state.next_object,
        };

        let bytes: usize = values.iter().map(Vec::len).sum();
        if let Some(c) = state.containers.get_mut(&container.uuid) {
            c.arrays
                .insert((oid, dkey.to_vec(), akey.to_vec()), values.to_vec());
        }
        self.commit(&mut state, pool, bytes as i64);
        Ok(oid)
    }

    fn read_array(
        &self,
        container: &ContainerHandle,
        oid: ObjectId,
        count: usize,
        record_len: usize,
        dkey: &[u8],
        akey: &[u8],
    ) -> Result<Vec<Vec<u8>>> {
        let state = self.state.lock();
        let c = state.containers.get(&container.uuid).ok_or_else(|| {
            Error::DataPath(format!("container {} does not exist", container.uuid))
        })?;
        let records = c
            .arrays
            .get(&(oid, dkey.to_vec(), akey.to_vec()))
            .ok_or_else(|| Error::DataPath(format!("object {} has no such array", oid)))?;
        self.metrics.increment(USED_CHUNKS_IO, 1i64);
        Ok(records
            .iter()
            .take(count)
            .map(|r| r.iter().copied().take(record_len).collect())
            .collect())
    }

    fn query_container(&self, container: &ContainerHandle) -> Result<Uuid> {
        let state = self.state.lock();
        state
            .containers
            .get(&container.uuid)
            .map(|c| c.handle.uuid)
            .ok_or_else(|| {
                Error::DataPath(format!("container {} does not exist", container.uuid))
            })
    }
}

impl MetricsSource for SimulatedEngine {
    fn query(&self, names: &[MetricName]) -> Result<BTreeMap<MetricName, MetricValue>> {
        if !self.metrics.is_reachable() {
            return Err(Error::transport("engine telemetry unreachable"));
        }
        {
            let mut state = self.state.lock();
            self.run_due_checkpoints(&mut state, Instant::now());
        }
        self.metrics.query(names)
    }
}
