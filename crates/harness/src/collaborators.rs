//! Interfaces to the systems a test case drives
//!
//! The suite owns none of these: pools and containers come from the control
//! plane, IOR runs through the workload runner, and raw array I/O goes
//! through the object data path.

use ftest_core::{
    ContainerHandle, Error, FlagReader, ObjectId, PoolHandle, PoolProperties, Result,
};
use std::fmt;
use std::time::Duration;
use uuid::Uuid;

/// Pool and container lifecycle plus run-wide flags
pub trait StorageControlPlane: FlagReader {
    /// Create a pool with `properties`
    fn create_pool(&self, properties: &PoolProperties) -> Result<PoolHandle>;

    /// Create a container in `pool`
    fn create_container(&self, pool: &PoolHandle) -> Result<ContainerHandle>;

    /// Destroy `container`
    fn destroy_container(&self, container: &ContainerHandle) -> Result<()>;
}

/// Runs a benchmark workload to completion
pub trait WorkloadRunner {
    /// Run `params` against `container`, blocking until it finishes
    fn run(
        &self,
        container: &ContainerHandle,
        params: &WorkloadParams,
    ) -> Result<WorkloadResult>;
}

/// Raw array reads and writes on objects
pub trait ObjectDataPath {
    /// Write `values` as consecutive array records under `dkey`/`akey`
    fn write_array(
        &self,
        container: &ContainerHandle,
        dkey: &[u8],
        akey: &[u8],
        values: &[Vec<u8>],
        obj_class: u32,
    ) -> Result<ObjectId>;

    /// Read `count` records of at most `record_len` bytes each
    fn read_array(
        &self,
        container: &ContainerHandle,
        oid: ObjectId,
        count: usize,
        record_len: usize,
        dkey: &[u8],
        akey: &[u8],
    ) -> Result<Vec<Vec<u8>>>;

    /// UUID the engine reports for `container`
    fn query_container(&self, container: &ContainerHandle) -> Result<Uuid>;
}

/// Opaque completion record of a workload
#[derive(Debug, Clone, PartialEq)]
pub struct WorkloadResult {
    /// What ran
    pub label: String,
    /// Wall time
    pub elapsed: Duration,
}

impl WorkloadResult {
    /// Completion record for `label`
    pub fn completed(label: impl Into<String>, elapsed: Duration) -> Self {
        WorkloadResult {
            label: label.into(),
            elapsed,
        }
    }
}

/// IOR access pattern
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IorFlavor {
    /// Large sequential transfers, file per process
    Easy,
    /// Small unaligned transfers into one shared file
    Hard,
}

/// I/O interface IOR drives
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IorApi {
    /// Native file system API
    Dfs,
    /// POSIX through the FUSE mount
    Dfuse,
    /// MPI-IO
    Mpiio,
    /// HDF5
    Hdf5,
}

/// Interception library preloaded for POSIX runs
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Interception {
    /// No interception
    None,
    /// I/O interception library
    Il,
    /// Full POSIX interception library
    Pil4dfs,
}

/// Workload phase
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IoPhase {
    /// Write the data set
    Write,
    /// Read it back
    Read,
}

impl fmt::Display for IoPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            IoPhase::Write => f.write_str("write"),
            IoPhase::Read => f.write_str("read"),
        }
    }
}

/// One IOR invocation
#[derive(Debug, Clone, PartialEq)]
pub struct WorkloadParams {
    /// Parameter namespace, e.g. `/run/ior_dfs_sx/*`
    pub namespace: String,
    /// Access pattern
    pub flavor: IorFlavor,
    /// I/O interface
    pub api: IorApi,
    /// Interception library
    pub interception: Interception,
    /// Object class, e.g. `SX` or `EC_16P2GX`
    pub object_class: String,
    /// Write or read
    pub phase: IoPhase,
    /// Stop one engine rank after this fraction of the phase has run
    pub stop_rank_delay: Option<f64>,
}

impl WorkloadParams {
    /// Derive parameters from a namespace like `/run/ior_dfuse_il_ec_16p2gx/*`
    ///
    /// Segments that are not present fall back to DFS, no interception,
    /// and object class `SX`.
    pub fn from_namespace(namespace: &str, flavor: IorFlavor, phase: IoPhase) -> Result<Self> {
        let segment = namespace
            .strip_prefix("/run/")
            .and_then(|s| s.strip_suffix("/*"))
            .filter(|s| !s.is_empty() && !s.contains('/'))
            .ok_or_else(|| {
                Error::configuration(format!(
                    "IOR namespace '{}' is not of the form /run/<name>/*",
                    namespace
                ))
            })?;

        let mut tokens: Vec<&str> = segment.split('_').collect();
        if tokens.first() == Some(&"ior") {
            tokens.remove(0);
        }

        let mut api = IorApi::Dfs;
        let mut interception = Interception::None;
        let mut rest = tokens.as_slice();
        if let Some((first, tail)) = rest.split_first() {
            let parsed = match *first {
                "dfs" => Some(IorApi::Dfs),
                "dfuse" => Some(IorApi::Dfuse),
                "mpiio" => Some(IorApi::Mpiio),
                "hdf5" => Some(IorApi::Hdf5),
                _ => None,
            };
            if let Some(parsed) = parsed {
                api = parsed;
                rest = tail;
            }
        }
        if let Some((first, tail)) = rest.split_first() {
            let parsed = match *first {
                "il" => Some(Interception::Il),
                "pil4dfs" => Some(Interception::Pil4dfs),
                _ => None,
            };
            if let Some(parsed) = parsed {
                interception = parsed;
                rest = tail;
            }
        }
        let object_class = if rest.is_empty() {
            "SX".to_string()
        } else {
            rest.join("_").to_uppercase()
        };

        Ok(WorkloadParams {
            namespace: namespace.to_string(),
            flavor,
            api,
            interception,
            object_class,
            phase,
            stop_rank_delay: None,
        })
    }

    /// Stop a rank part-way through the phase (builder pattern)
    pub fn with_stop_rank_delay(mut self, delay: Option<f64>) -> Self {
        self.stop_rank_delay = delay;
        self
    }
}
