//! Test-case drivers
//!
//! Each case provisions what it needs through the collaborators, drives a
//! workload, and turns verdicts into a [`CaseOutcome`]. Infrastructure
//! failures (transport, configuration, workload) are returned as `Err`.

use crate::collaborators::{
    IoPhase, IorFlavor, ObjectDataPath, StorageControlPlane, WorkloadParams, WorkloadResult,
    WorkloadRunner,
};
use crate::config::SuiteConfig;
use crate::logging::Steps;
use crate::orchestrator::{PhaseOrchestrator, TransitionPlan, TransitionReport};
use ftest_core::{
    format_frequency, ContainerHandle, ExpectedRange, FeatureFlag, PoolProperties, Result,
};
use ftest_telemetry::{catalog, MetricsSource};
use std::fmt;
use tracing::{error, info};

/// Object class used by the array object case
const ARRAY_OBJ_CLASS: u32 = 3;

/// Pass/fail result of one case
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CaseOutcome {
    /// Every assertion held
    Passed,
    /// An assertion failed; the reason names it
    Failed(String),
}

impl CaseOutcome {
    /// True for [`CaseOutcome::Passed`]
    pub fn passed(&self) -> bool {
        matches!(self, CaseOutcome::Passed)
    }
}

impl fmt::Display for CaseOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CaseOutcome::Passed => f.write_str("PASS"),
            CaseOutcome::Failed(reason) => write!(f, "FAIL: {}", reason),
        }
    }
}

/// Everything a case talks to
pub struct TestBed<'a> {
    /// Pool/container lifecycle and flags
    pub control: &'a dyn StorageControlPlane,
    /// IOR driver
    pub runner: &'a dyn WorkloadRunner,
    /// Raw object I/O
    pub data: &'a dyn ObjectDataPath,
    /// Engine telemetry
    pub metrics: &'a dyn MetricsSource,
    /// Suite settings
    pub config: &'a SuiteConfig,
}

impl<'a> TestBed<'a> {
    fn orchestrator(&self) -> Result<PhaseOrchestrator<'a>> {
        self.config.validate()?;
        let flag = FeatureFlag::resolve(self.control, &self.config.metadata_flag)?;
        info!(flag = flag.name(), enabled = flag.is_enabled(), "Resolved feature flag");
        Ok(PhaseOrchestrator::new(self.metrics, flag))
    }

    /// Write data into `container` with IOR
    fn write_data(&self, container: &ContainerHandle) -> Result<WorkloadResult> {
        let params = WorkloadParams::from_namespace(
            &self.config.ior.write_namespace,
            IorFlavor::Easy,
            IoPhase::Write,
        )?;
        self.runner.run(container, &params)
    }
}

fn judge(report: &TransitionReport, before_msg: &str, after_msg: &str) -> CaseOutcome {
    if !report.before.ok() {
        return CaseOutcome::Failed(format!("{}\n{}", before_msg, report.before));
    }
    if !report.after.ok() {
        return CaseOutcome::Failed(format!("{}\n{}", after_msg, report.after));
    }
    CaseOutcome::Passed
}

fn finish(steps: &Steps, outcome: CaseOutcome) -> CaseOutcome {
    match &outcome {
        CaseOutcome::Passed => steps.log("Test passed"),
        CaseOutcome::Failed(reason) => error!("Test failed: {}", reason),
    }
    outcome
}

/// WAL commit metrics grow with local transactions
///
/// Zero before writing data; at least 1 after, or still zero when metadata
/// is not on SSD.
pub fn wal_commit_metrics(bed: &TestBed<'_>) -> Result<CaseOutcome> {
    let steps = Steps::new("wal_commit_metrics");
    let orchestrator = bed.orchestrator()?;

    steps.log("Creating a pool");
    let pool = bed.control.create_pool(&PoolProperties::default())?;

    steps.log("Creating a container");
    let container = bed.control.create_container(&pool)?;

    steps.log("Verify WAL commit metrics before writing data");
    let plan = TransitionPlan::new(catalog::wal_commit_metrics(), ExpectedRange::at_least(1.0));
    let report = orchestrator.verify_transition(&plan, || {
        steps.log("Writing data (ior)");
        let result = bed.write_data(&container)?;
        steps.log("Verify WAL commit metrics after writing data");
        Ok(result)
    })?;

    Ok(finish(
        &steps,
        judge(
            &report,
            "Unexpected WAL commit metrics before writing data",
            "Unexpected WAL commit metrics after writing data",
        ),
    ))
}

/// WAL replay metrics move once pool targets are opened
pub fn wal_replay_metrics(bed: &TestBed<'_>) -> Result<CaseOutcome> {
    let steps = Steps::new("wal_replay_metrics");
    let orchestrator = bed.orchestrator()?;

    steps.log("Creating a pool");
    let pool = bed.control.create_pool(&PoolProperties::default())?;

    steps.log("Verify WAL replay metrics after pool creation");
    let plan = TransitionPlan::new(catalog::wal_replay_metrics(), ExpectedRange::at_least(1.0));
    let report = orchestrator.verify_transition(&plan, || {
        steps.log("Creating a container");
        let container = bed.control.create_container(&pool)?;
        steps.log("Writing data (ior)");
        let result = bed.write_data(&container)?;
        steps.log("Verify WAL replay metrics after writing data");
        Ok(result)
    })?;

    Ok(finish(
        &steps,
        judge(
            &report,
            "Unexpected WAL replay metrics after pool creation",
            "Unexpected WAL replay metrics after writing data",
        ),
    ))
}

/// Timed checkpoints update checkpoint metrics once there is dirty data
pub fn wal_checkpoint_metrics(bed: &TestBed<'_>) -> Result<CaseOutcome> {
    let steps = Steps::new("wal_checkpoint_metrics");
    let orchestrator = bed.orchestrator()?;
    let frequency = bed.config.checkpoint_frequency();
    let settle = bed.config.checkpoint_settle();

    steps.log("Creating a pool");
    let properties = PoolProperties::default()
        .with("checkpoint", "timed")
        .with("checkpoint_freq", format_frequency(frequency));
    let pool = bed.control.create_pool(&properties)?;

    steps.log("Creating a container");
    let container = bed.control.create_container(&pool)?;
    info!(pool = %pool, frequency_ms = frequency.as_millis() as u64, "Checkpoint frequency");

    steps.log("Verify WAL checkpoint metrics before writing data");
    let plan = TransitionPlan::new(
        catalog::wal_checkpoint_metrics(),
        ExpectedRange::at_least(1.0),
    )
    .with_settle(settle);
    let report = orchestrator.verify_transition(&plan, || {
        steps.log("Writing data (ior)");
        let result = bed.write_data(&container)?;
        steps.log(&format!(
            "Waiting for check pointing to complete ({} ms)",
            settle.as_millis()
        ));
        Ok(result)
    })?;

    Ok(finish(
        &steps,
        judge(
            &report,
            "Unexpected WAL checkpoint metrics before writing data",
            "Unexpected WAL checkpoint metrics after writing data",
        ),
    ))
}

/// Write an array to an object, read it back, and compare
pub fn array_object(bed: &TestBed<'_>) -> Result<CaseOutcome> {
    bed.config.validate()?;
    let steps = Steps::new("array_object");

    steps.log("Creating a pool");
    let pool = bed.control.create_pool(&PoolProperties::default())?;

    steps.log("Creating a container");
    let container = bed.control.create_container(&pool)?;
    info!(container = %container.uuid, "Container created");

    let reported = bed.data.query_container(&container)?;
    if reported != container.uuid {
        return Ok(finish(
            &steps,
            CaseOutcome::Failed(format!(
                "Container UUID did not match the one in info: {} != {}",
                container.uuid, reported
            )),
        ));
    }

    let data: Vec<Vec<u8>> = vec![
        b"data string one".to_vec(),
        b"data string two".to_vec(),
        b"data string tre".to_vec(),
    ];
    let dkey = b"this is the dkey";
    let akey = b"this is the akey";

    steps.log("Writing array");
    let oid = bed
        .data
        .write_array(&container, dkey, akey, &data, ARRAY_OBJ_CLASS)?;

    steps.log("Reading array back");
    let length = data[0].len();
    let read = bed
        .data
        .read_array(&container, oid, data.len(), length + 1, dkey, akey)?;

    // Only the first `length - 1` bytes of a record are compared.
    let cmp = length - 1;
    for index in [0, 2] {
        let wrote = &data[index][..cmp];
        let got = read.get(index).map(|r| &r[..cmp.min(r.len())]);
        if got != Some(wrote) {
            error!(
                wrote = %String::from_utf8_lossy(&data[index]),
                read = %got.map(String::from_utf8_lossy).unwrap_or_default(),
                "Data mismatch"
            );
            return Ok(finish(
                &steps,
                CaseOutcome::Failed("Write data, read it back, didn't match".to_string()),
            ));
        }
    }

    steps.log("Destroying container");
    bed.control.destroy_container(&container)?;
    Ok(finish(&steps, CaseOutcome::Passed))
}

/// One row of an IOR performance table
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct IorCase {
    /// Case name
    pub name: &'static str,
    /// Parameter namespace
    pub namespace: &'static str,
    /// Stop a rank this far into the write phase
    pub stop_delay_write: Option<f64>,
    /// Stop a rank this far into the read phase
    pub stop_delay_read: Option<f64>,
}

const fn ior(name: &'static str, namespace: &'static str) -> IorCase {
    IorCase {
        name,
        namespace,
        stop_delay_write: None,
        stop_delay_read: None,
    }
}

/// IOR easy cases
pub const IOR_EASY_CASES: &[IorCase] = &[
    ior("ior_easy_dfs_sx", "/run/ior_dfs_sx/*"),
    ior("ior_easy_dfs_ec_16p2gx", "/run/ior_dfs_ec_16p2gx/*"),
    ior("ior_easy_dfuse_il_sx", "/run/ior_dfuse_il_sx/*"),
    ior("ior_easy_dfuse_pil4dfs_sx", "/run/ior_dfuse_pil4dfs_sx/*"),
    ior("ior_easy_dfuse_il_ec_16p2gx", "/run/ior_dfuse_il_ec_16p2gx/*"),
    ior("ior_easy_dfuse_pil4dfs_ec_16p2gx", "/run/ior_dfuse_pil4dfs_ec_16p2gx/*"),
    IorCase {
        stop_delay_write: Some(0.5),
        ..ior("ior_easy_dfs_ec_4p2gx_stop_write", "/run/ior_dfs_ec_4p2gx/*")
    },
    IorCase {
        stop_delay_read: Some(0.5),
        ..ior("ior_easy_dfs_ec_4p2gx_stop_read", "/run/ior_dfs_ec_4p2gx/*")
    },
    IorCase {
        stop_delay_write: Some(0.5),
        ..ior("ior_easy_dfs_ec_16p2gx_stop_write", "/run/ior_dfs_ec_16p2gx/*")
    },
    IorCase {
        stop_delay_read: Some(0.5),
        ..ior("ior_easy_dfs_ec_16p2gx_stop_read", "/run/ior_dfs_ec_16p2gx/*")
    },
    ior("ior_easy_hdf5_sx", "/run/ior_hdf5_sx/*"),
    ior("ior_easy_mpiio_sx", "/run/ior_mpiio_sx/*"),
];

/// IOR hard cases
pub const IOR_HARD_CASES: &[IorCase] = &[
    ior("ior_hard_dfs_sx", "/run/ior_dfs_sx/*"),
    ior("ior_hard_dfs_ec_16p2gx", "/run/ior_dfs_ec_16p2gx/*"),
    ior("ior_hard_dfuse_il_sx", "/run/ior_dfuse_il_sx/*"),
    ior("ior_hard_dfuse_pil4dfs_sx", "/run/ior_dfuse_pil4dfs_sx/*"),
    ior("ior_hard_dfuse_il_ec_16p2gx", "/run/ior_dfuse_il_ec_16p2gx/*"),
    ior("ior_hard_dfuse_pil4dfs_ec_16p2gx", "/run/ior_dfuse_pil4dfs_ec_16p2gx/*"),
];

/// Create a pool and container, then run IOR write and read phases
pub fn run_performance_ior(
    bed: &TestBed<'_>,
    flavor: IorFlavor,
    namespace: &str,
    stop_delay_write: Option<f64>,
    stop_delay_read: Option<f64>,
) -> Result<CaseOutcome> {
    bed.config.validate()?;
    let steps = Steps::new("performance_ior");

    steps.log("Creating a pool");
    let pool = bed.control.create_pool(&PoolProperties::default())?;

    steps.log("Creating a container");
    let container = bed.control.create_container(&pool)?;

    for (phase, stop_delay) in [
        (IoPhase::Write, stop_delay_write),
        (IoPhase::Read, stop_delay_read),
    ] {
        steps.log(&format!("Running IOR {} ({})", phase, namespace));
        let params = WorkloadParams::from_namespace(namespace, flavor, phase)?
            .with_stop_rank_delay(stop_delay);
        let result = bed.runner.run(&container, &params)?;
        info!(
            workload = %result.label,
            elapsed_ms = result.elapsed.as_millis() as u64,
            "IOR phase complete"
        );
    }

    Ok(finish(&steps, CaseOutcome::Passed))
}

/// Run one row of [`IOR_EASY_CASES`] or [`IOR_HARD_CASES`]
pub fn run_ior_case(
    bed: &TestBed<'_>,
    flavor: IorFlavor,
    case: &IorCase,
) -> Result<CaseOutcome> {
    info!(case = case.name, "Running performance case");
    run_performance_ior(
        bed,
        flavor,
        case.namespace,
        case.stop_delay_write,
        case.stop_delay_read,
    )
}
