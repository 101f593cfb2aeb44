//! Phase orchestrator
//!
//! Sequences `sample -> evaluate` around a workload:
//!
//! 1. Baseline: sample and evaluate against the before-range. A failed
//!    baseline is reported in the result and the flow continues.
//! 2. Run the workload, blocking until it returns.
//! 3. Resolve the after-range from the feature flag, once per call.
//! 4. Optionally wait a fixed settle delay for background activity.
//! 5. Sample again and evaluate against the resolved range.
//!
//! Transport, workload, and cancellation errors propagate. Failed verdicts
//! are values; whether they fail the test is the caller's decision.

use crate::collaborators::WorkloadResult;
use crate::settle::{CancelHandle, SettleTimer};
use ftest_core::{ExpectedRange, FeatureFlag, MetricName, Result};
use ftest_telemetry::{evaluate, render_sample, MetricSampler, MetricsSource, VerificationVerdict};
use std::time::Duration;
use tracing::{info, warn};

/// Range to apply after a workload
///
/// With the flag off the monitored code path is inactive, so the counters
/// must not move: `[0, 0]` replaces whatever was requested.
pub fn resolve_range(flag: bool, requested: ExpectedRange) -> ExpectedRange {
    if flag {
        requested
    } else {
        ExpectedRange::exactly_zero()
    }
}

/// What to check before and after a workload
#[derive(Debug, Clone)]
pub struct TransitionPlan {
    names: Vec<MetricName>,
    before: ExpectedRange,
    after: ExpectedRange,
    settle: Option<Duration>,
}

impl TransitionPlan {
    /// Check `names` against `[0, 0]` before and `after` afterwards
    pub fn new<I, N>(names: I, after: ExpectedRange) -> Self
    where
        I: IntoIterator<Item = N>,
        N: Into<MetricName>,
    {
        TransitionPlan {
            names: names.into_iter().map(Into::into).collect(),
            before: ExpectedRange::exactly_zero(),
            after,
            settle: None,
        }
    }

    /// Set the baseline range (builder pattern)
    pub fn with_before(mut self, before: ExpectedRange) -> Self {
        self.before = before;
        self
    }

    /// Wait `delay` between the workload and the final sample (builder pattern)
    pub fn with_settle(mut self, delay: Duration) -> Self {
        self.settle = Some(delay);
        self
    }

    /// Metrics checked in both phases
    pub fn names(&self) -> &[MetricName] {
        &self.names
    }

    /// Baseline range
    pub fn before(&self) -> ExpectedRange {
        self.before
    }

    /// Requested after-range, before flag resolution
    pub fn after(&self) -> ExpectedRange {
        self.after
    }

    /// Settle delay, if any
    pub fn settle(&self) -> Option<Duration> {
        self.settle
    }
}

/// Both verdicts of one transition
#[derive(Debug, Clone)]
pub struct TransitionReport {
    /// Baseline verdict
    pub before: VerificationVerdict,
    /// Post-workload verdict
    pub after: VerificationVerdict,
    /// Range the after-sample was actually held to
    pub effective_after: ExpectedRange,
    /// Workload completion record
    pub workload: WorkloadResult,
}

impl TransitionReport {
    /// True if both verdicts passed
    pub fn ok(&self) -> bool {
        self.before.ok() && self.after.ok()
    }

    /// `(before, after)`
    pub fn into_verdicts(self) -> (VerificationVerdict, VerificationVerdict) {
        (self.before, self.after)
    }
}

/// Runs sample/assert phases for one test case
pub struct PhaseOrchestrator<'a> {
    source: &'a dyn MetricsSource,
    flag: FeatureFlag,
    timer: SettleTimer,
}

impl<'a> PhaseOrchestrator<'a> {
    /// Orchestrator sampling `source`, with after-ranges keyed on `flag`
    pub fn new(source: &'a dyn MetricsSource, flag: FeatureFlag) -> Self {
        PhaseOrchestrator {
            source,
            flag,
            timer: SettleTimer::new(),
        }
    }

    /// Use `timer` for settle delays (builder pattern)
    pub fn with_timer(mut self, timer: SettleTimer) -> Self {
        self.timer = timer;
        self
    }

    /// Handle that cancels a pending settle delay
    pub fn cancel_handle(&self) -> CancelHandle {
        self.timer.cancel_handle()
    }

    /// Flag this orchestrator resolves ranges with
    pub fn flag(&self) -> &FeatureFlag {
        &self.flag
    }

    /// Sample `names` once and evaluate against `range`
    pub fn verify(
        &self,
        names: &[MetricName],
        range: ExpectedRange,
    ) -> Result<VerificationVerdict> {
        let sample = MetricSampler::new(self.source).sample(names)?;
        info!("Metric values:\n{}", render_sample(&sample));

        let verdict = evaluate(&sample, range);
        if verdict.ok() {
            info!(range = %range, "Metric verification passed");
        } else {
            warn!("Metric verification failed\n{}", verdict);
        }
        Ok(verdict)
    }

    /// Baseline check, workload, settle, final check
    pub fn verify_transition<F>(
        &self,
        plan: &TransitionPlan,
        workload: F,
    ) -> Result<TransitionReport>
    where
        F: FnOnce() -> Result<WorkloadResult>,
    {
        info!(metrics = plan.names.len(), range = %plan.before, "Verifying baseline");
        let before = self.verify(&plan.names, plan.before)?;
        if !before.ok() {
            warn!("Baseline check failed; continuing with workload");
        }

        let workload = workload()?;
        info!(
            workload = %workload.label,
            elapsed_ms = workload.elapsed.as_millis() as u64,
            "Workload complete"
        );

        let effective_after = resolve_range(self.flag.is_enabled(), plan.after);
        if effective_after != plan.after {
            info!(
                flag = self.flag.name(),
                requested = %plan.after,
                effective = %effective_after,
                "Flag disabled; expecting metrics to stay at zero"
            );
        }

        if let Some(delay) = plan.settle {
            info!(
                delay_ms = delay.as_millis() as u64,
                "Waiting for background activity to settle"
            );
            self.timer.wait(delay)?;
        }

        info!(metrics = plan.names.len(), range = %effective_after, "Verifying after workload");
        let after = self.verify(&plan.names, effective_after)?;

        Ok(TransitionReport {
            before,
            after,
            effective_after,
            workload,
        })
    }
}
