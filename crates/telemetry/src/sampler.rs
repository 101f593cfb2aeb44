//! Metric sampler: one read of the metrics source per call

use crate::source::MetricsSource;
use ftest_core::{MetricName, MetricSample, Result};
use std::collections::{BTreeMap, BTreeSet};
use tracing::debug;

/// Takes point-in-time samples from a [`MetricsSource`]
pub struct MetricSampler<'a> {
    source: &'a dyn MetricsSource,
}

impl<'a> MetricSampler<'a> {
    /// Sampler reading from `source`
    pub fn new(source: &'a dyn MetricsSource) -> Self {
        MetricSampler { source }
    }

    /// Sample the current value of every name in `names`
    ///
    /// The result covers exactly the requested names (duplicates collapse);
    /// unknown names are absent. Transport failures propagate unmodified and
    /// are not retried.
    pub fn sample(&self, names: &[MetricName]) -> Result<MetricSample> {
        let requested: Vec<MetricName> = names
            .iter()
            .cloned()
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect();
        if requested.is_empty() {
            return Ok(MetricSample::from_readings(requested, BTreeMap::new()));
        }

        let readings = self.source.query(&requested)?;
        let sample = MetricSample::from_readings(requested, readings);
        debug!(
            requested = sample.len(),
            present = sample.present(),
            "Sampled metrics"
        );
        Ok(sample)
    }
}
