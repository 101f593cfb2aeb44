//! Metrics source abstraction
//!
//! The suite never knows how counters travel from an engine to the test
//! process. It only needs `query`, which must be a side-effect-free read.

use ftest_core::{Error, MetricName, MetricValue, Result};
use parking_lot::RwLock;
use std::collections::BTreeMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// Read access to exported engine counters
pub trait MetricsSource {
    /// Current values for `names`
    ///
    /// Names the source has never emitted are left out of the map; that
    /// is not an error. Unreachable sources return [`Error::Transport`].
    fn query(&self, names: &[MetricName]) -> Result<BTreeMap<MetricName, MetricValue>>;
}

impl<T: MetricsSource + ?Sized> MetricsSource for &T {
    fn query(&self, names: &[MetricName]) -> Result<BTreeMap<MetricName, MetricValue>> {
        (**self).query(names)
    }
}

impl<T: MetricsSource + ?Sized> MetricsSource for Arc<T> {
    fn query(&self, names: &[MetricName]) -> Result<BTreeMap<MetricName, MetricValue>> {
        (**self).query(names)
    }
}

/// Process-local metrics registry
///
/// Backs unit tests and the simulated engine. Reachability can be toggled
/// to exercise transport failures.
#[derive(Debug)]
pub struct InMemoryMetricsSource {
    values: RwLock<BTreeMap<MetricName, MetricValue>>,
    reachable: AtomicBool,
}

impl Default for InMemoryMetricsSource {
    fn default() -> Self {
        Self::new()
    }
}

impl InMemoryMetricsSource {
    /// Empty, reachable registry
    pub fn new() -> Self {
        InMemoryMetricsSource {
            values: RwLock::new(BTreeMap::new()),
            reachable: AtomicBool::new(true),
        }
    }

    /// Overwrite the value of `name`
    pub fn set(&self, name: impl Into<MetricName>, value: impl Into<MetricValue>) {
        self.values.write().insert(name.into(), value.into());
    }

    /// Add `by` to `name`, creating it at `by` if absent
    pub fn increment(&self, name: impl Into<MetricName>, by: impl Into<MetricValue>) {
        let by = by.into();
        let mut values = self.values.write();
        values
            .entry(name.into())
            .and_modify(|v| *v = v.sum(&by))
            .or_insert(by);
    }

    /// Current value of `name`, bypassing reachability
    pub fn peek(&self, name: &str) -> Option<MetricValue> {
        self.values.read().get(name).copied()
    }

    /// Forget every metric
    pub fn reset(&self) {
        self.values.write().clear();
    }

    /// Make subsequent queries succeed (`true`) or fail with a transport error
    pub fn set_reachable(&self, reachable: bool) {
        self.reachable.store(reachable, Ordering::Release);
    }

    /// True unless made unreachable with [`set_reachable`](Self::set_reachable)
    pub fn is_reachable(&self) -> bool {
        self.reachable.load(Ordering::Acquire)
    }
}

impl MetricsSource for InMemoryMetricsSource {
    fn query(&self, names: &[MetricName]) -> Result<BTreeMap<MetricName, MetricValue>> {
        if !self.is_reachable() {
            return Err(Error::transport("metrics source unreachable"));
        }
        let values = self.values.read();
        Ok(names
            .iter()
            .filter_map(|name| values.get(name).map(|v| (name.clone(), *v)))
            .collect())
    }
}
