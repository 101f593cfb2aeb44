//! Metric names, values, and point-in-time samples
//!
//! A [`MetricSample`] maps every requested [`MetricName`] to its observed
//! value, or to nothing when the engine never emitted that counter.

use std::borrow::Borrow;
use std::collections::BTreeMap;
use std::fmt;

/// Name of a single exported counter, e.g. `engine_dmabuff_wal_sz`
///
/// Opaque to the suite: the namespace is defined by the metrics source.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct MetricName(String);

impl MetricName {
    /// Create a metric name
    pub fn new(name: impl Into<String>) -> Self {
        MetricName(name.into())
    }

    /// Borrow the name as a string slice
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for MetricName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for MetricName {
    fn from(name: &str) -> Self {
        MetricName(name.to_string())
    }
}

impl From<String> for MetricName {
    fn from(name: String) -> Self {
        MetricName(name)
    }
}

impl AsRef<str> for MetricName {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl Borrow<str> for MetricName {
    fn borrow(&self) -> &str {
        &self.0
    }
}

/// Numeric value of a counter, gauge, or timer
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum MetricValue {
    /// Integral counter value
    Integer(i64),
    /// Fractional value (durations, averages)
    Float(f64),
}

impl MetricValue {
    /// Value projected onto `f64` for range comparison
    pub fn as_f64(&self) -> f64 {
        match self {
            MetricValue::Integer(v) => *v as f64,
            MetricValue::Float(v) => *v,
        }
    }

    /// `self - other`, staying integral when both sides are
    pub fn difference(&self, other: &MetricValue) -> MetricValue {
        match (self, other) {
            (MetricValue::Integer(a), MetricValue::Integer(b)) => {
                MetricValue::Integer(a.saturating_sub(*b))
            }
            _ => MetricValue::Float(self.as_f64() - other.as_f64()),
        }
    }

    /// `self + other`, staying integral when both sides are
    pub fn sum(&self, other: &MetricValue) -> MetricValue {
        match (self, other) {
            (MetricValue::Integer(a), MetricValue::Integer(b)) => {
                MetricValue::Integer(a.saturating_add(*b))
            }
            _ => MetricValue::Float(self.as_f64() + other.as_f64()),
        }
    }
}

impl fmt::Display for MetricValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MetricValue::Integer(v) => write!(f, "{}", v),
            MetricValue::Float(v) => write!(f, "{}", v),
        }
    }
}

impl From<i64> for MetricValue {
    fn from(v: i64) -> Self {
        MetricValue::Integer(v)
    }
}

impl From<u64> for MetricValue {
    fn from(v: u64) -> Self {
        match i64::try_from(v) {
            Ok(v) => MetricValue::Integer(v),
            Err(_) => MetricValue::Float(v as f64),
        }
    }
}

impl From<f64> for MetricValue {
    fn from(v: f64) -> Self {
        MetricValue::Float(v)
    }
}

/// Point-in-time values for a fixed set of metric names
///
/// `None` means the metric was requested but never emitted. A sample is
/// built once and only read afterwards; each phase takes a fresh one.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct MetricSample {
    values: BTreeMap<MetricName, Option<MetricValue>>,
}

impl MetricSample {
    /// Build a sample covering exactly `names`
    ///
    /// Readings for names that were not requested are dropped.
    pub fn from_readings(
        names: impl IntoIterator<Item = MetricName>,
        mut readings: BTreeMap<MetricName, MetricValue>,
    ) -> Self {
        let values = names
            .into_iter()
            .map(|name| {
                let value = readings.remove(&name);
                (name, value)
            })
            .collect();
        MetricSample { values }
    }

    /// Observed value, `None` when absent or not requested
    pub fn value(&self, name: &str) -> Option<MetricValue> {
        self.values.get(name).copied().flatten()
    }

    /// Observed value with "absent" read as 0
    pub fn value_or_zero(&self, name: &str) -> f64 {
        self.value(name).map_or(0.0, |v| v.as_f64())
    }

    /// True if `name` was part of the request
    pub fn contains(&self, name: &str) -> bool {
        self.values.contains_key(name)
    }

    /// Requested names in sorted order
    pub fn names(&self) -> impl Iterator<Item = &MetricName> {
        self.values.keys()
    }

    /// `(name, value)` pairs in sorted name order
    pub fn iter(&self) -> impl Iterator<Item = (&MetricName, Option<MetricValue>)> {
        self.values.iter().map(|(k, v)| (k, *v))
    }

    /// Number of requested names
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// True if no names were requested
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Number of names that carried a value
    pub fn present(&self) -> usize {
        self.values.values().filter(|v| v.is_some()).count()
    }

    /// Per-metric change from `before` to `self`
    ///
    /// Covers the names of `self`. Absent is read as 0 on either side,
    /// except that a name absent in both samples stays absent.
    pub fn delta(&self, before: &MetricSample) -> MetricSample {
        let values = self
            .values
            .iter()
            .map(|(name, after)| {
                let prior = before.value(name.as_str());
                let change = match (after, prior) {
                    (None, None) => None,
                    (Some(a), None) => Some(*a),
                    (None, Some(b)) => Some(MetricValue::Integer(0).difference(&b)),
                    (Some(a), Some(b)) => Some(a.difference(&b)),
                };
                (name.clone(), change)
            })
            .collect();
        MetricSample { values }
    }
}
