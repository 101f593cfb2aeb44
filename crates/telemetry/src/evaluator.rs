//! Threshold evaluator
//!
//! Pure range check over a [`MetricSample`]. The verdict keeps one
//! [`MetricCheck`] per requested metric so a failure message can name the
//! exact counter that broke its bound.

use ftest_core::{ExpectedRange, MetricName, MetricSample, MetricValue};
use std::fmt;

/// Outcome for a single metric
#[derive(Debug, Clone, PartialEq)]
pub struct MetricCheck {
    /// Metric that was checked
    pub name: MetricName,
    /// Observed value, `None` if the metric was never emitted
    pub observed: Option<MetricValue>,
    /// Whether the value (absent read as 0) fell inside the range
    pub passed: bool,
}

impl MetricCheck {
    /// Value used for the comparison
    pub fn effective_value(&self) -> f64 {
        self.observed.map_or(0.0, |v| v.as_f64())
    }
}

/// Result of checking a sample against one range
///
/// `ok()` is true iff every check passed. An empty verdict is vacuously ok.
#[derive(Debug, Clone, PartialEq)]
pub struct VerificationVerdict {
    range: ExpectedRange,
    checks: Vec<MetricCheck>,
}

impl VerificationVerdict {
    /// True if every metric satisfied the range
    pub fn ok(&self) -> bool {
        self.checks.iter().all(|c| c.passed)
    }

    /// Range the sample was evaluated against
    pub fn range(&self) -> ExpectedRange {
        self.range
    }

    /// Every per-metric check, in metric name order
    pub fn checks(&self) -> &[MetricCheck] {
        &self.checks
    }

    /// Check for `name`, if it was requested
    pub fn check(&self, name: &str) -> Option<&MetricCheck> {
        self.checks.iter().find(|c| c.name.as_str() == name)
    }

    /// Checks that failed
    pub fn failures(&self) -> impl Iterator<Item = &MetricCheck> {
        self.checks.iter().filter(|c| !c.passed)
    }
}

/// Evaluate every metric in `sample` against `range`
///
/// Absent metrics compare as 0 ("not yet incremented").
pub fn evaluate(sample: &MetricSample, range: ExpectedRange) -> VerificationVerdict {
    let checks = sample
        .iter()
        .map(|(name, observed)| {
            let value = observed.map_or(0.0, |v| v.as_f64());
            MetricCheck {
                name: name.clone(),
                observed,
                passed: range.contains(value),
            }
        })
        .collect();
    VerificationVerdict { range, checks }
}

impl fmt::Display for MetricCheck {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let status = if self.passed { "PASS" } else { "FAIL" };
        match self.observed {
            Some(v) => write!(f, "{}: {} {}", self.name, v, status),
            None => write!(f, "{}: absent (0) {}", self.name, status),
        }
    }
}

impl fmt::Display for VerificationVerdict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let failed = self.failures().count();
        if failed == 0 {
            write!(
                f,
                "PASS: {} metric(s) within expected {}",
                self.checks.len(),
                self.range
            )?;
        } else {
            write!(
                f,
                "FAIL: {} of {} metric(s) outside expected {}",
                failed,
                self.checks.len(),
                self.range
            )?;
        }
        for check in &self.checks {
            write!(f, "\n  {}", check)?;
        }
        Ok(())
    }
}
