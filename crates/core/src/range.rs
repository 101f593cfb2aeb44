//! Expected value ranges for metric verification

use crate::error::{Error, Result};
use std::fmt;

/// Inclusive range a metric value must fall in
///
/// `max = None` leaves the range unbounded above. When bounded,
/// `min <= max` always holds.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ExpectedRange {
    min: f64,
    max: Option<f64>,
}

impl ExpectedRange {
    /// Create a range, rejecting unordered or NaN bounds
    pub fn new(min: f64, max: Option<f64>) -> Result<Self> {
        let invalid = || Error::InvalidRange {
            min,
            max: max.unwrap_or(f64::INFINITY),
        };
        if min.is_nan() {
            return Err(invalid());
        }
        if let Some(max) = max {
            if max.is_nan() || min > max {
                return Err(invalid());
            }
        }
        Ok(ExpectedRange { min, max })
    }

    /// The zero-width range `[0, 0]`: metric must not have moved
    pub fn exactly_zero() -> Self {
        ExpectedRange {
            min: 0.0,
            max: Some(0.0),
        }
    }

    /// `[min, inf)`
    ///
    /// A NaN minimum is replaced by 0.
    pub fn at_least(min: f64) -> Self {
        ExpectedRange {
            min: if min.is_nan() { 0.0 } else { min },
            max: None,
        }
    }

    /// `[min, max]`
    pub fn between(min: f64, max: f64) -> Result<Self> {
        Self::new(min, Some(max))
    }

    /// Lower bound
    pub fn min(&self) -> f64 {
        self.min
    }

    /// Upper bound, `None` when unbounded
    pub fn max(&self) -> Option<f64> {
        self.max
    }

    /// True if `value` lies inside the range
    pub fn contains(&self, value: f64) -> bool {
        self.min <= value && self.max.map_or(true, |max| value <= max)
    }
}

impl fmt::Display for ExpectedRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.max {
            Some(max) => write!(f, "[{}, {}]", self.min, max),
            None => write!(f, "[{}, inf)", self.min),
        }
    }
}
