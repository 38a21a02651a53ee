//! Summary Statistics
//!
//! Streaming accumulation of count, mean and variance using Welford's
//! single-pass update:
//!
//! ```text
//! n     = n + 1
//! delta = x - mean
//! mean  = mean + delta / n
//! M2    = M2 + delta * (x - mean)
//! ```
//!
//! No raw values are retained, and the variance never goes through a
//! sum-of-squares subtraction, so large sample counts stay numerically stable.

use serde::{Deserialize, Serialize};

/// Errors raised when a statistic is requested from an empty input
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum StatsError {
    #[error("Cannot summarize an empty set of measurements")]
    EmptyInput,
}

/// Online accumulator of count, mean, variance and extremes
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SummaryStatistic {
    count: u64,
    mean: f64,
    m2: f64,
    sum: f64,
    min: f64,
    max: f64,
}

impl Default for SummaryStatistic {
    fn default() -> Self {
        Self::new()
    }
}

impl SummaryStatistic {
    /// Create an empty accumulator
    pub fn new() -> Self {
        Self {
            count: 0,
            mean: 0.0,
            m2: 0.0,
            sum: 0.0,
            min: f64::INFINITY,
            max: f64::NEG_INFINITY,
        }
    }

    /// Fold one value into the accumulator
    pub fn add(&mut self, x: f64) {
        self.count += 1;
        let delta = x - self.mean;
        self.mean += delta / self.count as f64;
        self.m2 += delta * (x - self.mean);
        self.sum += x;
        self.min = self.min.min(x);
        self.max = self.max.max(x);
    }

    /// Combine another accumulator into this one.
    ///
    /// Uses the pairwise update of Chan, Golub and LeVeque, so the result
    /// matches feeding both streams through [`add`](Self::add) up to rounding.
    pub fn merge(&mut self, other: &SummaryStatistic) {
        if other.count == 0 {
            return;
        }
        if self.count == 0 {
            *self = *other;
            return;
        }

        let n_a = self.count as f64;
        let n_b = other.count as f64;
        let n = n_a + n_b;
        let delta = other.mean - self.mean;

        self.mean += delta * n_b / n;
        self.m2 += other.m2 + delta * delta * n_a * n_b / n;
        self.count += other.count;
        self.sum += other.sum;
        self.min = self.min.min(other.min);
        self.max = self.max.max(other.max);
    }

    /// Number of values seen
    pub fn count(&self) -> u64 {
        self.count
    }

    /// Whether no value has been added yet
    pub fn is_empty(&self) -> bool {
        self.count == 0
    }

    /// Arithmetic mean; `None` when empty
    pub fn mean(&self) -> Option<f64> {
        (self.count > 0).then_some(self.mean)
    }

    /// Unbiased sample variance (`M2 / (n - 1)`), `0.0` for a single value
    pub fn variance(&self) -> Option<f64> {
        match self.count {
            0 => None,
            1 => Some(0.0),
            n => Some(self.m2 / (n - 1) as f64),
        }
    }

    /// Sample standard deviation
    pub fn std_dev(&self) -> Option<f64> {
        self.variance().map(f64::sqrt)
    }

    /// Sum of all values
    pub fn sum(&self) -> f64 {
        self.sum
    }

    /// Smallest value seen
    pub fn min(&self) -> Option<f64> {
        (self.count > 0).then_some(self.min)
    }

    /// Largest value seen
    pub fn max(&self) -> Option<f64> {
        (self.count > 0).then_some(self.max)
    }

    /// Summarize a slice, failing on empty input
    pub fn from_slice(values: &[f64]) -> Result<Self, StatsError> {
        if values.is_empty() {
            return Err(StatsError::EmptyInput);
        }
        Ok(values.iter().copied().collect())
    }
}

impl Extend<f64> for SummaryStatistic {
    fn extend<I: IntoIterator<Item = f64>>(&mut self, iter: I) {
        for x in iter {
            self.add(x);
        }
    }
}

impl FromIterator<f64> for SummaryStatistic {
    fn from_iter<I: IntoIterator<Item = f64>>(iter: I) -> Self {
        let mut stat = Self::new();
        stat.extend(iter);
        stat
    }
}
