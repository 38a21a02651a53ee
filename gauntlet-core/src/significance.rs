//! Pairwise Significance
//!
//! Compares the per-iteration values of two keys (normally two tests at the
//! same parameter) with Welch's t-test. Sample sizes may differ when some
//! runs failed; whatever was recorded is used.

use crate::results::{Measurement, MeasurementKey, ResultSet, SpecId};
use gauntlet_stats::{ComparisonError, WelchTTest, welch_t_test};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Which recorded quantity to compare
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Metric {
    /// Wall-clock runtime in milliseconds
    Runtime,
    /// One dimension of the test's output vector
    Output(usize),
}

impl fmt::Display for Metric {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Metric::Runtime => write!(f, "runtime"),
            Metric::Output(i) => write!(f, "value{}", i),
        }
    }
}

/// Errors from significance comparisons
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum SignificanceError {
    #[error("No results recorded for key (spec {}, param {})", .0.spec().index(), .0.param())]
    UnknownKey(MeasurementKey),
    #[error("Output dimension {dimension} out of range ({available} available)")]
    DimensionOutOfRange { dimension: usize, available: usize },
    #[error("Insufficient data: {0}")]
    Insufficient(#[from] ComparisonError),
}

/// Extract the values of one metric from a measurement sequence
pub fn metric_values(
    measurements: &[Measurement],
    metric: Metric,
) -> Result<Vec<f64>, SignificanceError> {
    measurements
        .iter()
        .map(|m| match metric {
            Metric::Runtime => Ok(m.runtime_millis()),
            Metric::Output(dimension) => {
                m.output(dimension)
                    .ok_or(SignificanceError::DimensionOutOfRange {
                        dimension,
                        available: m.outputs().len(),
                    })
            }
        })
        .collect()
}

impl ResultSet {
    /// Welch's t-test between two keys on one metric
    pub fn compare_keys(
        &self,
        baseline: MeasurementKey,
        candidate: MeasurementKey,
        metric: Metric,
    ) -> Result<WelchTTest, SignificanceError> {
        let a = self
            .measurements(&baseline)
            .ok_or(SignificanceError::UnknownKey(baseline))?;
        let b = self
            .measurements(&candidate)
            .ok_or(SignificanceError::UnknownKey(candidate))?;

        let a = metric_values(&a, metric)?;
        let b = metric_values(&b, metric)?;
        Ok(welch_t_test(&a, &b)?)
    }

    /// Welch's t-test between two tests at the same parameter value
    pub fn compare(
        &self,
        baseline: SpecId,
        candidate: SpecId,
        param: f64,
        metric: Metric,
    ) -> Result<WelchTTest, SignificanceError> {
        self.compare_keys(
            MeasurementKey::new(baseline, param),
            MeasurementKey::new(candidate, param),
            metric,
        )
    }
}
