//! Interval Views
//!
//! An [`Interval`] folds every measurement recorded under one key into one
//! [`SummaryStatistic`] for runtime (milliseconds) plus one per output
//! dimension. It is recomputed from the result set on demand and never
//! stored.

use crate::results::{Measurement, MeasurementKey, ResultSet, SpecId};
use gauntlet_stats::{StatsError, SummaryStatistic};

/// Summary of all measurements for one (test, parameter) pair
#[derive(Debug, Clone, PartialEq)]
pub struct Interval {
    key: MeasurementKey,
    runtime: SummaryStatistic,
    values: Vec<SummaryStatistic>,
}

impl Interval {
    /// Fold a non-empty set of measurements.
    ///
    /// The first measurement's output length fixes the number of dimensions;
    /// extra values in later measurements are ignored and missing ones skipped.
    pub fn for_key(key: MeasurementKey, measurements: &[Measurement]) -> Result<Self, StatsError> {
        let first = measurements.first().ok_or(StatsError::EmptyInput)?;
        let mut values = vec![SummaryStatistic::new(); first.outputs().len()];
        let mut runtime = SummaryStatistic::new();

        for measurement in measurements {
            runtime.add(measurement.runtime_millis());
            for (stat, &x) in values.iter_mut().zip(measurement.outputs()) {
                stat.add(x);
            }
        }

        Ok(Self {
            key,
            runtime,
            values,
        })
    }

    /// Key summarized by this interval
    pub fn key(&self) -> MeasurementKey {
        self.key
    }

    /// Factory of the summarized test
    pub fn spec(&self) -> SpecId {
        self.key.spec()
    }

    /// Parameter value of the summarized runs
    pub fn param(&self) -> f64 {
        self.key.param()
    }

    /// Runtime statistics in milliseconds
    pub fn runtime(&self) -> &SummaryStatistic {
        &self.runtime
    }

    /// Per-dimension output statistics
    pub fn values(&self) -> &[SummaryStatistic] {
        &self.values
    }

    /// Statistics of one output dimension
    pub fn value(&self, dimension: usize) -> Option<&SummaryStatistic> {
        self.values.get(dimension)
    }

    /// Number of output dimensions
    pub fn dimensions(&self) -> usize {
        self.values.len()
    }

    /// Number of measurements folded in
    pub fn count(&self) -> u64 {
        self.runtime.count()
    }
}

impl ResultSet {
    /// Interval view for one key; fails when the key has no measurements
    pub fn interval(&self, key: &MeasurementKey) -> Result<Interval, StatsError> {
        let measurements = self.measurements(key).unwrap_or_default();
        Interval::for_key(*key, &measurements)
    }

    /// Interval views for every key holding at least one measurement,
    /// in first-seen key order
    pub fn intervals(&self) -> Vec<Interval> {
        self.keys()
            .filter_map(|key| match self.interval(&key) {
                Ok(interval) => Some(interval),
                Err(_) => {
                    tracing::debug!(
                        test = self.spec_name(key.spec()).unwrap_or("<unknown>"),
                        param = key.param(),
                        "no measurements recorded; interval skipped"
                    );
                    None
                }
            })
            .collect()
    }
}
