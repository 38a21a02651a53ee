#![warn(missing_docs)]
//! Gauntlet Core - Scheduler and Result Aggregation
//!
//! This crate provides the execution engine behind gauntlet:
//! - `Test` / `TestSpec` capabilities implemented by the code under measurement
//! - `Scheduler` fanning (test, parameter) runs out to a bounded worker pool,
//!   with a hard barrier between iterations
//! - `ResultSet` collecting measurements into per-key, concurrently appendable buckets
//! - `Interval` and Welch-test views computed on demand for reporting

mod interval;
mod measure;
mod progress;
mod results;
mod scheduler;
mod significance;
mod traits;

pub use interval::Interval;
pub use measure::{Timer, as_millis_f64};
pub use progress::{ProgressEstimator, ProgressReporter, ProgressSnapshot, format_dhms};
pub use results::{
    Attempts, Bucket, Measurement, MeasurementKey, MeasurementRecord, ResultSet, SpecId,
};
pub use scheduler::{
    IterationListener, RunOutcome, Scheduler, SchedulerConfig, SchedulerError,
    default_parallelism,
};
pub use significance::{Metric, SignificanceError, metric_values};
pub use traits::{FnSpec, Test, TestError, TestOutput, TestSpec};

pub use gauntlet_stats::{StatsError, SummaryStatistic, WelchTTest};
