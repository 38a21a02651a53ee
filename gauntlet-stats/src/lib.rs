#![warn(missing_docs)]
//! Gauntlet Statistical Engine
//!
//! Provides the numerical core used to summarize benchmark measurements:
//! - Single-pass (Welford) accumulation of count, mean and variance
//! - Merging of partial accumulators computed on different threads
//! - Welch's unequal-variance t-test for comparing two sample sets

mod comparison;
mod summary;

pub use comparison::{ComparisonError, WelchTTest, welch_t_test};
pub use summary::{StatsError, SummaryStatistic};

/// Default significance threshold used when callers do not supply their own
pub const DEFAULT_SIGNIFICANCE_LEVEL: f64 = 0.05;

/// Minimum number of observations per side required by the t-test
pub const MIN_SAMPLES_FOR_COMPARISON: usize = 2;
