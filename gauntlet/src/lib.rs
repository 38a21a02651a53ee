#![warn(missing_docs)]
//! # Gauntlet
//!
//! Concurrent benchmark harness for comparing algorithm implementations.
//!
//! Gauntlet runs every registered test at every parameter value, a fixed
//! number of times, on a worker pool:
//! - **Iteration barriers**: iteration `i + 1` never starts before every run of iteration `i` has finished
//! - **Fresh instances**: each test factory produces one new instance per iteration
//! - **Failure tolerance**: a run that errors or panics is logged and left out; the others continue
//! - **Interval statistics**: runtime and every output dimension folded with Welford's online algorithm
//! - **Significance**: Welch's t-test between any two tests at the same parameter value
//!
//! ## Quick Start
//!
//! ```ignore
//! use gauntlet::prelude::*;
//!
//! let mut scheduler = Scheduler::new(SchedulerConfig {
//!     iterations: 20,
//!     param_values: vec![1_000.0, 10_000.0],
//!     ..Default::default()
//! });
//! let quick = scheduler.add_test(FnSpec::new("quick", |n| Ok(vec![sort_quick(n as usize)])));
//! let merge = scheduler.add_test(FnSpec::new("merge", |n| Ok(vec![sort_merge(n as usize)])));
//!
//! let outcome = scheduler.run()?;
//! for interval in outcome.results.intervals() {
//!     println!("{:?} @ {}: {:?}", interval.spec(), interval.param(), interval.runtime().mean());
//! }
//! let t = outcome.results.compare(quick, merge, 1_000.0, Metric::Runtime)?;
//! println!("p = {}", t.p_value);
//! ```
//!
//! ## Command-Line Harness
//!
//! ```ignore
//! fn main() -> anyhow::Result<()> {
//!     gauntlet::run(Suite::new("sorting").test(FnSpec::new("quick", quick)))
//! }
//! ```

// Re-export core types
pub use gauntlet_core::{
    Attempts, FnSpec, Interval, IterationListener, Measurement, MeasurementKey,
    MeasurementRecord, Metric, ResultSet, RunOutcome, Scheduler, SchedulerConfig, SchedulerError,
    SignificanceError, SpecId, Test, TestError, TestOutput, TestSpec, Timer, default_parallelism,
    format_dhms,
};

// Re-export stats
pub use gauntlet_stats::{
    ComparisonError, DEFAULT_SIGNIFICANCE_LEVEL, StatsError, SummaryStatistic, WelchTTest,
    welch_t_test,
};

// Re-export report types
pub use gauntlet_report::{OutputFormat, Report, generate_json_report};

// Re-export CLI types
pub use gauntlet_cli::{Cli, GauntletConfig, Suite, build_report};

/// Prelude for convenient imports
pub mod prelude {
    pub use crate::{
        FnSpec, Metric, Scheduler, SchedulerConfig, Suite, Test, TestOutput, TestSpec,
    };
}

/// Run the Gauntlet CLI harness on a suite.
///
/// Call this from your benchmark binary's `main()`:
/// ```ignore
/// fn main() -> anyhow::Result<()> {
///     gauntlet::run(my_suite())
/// }
/// ```
pub use gauntlet_cli::run;
