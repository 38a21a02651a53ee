//! Run Executor
//!
//! Runs the planned tests on the scheduler and turns the outcome into a
//! report.
//!
//! ## Pipeline Overview
//!
//! ```text
//! Suite (registered tests)
//!       │
//!       ▼
//! ┌─────────────┐
//! │  execution  │  Scheduler run, iteration barriers
//! └──────┬──────┘
//!        │
//!        ▼
//! ┌─────────────┐
//! │   report    │  Intervals, comparisons, datasets
//! └──────┬──────┘
//!        │
//!        ▼
//! ┌─────────────┐
//! │ formatting  │  Human-readable output
//! └─────────────┘
//! ```

mod execution;
mod formatting;
mod report;

pub use execution::Executor;
pub use formatting::format_human_output;
pub use report::build_report;
