#![warn(missing_docs)]
//! Gauntlet Report - Report Data Model
//!
//! Serializable snapshot of a finished run:
//! - Per-key intervals (runtime and output statistics)
//! - Pairwise Welch comparisons between tests at each parameter
//! - Per-test datasets (parameter → mean) for plotting
//! - Attempt accounting and raw measurement records
//!
//! Output formats: JSON (machine-readable) and human-readable terminal text,
//! the latter rendered by the CLI.

mod format;
mod json;
mod report;

pub use format::format_duration_ms;
pub use json::generate_json_report;
pub use report::{
    AttemptSummary, ComparisonEntry, DataPoint, Dataset, IntervalSummary, Report, ReportMeta,
    ReportSummary, StatSummary, SCHEMA_VERSION,
};

/// Output format selection
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    /// JSON with full schema
    Json,
    /// Human-readable terminal output
    Human,
}

impl std::str::FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "json" => Ok(OutputFormat::Json),
            "human" | "text" => Ok(OutputFormat::Human),
            other => Err(format!("Unknown output format: {}", other)),
        }
    }
}
