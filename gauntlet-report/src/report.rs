//! Report Data Structures

use chrono::{DateTime, Utc};
use gauntlet_core::{Attempts, Interval, MeasurementRecord};
use gauntlet_stats::{SummaryStatistic, WelchTTest};
use serde::{Deserialize, Serialize};

/// Current report schema version
pub const SCHEMA_VERSION: u32 = 1;

/// Complete run report
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Report {
    pub meta: ReportMeta,
    pub intervals: Vec<IntervalSummary>,
    pub comparisons: Vec<ComparisonEntry>,
    pub datasets: Vec<Dataset>,
    pub attempts: Vec<AttemptSummary>,
    pub records: Vec<MeasurementRecord>,
    pub summary: ReportSummary,
}

/// Report metadata
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReportMeta {
    pub schema_version: u32,
    pub version: String,
    /// Run id, `yyyyMMddHHmmss` of the timestamp
    pub id: String,
    pub title: String,
    pub timestamp: DateTime<Utc>,
    pub tests: Vec<String>,
    pub param_values: Vec<f64>,
    pub iterations: usize,
    pub parallelism: usize,
}

impl ReportMeta {
    /// Metadata stamped with the given time
    pub fn new(title: impl Into<String>, timestamp: DateTime<Utc>) -> Self {
        Self {
            schema_version: SCHEMA_VERSION,
            version: env!("CARGO_PKG_VERSION").to_string(),
            id: timestamp.format("%Y%m%d%H%M%S").to_string(),
            title: title.into(),
            timestamp,
            tests: Vec::new(),
            param_values: Vec::new(),
            iterations: 0,
            parallelism: 0,
        }
    }
}

/// Serializable view of a [`SummaryStatistic`]
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct StatSummary {
    pub count: u64,
    pub mean: Option<f64>,
    pub variance: Option<f64>,
    pub std_dev: Option<f64>,
    pub min: Option<f64>,
    pub max: Option<f64>,
}

impl From<&SummaryStatistic> for StatSummary {
    fn from(stat: &SummaryStatistic) -> Self {
        Self {
            count: stat.count(),
            mean: stat.mean(),
            variance: stat.variance(),
            std_dev: stat.std_dev(),
            min: stat.min(),
            max: stat.max(),
        }
    }
}

/// Statistics for one (test, parameter) pair
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IntervalSummary {
    pub test: String,
    /// Registration index of the test; names need not be unique
    pub test_index: usize,
    pub param: f64,
    /// Runtime in milliseconds
    pub runtime: StatSummary,
    /// One entry per output dimension
    pub values: Vec<StatSummary>,
}

impl IntervalSummary {
    /// Summarize an interval under the test's display name
    pub fn from_interval(test: impl Into<String>, interval: &Interval) -> Self {
        Self {
            test: test.into(),
            test_index: interval.spec().index(),
            param: interval.param(),
            runtime: interval.runtime().into(),
            values: interval.values().iter().map(StatSummary::from).collect(),
        }
    }

    /// Number of measurements summarized
    pub fn samples(&self) -> u64 {
        self.runtime.count
    }
}

/// Welch comparison of two tests at one parameter on one metric
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ComparisonEntry {
    pub param: f64,
    /// `runtime` or `value<N>`
    pub metric: String,
    pub baseline: String,
    pub candidate: String,
    pub baseline_mean: f64,
    pub candidate_mean: f64,
    /// `None` when the statistic is infinite (both samples without spread)
    pub t_statistic: Option<f64>,
    pub degrees_of_freedom: Option<f64>,
    pub p_value: f64,
    pub significant: bool,
}

impl ComparisonEntry {
    /// Build an entry from a finished t-test
    pub fn from_test(
        param: f64,
        metric: impl Into<String>,
        baseline: impl Into<String>,
        candidate: impl Into<String>,
        test: &WelchTTest,
        alpha: f64,
    ) -> Self {
        Self {
            param,
            metric: metric.into(),
            baseline: baseline.into(),
            candidate: candidate.into(),
            baseline_mean: test.baseline_mean,
            candidate_mean: test.candidate_mean,
            t_statistic: finite(test.t_statistic),
            degrees_of_freedom: finite(test.degrees_of_freedom),
            p_value: test.p_value,
            significant: test.is_significant(alpha),
        }
    }
}

fn finite(x: f64) -> Option<f64> {
    x.is_finite().then_some(x)
}

/// One (x, y) point of a dataset
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DataPoint {
    pub x: f64,
    pub y: f64,
}

/// Mean of one metric for one test, across parameter values
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Dataset {
    pub label: String,
    pub metric: String,
    /// Sorted by ascending `x`
    pub points: Vec<DataPoint>,
}

/// Attempted versus recorded runs for one key
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AttemptSummary {
    pub test: String,
    pub param: f64,
    pub attempted: usize,
    pub succeeded: usize,
    pub failed: usize,
}

impl AttemptSummary {
    /// Attach a test name and parameter to raw counts
    pub fn new(test: impl Into<String>, param: f64, attempts: Attempts) -> Self {
        Self {
            test: test.into(),
            param,
            attempted: attempts.attempted,
            succeeded: attempts.succeeded,
            failed: attempts.failed,
        }
    }
}

/// Report summary
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ReportSummary {
    pub tests: usize,
    pub keys: usize,
    pub measurements: usize,
    pub failed_runs: usize,
    pub comparisons: usize,
    pub significant_comparisons: usize,
    pub total_duration_ms: f64,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_meta_id_format() {
        let ts = Utc.with_ymd_and_hms(2016, 3, 7, 14, 5, 9).unwrap();
        let meta = ReportMeta::new("case", ts);

        assert_eq!(meta.id, "20160307140509");
        assert_eq!(meta.schema_version, SCHEMA_VERSION);
    }

    #[test]
    fn test_stat_summary_from_statistic() {
        let stat: SummaryStatistic = [1.0, 2.0, 3.0, 4.0, 5.0].into_iter().collect();
        let summary = StatSummary::from(&stat);

        assert_eq!(summary.count, 5);
        assert_eq!(summary.mean, Some(3.0));
        assert_eq!(summary.variance, Some(2.5));
        assert_eq!(summary.min, Some(1.0));
        assert_eq!(summary.max, Some(5.0));
    }

    #[test]
    fn test_empty_stat_summary_serializes_nulls() {
        let summary = StatSummary::from(&SummaryStatistic::new());
        let json = serde_json::to_string(&summary).unwrap();

        assert!(json.contains("\"mean\":null"));
        assert!(json.contains("\"count\":0"));
    }

    #[test]
    fn test_comparison_entry_significance() {
        let test = WelchTTest {
            baseline_mean: 1.0,
            candidate_mean: 2.0,
            t_statistic: -5.0,
            degrees_of_freedom: 8.0,
            p_value: 0.001,
        };
        let entry = ComparisonEntry::from_test(4.0, "runtime", "a", "b", &test, 0.05);

        assert!(entry.significant);
        assert_eq!(entry.metric, "runtime");
        assert_eq!(entry.param, 4.0);
        assert_eq!(entry.t_statistic, Some(-5.0));
    }

    #[test]
    fn test_infinite_t_statistic_survives_json() {
        let test = WelchTTest {
            baseline_mean: 1.0,
            candidate_mean: 100.0,
            t_statistic: f64::NEG_INFINITY,
            degrees_of_freedom: 6.0,
            p_value: 0.0,
        };
        let entry = ComparisonEntry::from_test(1.0, "value0", "a", "b", &test, 0.05);
        assert_eq!(entry.t_statistic, None);
        assert_eq!(entry.degrees_of_freedom, Some(6.0));

        let json = serde_json::to_string(&entry).unwrap();
        let back: ComparisonEntry = serde_json::from_str(&json).unwrap();
        assert_eq!(back.t_statistic, None);
        assert!(back.significant);
    }
}
