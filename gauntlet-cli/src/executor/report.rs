//! Report Building
//!
//! Constructs the complete report from a finished run, including the
//! pairwise significance comparisons.
//!
//! ## Pipeline
//!
//! ```text
//! RunOutcome (ResultSet)
//!        │
//!        ▼
//!   ┌─────────────────────┐
//!   │     Intervals       │  One per key with measurements
//!   └──────────┬──────────┘
//!              │
//!              ▼
//!   ┌─────────────────────┐
//!   │ Parallel Welch      │  Every test pair × parameter × metric
//!   │   Comparisons       │
//!   └──────────┬──────────┘
//!              │
//!              ▼
//!   ┌─────────────────────┐
//!   │      Report         │  Ready for JSON or terminal output
//!   └─────────────────────┘
//! ```

use chrono::Utc;
use fxhash::FxHashMap;
use gauntlet_core::{Interval, MeasurementKey, Metric, ResultSet, RunOutcome, SpecId};
use gauntlet_report::{
    AttemptSummary, ComparisonEntry, DataPoint, Dataset, IntervalSummary, Report, ReportMeta,
    ReportSummary,
};
use rayon::prelude::*;

/// Build a complete Report from a finished run
///
/// # Arguments
/// * `outcome` - Results and timings returned by the scheduler
/// * `title` - Suite title recorded in the metadata
/// * `alpha` - Significance level for flagging comparisons
pub fn build_report(outcome: &RunOutcome, title: &str, alpha: f64) -> Report {
    let results = &outcome.results;
    let intervals = results.intervals();
    let by_key: FxHashMap<MeasurementKey, &Interval> =
        intervals.iter().map(|i| (i.key(), i)).collect();

    let interval_summaries: Vec<_> = intervals
        .iter()
        .map(|i| IntervalSummary::from_interval(test_name(results, i.spec()), i))
        .collect();

    let comparisons = compare_all(results, &by_key, alpha);
    let datasets = build_datasets(results, &intervals);

    let attempts: Vec<_> = results
        .keys()
        .filter_map(|key| {
            results.attempts(&key).map(|a| {
                AttemptSummary::new(test_name(results, key.spec()), key.param(), a)
            })
        })
        .collect();

    let summary = ReportSummary {
        tests: results.spec_names().len(),
        keys: results.len(),
        measurements: results.total_measurements(),
        failed_runs: attempts.iter().map(|a| a.failed).sum(),
        comparisons: comparisons.len(),
        significant_comparisons: comparisons.iter().filter(|c| c.significant).count(),
        total_duration_ms: outcome.total_runtime.as_secs_f64() * 1000.0,
    };

    let mut meta = ReportMeta::new(title, Utc::now());
    meta.tests = results.spec_names().to_vec();
    meta.param_values = outcome.param_values.clone();
    meta.iterations = outcome.iterations;
    meta.parallelism = outcome.parallelism;

    Report {
        meta,
        intervals: interval_summaries,
        comparisons,
        datasets,
        attempts,
        records: results.records(),
        summary,
    }
}

fn test_name(results: &ResultSet, spec: SpecId) -> String {
    results
        .spec_name(spec)
        .map(str::to_string)
        .unwrap_or_else(|| format!("test#{}", spec.index()))
}

/// Welch comparisons for each unordered pair of tests at every shared parameter,
/// on runtime and on each output dimension both tests report
///
/// A pair is compared once, with the earlier-registered test as baseline.
fn compare_all(
    results: &ResultSet,
    by_key: &FxHashMap<MeasurementKey, &Interval>,
    alpha: f64,
) -> Vec<ComparisonEntry> {
    let specs: Vec<SpecId> = results.specs().collect();
    let params = results.params();
    let mut work = Vec::new();

    for (i, &baseline) in specs.iter().enumerate() {
        for &candidate in &specs[i + 1..] {
            for &param in &params {
                let a = by_key.get(&MeasurementKey::new(baseline, param));
                let b = by_key.get(&MeasurementKey::new(candidate, param));
                let (Some(a), Some(b)) = (a, b) else {
                    continue;
                };

                work.push((baseline, candidate, param, Metric::Runtime));
                for dimension in 0..a.dimensions().min(b.dimensions()) {
                    work.push((baseline, candidate, param, Metric::Output(dimension)));
                }
            }
        }
    }

    work.par_iter()
        .filter_map(|&(baseline, candidate, param, metric)| {
            match results.compare(baseline, candidate, param, metric) {
                Ok(test) => Some(ComparisonEntry::from_test(
                    param,
                    metric.to_string(),
                    test_name(results, baseline),
                    test_name(results, candidate),
                    &test,
                    alpha,
                )),
                Err(e) => {
                    tracing::debug!(
                        baseline = %test_name(results, baseline),
                        candidate = %test_name(results, candidate),
                        param,
                        %metric,
                        error = %e,
                        "comparison skipped"
                    );
                    None
                }
            }
        })
        .collect()
}

/// Interval means per test and metric, as (param, mean) points sorted by param
fn build_datasets(results: &ResultSet, intervals: &[Interval]) -> Vec<Dataset> {
    let mut datasets = Vec::new();

    for spec in results.specs() {
        let mut own: Vec<&Interval> = intervals.iter().filter(|i| i.spec() == spec).collect();
        if own.is_empty() {
            continue;
        }
        own.sort_by(|a, b| a.param().total_cmp(&b.param()));

        let label = test_name(results, spec);
        let dimensions = own.iter().map(|i| i.dimensions()).max().unwrap_or(0);

        let mut metrics = vec![Metric::Runtime];
        metrics.extend((0..dimensions).map(Metric::Output));

        for metric in metrics {
            let points = own
                .iter()
                .filter_map(|i| {
                    let stat = match metric {
                        Metric::Runtime => Some(i.runtime()),
                        Metric::Output(d) => i.value(d),
                    }?;
                    stat.mean().map(|y| DataPoint { x: i.param(), y })
                })
                .collect();

            datasets.push(Dataset {
                label: label.clone(),
                metric: metric.to_string(),
                points,
            });
        }
    }

    datasets
}
