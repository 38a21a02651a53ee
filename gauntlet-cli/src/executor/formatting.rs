//! Output Formatting
//!
//! Human-readable output formatting for run reports.
//!
//! Generates terminal-friendly output with:
//! - Per-test interval statistics, one line per parameter value
//! - Pairwise comparison table with p-values
//! - Shortfall warnings where runs failed

use gauntlet_report::{format_duration_ms, IntervalSummary, Report, StatSummary};

/// Format a report for human-readable terminal display
pub fn format_human_output(report: &Report) -> String {
    let mut output = String::new();

    output.push('\n');
    output.push_str(&format!("Gauntlet Results: {}\n", report.meta.title));
    output.push_str(&"=".repeat(60));
    output.push_str("\n\n");

    // Group intervals by test identity, keeping registration order
    let mut groups: Vec<(usize, Vec<&IntervalSummary>)> = Vec::new();
    for interval in &report.intervals {
        match groups
            .iter_mut()
            .find(|(index, _)| *index == interval.test_index)
        {
            Some((_, list)) => list.push(interval),
            None => groups.push((interval.test_index, vec![interval])),
        }
    }

    for (_, intervals) in groups {
        output.push_str(&format!("Test: {}\n", intervals[0].test));
        output.push_str(&"-".repeat(60));
        output.push('\n');

        for interval in intervals {
            output.push_str(&format!(
                "  param {}  (n = {})\n",
                interval.param,
                interval.samples()
            ));
            output.push_str(&format!(
                "      runtime: mean {}  stddev {}  min {}  max {}\n",
                format_duration_ms(interval.runtime.mean.unwrap_or(f64::NAN)),
                format_duration_ms(interval.runtime.std_dev.unwrap_or(f64::NAN)),
                format_duration_ms(interval.runtime.min.unwrap_or(f64::NAN)),
                format_duration_ms(interval.runtime.max.unwrap_or(f64::NAN)),
            ));
            for (i, value) in interval.values.iter().enumerate() {
                output.push_str(&format!("      value{}: {}\n", i, format_stat(value)));
            }
        }
        output.push('\n');
    }

    if !report.comparisons.is_empty() {
        output.push_str("Comparisons\n");
        output.push_str(&"-".repeat(60));
        output.push('\n');

        let width = report
            .comparisons
            .iter()
            .map(|c| c.baseline.len() + c.candidate.len() + 4)
            .max()
            .unwrap_or(20);

        output.push_str(&format!(
            "  {:<width$}  {:>8}  {:>8}  {:>10}\n",
            "Pair",
            "param",
            "metric",
            "p-value",
            width = width
        ));
        output.push_str(&format!("  {}\n", "-".repeat(width + 32)));

        for cmp in &report.comparisons {
            let pair = format!("{} vs {}", cmp.baseline, cmp.candidate);
            let marker = if cmp.significant { " *" } else { "" };
            output.push_str(&format!(
                "  {:<width$}  {:>8}  {:>8}  {:>10.4}{}\n",
                pair,
                cmp.param,
                cmp.metric,
                cmp.p_value,
                marker,
                width = width
            ));
        }
        output.push_str("  (* significant)\n\n");
    }

    let short: Vec<_> = report.attempts.iter().filter(|a| a.failed > 0).collect();
    if !short.is_empty() {
        output.push_str("Failed Runs\n");
        output.push_str(&"-".repeat(60));
        output.push('\n');
        for a in short {
            output.push_str(&format!(
                "  ✗ {} @ {}: {} of {} runs failed\n",
                a.test, a.param, a.failed, a.attempted
            ));
        }
        output.push('\n');
    }

    // Summary
    output.push_str("Summary\n");
    output.push_str(&"-".repeat(60));
    output.push('\n');
    output.push_str(&format!(
        "  Tests: {}  Keys: {}  Measurements: {}  Failed runs: {}\n",
        report.summary.tests,
        report.summary.keys,
        report.summary.measurements,
        report.summary.failed_runs
    ));
    output.push_str(&format!(
        "  Comparisons: {}  Significant: {}\n",
        report.summary.comparisons, report.summary.significant_comparisons
    ));
    output.push_str(&format!(
        "  Duration: {}\n",
        format_duration_ms(report.summary.total_duration_ms)
    ));

    output
}

fn format_stat(stat: &StatSummary) -> String {
    match (stat.mean, stat.std_dev) {
        (Some(mean), Some(std_dev)) => format!("mean {:.4}  stddev {:.4}", mean, std_dev),
        _ => "-".to_string(),
    }
}
