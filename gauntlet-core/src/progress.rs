//! Progress Reporting
//!
//! Estimates remaining time by linear extrapolation from the iterations
//! completed so far:
//!
//! ```text
//! remaining = (total - done) * elapsed / done
//! ```

use indicatif::{ProgressBar, ProgressStyle};
use std::time::{Duration, Instant};

const ONE_SECOND: u64 = 1_000;
const ONE_MINUTE: u64 = ONE_SECOND * 60;
const ONE_HOUR: u64 = ONE_MINUTE * 60;
const ONE_DAY: u64 = ONE_HOUR * 24;

/// Snapshot of run progress after a number of completed iterations
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProgressSnapshot {
    /// Iterations completed
    pub done: usize,
    /// Iterations planned
    pub total: usize,
    /// Whole percent complete
    pub percent: u32,
    /// Estimated time until the last iteration completes
    pub remaining: Duration,
}

/// Linear remaining-time estimator
#[derive(Debug, Clone)]
pub struct ProgressEstimator {
    total: usize,
    start: Instant,
}

impl ProgressEstimator {
    /// Start estimating a run of `total` iterations now
    pub fn start(total: usize) -> Self {
        Self {
            total,
            start: Instant::now(),
        }
    }

    /// Estimate from the wall-clock time elapsed since [`start`](Self::start)
    pub fn update(&self, done: usize) -> ProgressSnapshot {
        self.estimate(done, self.start.elapsed())
    }

    /// Estimate for an explicit elapsed time
    pub fn estimate(&self, done: usize, elapsed: Duration) -> ProgressSnapshot {
        let done = done.min(self.total);
        let remaining = if done == 0 {
            Duration::ZERO
        } else {
            let left = (self.total - done) as u128;
            let nanos = left * elapsed.as_nanos() / done as u128;
            Duration::from_nanos(nanos.min(u64::MAX as u128) as u64)
        };
        let percent = if self.total == 0 {
            100
        } else {
            (100 * done / self.total) as u32
        };

        ProgressSnapshot {
            done,
            total: self.total,
            percent,
            remaining,
        }
    }
}

/// Format a duration as "1 day, 2 hours, 3 minutes and 4 seconds".
///
/// Anything under one second renders as `"0 second"`.
pub fn format_dhms(duration: Duration) -> String {
    let mut left = duration.as_millis().min(u64::MAX as u128) as u64;
    if left < ONE_SECOND {
        return "0 second".to_string();
    }

    let mut out = String::new();
    for (unit, name) in [(ONE_DAY, "day"), (ONE_HOUR, "hour")] {
        let n = left / unit;
        if n > 0 {
            left -= n * unit;
            out.push_str(&plural(n, name));
            if left >= ONE_MINUTE {
                out.push_str(", ");
            }
        }
    }

    let minutes = left / ONE_MINUTE;
    if minutes > 0 {
        left -= minutes * ONE_MINUTE;
        out.push_str(&plural(minutes, "minute"));
    }

    if !out.is_empty() && left >= ONE_SECOND {
        out.push_str(" and ");
    }

    let seconds = left / ONE_SECOND;
    if seconds > 0 {
        out.push_str(&plural(seconds, "second"));
    }
    out
}

fn plural(n: u64, unit: &str) -> String {
    if n > 1 {
        format!("{} {}s", n, unit)
    } else {
        format!("{} {}", n, unit)
    }
}

/// Terminal progress bar driven by iteration barriers
pub struct ProgressReporter {
    estimator: ProgressEstimator,
    bar: ProgressBar,
}

impl ProgressReporter {
    /// Create a reporter for `total` iterations; `visible = false` draws nothing
    pub fn new(total: usize, visible: bool) -> Self {
        let bar = if visible {
            let bar = ProgressBar::new(total as u64);
            bar.set_style(
                ProgressStyle::default_bar()
                    .template(
                        "{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} {msg}",
                    )
                    .unwrap_or_else(|_| ProgressStyle::default_bar())
                    .progress_chars("#>-"),
            );
            bar
        } else {
            ProgressBar::hidden()
        };

        Self {
            estimator: ProgressEstimator::start(total),
            bar,
        }
    }

    /// Record that `done` iterations have completed
    pub fn update(&self, done: usize) -> ProgressSnapshot {
        let snapshot = self.estimator.update(done);
        self.bar.set_position(snapshot.done as u64);
        self.bar.set_message(format!(
            "{:3}% {} remaining",
            snapshot.percent,
            format_dhms(snapshot.remaining)
        ));
        tracing::trace!(
            done = snapshot.done,
            total = snapshot.total,
            remaining_ms = snapshot.remaining.as_millis() as u64,
            "progress"
        );
        snapshot
    }

    /// Close the bar
    pub fn finish(&self) {
        self.bar.finish_with_message("Complete");
    }
}
