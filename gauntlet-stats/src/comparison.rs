//! Two-Sample Comparison
//!
//! Welch's t-test for equality of means between two independent samples
//! with possibly different variances and sizes.
//!
//! ```text
//! t  = (mean_a - mean_b) / sqrt(var_a/n_a + var_b/n_b)
//! df = (var_a/n_a + var_b/n_b)^2
//!      / ((var_a/n_a)^2/(n_a-1) + (var_b/n_b)^2/(n_b-1))
//! p  = 2 * P(T_df > |t|)
//! ```

use crate::MIN_SAMPLES_FOR_COMPARISON;
use crate::summary::SummaryStatistic;
use serde::{Deserialize, Serialize};
use statrs::distribution::{ContinuousCDF, StudentsT};

/// Result of Welch's t-test
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct WelchTTest {
    /// Mean of the baseline sample
    pub baseline_mean: f64,
    /// Mean of the candidate sample
    pub candidate_mean: f64,
    /// t statistic (baseline minus candidate)
    pub t_statistic: f64,
    /// Welch-Satterthwaite degrees of freedom
    pub degrees_of_freedom: f64,
    /// Two-tailed p-value in `[0, 1]`
    pub p_value: f64,
}

impl WelchTTest {
    /// Whether the difference is significant at the given level
    pub fn is_significant(&self, alpha: f64) -> bool {
        self.p_value < alpha
    }
}

/// Errors from comparison operations
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ComparisonError {
    #[error("Baseline needs at least 2 samples, got {count}")]
    InsufficientBaseline { count: usize },
    #[error("Candidate needs at least 2 samples, got {count}")]
    InsufficientCandidate { count: usize },
}

/// Run Welch's t-test on two samples.
///
/// Both samples need at least two observations. When neither sample has any
/// spread the test degenerates: identical means give `p = 1`, distinct means
/// give `p = 0`.
pub fn welch_t_test(baseline: &[f64], candidate: &[f64]) -> Result<WelchTTest, ComparisonError> {
    if baseline.len() < MIN_SAMPLES_FOR_COMPARISON {
        return Err(ComparisonError::InsufficientBaseline {
            count: baseline.len(),
        });
    }
    if candidate.len() < MIN_SAMPLES_FOR_COMPARISON {
        return Err(ComparisonError::InsufficientCandidate {
            count: candidate.len(),
        });
    }

    let a: SummaryStatistic = baseline.iter().copied().collect();
    let b: SummaryStatistic = candidate.iter().copied().collect();
    Ok(welch_from_summaries(&a, &b))
}

/// Welch's t-test from two pre-computed accumulators (each with `count >= 2`)
pub(crate) fn welch_from_summaries(a: &SummaryStatistic, b: &SummaryStatistic) -> WelchTTest {
    let n_a = a.count() as f64;
    let n_b = b.count() as f64;
    let mean_a = a.mean().unwrap_or(0.0);
    let mean_b = b.mean().unwrap_or(0.0);
    let se_a = a.variance().unwrap_or(0.0) / n_a;
    let se_b = b.variance().unwrap_or(0.0) / n_b;
    let se2 = se_a + se_b;

    if se2 <= 0.0 || !se2.is_finite() {
        let (t_statistic, p_value) = if mean_a == mean_b {
            (0.0, 1.0)
        } else {
            (f64::INFINITY.copysign(mean_a - mean_b), 0.0)
        };
        return WelchTTest {
            baseline_mean: mean_a,
            candidate_mean: mean_b,
            t_statistic,
            degrees_of_freedom: n_a + n_b - 2.0,
            p_value,
        };
    }

    let t_statistic = (mean_a - mean_b) / se2.sqrt();
    let degrees_of_freedom =
        se2 * se2 / (se_a * se_a / (n_a - 1.0) + se_b * se_b / (n_b - 1.0));
    let p_value = two_tailed_p(t_statistic, degrees_of_freedom);

    WelchTTest {
        baseline_mean: mean_a,
        candidate_mean: mean_b,
        t_statistic,
        degrees_of_freedom,
        p_value,
    }
}

fn two_tailed_p(t: f64, df: f64) -> f64 {
    match StudentsT::new(0.0, 1.0, df) {
        Ok(dist) => (2.0 * dist.sf(t.abs())).clamp(0.0, 1.0),
        // df is finite and positive whenever se2 > 0, so this is unreachable in practice
        Err(_) => 1.0,
    }
}
