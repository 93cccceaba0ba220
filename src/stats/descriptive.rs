//! Descriptive statistics.
//!
//! `describe` computes the first/second moment summary of a series along with
//! the Sturges class count used by the class-interval builder.
//!
//! Conventions:
//! - variance and standard deviation are sample estimates (divisor `n - 1`)
//! - the mode is the most frequent value, ties resolved to the lowest value
//! - the coefficient of variation is a percentage and is `0` for a zero mean

use std::cmp::Ordering;

use serde::{Deserialize, Serialize};

use crate::error::StatsError;

/// Summary statistics of a numeric series.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Statistics {
    pub n: usize,
    pub min: f64,
    pub max: f64,
    pub range: f64,
    pub mean: f64,
    pub median: f64,
    pub mode: f64,
    pub variance: f64,
    pub std_dev: f64,
    /// `std_dev / mean * 100`, or `0` when the mean is zero.
    pub coef_variation: f64,
    /// Sturges' rule class count for `n`.
    pub num_classes: usize,
    pub class_width: f64,
}

/// Compute descriptive statistics over `values`.
///
/// NaN entries are dropped first. Fails with `InsufficientData` when fewer
/// than two values remain, since the sample variance is undefined for `n = 1`.
pub fn describe(values: &[f64]) -> Result<Statistics, StatsError> {
    let sorted = sorted_clean(values);
    let n = sorted.len();

    if n == 0 {
        return Err(StatsError::InsufficientData(
            "no values remain after dropping missing entries".to_string(),
        ));
    }
    if n == 1 {
        return Err(StatsError::InsufficientData(
            "sample variance needs at least two values".to_string(),
        ));
    }

    let min = sorted[0];
    let max = sorted[n - 1];
    let range = max - min;
    let mean = sorted.iter().sum::<f64>() / n as f64;
    let median = median_of_sorted(&sorted);
    let mode = mode_of_sorted(&sorted);

    let variance = sorted.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / (n - 1) as f64;
    let std_dev = variance.sqrt();
    let coef_variation = if mean == 0.0 { 0.0 } else { std_dev / mean * 100.0 };

    let num_classes = sturges_classes(n);
    let class_width = if num_classes > 0 {
        range / num_classes as f64
    } else {
        0.0
    };

    Ok(Statistics {
        n,
        min,
        max,
        range,
        mean,
        median,
        mode,
        variance,
        std_dev,
        coef_variation,
        num_classes,
        class_width,
    })
}

/// Sturges' rule: `floor(1 + 3.322 * log10(n))`, never below 1.
pub fn sturges_classes(n: usize) -> usize {
    if n == 0 {
        return 1;
    }
    let k = (1.0 + 3.322 * (n as f64).log10()).floor();
    (k as usize).max(1)
}

/// Copy of `values` without NaNs, sorted ascending.
pub(crate) fn sorted_clean(values: &[f64]) -> Vec<f64> {
    let mut out: Vec<f64> = values.iter().copied().filter(|v| !v.is_nan()).collect();
    out.sort_by(|a, b| a.partial_cmp(b).unwrap_or(Ordering::Equal));
    out
}

/// Median of an already-sorted, non-empty slice.
pub(crate) fn median_of_sorted(sorted: &[f64]) -> f64 {
    let n = sorted.len();
    if n % 2 == 0 {
        (sorted[n / 2 - 1] + sorted[n / 2]) / 2.0
    } else {
        sorted[n / 2]
    }
}

/// Most frequent value of a sorted, non-empty slice.
///
/// Scanning ascending and only replacing the best run on a strictly larger
/// count resolves ties to the lowest value.
fn mode_of_sorted(sorted: &[f64]) -> f64 {
    let mut best = sorted[0];
    let mut best_count = 0usize;

    let mut i = 0;
    while i < sorted.len() {
        let value = sorted[i];
        let mut j = i;
        while j < sorted.len() && sorted[j] == value {
            j += 1;
        }
        let count = j - i;
        if count > best_count {
            best = value;
            best_count = count;
        }
        i = j;
    }

    best
}
