//! Per-calendar-month summaries over all years.
//!
//! These back the box plot, its statistics table and the four monthly
//! frequency charts of the report. Unlike the regime aggregation, everything
//! here works on the raw observations of each month pooled across years.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::domain::Observation;
use crate::stats::descriptive::{Statistics, describe, median_of_sorted, sorted_clean};

/// Whisker reach in multiples of the interquartile range.
const WHISKER_IQR: f64 = 1.5;

/// How many observations fall in each calendar month.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MonthFrequency {
    pub month: u32,
    pub count: usize,
    pub cum_count: usize,
    pub rel_freq: f64,
    pub cum_rel_freq: f64,
}

/// Descriptive statistics for one calendar month.
///
/// `stats` is `None` when the month has no observations. A month with a
/// single observation keeps its location measures; its variance, standard
/// deviation and coefficient of variation are NaN.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MonthlyStatistics {
    pub month: u32,
    pub stats: Option<Statistics>,
}

/// Five-number box summary for one calendar month.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BoxSummary {
    pub month: u32,
    pub n: usize,
    pub q1: f64,
    pub median: f64,
    pub q3: f64,
    /// Lowest observation within `q1 - 1.5 * IQR`.
    pub lower_whisker: f64,
    /// Highest observation within `q3 + 1.5 * IQR`.
    pub upper_whisker: f64,
    pub outliers: Vec<f64>,
    /// Flat mean of the month's raw values.
    pub mean: f64,
}

fn values_by_month(observations: &[Observation]) -> BTreeMap<u32, Vec<f64>> {
    let mut out: BTreeMap<u32, Vec<f64>> = BTreeMap::new();
    for obs in observations {
        out.entry(obs.month()).or_default().push(obs.value);
    }
    out
}

/// Observation counts per month present, with cumulative and relative columns.
pub fn monthly_frequency(observations: &[Observation]) -> Vec<MonthFrequency> {
    let by_month = values_by_month(observations);
    let total: usize = by_month.values().map(Vec::len).sum();

    let mut cum_count = 0usize;
    let mut cum_rel = 0.0f64;
    by_month
        .into_iter()
        .map(|(month, values)| {
            let count = values.len();
            let rel_freq = if total > 0 { count as f64 / total as f64 } else { 0.0 };
            cum_count += count;
            cum_rel += rel_freq;
            MonthFrequency {
                month,
                count,
                cum_count,
                rel_freq,
                cum_rel_freq: cum_rel,
            }
        })
        .collect()
}

/// `describe` over each month's values, for all twelve months.
pub fn monthly_statistics(observations: &[Observation]) -> Vec<MonthlyStatistics> {
    let by_month = values_by_month(observations);
    (1..=12)
        .map(|month| MonthlyStatistics {
            month,
            stats: by_month.get(&month).and_then(|v| month_statistics(v)),
        })
        .collect()
}

fn month_statistics(values: &[f64]) -> Option<Statistics> {
    if let Ok(stats) = describe(values) {
        return Some(stats);
    }
    match sorted_clean(values)[..] {
        [value] => Some(Statistics {
            n: 1,
            min: value,
            max: value,
            range: 0.0,
            mean: value,
            median: value,
            mode: value,
            variance: f64::NAN,
            std_dev: f64::NAN,
            coef_variation: f64::NAN,
            num_classes: 1,
            class_width: 0.0,
        }),
        _ => None,
    }
}

/// Box summaries for every month present, ascending.
pub fn box_summaries(observations: &[Observation]) -> Vec<BoxSummary> {
    values_by_month(observations)
        .into_iter()
        .filter_map(|(month, values)| box_summary(month, &values))
        .collect()
}

fn box_summary(month: u32, values: &[f64]) -> Option<BoxSummary> {
    let sorted = sorted_clean(values);
    if sorted.is_empty() {
        return None;
    }

    let q1 = quantile_sorted(&sorted, 0.25);
    let median = median_of_sorted(&sorted);
    let q3 = quantile_sorted(&sorted, 0.75);
    let iqr = q3 - q1;
    let low_fence = q1 - WHISKER_IQR * iqr;
    let high_fence = q3 + WHISKER_IQR * iqr;

    let lower_whisker = sorted.iter().copied().find(|&v| v >= low_fence).unwrap_or(q1);
    let upper_whisker = sorted.iter().rev().copied().find(|&v| v <= high_fence).unwrap_or(q3);
    let outliers = sorted
        .iter()
        .copied()
        .filter(|&v| v < low_fence || v > high_fence)
        .collect();
    let mean = sorted.iter().sum::<f64>() / sorted.len() as f64;

    Some(BoxSummary {
        month,
        n: sorted.len(),
        q1,
        median,
        q3,
        lower_whisker,
        upper_whisker,
        outliers,
        mean,
    })
}

/// Quantile with linear interpolation between closest ranks.
pub fn quantile_sorted(sorted: &[f64], p: f64) -> f64 {
    let n = sorted.len();
    if n == 1 {
        return sorted[0];
    }
    let pos = p.clamp(0.0, 1.0) * (n - 1) as f64;
    let lo = pos.floor() as usize;
    let hi = pos.ceil() as usize;
    sorted[lo] + (sorted[hi] - sorted[lo]) * (pos - lo as f64)
}
