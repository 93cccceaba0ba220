//! Class-interval (histogram) tables.
//!
//! Bins are contiguous and span `[min, max]`. Every bin is half-open
//! `[lower, upper)` except the last, which is closed and whose upper bound is
//! widened by a 0.01% margin of `|max|` so the maximum is always counted.

use serde::{Deserialize, Serialize};

use crate::error::StatsError;
use crate::stats::descriptive::{sorted_clean, sturges_classes};

/// Multiplicative margin applied to the last upper bound.
const LAST_BIN_MARGIN: f64 = 1.0001;

/// One row of a frequency-distribution table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClassInterval {
    pub label: String,
    pub lower_bound: f64,
    pub upper_bound: f64,
    /// Class mark: `(lower + upper) / 2`.
    pub midpoint: f64,
    pub abs_freq: usize,
    pub rel_freq: f64,
    pub cum_abs_freq: usize,
    pub cum_rel_freq: f64,
}

/// Build the class-interval table for `values`.
///
/// `num_classes` defaults to Sturges' rule and may not exceed the number of
/// values. NaNs are dropped first.
pub fn class_intervals(values: &[f64], num_classes: Option<usize>) -> Result<Vec<ClassInterval>, StatsError> {
    if num_classes == Some(0) {
        return Err(StatsError::InvalidParameter(
            "num_classes must be at least 1".to_string(),
        ));
    }

    let sorted = sorted_clean(values);
    let n = sorted.len();
    if n == 0 {
        return Err(StatsError::InsufficientData(
            "cannot bin an empty series".to_string(),
        ));
    }

    let k = num_classes.unwrap_or_else(|| sturges_classes(n));
    if k > n {
        return Err(StatsError::InvalidParameter(format!(
            "num_classes ({k}) exceeds the number of values ({n})"
        )));
    }
    let min = sorted[0];
    let max = sorted[n - 1];
    let width = (max - min) / k as f64;
    let last_upper = widened_upper(max);

    // Bound i+1 is computed the same way as lower bound i+1, so neighbouring
    // bins share bit-identical edges and no value can fall between them.
    let edge = |i: usize| min + i as f64 * width;

    let mut out = Vec::with_capacity(k);
    let mut cum_abs = 0usize;
    let mut cum_rel = 0.0f64;

    for i in 0..k {
        let is_last = i == k - 1;
        let lower = edge(i);
        let upper = if is_last { last_upper } else { edge(i + 1) };

        let abs_freq = if is_last {
            sorted.iter().filter(|&&v| v >= lower && v <= upper).count()
        } else {
            sorted.iter().filter(|&&v| v >= lower && v < upper).count()
        };
        let rel_freq = abs_freq as f64 / n as f64;

        cum_abs += abs_freq;
        cum_rel += rel_freq;

        let label = if is_last {
            format!("[{lower:.2}, {upper:.2}]")
        } else {
            format!("[{lower:.2}, {upper:.2})")
        };

        out.push(ClassInterval {
            label,
            lower_bound: lower,
            upper_bound: upper,
            midpoint: (lower + upper) / 2.0,
            abs_freq,
            rel_freq,
            cum_abs_freq: cum_abs,
            cum_rel_freq: cum_rel,
        });
    }

    Ok(out)
}

/// `max * 1.0001`, taken away from zero so negative maxima widen upward too.
fn widened_upper(max: f64) -> f64 {
    max + max.abs() * (LAST_BIN_MARGIN - 1.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn total(intervals: &[ClassInterval]) -> usize {
        intervals.iter().map(|c| c.abs_freq).sum()
    }

    #[test]
    fn one_to_ten_with_sturges() {
        let values: Vec<f64> = (1..=10).map(f64::from).collect();
        let table = class_intervals(&values, None).unwrap();
        assert_eq!(table.len(), 4);

        let counts: Vec<usize> = table.iter().map(|c| c.abs_freq).collect();
        // [1, 3.25) [3.25, 5.5) [5.5, 7.75) [7.75, 10.001]
        assert_eq!(counts, vec![3, 2, 2, 3]);
        assert_eq!(total(&table), 10);

        assert!((table[0].lower_bound - 1.0).abs() < 1e-12);
        assert!((table[0].upper_bound - 3.25).abs() < 1e-12);
        assert!((table[0].midpoint - 2.125).abs() < 1e-12);
        assert!((table[3].upper_bound - 10.001).abs() < 1e-9);
        assert!(table[0].label.ends_with(')'));
        assert!(table[3].label.ends_with(']'));

        let last = table.last().unwrap();
        assert_eq!(last.cum_abs_freq, 10);
        assert!((last.cum_rel_freq - 1.0).abs() < 1e-12);
    }

    #[test]
    fn adjacent_bins_share_edges() {
        let values: Vec<f64> = (0..997).map(|i| (i as f64 * 0.37).sin() * 41.3 + 0.123).collect();
        let table = class_intervals(&values, None).unwrap();
        for pair in table.windows(2) {
            assert_eq!(pair[0].upper_bound.to_bits(), pair[1].lower_bound.to_bits());
        }
        assert_eq!(total(&table), values.len());
        assert_eq!(table.last().unwrap().cum_abs_freq, values.len());
    }

    #[test]
    fn explicit_class_count() {
        let values = [0.0, 0.5, 1.0, 1.5, 2.0];
        let table = class_intervals(&values, Some(2)).unwrap();
        assert_eq!(table.len(), 2);
        assert_eq!(table[0].abs_freq, 2);
        assert_eq!(table[1].abs_freq, 3);
    }

    #[test]
    fn zero_classes_rejected() {
        let err = class_intervals(&[1.0, 2.0], Some(0)).unwrap_err();
        assert!(matches!(err, StatsError::InvalidParameter(_)));
    }

    #[test]
    fn more_classes_than_values_rejected() {
        let err = class_intervals(&[1.0, 2.0, 3.0], Some(usize::MAX / 8)).unwrap_err();
        assert!(matches!(err, StatsError::InvalidParameter(_)));

        let err = class_intervals(&[1.0, 2.0, 3.0, f64::NAN], Some(4)).unwrap_err();
        assert!(matches!(err, StatsError::InvalidParameter(_)));
        assert_eq!(class_intervals(&[1.0, 2.0, 3.0], Some(3)).unwrap().len(), 3);
    }

    #[test]
    fn empty_rejected() {
        let err = class_intervals(&[], None).unwrap_err();
        assert!(matches!(err, StatsError::InsufficientData(_)));
    }

    #[test]
    fn negative_maximum_is_counted() {
        let values = [-12.0, -9.5, -7.25, -4.0, -2.0];
        let table = class_intervals(&values, None).unwrap();
        assert_eq!(total(&table), values.len());
        assert!(table.last().unwrap().upper_bound > -2.0);
    }

    #[test]
    fn zero_maximum_is_counted() {
        let values = [-3.0, -1.0, 0.0, 0.0];
        let table = class_intervals(&values, Some(3)).unwrap();
        assert_eq!(total(&table), 4);
    }

    #[test]
    fn constant_series_lands_in_last_bin() {
        let values = [5.0; 8];
        let table = class_intervals(&values, None).unwrap();
        assert_eq!(total(&table), 8);
        assert_eq!(table.last().unwrap().abs_freq, 8);
    }

    #[test]
    fn single_value_is_binnable() {
        let table = class_intervals(&[7.0], None).unwrap();
        assert_eq!(table.len(), 1);
        assert_eq!(table[0].abs_freq, 1);
    }
}
