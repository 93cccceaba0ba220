//! Period aggregation.
//!
//! Observations are grouped by `(year, month)`, `(year, quarter)` or `year`
//! and averaged. For monthly and quarterly granularity a second stage then
//! averages the per-year means over the year dimension, producing the
//! seasonal regime:
//!
//! ```text
//! regime(m) = mean over years y of ( mean of values in (y, m) )
//! ```
//!
//! This is a mean of means, not a flat mean over all raw values of a
//! calendar month: a year with many observations in January weighs exactly as
//! much as a year with one.
//!
//! All grouping goes through `BTreeMap`s so output order and summation order
//! are fixed, which keeps repeated runs bit-identical.

use std::collections::BTreeMap;

use crate::domain::{Granularity, Observation, PeriodAggregate, PeriodKey};

#[derive(Debug, Clone, Copy, Default)]
struct Mean {
    sum: f64,
    count: usize,
}

impl Mean {
    fn push(&mut self, value: f64) {
        self.sum += value;
        self.count += 1;
    }

    fn value(&self) -> f64 {
        self.sum / self.count as f64
    }
}

/// First-stage aggregation: the mean per `(year, unit)` key, ordered by key.
///
/// Keys are `YearMonth`, `YearQuarter` or `Year` depending on `granularity`.
pub fn period_means(observations: &[Observation], granularity: Granularity) -> Vec<PeriodAggregate> {
    let mut groups: BTreeMap<PeriodKey, Mean> = BTreeMap::new();

    for obs in observations {
        let key = match granularity {
            Granularity::Monthly => PeriodKey::YearMonth(obs.year(), obs.month()),
            Granularity::Quarterly => PeriodKey::YearQuarter(obs.year(), obs.quarter()),
            Granularity::Annual => PeriodKey::Year(obs.year()),
        };
        groups.entry(key).or_default().push(obs.value);
    }

    groups
        .into_iter()
        .map(|(period, mean)| PeriodAggregate {
            period,
            mean_value: mean.value(),
        })
        .collect()
}

/// Aggregate observations at the given granularity.
///
/// - `Annual`: one row per year (single stage), ascending.
/// - `Monthly` / `Quarterly`: one row per calendar month / quarter present in
///   the input, ascending, each the mean of that unit's per-year means.
///
/// Empty input yields an empty result.
pub fn aggregate(observations: &[Observation], granularity: Granularity) -> Vec<PeriodAggregate> {
    let stage_one = period_means(observations, granularity);
    if granularity == Granularity::Annual {
        return stage_one;
    }

    let mut regime: BTreeMap<PeriodKey, Mean> = BTreeMap::new();
    for row in &stage_one {
        let key = match row.period {
            PeriodKey::YearMonth(_, m) => PeriodKey::Month(m),
            PeriodKey::YearQuarter(_, q) => PeriodKey::Quarter(q),
            other => other,
        };
        regime.entry(key).or_default().push(row.mean_value);
    }

    regime
        .into_iter()
        .map(|(period, mean)| PeriodAggregate {
            period,
            mean_value: mean.value(),
        })
        .collect()
}
