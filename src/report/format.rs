//! Terminal formatting.
//!
//! All output is built as `String`s so it can be tested without capturing
//! stdout. Column layouts use fixed widths; trailing whitespace is trimmed.

use crate::app::pipeline::PipelineOutput;
use crate::domain::{Granularity, PeriodAggregate, Variable};
use crate::error::AppError;
use crate::stats::{ClassInterval, Statistics};

/// Named rows of a `Statistics` summary, in display order.
///
/// Shared by the terminal report and the statistics table image.
pub fn statistics_rows(stats: &Statistics) -> Vec<(&'static str, String)> {
    vec![
        ("Número de datos", stats.n.to_string()),
        ("Mínimo", fmt_num(stats.min)),
        ("Máximo", fmt_num(stats.max)),
        ("Rango", fmt_num(stats.range)),
        ("Media", fmt_num(stats.mean)),
        ("Mediana", fmt_num(stats.median)),
        ("Moda", fmt_num(stats.mode)),
        ("Varianza", fmt_num(stats.variance)),
        ("Desviación estándar", fmt_num(stats.std_dev)),
        ("Coef. de variación (%)", fmt_num(stats.coef_variation)),
        ("Número de clases", stats.num_classes.to_string()),
        ("Amplitud de clase", fmt_num(stats.class_width)),
    ]
}

/// Two-column statistics listing.
pub fn format_statistics(variable: Variable, stats: &Statistics) -> String {
    let mut out = String::new();
    out.push_str(&format!("=== {} ===\n", variable.dataset_title()));
    for (name, value) in statistics_rows(stats) {
        out.push_str(format!("{:<26} {:>14}", name, value).trim_end());
        out.push('\n');
    }
    out
}

/// Frequency-distribution table.
pub fn format_intervals(intervals: &[ClassInterval]) -> String {
    let mut out = String::new();
    out.push_str(
        format!(
            "{:<24} {:>12} {:>8} {:>10} {:>8} {:>10}",
            "interval", "midpoint", "abs", "rel", "cum_abs", "cum_rel"
        )
        .trim_end(),
    );
    out.push('\n');
    out.push_str(&format!("{:-<24} {:-<12} {:-<8} {:-<10} {:-<8} {:-<10}\n", "", "", "", "", "", ""));

    for c in intervals {
        out.push_str(
            format!(
                "{:<24} {:>12} {:>8} {:>10.4} {:>8} {:>10.4}",
                truncate(&c.label, 24),
                fmt_num(c.midpoint),
                c.abs_freq,
                c.rel_freq,
                c.cum_abs_freq,
                c.cum_rel_freq,
            )
            .trim_end(),
        );
        out.push('\n');
    }
    out
}

/// Period/mean table for one regime.
pub fn format_regime(variable: Variable, granularity: Granularity, aggregates: &[PeriodAggregate]) -> String {
    let mut out = String::new();
    out.push_str(&format!(
        "=== Régimen {} de {} ===\n",
        granularity.display_name(),
        variable.short_title()
    ));
    out.push_str(format!("{:<12} {:>14}", granularity.axis_label(), variable.axis_label()).trim_end());
    out.push('\n');
    out.push_str(&format!("{:-<12} {:-<14}\n", "", ""));
    for a in aggregates {
        out.push_str(&format!("{:<12} {:>14}\n", a.period.label(), fmt_num(a.mean_value)));
    }
    if aggregates.is_empty() {
        out.push_str("(no data)\n");
    }
    out
}

/// One line per pipeline: rows used and dropped, headline statistics, files written.
pub fn format_run_summary(results: &[(Variable, Result<PipelineOutput, AppError>)]) -> String {
    let mut out = String::new();
    out.push_str("=== hydro - Resumen ===\n");
    out.push_str(
        format!(
            "{:<14} {:>8} {:>8} {:>12} {:>12} {:>6}  {}",
            "variable", "rows", "dropped", "mean", "std", "files", "status"
        )
        .trim_end(),
    );
    out.push('\n');
    out.push_str(&format!(
        "{:-<14} {:-<8} {:-<8} {:-<12} {:-<12} {:-<6}  {:-<6}\n",
        "", "", "", "", "", "", ""
    ));

    for (variable, result) in results {
        let line = match result {
            Ok(output) => format!(
                "{:<14} {:>8} {:>8} {:>12} {:>12} {:>6}  ok",
                variable.slug(),
                output.rows_read - output.rows_dropped,
                output.rows_dropped,
                fmt_num(output.statistics.mean),
                fmt_num(output.statistics.std_dev),
                output.written.len(),
            ),
            Err(err) => format!(
                "{:<14} {:>8} {:>8} {:>12} {:>12} {:>6}  error: {}",
                variable.slug(),
                "-",
                "-",
                "-",
                "-",
                "-",
                truncate(&err.to_string(), 60),
            ),
        };
        out.push_str(line.trim_end());
        out.push('\n');
    }

    let failed = results.iter().filter(|(_, r)| r.is_err()).count();
    out.push_str(&format!("\n{} ok, {failed} failed\n", results.len() - failed));
    out
}

/// Fixed four-decimal rendering used across reports and tables.
pub fn fmt_num(v: f64) -> String {
    if v.is_finite() { format!("{v:.4}") } else { "N/A".to_string() }
}

pub(crate) fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        return s.to_string();
    }
    let mut out: String = s.chars().take(max.saturating_sub(1)).collect();
    out.push('.');
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::PeriodKey;
    use crate::stats::{class_intervals, describe};

    fn one_to_ten() -> Vec<f64> {
        (1..=10).map(f64::from).collect()
    }

    #[test]
    fn statistics_listing_has_every_row() {
        let stats = describe(&one_to_ten()).unwrap();
        let text = format_statistics(Variable::Flow, &stats);
        assert!(text.starts_with("=== Caudal Medio Mensual ==="));
        assert!(text.contains("Media"));
        assert!(text.contains("5.5000"));
        assert!(text.contains("Número de clases"));
        assert_eq!(text.lines().count(), 13);
    }

    #[test]
    fn intervals_table_rows() {
        let intervals = class_intervals(&one_to_ten(), None).unwrap();
        let text = format_intervals(&intervals);
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines.len(), 2 + 4);
        assert!(lines[2].starts_with("[1.00, 3.25)"));
        assert!(lines[5].starts_with("[7.75, 10.00]"));
        assert!(lines.iter().all(|l| l.trim_end() == *l));
    }

    #[test]
    fn regime_table_lists_periods_in_order() {
        let aggs = vec![
            PeriodAggregate {
                period: PeriodKey::Month(1),
                mean_value: 22.5,
            },
            PeriodAggregate {
                period: PeriodKey::Month(2),
                mean_value: 15.0,
            },
        ];
        let text = format_regime(Variable::Flow, Granularity::Monthly, &aggs);
        let ene = text.find("Ene").unwrap();
        let feb = text.find("Feb").unwrap();
        assert!(ene < feb);
        assert!(text.contains("22.5000"));

        let empty = format_regime(Variable::Flow, Granularity::Annual, &[]);
        assert!(empty.contains("(no data)"));
    }

    #[test]
    fn summary_counts_failures() {
        let results = vec![(
            Variable::Evaporation,
            Err(AppError::new(2, "Failed to open 'evap.csv': No such file")),
        )];
        let text = format_run_summary(&results);
        assert!(text.contains("evaporacion"));
        assert!(text.contains("error: Failed to open"));
        assert!(text.contains("0 ok, 1 failed"));
    }

    #[test]
    fn number_formatting() {
        assert_eq!(fmt_num(1.0), "1.0000");
        assert_eq!(fmt_num(f64::NAN), "N/A");
        assert_eq!(truncate("abcdef", 4), "abc.");
        assert_eq!(truncate("abc", 4), "abc");
    }
}
