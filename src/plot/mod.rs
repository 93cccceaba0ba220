//! PNG rendering of the report.
//!
//! - `canvas`: scoped bitmap canvases and font registration
//! - `charts`: bar, line, box and comparison charts
//! - `tables`: table images
//!
//! [`render_variable`] writes the full chart set of one variable and returns
//! the paths it wrote, in a fixed order.

use std::path::{Path, PathBuf};

use crate::domain::{Granularity, PeriodAggregate, Variable};
use crate::error::AppError;
use crate::stats::{BoxSummary, ClassInterval, MonthFrequency, MonthlyStatistics, Statistics};

pub mod canvas;
pub mod charts;
pub mod tables;

pub use canvas::{init_fonts, text_enabled, with_canvas};
pub use charts::{BarSpec, annual_chart, bar_chart, boxplot_chart, comparison_chart};

/// File name of the comparison chart.
pub const COMPARISON_FILE: &str = "comparacion_regimenes.png";

/// Everything needed to draw one variable's charts.
#[derive(Debug, Clone, Copy)]
pub struct ChartInputs<'a> {
    pub variable: Variable,
    pub monthly: &'a [PeriodAggregate],
    pub quarterly: &'a [PeriodAggregate],
    pub annual: &'a [PeriodAggregate],
    pub statistics: &'a Statistics,
    pub intervals: &'a [ClassInterval],
    pub boxes: &'a [BoxSummary],
    pub monthly_statistics: &'a [MonthlyStatistics],
    pub frequency: &'a [MonthFrequency],
}

/// Output path `{dir}/{slug}_{suffix}.png`.
pub fn chart_path(dir: &Path, variable: Variable, suffix: &str) -> PathBuf {
    dir.join(format!("{}_{suffix}.png", variable.slug()))
}

/// Render every chart of one variable into `dir`.
pub fn render_variable(dir: &Path, inputs: &ChartInputs<'_>) -> Result<Vec<PathBuf>, AppError> {
    let v = inputs.variable;
    let mut written = Vec::new();

    for (granularity, aggregates) in [
        (Granularity::Monthly, inputs.monthly),
        (Granularity::Quarterly, inputs.quarterly),
    ] {
        let path = chart_path(dir, v, granularity.file_suffix());
        bar_chart(&path, &BarSpec::regime(v, granularity, aggregates))?;
        written.push(path);
    }

    let path = chart_path(dir, v, Granularity::Annual.file_suffix());
    annual_chart(&path, v, inputs.annual)?;
    written.push(path);

    let path = chart_path(dir, v, "boxplot");
    boxplot_chart(&path, v, inputs.boxes)?;
    written.push(path);

    for (suffix, spec) in frequency_specs(v, inputs.frequency) {
        let path = chart_path(dir, v, suffix);
        bar_chart(&path, &spec)?;
        written.push(path);
    }

    if text_enabled() {
        for (suffix, table) in [
            ("estadisticas", tables::statistics_table(v, inputs.statistics)),
            ("intervalos", tables::intervals_table(v, inputs.intervals)),
            ("boxplot_stats", tables::monthly_statistics_table(v, inputs.monthly_statistics)),
        ] {
            let path = chart_path(dir, v, suffix);
            tables::table_image(&path, &table, v)?;
            written.push(path);
        }
    } else {
        log::warn!("{v}: no font available, table images skipped");
    }

    Ok(written)
}

/// The four monthly observation-frequency charts.
fn frequency_specs(variable: Variable, frequency: &[MonthFrequency]) -> [(&'static str, BarSpec); 4] {
    let labels = charts::month_labels(frequency.iter().map(|f| f.month));
    let spec = |title: &str, y_desc: &str, values: Vec<f64>| BarSpec {
        title: format!("{title} - {}", variable.short_title()),
        x_desc: "Mes".to_string(),
        y_desc: y_desc.to_string(),
        labels: labels.clone(),
        values,
        color: canvas::rgb(variable.color()),
        annotate: true,
    };

    [
        (
            "frec_abs_mensual",
            spec(
                "Frecuencia Absoluta Mensual",
                "Número de registros",
                frequency.iter().map(|f| f.count as f64).collect(),
            ),
        ),
        (
            "frec_abs_acum",
            spec(
                "Frecuencia Absoluta Acumulada",
                "Registros acumulados",
                frequency.iter().map(|f| f.cum_count as f64).collect(),
            ),
        ),
        (
            "frec_rel_mensual",
            spec(
                "Frecuencia Relativa Mensual",
                "Frecuencia relativa",
                frequency.iter().map(|f| f.rel_freq).collect(),
            ),
        ),
        (
            "frec_rel_acum",
            spec(
                "Frecuencia Relativa Acumulada",
                "Frecuencia relativa acumulada",
                frequency.iter().map(|f| f.cum_rel_freq).collect(),
            ),
        ),
    ]
}

/// Render the cross-variable comparison chart into `dir`.
pub fn render_comparison(dir: &Path, regimes: &[(Variable, Vec<PeriodAggregate>)]) -> Result<PathBuf, AppError> {
    let path = dir.join(COMPARISON_FILE);
    comparison_chart(&path, regimes)?;
    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn chart_paths_use_variable_slug() {
        let dir = Path::new("figuras");
        assert_eq!(
            chart_path(dir, Variable::MinTemperature, "mensual"),
            PathBuf::from("figuras/temperatura_mensual.png")
        );
        assert_eq!(
            chart_path(dir, Variable::Flow, "frec_rel_acum"),
            PathBuf::from("figuras/caudal_frec_rel_acum.png")
        );
    }

    #[test]
    fn frequency_specs_follow_frequency_table() {
        let frequency = vec![
            MonthFrequency {
                month: 1,
                count: 2,
                cum_count: 2,
                rel_freq: 0.5,
                cum_rel_freq: 0.5,
            },
            MonthFrequency {
                month: 7,
                count: 2,
                cum_count: 4,
                rel_freq: 0.5,
                cum_rel_freq: 1.0,
            },
        ];
        let specs = frequency_specs(Variable::Flow, &frequency);
        let suffixes: Vec<&str> = specs.iter().map(|(s, _)| *s).collect();
        assert_eq!(
            suffixes,
            vec!["frec_abs_mensual", "frec_abs_acum", "frec_rel_mensual", "frec_rel_acum"]
        );
        assert_eq!(specs[0].1.labels, vec!["Ene", "Jul"]);
        assert_eq!(specs[1].1.values, vec![2.0, 4.0]);
        assert_eq!(specs[3].1.values, vec![0.5, 1.0]);
    }
}
