//! Chart renderers.
//!
//! Renderers are data-driven: callers hand over fully computed series and
//! labels, and the functions here only draw. Each public function writes one
//! PNG file.

use std::path::Path;

use plotters::prelude::*;
use plotters::style::text_anchor::{HPos, Pos, VPos};

use crate::domain::{Granularity, MONTH_LABELS, PeriodAggregate, Variable, month_label};
use crate::error::AppError;
use crate::plot::canvas::{Canvas, DrawResult, bold, font, rgb, text_enabled, with_canvas};
use crate::stats::BoxSummary;

pub const CHART_SIZE: (u32, u32) = (1200, 700);
pub const COMPARISON_SIZE: (u32, u32) = (1500, 1200);

const MEAN_LINE: RGBColor = RGBColor(0xD6, 0x27, 0x28);
const GRID: RGBColor = RGBColor(0xDD, 0xDD, 0xDD);

/// A categorical bar chart.
#[derive(Debug, Clone)]
pub struct BarSpec {
    pub title: String,
    pub x_desc: String,
    pub y_desc: String,
    pub labels: Vec<String>,
    pub values: Vec<f64>,
    pub color: RGBColor,
    /// Write each bar's value above it.
    pub annotate: bool,
}

impl BarSpec {
    /// Bar chart of a monthly or quarterly regime.
    pub fn regime(variable: Variable, granularity: Granularity, aggregates: &[PeriodAggregate]) -> Self {
        Self {
            title: format!("Régimen {} de {}", granularity.display_name(), variable.short_title()),
            x_desc: granularity.axis_label().to_string(),
            y_desc: variable.axis_label().to_string(),
            labels: aggregates.iter().map(|a| a.period.label()).collect(),
            values: aggregates.iter().map(|a| a.mean_value).collect(),
            color: rgb(variable.color()),
            annotate: true,
        }
    }
}

/// Write a bar chart to `path`.
pub fn bar_chart(path: &Path, spec: &BarSpec) -> Result<(), AppError> {
    with_canvas(path, CHART_SIZE, |root| draw_bars(root, spec, 1.0))
}

/// Value range covering every bar and the zero baseline, with headroom.
fn bar_range(values: &[f64]) -> (f64, f64) {
    let finite = values.iter().copied().filter(|v| v.is_finite());
    let lo = finite.clone().fold(0.0f64, f64::min);
    let hi = finite.fold(0.0f64, f64::max);
    let pad = (hi - lo).abs().max(1e-9) * 0.12;
    let lo = if lo < 0.0 { lo - pad } else { 0.0 };
    let hi = if hi > 0.0 { hi + pad } else { 0.0 };
    if hi - lo < 1e-9 { (lo, lo + 1.0) } else { (lo, hi) }
}

/// Category axis: slot `i` (1-based) is centred at `x = i` on `0.5..n + 0.5`,
/// so `x_labels(n)` places exactly one tick per slot.
fn category_axis(n: usize) -> std::ops::Range<f64> {
    0.5..n as f64 + 0.5
}

fn slot_label(labels: &[String], x: f64) -> String {
    let idx = x.round() as i64 - 1;
    if idx < 0 {
        return String::new();
    }
    labels.get(idx as usize).cloned().unwrap_or_default()
}

/// Draw `spec` into `area`. `scale` shrinks text and margins for the
/// comparison grid.
fn draw_bars(area: &Canvas<'_>, spec: &BarSpec, scale: f64) -> DrawResult<()> {
    let n = spec.labels.len().max(1);
    let (y_lo, y_hi) = bar_range(&spec.values);
    let text = text_enabled();
    let px = |size: f64| (size * scale).round() as i32;
    let pt = |size: f64| (size * scale).round() as u32;
    let x_fmt = |x: &f64| slot_label(&spec.labels, *x);
    let y_fmt = |y: &f64| format!("{y:.2}");

    let mut builder = ChartBuilder::on(area);
    builder.margin(px(16.0));
    if text {
        builder
            .caption(&spec.title, bold(pt(26.0)))
            .x_label_area_size(px(50.0))
            .y_label_area_size(px(80.0));
    }
    let mut chart = builder.build_cartesian_2d(category_axis(n), y_lo..y_hi)?;

    let mut mesh = chart.configure_mesh();
    mesh.disable_x_mesh()
        .x_labels(n)
        .light_line_style(&TRANSPARENT)
        .bold_line_style(&GRID);
    if text {
        mesh.x_desc(spec.x_desc.as_str())
            .y_desc(spec.y_desc.as_str())
            .x_label_formatter(&x_fmt)
            .y_label_formatter(&y_fmt)
            .label_style(font(pt(15.0)))
            .axis_desc_style(font(pt(17.0)));
    }
    mesh.draw()?;

    let bar = |i: usize, v: f64| {
        let x = i as f64 + 1.0;
        [(x - 0.35, 0.0), (x + 0.35, v)]
    };
    chart.draw_series(
        spec.values
            .iter()
            .enumerate()
            .map(|(i, &v)| Rectangle::new(bar(i, v), spec.color.filled())),
    )?;
    chart.draw_series(
        spec.values
            .iter()
            .enumerate()
            .map(|(i, &v)| Rectangle::new(bar(i, v), BLACK.stroke_width(1))),
    )?;

    if text && spec.annotate {
        let style = font(pt(13.0)).pos(Pos::new(HPos::Center, VPos::Bottom));
        let points: Vec<(f64, f64)> = spec.values.iter().enumerate().map(|(i, &v)| (i as f64 + 1.0, v)).collect();
        chart.draw_series(
            value_labels(&points, y_hi - y_lo)
                .into_iter()
                .map(|(label, at)| Text::new(label, at, style.clone())),
        )?;
    }

    Ok(())
}

/// `{:.2}` label for each point, lifted 1% of `span` away from zero.
fn value_labels(points: &[(f64, f64)], span: f64) -> Vec<(String, (f64, f64))> {
    let lift = span * 0.01;
    points
        .iter()
        .filter(|(_, v)| v.is_finite())
        .map(|&(x, v)| {
            let y = if v >= 0.0 { v + lift } else { v - lift };
            (format!("{v:.2}"), (x, y))
        })
        .collect()
}

/// Line chart of the annual regime.
pub fn annual_chart(path: &Path, variable: Variable, annual: &[PeriodAggregate]) -> Result<(), AppError> {
    let points: Vec<(f64, f64)> = annual.iter().map(|a| (a.period.ordinal(), a.mean_value)).collect();
    let title = format!("Régimen Anual de {}", variable.short_title());
    let color = rgb(variable.color());

    with_canvas(path, CHART_SIZE, |root| {
        let (x_lo, x_hi) = match (points.first(), points.last()) {
            (Some(first), Some(last)) => (first.0 - 0.5, last.0 + 0.5),
            _ => (0.0, 1.0),
        };
        let (y_lo, y_hi) = padded_range(points.iter().map(|p| p.1));

        let text = text_enabled();
        let x_fmt = |x: &f64| format!("{x:.0}");
        let y_fmt = |y: &f64| format!("{y:.2}");

        let mut builder = ChartBuilder::on(root);
        builder.margin(16);
        if text {
            builder
                .caption(&title, bold(26))
                .x_label_area_size(50)
                .y_label_area_size(80);
        }
        let mut chart = builder.build_cartesian_2d(x_lo..x_hi, y_lo..y_hi)?;

        let mut mesh = chart.configure_mesh();
        // At most one tick per year; longer records get 2/5/10-year steps.
        mesh.x_labels(points.len().clamp(1, 12))
            .light_line_style(&TRANSPARENT)
            .bold_line_style(&GRID);
        if text {
            mesh.x_desc("Año")
                .y_desc(variable.axis_label())
                .x_label_formatter(&x_fmt)
                .y_label_formatter(&y_fmt)
                .label_style(font(15))
                .axis_desc_style(font(17));
        }
        mesh.draw()?;

        chart.draw_series(LineSeries::new(points.iter().copied(), color.stroke_width(2)))?;
        chart.draw_series(points.iter().map(|&p| Circle::new(p, 4, color.filled())))?;

        if text {
            let style = font(13).pos(Pos::new(HPos::Center, VPos::Bottom));
            chart.draw_series(
                value_labels(&points, y_hi - y_lo)
                    .into_iter()
                    .map(|(label, at)| Text::new(label, at, style.clone())),
            )?;
        }
        Ok(())
    })
}

/// Min/max of `values` with 8% headroom on both sides.
fn padded_range(values: impl Iterator<Item = f64>) -> (f64, f64) {
    let (lo, hi) = values
        .filter(|v| v.is_finite())
        .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), v| (lo.min(v), hi.max(v)));
    if !lo.is_finite() {
        return (0.0, 1.0);
    }
    let pad = ((hi - lo) * 0.08).max(hi.abs().max(1.0) * 0.01);
    (lo - pad, hi + pad)
}

/// Box per calendar month with the monthly mean overlaid.
pub fn boxplot_chart(path: &Path, variable: Variable, boxes: &[BoxSummary]) -> Result<(), AppError> {
    let title = format!("Diagrama de Caja Mensual de {}", variable.short_title());
    let fill = rgb(variable.tint());
    let edge = rgb(variable.color());
    let labels: Vec<String> = MONTH_LABELS.iter().map(|s| s.to_string()).collect();

    with_canvas(path, CHART_SIZE, |root| {
        let (y_lo, y_hi) = padded_range(boxes.iter().flat_map(|b| {
            [b.lower_whisker, b.upper_whisker]
                .into_iter()
                .chain(b.outliers.iter().copied())
        }));

        let text = text_enabled();
        let x_fmt = |x: &f64| slot_label(&labels, *x);
        let y_fmt = |y: &f64| format!("{y:.2}");

        let mut builder = ChartBuilder::on(root);
        builder.margin(16);
        if text {
            builder
                .caption(&title, bold(26))
                .x_label_area_size(50)
                .y_label_area_size(80);
        }
        let mut chart = builder.build_cartesian_2d(category_axis(12), y_lo..y_hi)?;

        let mut mesh = chart.configure_mesh();
        mesh.disable_x_mesh()
            .x_labels(12)
            .light_line_style(&TRANSPARENT)
            .bold_line_style(&GRID);
        if text {
            mesh.x_desc("Mes")
                .y_desc(variable.axis_label())
                .x_label_formatter(&x_fmt)
                .y_label_formatter(&y_fmt)
                .label_style(font(15))
                .axis_desc_style(font(17));
        }
        mesh.draw()?;

        for b in boxes {
            let centre = f64::from(b.month);
            let (left, right) = (centre - 0.25, centre + 0.25);
            let (cap_l, cap_r) = (centre - 0.12, centre + 0.12);

            chart.draw_series([
                Rectangle::new([(left, b.q1), (right, b.q3)], fill.filled()),
                Rectangle::new([(left, b.q1), (right, b.q3)], edge.stroke_width(1)),
            ])?;
            chart.draw_series(
                [
                    vec![(centre, b.q3), (centre, b.upper_whisker)],
                    vec![(centre, b.q1), (centre, b.lower_whisker)],
                    vec![(cap_l, b.upper_whisker), (cap_r, b.upper_whisker)],
                    vec![(cap_l, b.lower_whisker), (cap_r, b.lower_whisker)],
                ]
                .into_iter()
                .map(|pts| PathElement::new(pts, BLACK.stroke_width(1))),
            )?;
            chart.draw_series(std::iter::once(PathElement::new(
                vec![(left, b.median), (right, b.median)],
                edge.stroke_width(3),
            )))?;
            chart.draw_series(
                b.outliers
                    .iter()
                    .map(|&v| Circle::new((centre, v), 3, BLACK.stroke_width(1))),
            )?;
        }

        let means: Vec<(f64, f64)> = boxes.iter().map(|b| (f64::from(b.month), b.mean)).collect();
        chart.draw_series(means.iter().map(|&p| Circle::new(p, 4, MEAN_LINE.filled())))?;
        let series = chart.draw_series(LineSeries::new(means.iter().copied(), MEAN_LINE.stroke_width(2)))?;

        if text {
            series
                .label("Media mensual")
                .legend(|(x, y)| PathElement::new(vec![(x, y), (x + 20, y)], MEAN_LINE.stroke_width(2)));
            chart
                .configure_series_labels()
                .background_style(&WHITE.mix(0.8))
                .border_style(&BLACK)
                .label_font(font(14))
                .draw()?;
        }
        Ok(())
    })
}

/// 3x2 grid of monthly regimes, one panel per variable; unused panels stay blank.
pub fn comparison_chart(path: &Path, regimes: &[(Variable, Vec<PeriodAggregate>)]) -> Result<(), AppError> {
    with_canvas(path, COMPARISON_SIZE, |root| {
        let root = if text_enabled() {
            root.titled("Comparación de Regímenes Mensuales", bold(30))?
        } else {
            root.clone()
        };
        let panels = root.split_evenly((3, 2));
        for (panel, (variable, monthly)) in panels.iter().zip(regimes) {
            draw_bars(panel, &comparison_panel(*variable, monthly), 0.7)?;
        }
        Ok(())
    })
}

fn comparison_panel(variable: Variable, monthly: &[PeriodAggregate]) -> BarSpec {
    BarSpec {
        annotate: false,
        ..BarSpec::regime(variable, Granularity::Monthly, monthly)
    }
}

/// Label of a month bar: three-letter Spanish abbreviation.
pub fn month_labels(months: impl Iterator<Item = u32>) -> Vec<String> {
    months.map(|m| month_label(m).to_string()).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::PeriodKey;

    #[test]
    fn bar_range_includes_zero_and_headroom() {
        let (lo, hi) = bar_range(&[2.0, 10.0]);
        assert_eq!(lo, 0.0);
        assert!(hi > 10.0);

        let (lo, hi) = bar_range(&[-4.0, -1.0]);
        assert!(lo < -4.0);
        assert_eq!(hi, 0.0);

        assert_eq!(bar_range(&[]), (0.0, 1.0));
        assert_eq!(bar_range(&[0.0, 0.0]), (0.0, 1.0));
    }

    #[test]
    fn slot_labels_map_centres_to_categories() {
        let labels = month_labels(1..=3);
        assert_eq!(slot_label(&labels, 1.0), "Ene");
        assert_eq!(slot_label(&labels, 2.9999999), "Mar");
        assert_eq!(slot_label(&labels, 4.0), "");
        assert_eq!(slot_label(&labels, 0.0), "");
        assert_eq!(category_axis(3), 0.5..3.5);
    }

    #[test]
    fn padded_range_handles_constant_series() {
        let (lo, hi) = padded_range([5.0, 5.0].into_iter());
        assert!(lo < 5.0 && hi > 5.0);
        assert_eq!(padded_range(std::iter::empty()), (0.0, 1.0));
    }

    #[test]
    fn regime_spec_uses_period_labels() {
        let aggs = vec![
            PeriodAggregate {
                period: PeriodKey::Quarter(1),
                mean_value: 3.0,
            },
            PeriodAggregate {
                period: PeriodKey::Quarter(3),
                mean_value: 5.0,
            },
        ];
        let spec = BarSpec::regime(Variable::Flow, Granularity::Quarterly, &aggs);
        assert_eq!(spec.labels, vec!["Ene-Mar", "Jul-Sep"]);
        assert_eq!(spec.values, vec![3.0, 5.0]);
        assert_eq!(spec.x_desc, "Trimestre");
        assert!(spec.title.contains("Caudal"));
    }

    #[test]
    fn value_labels_sit_outside_each_point() {
        let labels = value_labels(&[(1.0, 2.5), (2.0, -1.0), (3.0, f64::NAN)], 100.0);
        assert_eq!(labels.len(), 2);
        assert_eq!(labels[0], ("2.50".to_string(), (1.0, 3.5)));
        assert_eq!(labels[1], ("-1.00".to_string(), (2.0, -2.0)));
    }

    #[test]
    fn comparison_panels_keep_full_regime_titles() {
        let monthly = vec![PeriodAggregate {
            period: PeriodKey::Month(1),
            mean_value: 1.0,
        }];
        let spec = comparison_panel(Variable::Evaporation, &monthly);
        assert_eq!(spec.title, "Régimen Mensual de Evaporación");
        assert_eq!(spec.x_desc, "Mes");
        assert!(!spec.annotate);
    }

    #[test]
    fn annual_chart_renders_without_font() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("anual.png");
        let annual: Vec<PeriodAggregate> = (2015..=2020)
            .map(|y| PeriodAggregate {
                period: PeriodKey::Year(y),
                mean_value: f64::from(y - 2000),
            })
            .collect();
        annual_chart(&path, Variable::Flow, &annual).unwrap();
        assert!(path.exists());
    }

    #[test]
    fn bar_chart_renders_without_font() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bars.png");
        let spec = BarSpec {
            title: "t".to_string(),
            x_desc: "x".to_string(),
            y_desc: "y".to_string(),
            labels: month_labels(1..=4),
            values: vec![1.0, -2.0, 3.5, 0.0],
            color: rgb(Variable::Flow.color()),
            annotate: true,
        };
        // Tests never register a font, so text stays disabled here.
        bar_chart(&path, &spec).unwrap();
        assert!(path.exists());
    }
}
