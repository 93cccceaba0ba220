//! Per-variable pipeline shared by every subcommand.
//!
//! ingest -> aggregate (monthly / quarterly / annual) -> describe -> class
//! intervals -> monthly summaries -> charts -> exports
//!
//! A pipeline owns everything it touches (its data source, its canvases, its
//! output files), so several can run at once without coordination.

use std::path::{Path, PathBuf};

use crate::config::Config;
use crate::domain::{Granularity, PeriodAggregate, Variable};
use crate::error::AppError;
use crate::io::export::{RegimeSet, SummaryFile, write_intervals_csv, write_summary_json};
use crate::io::ingest::{DataSource, source_for};
use crate::plot::{ChartInputs, render_variable};
use crate::stats::{
    BoxSummary, ClassInterval, MonthFrequency, MonthlyStatistics, Statistics, aggregate, box_summaries,
    class_intervals, describe, monthly_frequency, monthly_statistics,
};

/// What a pipeline run should produce besides the computed results.
#[derive(Debug, Clone, Default)]
pub struct PipelineOptions {
    /// Where charts and exports go. The directory must already exist.
    pub output_dir: PathBuf,
    pub charts: bool,
    pub export: bool,
    /// Class count override; Sturges' rule when `None`.
    pub num_classes: Option<usize>,
}

/// All computed outputs of one variable's pipeline.
#[derive(Debug, Clone)]
pub struct PipelineOutput {
    pub variable: Variable,
    pub rows_read: usize,
    pub rows_dropped: usize,
    pub monthly: Vec<PeriodAggregate>,
    pub quarterly: Vec<PeriodAggregate>,
    pub annual: Vec<PeriodAggregate>,
    pub statistics: Statistics,
    pub intervals: Vec<ClassInterval>,
    pub frequency: Vec<MonthFrequency>,
    pub monthly_statistics: Vec<MonthlyStatistics>,
    pub boxes: Vec<BoxSummary>,
    /// Files written by this run, charts first.
    pub written: Vec<PathBuf>,
}

impl PipelineOutput {
    pub fn regime(&self, granularity: Granularity) -> &[PeriodAggregate] {
        match granularity {
            Granularity::Monthly => &self.monthly,
            Granularity::Quarterly => &self.quarterly,
            Granularity::Annual => &self.annual,
        }
    }

    fn chart_inputs(&self) -> ChartInputs<'_> {
        ChartInputs {
            variable: self.variable,
            monthly: &self.monthly,
            quarterly: &self.quarterly,
            annual: &self.annual,
            statistics: &self.statistics,
            intervals: &self.intervals,
            boxes: &self.boxes,
            monthly_statistics: &self.monthly_statistics,
            frequency: &self.frequency,
        }
    }

    fn summary(&self) -> SummaryFile<'_> {
        SummaryFile {
            tool: "hydro",
            variable: self.variable,
            title: self.variable.dataset_title(),
            rows_read: self.rows_read,
            rows_dropped: self.rows_dropped,
            statistics: &self.statistics,
            intervals: &self.intervals,
            regimes: RegimeSet {
                monthly: &self.monthly,
                quarterly: &self.quarterly,
                annual: &self.annual,
            },
            monthly_frequency: &self.frequency,
            box_summaries: &self.boxes,
        }
    }
}

/// Run the pipeline for `variable` using the source configured for it.
///
/// Errors carry the variable name as context.
pub fn run_variable(config: &Config, variable: Variable, options: &PipelineOptions) -> Result<PipelineOutput, AppError> {
    let source = source_for(config.sources.get(variable), config.source_path(variable));
    run_with_source(variable, source.as_ref(), options).map_err(|e| e.context(variable))
}

/// Run the pipeline over an arbitrary data source.
pub fn run_with_source(
    variable: Variable,
    source: &dyn DataSource,
    options: &PipelineOptions,
) -> Result<PipelineOutput, AppError> {
    log::info!("{variable}: loading {}", source.describe());
    let series = source.load()?;
    if series.rows_dropped > 0 {
        log::warn!(
            "{variable}: dropped {} of {} rows with an unparsable date or value",
            series.rows_dropped,
            series.rows_read
        );
    }

    let observations = &series.observations;
    let values = series.values();

    let statistics = describe(&values)?;
    let intervals = class_intervals(&values, options.num_classes)?;
    log::info!(
        "{variable}: n={} mean={:.4} std={:.4} classes={}",
        statistics.n,
        statistics.mean,
        statistics.std_dev,
        intervals.len()
    );

    let mut output = PipelineOutput {
        variable,
        rows_read: series.rows_read,
        rows_dropped: series.rows_dropped,
        monthly: aggregate(observations, Granularity::Monthly),
        quarterly: aggregate(observations, Granularity::Quarterly),
        annual: aggregate(observations, Granularity::Annual),
        statistics,
        intervals,
        frequency: monthly_frequency(observations),
        monthly_statistics: monthly_statistics(observations),
        boxes: box_summaries(observations),
        written: Vec::new(),
    };

    if options.charts {
        let charts = render_variable(&options.output_dir, &output.chart_inputs())?;
        log::info!("{variable}: wrote {} charts", charts.len());
        output.written.extend(charts);
    }

    if options.export {
        let exported = write_exports(&options.output_dir, &output)?;
        output.written.extend(exported);
    }

    Ok(output)
}

fn write_exports(dir: &Path, output: &PipelineOutput) -> Result<Vec<PathBuf>, AppError> {
    let slug = output.variable.slug();

    let csv_path = dir.join(format!("{slug}_intervalos.csv"));
    write_intervals_csv(&csv_path, &output.intervals)?;

    let json_path = dir.join(format!("{slug}_resumen.json"));
    write_summary_json(&json_path, &output.summary())?;

    log::debug!("{}: exported {} and {}", output.variable, csv_path.display(), json_path.display());
    Ok(vec![csv_path, json_path])
}
