//! Export structured results next to the charts.
//!
//! The exports are meant to be easy to consume in spreadsheets or downstream scripts:
//! one CSV with the frequency table, one JSON document with everything else.

use std::fs::File;
use std::path::Path;

use serde::Serialize;

use crate::domain::{PeriodAggregate, Variable};
use crate::error::AppError;
use crate::stats::{BoxSummary, ClassInterval, MonthFrequency, Statistics};

/// JSON summary of one variable's pipeline run.
#[derive(Debug, Serialize)]
pub struct SummaryFile<'a> {
    pub tool: &'static str,
    pub variable: Variable,
    pub title: &'static str,
    pub rows_read: usize,
    pub rows_dropped: usize,
    pub statistics: &'a Statistics,
    pub intervals: &'a [ClassInterval],
    pub regimes: RegimeSet<'a>,
    pub monthly_frequency: &'a [MonthFrequency],
    pub box_summaries: &'a [BoxSummary],
}

#[derive(Debug, Serialize)]
pub struct RegimeSet<'a> {
    pub monthly: &'a [PeriodAggregate],
    pub quarterly: &'a [PeriodAggregate],
    pub annual: &'a [PeriodAggregate],
}

/// Write the class-interval table as CSV.
pub fn write_intervals_csv(path: &Path, intervals: &[ClassInterval]) -> Result<(), AppError> {
    let mut writer = csv::Writer::from_path(path)
        .map_err(|e| AppError::new(4, format!("Failed to create export CSV '{}': {e}", path.display())))?;

    for interval in intervals {
        writer
            .serialize(interval)
            .map_err(|e| AppError::new(4, format!("Failed to write export CSV row: {e}")))?;
    }

    writer
        .flush()
        .map_err(|e| AppError::new(4, format!("Failed to flush export CSV '{}': {e}", path.display())))?;
    Ok(())
}

/// Write the summary JSON document.
pub fn write_summary_json(path: &Path, summary: &SummaryFile<'_>) -> Result<(), AppError> {
    let file = File::create(path)
        .map_err(|e| AppError::new(4, format!("Failed to create summary JSON '{}': {e}", path.display())))?;
    serde_json::to_writer_pretty(file, summary)
        .map_err(|e| AppError::new(4, format!("Failed to write summary JSON: {e}")))?;
    Ok(())
}
