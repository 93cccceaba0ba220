//! Dataset ingest.
//!
//! Each variable comes from its own export with its own quirks. They all
//! reduce to the same contract: a sequence of `(date, value)` observations.
//!
//! Design goals:
//! - **One capability, many layouts**: `DataSource` hides the file format
//! - **Row-level tolerance**: unparsable rows are dropped, never fatal
//! - **Visible data quality**: dropped rows are counted and reported upward
//! - **Separation of concerns**: no aggregation or statistics here

use std::collections::HashMap;
use std::fs::File;
use std::io::{BufRead, BufReader, Read};
use std::path::{Path, PathBuf};

use chrono::{DateTime, NaiveDate, NaiveDateTime};
use csv::StringRecord;

use crate::config::SourceSpec;
use crate::domain::Observation;
use crate::error::AppError;

/// Ingest output: the usable observations plus row accounting.
#[derive(Debug, Clone, PartialEq)]
pub struct IngestedSeries {
    pub observations: Vec<Observation>,
    /// Data rows inspected (header and metadata lines excluded).
    pub rows_read: usize,
    /// Rows skipped because the date or value did not parse.
    pub rows_dropped: usize,
}

impl IngestedSeries {
    pub fn values(&self) -> Vec<f64> {
        self.observations.iter().map(|o| o.value).collect()
    }
}

/// Anything that can produce a variable's observations.
pub trait DataSource {
    /// Path or name used in log and error messages.
    fn describe(&self) -> String;

    /// Read the whole dataset. Fails on I/O or schema errors, or when no row
    /// is usable; individual bad rows are dropped and counted.
    fn load(&self) -> Result<IngestedSeries, AppError>;
}

/// Build the data source described by `spec`, reading from `path`.
pub fn source_for(spec: &SourceSpec, path: PathBuf) -> Box<dyn DataSource + Send + Sync> {
    match spec {
        SourceSpec::Columns {
            date_column,
            value_column,
            ..
        } => Box::new(ColumnSource {
            path,
            date_column: date_column.clone(),
            value_column: value_column.clone(),
        }),
        SourceSpec::Metadata {
            header_prefix,
            date_index,
            value_index,
            ..
        } => Box::new(MetadataSource {
            path,
            header_prefix: header_prefix.clone(),
            date_index: *date_index,
            value_index: *value_index,
        }),
    }
}

/// CSV with a header row; date and value columns looked up by name.
#[derive(Debug, Clone)]
pub struct ColumnSource {
    pub path: PathBuf,
    pub date_column: String,
    pub value_column: String,
}

impl ColumnSource {
    /// Parse CSV text from any reader.
    pub fn read_from<R: Read>(&self, reader: R) -> Result<IngestedSeries, AppError> {
        let mut reader = csv::ReaderBuilder::new()
            .flexible(true)
            .trim(csv::Trim::All)
            .from_reader(reader);

        let headers = reader
            .headers()
            .map_err(|e| AppError::new(2, format!("Failed to read CSV headers: {e}")))?
            .clone();
        let header_map = build_header_map(&headers);

        let date_idx = column_index(&header_map, &self.date_column)?;
        let value_idx = column_index(&header_map, &self.value_column)?;

        let mut observations = Vec::new();
        let mut rows_read = 0usize;
        let mut rows_dropped = 0usize;

        for result in reader.records() {
            rows_read += 1;
            let parsed = result
                .ok()
                .and_then(|record| parse_fields(record.get(date_idx), record.get(value_idx)));
            match parsed {
                Some(obs) => observations.push(obs),
                None => rows_dropped += 1,
            }
        }

        finish(observations, rows_read, rows_dropped)
    }
}

impl DataSource for ColumnSource {
    fn describe(&self) -> String {
        self.path.display().to_string()
    }

    fn load(&self) -> Result<IngestedSeries, AppError> {
        let file = open(&self.path)?;
        self.read_from(file)
    }
}

/// Text export with a metadata preamble and positional columns.
///
/// Data starts two lines after the first line beginning with `header_prefix`
/// (the header itself and a blank separator are skipped). If no such line
/// exists every line is treated as data.
#[derive(Debug, Clone)]
pub struct MetadataSource {
    pub path: PathBuf,
    pub header_prefix: String,
    pub date_index: usize,
    pub value_index: usize,
}

impl MetadataSource {
    pub fn read_from<R: BufRead>(&self, reader: R) -> Result<IngestedSeries, AppError> {
        let lines: Vec<String> = reader
            .lines()
            .collect::<Result<_, _>>()
            .map_err(|e| AppError::new(2, format!("Failed to read '{}': {e}", self.path.display())))?;

        let data_start = lines
            .iter()
            .position(|line| line.starts_with(&self.header_prefix))
            .map(|i| i + 2)
            .unwrap_or(0);

        let mut observations = Vec::new();
        let mut rows_read = 0usize;
        let mut rows_dropped = 0usize;

        for line in lines.iter().skip(data_start) {
            let line = line.trim();
            if line.is_empty() || !line.contains(',') {
                continue;
            }
            rows_read += 1;

            let parts: Vec<&str> = line.split(',').collect();
            match parse_fields(parts.get(self.date_index).copied(), parts.get(self.value_index).copied()) {
                Some(obs) => observations.push(obs),
                None => rows_dropped += 1,
            }
        }

        finish(observations, rows_read, rows_dropped)
    }
}

impl DataSource for MetadataSource {
    fn describe(&self) -> String {
        self.path.display().to_string()
    }

    fn load(&self) -> Result<IngestedSeries, AppError> {
        let file = open(&self.path)?;
        self.read_from(BufReader::new(file))
    }
}

fn open(path: &Path) -> Result<File, AppError> {
    File::open(path).map_err(|e| AppError::new(2, format!("Failed to open '{}': {e}", path.display())))
}

fn finish(observations: Vec<Observation>, rows_read: usize, rows_dropped: usize) -> Result<IngestedSeries, AppError> {
    if observations.is_empty() {
        return Err(AppError::new(
            3,
            format!("No usable rows ({rows_read} read, {rows_dropped} dropped)."),
        ));
    }
    Ok(IngestedSeries {
        observations,
        rows_read,
        rows_dropped,
    })
}

fn build_header_map(headers: &StringRecord) -> HashMap<String, usize> {
    headers
        .iter()
        .enumerate()
        .map(|(idx, name)| (normalize_header_name(name), idx))
        .collect()
}

fn normalize_header_name(name: &str) -> String {
    // Spreadsheet exports often prefix the first header with a UTF-8 BOM.
    let name = name.trim().trim_start_matches('\u{feff}');
    name.to_lowercase()
}

fn column_index(header_map: &HashMap<String, usize>, name: &str) -> Result<usize, AppError> {
    header_map
        .get(&normalize_header_name(name))
        .copied()
        .ok_or_else(|| AppError::new(2, format!("Missing required column: `{name}`")))
}

fn parse_fields(date: Option<&str>, value: Option<&str>) -> Option<Observation> {
    let date = parse_date(date?.trim())?;
    let value = parse_value(value?)?;
    Some(Observation::new(date, value))
}

/// Parse a date in any of the formats seen in the exports.
///
/// Accepts ISO dates with or without a time part, `YYYY/MM/DD`,
/// `DD/MM/YYYY`, `Mon D, YYYY`, RFC 3339 and epoch milliseconds.
pub fn parse_date(s: &str) -> Option<NaiveDate> {
    if s.is_empty() {
        return None;
    }

    const DATE_FMTS: [&str; 4] = ["%Y-%m-%d", "%Y/%m/%d", "%d/%m/%Y", "%b %d, %Y"];
    for fmt in DATE_FMTS {
        if let Ok(d) = NaiveDate::parse_from_str(s, fmt) {
            return Some(d);
        }
    }

    const DATETIME_FMTS: [&str; 4] = [
        "%Y-%m-%d %H:%M:%S",
        "%Y-%m-%dT%H:%M:%S",
        "%Y-%m-%d %H:%M",
        "%Y/%m/%d %H:%M:%S",
    ];
    for fmt in DATETIME_FMTS {
        if let Ok(dt) = NaiveDateTime::parse_from_str(s, fmt) {
            return Some(dt.date());
        }
    }

    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.date_naive());
    }

    // Earth Engine exports `system:time_start` as epoch milliseconds.
    if s.len() >= 9 && s.bytes().all(|b| b.is_ascii_digit()) {
        let ms = s.parse::<i64>().ok()?;
        return DateTime::from_timestamp_millis(ms).map(|dt| dt.date_naive());
    }

    None
}

fn parse_value(s: &str) -> Option<f64> {
    let s = s.trim();
    if s.is_empty() {
        return None;
    }
    let v = s.parse::<f64>().ok()?;
    if v.is_finite() { Some(v) } else { None }
}
