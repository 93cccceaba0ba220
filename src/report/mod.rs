//! Reporting utilities: formatted terminal output.
//!
//! Formatting lives in one place so the numeric core stays free of
//! presentation concerns and output changes stay localized.

pub mod format;

pub use format::{fmt_num, format_intervals, format_regime, format_run_summary, format_statistics, statistics_rows};
