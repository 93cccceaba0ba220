//! Domain types used throughout the pipeline.
//!
//! This module defines:
//!
//! - dated observations (`Observation`)
//! - aggregation keys and results (`Granularity`, `PeriodKey`, `PeriodAggregate`)
//! - the analysed variables and their report metadata (`Variable`)

pub mod types;

pub use types::*;
