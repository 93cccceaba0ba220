//! Numeric core: period aggregation, descriptive statistics, class intervals
//! and per-month summaries.
//!
//! Everything here is pure: no I/O, no logging, deterministic output.

pub mod aggregate;
pub mod descriptive;
pub mod intervals;
pub mod monthly;

pub use aggregate::*;
pub use descriptive::*;
pub use intervals::*;
pub use monthly::*;
