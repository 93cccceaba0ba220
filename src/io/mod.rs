//! Input/output helpers.
//!
//! - dataset ingest behind the `DataSource` capability (`ingest`)
//! - result exports (CSV/JSON) (`export`)

pub mod export;
pub mod ingest;

pub use export::*;
pub use ingest::*;
