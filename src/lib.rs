//! `hydrostat` library crate.
//!
//! The binary (`hydro`) is a thin wrapper around this library so that:
//!
//! - the statistics core is testable without spawning processes
//! - pipelines can be driven from tests with in-memory data sources
//! - code stays easy to navigate as the project grows

pub mod app;
pub mod cli;
pub mod config;
pub mod domain;
pub mod error;
pub mod io;
pub mod plot;
pub mod report;
pub mod stats;
