//! Command-line parsing for the hydrological report.
//!
//! The goal of this module is to keep **argument parsing** separate from
//! the pipeline and statistics code.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

use crate::domain::{Granularity, Variable};

/// Top-level CLI.
#[derive(Debug, Parser)]
#[command(name = "hydro", version, about = "Descriptive hydrological statistics and regime charts")]
pub struct Cli {
    #[command(flatten)]
    pub global: GlobalArgs,

    #[command(subcommand)]
    pub command: Command,
}

/// Options shared by every subcommand.
#[derive(Debug, Args, Clone)]
pub struct GlobalArgs {
    /// TOML configuration file (dataset paths and layouts).
    #[arg(long, global = true, env = "HYDRO_CONFIG", value_name = "TOML")]
    pub config: Option<PathBuf>,

    /// Output directory for charts and exports (overrides the config file).
    #[arg(short = 'o', long, global = true, env = "HYDRO_OUTPUT_DIR", value_name = "DIR")]
    pub output: Option<PathBuf>,
}

/// CLI subcommands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Run every variable's pipeline, write all charts and print a summary.
    Report(ReportArgs),
    /// Print descriptive statistics and the class-interval table of one variable.
    Stats(StatsArgs),
    /// Print the monthly, quarterly or annual regime of one variable.
    Regime(RegimeArgs),
}

#[derive(Debug, Args, Clone, Default)]
pub struct ReportArgs {
    /// Skip PNG rendering (statistics and exports only).
    #[arg(long)]
    pub no_charts: bool,

    /// Also write `{variable}_resumen.json` and `{variable}_intervalos.csv`.
    #[arg(long)]
    pub export: bool,

    /// Restrict the run to these variables (repeatable). Defaults to all five.
    #[arg(short = 'v', long = "variable", value_enum)]
    pub variables: Vec<Variable>,
}

#[derive(Debug, Args, Clone)]
pub struct StatsArgs {
    #[arg(short = 'v', long, value_enum)]
    pub variable: Variable,

    /// Number of classes; Sturges' rule when omitted.
    #[arg(short = 'k', long)]
    pub classes: Option<usize>,
}

#[derive(Debug, Args, Clone)]
pub struct RegimeArgs {
    #[arg(short = 'v', long, value_enum)]
    pub variable: Variable,

    #[arg(short = 'p', long, value_enum, default_value_t = Granularity::Monthly)]
    pub period: Granularity,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_report_flags() {
        let cli = Cli::parse_from(["hydro", "report", "--no-charts", "--export", "-v", "flow", "-v", "precipitation"]);
        let Command::Report(args) = cli.command else {
            panic!("expected report");
        };
        assert!(args.no_charts);
        assert!(args.export);
        assert_eq!(args.variables, vec![Variable::Flow, Variable::Precipitation]);
    }

    #[test]
    fn parses_stats_and_regime() {
        let cli = Cli::parse_from(["hydro", "stats", "--variable", "min-temperature", "--classes", "6"]);
        let Command::Stats(args) = cli.command else {
            panic!("expected stats");
        };
        assert_eq!(args.variable, Variable::MinTemperature);
        assert_eq!(args.classes, Some(6));

        let cli = Cli::parse_from(["hydro", "regime", "-v", "evaporation", "--period", "quarterly", "-o", "out"]);
        let Command::Regime(args) = cli.command else {
            panic!("expected regime");
        };
        assert_eq!(args.period, Granularity::Quarterly);
        assert_eq!(cli.global.output, Some(PathBuf::from("out")));
    }

    #[test]
    fn rejects_unknown_variable() {
        assert!(Cli::try_parse_from(["hydro", "stats", "--variable", "wind"]).is_err());
    }
}
