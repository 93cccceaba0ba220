//! Top-level application orchestration.
//!
//! `src/main.rs` is intentionally tiny; this module is the "real main" that:
//! - sets up logging and `.env`
//! - parses CLI arguments and loads the configuration
//! - runs the per-variable pipelines (in parallel for `report`)
//! - renders the comparison chart and prints the terminal report

use std::fs;
use std::path::PathBuf;

use clap::Parser;
use rayon::prelude::*;

use crate::cli::{Command, GlobalArgs, RegimeArgs, ReportArgs, StatsArgs};
use crate::config::Config;
use crate::domain::Variable;
use crate::error::AppError;

pub mod pipeline;

use pipeline::{PipelineOptions, PipelineOutput};

/// Entry point for the `hydro` binary.
pub fn run() -> Result<(), AppError> {
    dotenvy::dotenv().ok();
    env_logger::Builder::new()
        .format_timestamp_millis()
        .filter_level(log::LevelFilter::Info)
        .parse_default_env()
        .init();

    // We want `hydro` and `hydro --export` to behave like `hydro report ...`.
    //
    // Clap requires a subcommand name, so we do a small, explicit rewrite of the
    // argv list before parsing.
    let argv = rewrite_args(std::env::args().collect());
    let cli = crate::cli::Cli::parse_from(argv);

    match cli.command {
        Command::Report(args) => handle_report(&cli.global, &args),
        Command::Stats(args) => handle_stats(&cli.global, &args),
        Command::Regime(args) => handle_regime(&cli.global, &args),
    }
}

/// Load the config file (if any) and apply CLI overrides.
pub fn resolve_config(global: &GlobalArgs) -> Result<Config, AppError> {
    let mut config = Config::load(global.config.as_deref())?;
    if let Some(output) = &global.output {
        config.output_dir = output.clone();
    }
    Ok(config)
}

fn handle_report(global: &GlobalArgs, args: &ReportArgs) -> Result<(), AppError> {
    let config = resolve_config(global)?;
    let results = run_report(&config, args)?;

    println!("{}", crate::report::format_run_summary(&results));

    let failed = results.iter().filter(|(_, r)| r.is_err()).count();
    if failed == results.len() {
        let exit_code = results
            .iter()
            .find_map(|(_, r)| r.as_ref().err().map(AppError::exit_code))
            .unwrap_or(3);
        return Err(AppError::new(exit_code, "Every pipeline failed; nothing was produced."));
    }
    Ok(())
}

/// Run the selected pipelines concurrently and render the comparison chart.
///
/// Individual pipeline failures are logged and returned in the result list;
/// only setup problems (unwritable output directory) fail the whole run.
pub fn run_report(
    config: &Config,
    args: &ReportArgs,
) -> Result<Vec<(Variable, Result<PipelineOutput, AppError>)>, AppError> {
    let charts = !args.no_charts;
    if charts || args.export {
        fs::create_dir_all(&config.output_dir).map_err(|e| {
            AppError::new(
                4,
                format!("Failed to create output directory '{}': {e}", config.output_dir.display()),
            )
        })?;
    }
    if charts {
        // Register the font before any pipeline starts drawing.
        crate::plot::init_fonts(config.font_path.as_deref());
    }

    let options = PipelineOptions {
        output_dir: config.output_dir.clone(),
        charts,
        export: args.export,
        num_classes: None,
    };

    let results: Vec<(Variable, Result<PipelineOutput, AppError>)> = selected_variables(&args.variables)
        .par_iter()
        .map(|&variable| (variable, pipeline::run_variable(config, variable, &options)))
        .collect();

    for (_, result) in &results {
        if let Err(err) = result {
            log::error!("{err}");
        }
    }

    if charts {
        let regimes: Vec<(Variable, Vec<_>)> = results
            .iter()
            .filter_map(|(v, r)| r.as_ref().ok().map(|out| (*v, out.monthly.clone())))
            .collect();
        if !regimes.is_empty() {
            match crate::plot::render_comparison(&config.output_dir, &regimes) {
                Ok(path) => log::info!("Wrote {}", path.display()),
                Err(err) => log::error!("comparison chart: {err}"),
            }
        }
    }

    Ok(results)
}

/// Requested variables in canonical order without duplicates; all when none given.
fn selected_variables(requested: &[Variable]) -> Vec<Variable> {
    if requested.is_empty() {
        return Variable::ALL.to_vec();
    }
    let mut out = requested.to_vec();
    out.sort();
    out.dedup();
    out
}

fn stats_only(global: &GlobalArgs, variable: Variable, num_classes: Option<usize>) -> Result<PipelineOutput, AppError> {
    let config = resolve_config(global)?;
    let options = PipelineOptions {
        output_dir: PathBuf::new(),
        charts: false,
        export: false,
        num_classes,
    };
    pipeline::run_variable(&config, variable, &options)
}

fn handle_stats(global: &GlobalArgs, args: &StatsArgs) -> Result<(), AppError> {
    let output = stats_only(global, args.variable, args.classes)?;
    println!("{}", crate::report::format_statistics(args.variable, &output.statistics));
    println!("{}", crate::report::format_intervals(&output.intervals));
    Ok(())
}

fn handle_regime(global: &GlobalArgs, args: &RegimeArgs) -> Result<(), AppError> {
    let output = stats_only(global, args.variable, None)?;
    println!(
        "{}",
        crate::report::format_regime(args.variable, args.period, output.regime(args.period))
    );
    Ok(())
}

/// Rewrite argv so `hydro` defaults to `hydro report`.
///
/// Rules:
/// - `hydro`                          -> `hydro report`
/// - `hydro --export ...`             -> `hydro report --export ...`
/// - `hydro --config f stats ...`     -> unchanged (a subcommand is present)
/// - `hydro --help/--version/-h`      -> unchanged (show top-level help/version)
fn rewrite_args(mut argv: Vec<String>) -> Vec<String> {
    let Some(arg1) = argv.get(1).cloned() else {
        argv.push("report".to_string());
        return argv;
    };

    let is_top_level_help_or_version = matches!(arg1.as_str(), "-h" | "--help" | "-V" | "--version" | "help");
    if is_top_level_help_or_version {
        return argv;
    }

    let has_subcommand = argv
        .iter()
        .skip(1)
        .any(|a| matches!(a.as_str(), "report" | "stats" | "regime"));
    if has_subcommand {
        return argv;
    }

    // If the first token is a flag, treat it as "report flags".
    if arg1.starts_with('-') {
        argv.insert(1, "report".to_string());
        return argv;
    }

    argv
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn bare_invocation_runs_report() {
        assert_eq!(rewrite_args(args(&["hydro"])), args(&["hydro", "report"]));
    }

    #[test]
    fn leading_flags_go_to_report() {
        assert_eq!(
            rewrite_args(args(&["hydro", "--export", "--no-charts"])),
            args(&["hydro", "report", "--export", "--no-charts"])
        );
    }

    #[test]
    fn explicit_subcommands_and_help_are_untouched() {
        for argv in [
            args(&["hydro", "stats", "-v", "flow"]),
            args(&["hydro", "--config", "c.toml", "regime", "-v", "flow"]),
            args(&["hydro", "--help"]),
            args(&["hydro", "-V"]),
        ] {
            assert_eq!(rewrite_args(argv.clone()), argv);
        }
    }

    #[test]
    fn variable_selection_is_canonical() {
        assert_eq!(selected_variables(&[]), Variable::ALL.to_vec());
        assert_eq!(
            selected_variables(&[Variable::Precipitation, Variable::Flow, Variable::Flow]),
            vec![Variable::Flow, Variable::Precipitation]
        );
    }

    #[test]
    fn output_flag_overrides_config() {
        let global = GlobalArgs {
            config: None,
            output: Some(PathBuf::from("salida")),
        };
        let config = resolve_config(&global).unwrap();
        assert_eq!(config.output_dir, PathBuf::from("salida"));
    }
}
