//! Top-level application orchestration.
//!
//! `src/main.rs` is intentionally tiny; this module is the "real main" that:
//! - loads `.env` and initializes logging
//! - parses CLI arguments
//! - runs the pricing pipeline or describes the artifacts
//! - prints the run summary

use clap::Parser;
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

use crate::cli::{Command, InspectArgs, PredictArgs};
use crate::domain::RunConfig;
use crate::error::AppError;
use crate::models::ModelBundle;

pub mod pipeline;

/// Entry point for the `pricing` binary.
pub fn run() -> Result<(), AppError> {
    dotenvy::dotenv().ok();
    init_tracing();

    let argv = rewrite_args(std::env::args().collect());
    let cli = crate::cli::Cli::parse_from(argv);

    match cli.command {
        Command::Predict(args) => handle_predict(args),
        Command::Inspect(args) => handle_inspect(args),
    }
}

/// Logs go to stderr so stdout carries only the report.
fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    let _ = tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_target(false).with_writer(std::io::stderr))
        .try_init();
}

fn handle_predict(args: PredictArgs) -> Result<(), AppError> {
    let config = run_config_from_args(&args);
    let run = pipeline::run_predict(&config)?;
    println!("{}", crate::report::format_run_summary(&run));
    Ok(())
}

fn handle_inspect(args: InspectArgs) -> Result<(), AppError> {
    let bundles = ModelBundle::load_all(&args.artifacts)?;
    println!("{}", crate::report::format_bundles(&bundles));
    Ok(())
}

pub fn run_config_from_args(args: &PredictArgs) -> RunConfig {
    RunConfig {
        input_path: args.input.clone(),
        artifact_dir: args.artifacts.clone(),
        output_path: args.output.clone(),
        zip_policy: args.zip_policy,
    }
}

/// Rewrite argv so a bare input path means `predict`.
///
/// Rules:
/// - `pricing data.csv ...`       -> `pricing predict data.csv ...`
/// - `pricing --help/--version`   -> unchanged
/// - `pricing predict|inspect ..` -> unchanged
fn rewrite_args(mut argv: Vec<String>) -> Vec<String> {
    let Some(arg1) = argv.get(1) else {
        return argv;
    };

    let passthrough = arg1.starts_with('-') || matches!(arg1.as_str(), "predict" | "inspect" | "help");
    if !passthrough {
        argv.insert(1, "predict".to_string());
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
    fn bare_path_becomes_predict() {
        assert_eq!(
            rewrite_args(args(&["pricing", "batch.csv"])),
            args(&["pricing", "predict", "batch.csv"])
        );
    }

    #[test]
    fn subcommands_and_flags_pass_through() {
        for argv in [
            args(&["pricing"]),
            args(&["pricing", "--help"]),
            args(&["pricing", "inspect", "--artifacts", "x"]),
            args(&["pricing", "predict", "a.csv"]),
        ] {
            assert_eq!(rewrite_args(argv.clone()), argv);
        }
    }
}
