//! Command-line parsing for the hospital pricing predictor.
//!
//! Argument parsing and command dispatch stay separate from the pipeline so
//! the library can be driven directly from tests.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

use crate::domain::{DEFAULT_ARTIFACT_DIR, DEFAULT_OUTPUT_PATH, ZipPolicy};

/// Top-level CLI.
#[derive(Debug, Parser)]
#[command(name = "pricing", version, about = "Hospital billing price predictor")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Predict covered charges, total payments and Medicare payments for a CSV batch.
    Predict(PredictArgs),
    /// Load the model artifacts and describe what they expect as input.
    Inspect(InspectArgs),
}

#[derive(Debug, Parser, Clone)]
pub struct PredictArgs {
    /// Billing records CSV.
    #[arg(value_name = "CSV")]
    pub input: PathBuf,

    /// Directory holding the encoder/scaler/model artifacts.
    #[arg(long, env = "PRICING_ARTIFACT_DIR", default_value = DEFAULT_ARTIFACT_DIR)]
    pub artifacts: PathBuf,

    /// Where to write the augmented table (overwritten if present).
    #[arg(short, long, env = "PRICING_OUTPUT", default_value = DEFAULT_OUTPUT_PATH)]
    pub output: PathBuf,

    /// Treatment of zip codes longer than five characters.
    #[arg(long, value_enum, default_value_t = ZipPolicy::Keep)]
    pub zip_policy: ZipPolicy,
}

#[derive(Debug, Parser, Clone)]
pub struct InspectArgs {
    /// Directory holding the encoder/scaler/model artifacts.
    #[arg(long, env = "PRICING_ARTIFACT_DIR", default_value = DEFAULT_ARTIFACT_DIR)]
    pub artifacts: PathBuf,
}
