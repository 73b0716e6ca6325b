//! `hospital-pricing` library crate.
//!
//! The binary (`pricing`) is a thin wrapper around this library so that:
//!
//! - the pipeline is testable without spawning processes
//! - artifacts can be loaded and inspected from other tools

pub mod app;
pub mod cli;
pub mod domain;
pub mod error;
pub mod features;
pub mod io;
pub mod models;
pub mod report;

pub use app::pipeline::{PredictionRun, PredictorState, PricingPredictor, run_predict};
pub use domain::{RunConfig, TargetMetric, ZipPolicy};
pub use error::AppError;
pub use models::ModelBundle;
