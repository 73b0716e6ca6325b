//! Domain types used throughout the pipeline.
//!
//! This module defines:
//!
//! - the three target metrics and their artifact/output naming (`TargetMetric`)
//! - input column names the pipeline relies on
//! - run configuration (`RunConfig`, `ZipPolicy`)

pub mod types;

pub use types::*;
