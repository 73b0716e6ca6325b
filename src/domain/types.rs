//! Shared domain types.
//!
//! Column names and artifact names live here because they are the contract
//! between the input file, the artifact directory and the output file.

use std::fmt;
use std::path::PathBuf;

use clap::ValueEnum;
use serde::{Deserialize, Serialize};

pub const PROVIDER_ID: &str = "Provider Id";
pub const PROVIDER_STREET_ADDRESS: &str = "Provider Street Address";
pub const PROVIDER_CITY: &str = "Provider City";
pub const PROVIDER_STATE: &str = "Provider State";
pub const PROVIDER_ZIP_CODE: &str = "Provider Zip Code";

/// Columns dropped before encoding. Zip code is kept as a feature.
pub const IDENTIFYING_COLUMNS: [&str; 4] = [
    PROVIDER_ID,
    PROVIDER_STREET_ADDRESS,
    PROVIDER_CITY,
    PROVIDER_STATE,
];

/// Every column the input must carry regardless of the artifacts in use.
pub const REQUIRED_COLUMNS: [&str; 5] = [
    PROVIDER_ID,
    PROVIDER_STREET_ADDRESS,
    PROVIDER_CITY,
    PROVIDER_STATE,
    PROVIDER_ZIP_CODE,
];

/// Width zip codes are padded to.
pub const ZIP_WIDTH: usize = 5;

pub const DEFAULT_ARTIFACT_DIR: &str = ".bins";
pub const DEFAULT_OUTPUT_PATH: &str = "Outputs/result.csv";

/// One of the three predicted quantities. Each has its own artifact triple.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TargetMetric {
    CoveredCharges,
    TotalPayments,
    MedicarePayments,
}

impl TargetMetric {
    /// Output column order follows this order.
    pub const ALL: [TargetMetric; 3] = [
        TargetMetric::CoveredCharges,
        TargetMetric::TotalPayments,
        TargetMetric::MedicarePayments,
    ];

    pub fn display_name(self) -> &'static str {
        match self {
            TargetMetric::CoveredCharges => "Covered Charges",
            TargetMetric::TotalPayments => "Total Payments",
            TargetMetric::MedicarePayments => "Medicare Payments",
        }
    }

    /// Suffix shared by the metric's three artifact files.
    pub fn artifact_stem(self) -> &'static str {
        match self {
            TargetMetric::CoveredCharges => "covered_charges",
            TargetMetric::TotalPayments => "total_payments",
            TargetMetric::MedicarePayments => "medicare_payments",
        }
    }

    pub fn output_column(self) -> &'static str {
        match self {
            TargetMetric::CoveredCharges => "Predicted Covered Charges",
            TargetMetric::TotalPayments => "Predicted Total Payments",
            TargetMetric::MedicarePayments => "Predicted Medicare Payments",
        }
    }
}

impl fmt::Display for TargetMetric {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.display_name())
    }
}

/// Which member of a bundle an artifact file holds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArtifactRole {
    Encoder,
    Scaler,
    Model,
}

impl ArtifactRole {
    pub fn prefix(self) -> &'static str {
        match self {
            ArtifactRole::Encoder => "encoder",
            ArtifactRole::Scaler => "scaler",
            ArtifactRole::Model => "model",
        }
    }

    /// File name of this role's artifact for `metric`, e.g. `scaler_total_payments`.
    pub fn file_name(self, metric: TargetMetric) -> String {
        format!("{}_{}", self.prefix(), metric.artifact_stem())
    }
}

/// How zip codes longer than [`ZIP_WIDTH`] are treated.
///
/// Shorter values are always left-padded with `0`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum ZipPolicy {
    /// Keep longer values unchanged.
    #[default]
    Keep,
    /// Keep only the first five characters (`12345-6789` -> `12345`).
    Truncate,
    /// Fail the run with a data-format error.
    Reject,
}

/// A full run's configuration, resolved from CLI flags and environment.
#[derive(Debug, Clone)]
pub struct RunConfig {
    pub input_path: PathBuf,
    pub artifact_dir: PathBuf,
    pub output_path: PathBuf,
    pub zip_policy: ZipPolicy,
}

impl RunConfig {
    /// Configuration with the conventional artifact and output locations.
    pub fn with_defaults(input_path: impl Into<PathBuf>) -> Self {
        Self {
            input_path: input_path.into(),
            artifact_dir: PathBuf::from(DEFAULT_ARTIFACT_DIR),
            output_path: PathBuf::from(DEFAULT_OUTPUT_PATH),
            zip_policy: ZipPolicy::default(),
        }
    }
}
