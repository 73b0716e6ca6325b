//! Loading of the per-metric (encoder, scaler, model) triples.

use std::path::{Path, PathBuf};

use tracing::info;

use crate::domain::{ArtifactRole, TargetMetric};
use crate::error::AppError;
use crate::features::{Encoder, FeatureEncoder, FeatureScaler, Scaler};
use crate::io::artifact::read_artifact;
use crate::models::regressor::{Model, Regressor};

/// One metric's pre-trained pipeline. Immutable once loaded.
#[derive(Debug, Clone)]
pub struct ModelBundle {
    pub metric: TargetMetric,
    pub encoder: Encoder,
    pub scaler: Scaler,
    pub model: Regressor,
}

impl ModelBundle {
    /// Load and cross-check the three artifacts for `metric` from `dir`.
    pub fn load(dir: &Path, metric: TargetMetric) -> Result<Self, AppError> {
        let encoder_path = artifact_path(dir, ArtifactRole::Encoder, metric);
        let scaler_path = artifact_path(dir, ArtifactRole::Scaler, metric);
        let model_path = artifact_path(dir, ArtifactRole::Model, metric);

        let encoder: Encoder = read_artifact(&encoder_path)?;
        encoder.validate().map_err(|msg| AppError::artifact(&encoder_path, msg))?;

        let scaler: Scaler = read_artifact(&scaler_path)?;
        scaler.validate().map_err(|msg| AppError::artifact(&scaler_path, msg))?;

        let model: Regressor = read_artifact(&model_path)?;
        model.validate().map_err(|msg| AppError::artifact(&model_path, msg))?;

        if scaler.n_features() != encoder.output_width() {
            return Err(AppError::artifact(
                &scaler_path,
                format!(
                    "expects {} features but encoder produces {}",
                    scaler.n_features(),
                    encoder.output_width()
                ),
            ));
        }
        if model.n_features() != scaler.n_features() {
            return Err(AppError::artifact(
                &model_path,
                format!(
                    "expects {} features but scaler produces {}",
                    model.n_features(),
                    scaler.n_features()
                ),
            ));
        }

        info!(
            metric = %metric,
            encoder = encoder.kind_name(),
            scaler = scaler.kind_name(),
            model = model.kind_name(),
            features = encoder.output_width(),
            "Loaded model bundle"
        );

        Ok(Self {
            metric,
            encoder,
            scaler,
            model,
        })
    }

    /// Load all three bundles, in [`TargetMetric::ALL`] order.
    pub fn load_all(dir: &Path) -> Result<Vec<Self>, AppError> {
        TargetMetric::ALL
            .iter()
            .map(|&metric| Self::load(dir, metric))
            .collect()
    }

    /// Input columns the encoder needs from the working table.
    pub fn required_columns(&self) -> &[String] {
        self.encoder.features()
    }
}

pub fn artifact_path(dir: &Path, role: ArtifactRole, metric: TargetMetric) -> PathBuf {
    dir.join(role.file_name(metric))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::io::artifact::write_artifact;
    use crate::models::regressor::LinearModel;
    use std::collections::BTreeMap;

    fn write_triple(dir: &Path, metric: TargetMetric, model_width: usize) {
        let encoder = Encoder::Target(crate::features::TargetEncoder {
            features: vec!["DRG".into(), "Discharges".into()],
            mappings: BTreeMap::from([(
                "DRG".to_string(),
                BTreeMap::from([("039".to_string(), 1.0)]),
            )]),
            global_mean: 0.0,
            handle_unknown: Default::default(),
            handle_missing: Default::default(),
        });
        let scaler = Scaler::Identity { n_features: 2 };
        let model = Regressor::Linear(LinearModel {
            coefficients: vec![1.0; model_width],
            intercept: 0.0,
        });
        write_artifact(&artifact_path(dir, ArtifactRole::Encoder, metric), &encoder).unwrap();
        write_artifact(&artifact_path(dir, ArtifactRole::Scaler, metric), &scaler).unwrap();
        write_artifact(&artifact_path(dir, ArtifactRole::Model, metric), &model).unwrap();
    }

    #[test]
    fn loads_compatible_triple() {
        let dir = tempfile::tempdir().unwrap();
        write_triple(dir.path(), TargetMetric::TotalPayments, 2);
        let bundle = ModelBundle::load(dir.path(), TargetMetric::TotalPayments).unwrap();
        assert_eq!(bundle.required_columns(), ["DRG", "Discharges"]);
    }

    #[test]
    fn incompatible_model_names_model_artifact() {
        let dir = tempfile::tempdir().unwrap();
        write_triple(dir.path(), TargetMetric::MedicarePayments, 5);
        let err = ModelBundle::load(dir.path(), TargetMetric::MedicarePayments).unwrap_err();
        let msg = err.to_string();
        assert!(msg.contains("model_medicare_payments"), "{msg}");
        assert!(msg.contains("expects 5"), "{msg}");
    }

    #[test]
    fn load_all_stops_at_first_missing_artifact() {
        let dir = tempfile::tempdir().unwrap();
        write_triple(dir.path(), TargetMetric::CoveredCharges, 2);
        let err = ModelBundle::load_all(dir.path()).unwrap_err();
        assert!(err.to_string().contains("encoder_total_payments"), "{err}");
    }
}
