//! The pricing pipeline: artifacts -> prepared feature matrices -> predictions.
//!
//! `PricingPredictor` is a small state machine:
//!
//! ```text
//! Constructed --prepare--> Prepared --predict--> Done
//!      \                      \
//!       `------ error ---------`----> Failed
//! ```
//!
//! `Failed` and `Done` are terminal; a new predictor must be built to retry.
//! The CLI and tests both drive the pipeline through this type.

use std::path::{Path, PathBuf};

use nalgebra::DMatrix;
use rayon::prelude::*;
use tracing::{debug, info, warn};

use crate::domain::{RunConfig, TargetMetric, ZipPolicy};
use crate::error::AppError;
use crate::features::{FeatureEncoder, FeatureScaler};
use crate::io::export::write_results_csv;
use crate::io::ingest::{ensure_feature_columns_exist, load_input};
use crate::io::table::Table;
use crate::models::{Model, ModelBundle};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PredictorState {
    Constructed,
    Prepared,
    Done,
    Failed,
}

/// Everything a completed run produced.
#[derive(Debug, Clone)]
pub struct PredictionRun {
    pub output_path: PathBuf,
    pub rows: usize,
    pub output: Table,
    /// One prediction vector per metric, in [`TargetMetric::ALL`] order.
    pub predictions: Vec<(TargetMetric, Vec<f64>)>,
}

pub struct PricingPredictor {
    bundles: Vec<ModelBundle>,
    output_path: PathBuf,
    zip_policy: ZipPolicy,
    state: PredictorState,
    base: Option<Table>,
    matrices: Vec<(TargetMetric, DMatrix<f64>)>,
}

impl PricingPredictor {
    /// Load all three bundles from `artifact_dir`.
    pub fn new(artifact_dir: &Path, output_path: impl Into<PathBuf>) -> Result<Self, AppError> {
        info!(dir = %artifact_dir.display(), "Loading model artifacts");
        let bundles = ModelBundle::load_all(artifact_dir)?;
        Self::from_bundles(bundles, output_path)
    }

    /// Build from already-loaded bundles; exactly one per metric, in
    /// [`TargetMetric::ALL`] order.
    pub fn from_bundles(bundles: Vec<ModelBundle>, output_path: impl Into<PathBuf>) -> Result<Self, AppError> {
        let metrics: Vec<TargetMetric> = bundles.iter().map(|b| b.metric).collect();
        if let Some(expected) = TargetMetric::ALL
            .iter()
            .enumerate()
            .find(|&(i, m)| metrics.get(i) != Some(m))
            .map(|(_, m)| *m)
        {
            return Err(AppError::artifact(
                format!("*_{}", expected.artifact_stem()),
                format!(
                    "no bundle for {expected} (need one per metric in order {:?}, got {metrics:?})",
                    TargetMetric::ALL
                ),
            ));
        }
        if metrics.len() != TargetMetric::ALL.len() {
            return Err(AppError::artifact(
                "*",
                format!("expected {} bundles, got {}", TargetMetric::ALL.len(), metrics.len()),
            ));
        }

        Ok(Self {
            bundles,
            output_path: output_path.into(),
            zip_policy: ZipPolicy::default(),
            state: PredictorState::Constructed,
            base: None,
            matrices: Vec::new(),
        })
    }

    pub fn with_zip_policy(mut self, policy: ZipPolicy) -> Self {
        self.zip_policy = policy;
        self
    }

    pub fn state(&self) -> PredictorState {
        self.state
    }

    pub fn bundles(&self) -> &[ModelBundle] {
        &self.bundles
    }

    pub fn output_path(&self) -> &Path {
        &self.output_path
    }

    /// The unmodified input table, once `prepare` has succeeded.
    pub fn base_table(&self) -> Option<&Table> {
        self.base.as_ref()
    }

    /// The scaled feature matrix for `metric`, while prepared.
    pub fn feature_matrix(&self, metric: TargetMetric) -> Option<&DMatrix<f64>> {
        self.matrices.iter().find(|(m, _)| *m == metric).map(|(_, x)| x)
    }

    /// Load `data_file`, then encode and scale it once per metric.
    pub fn prepare(&mut self, data_file: &Path) -> Result<(), AppError> {
        self.expect_state(PredictorState::Constructed, "prepare")?;

        match self.build_matrices(data_file) {
            Ok((base, matrices)) => {
                self.base = Some(base);
                self.matrices = matrices;
                self.state = PredictorState::Prepared;
                Ok(())
            }
            Err(err) => Err(self.fail(err)),
        }
    }

    /// Run every model over its matrix and write the output table.
    ///
    /// Nothing is written unless all three models succeed.
    pub fn predict(&mut self) -> Result<PredictionRun, AppError> {
        self.expect_state(PredictorState::Prepared, "predict")?;

        match self.run_models() {
            Ok(run) => {
                self.matrices.clear();
                self.state = PredictorState::Done;
                Ok(run)
            }
            Err(err) => Err(self.fail(err)),
        }
    }

    fn build_matrices(&self, data_file: &Path) -> Result<(Table, Vec<(TargetMetric, DMatrix<f64>)>), AppError> {
        let batch = load_input(data_file, self.zip_policy)?;
        ensure_feature_columns_exist(&batch.working, &self.bundles)?;

        let working = &batch.working;
        let matrices = self
            .bundles
            .par_iter()
            .map(|bundle| -> Result<(TargetMetric, DMatrix<f64>), AppError> {
                let encoded = bundle
                    .encoder
                    .encode(working)
                    .map_err(|msg| AppError::transform(bundle.metric, msg))?;
                let scaled = bundle
                    .scaler
                    .scale(encoded)
                    .map_err(|msg| AppError::transform(bundle.metric, msg))?;

                if scaled.nrows() != working.n_rows() {
                    return Err(AppError::transform(
                        bundle.metric,
                        format!("produced {} rows for {} input rows", scaled.nrows(), working.n_rows()),
                    ));
                }

                debug!(metric = %bundle.metric, rows = scaled.nrows(), cols = scaled.ncols(), "Prepared feature matrix");
                Ok((bundle.metric, scaled))
            })
            .collect::<Result<Vec<_>, AppError>>()?;

        info!(rows = batch.n_rows(), metrics = matrices.len(), "Input prepared");
        Ok((batch.base, matrices))
    }

    fn run_models(&self) -> Result<PredictionRun, AppError> {
        let base = self
            .base
            .as_ref()
            .ok_or_else(|| AppError::State("not prepared".to_string()))?;

        let predictions = self
            .bundles
            .par_iter()
            .zip(self.matrices.par_iter())
            .map(|(bundle, (metric, matrix))| -> Result<(TargetMetric, Vec<f64>), AppError> {
                let values = bundle
                    .model
                    .infer(matrix)
                    .map_err(|msg| AppError::inference(metric, msg))?;
                if values.len() != base.n_rows() {
                    return Err(AppError::inference(
                        metric,
                        format!("returned {} predictions for {} rows", values.len(), base.n_rows()),
                    ));
                }
                Ok((*metric, values))
            })
            .collect::<Result<Vec<_>, AppError>>()?;

        for (metric, values) in &predictions {
            let negatives = values.iter().filter(|v| **v < 0.0).count();
            if negatives > 0 {
                warn!(metric = %metric, negatives, "Model produced negative predictions; passing them through unmodified");
            }
        }

        let output = write_results_csv(&self.output_path, base, &predictions)?;
        info!(path = %self.output_path.display(), rows = output.n_rows(), "Wrote predictions");

        Ok(PredictionRun {
            output_path: self.output_path.clone(),
            rows: output.n_rows(),
            output,
            predictions,
        })
    }

    fn expect_state(&self, wanted: PredictorState, op: &str) -> Result<(), AppError> {
        if self.state == wanted {
            return Ok(());
        }
        let reason = match self.state {
            PredictorState::Constructed => "not prepared",
            PredictorState::Prepared => "already prepared",
            PredictorState::Done => "run already completed",
            PredictorState::Failed => "an earlier stage failed; construct a new predictor to retry",
        };
        Err(AppError::State(format!("cannot {op}: {reason}")))
    }

    fn fail(&mut self, err: AppError) -> AppError {
        self.state = PredictorState::Failed;
        self.base = None;
        self.matrices.clear();
        err
    }
}

/// Execute a full run: load artifacts, prepare the input, predict, write.
pub fn run_predict(config: &RunConfig) -> Result<PredictionRun, AppError> {
    let mut predictor =
        PricingPredictor::new(&config.artifact_dir, &config.output_path)?.with_zip_policy(config.zip_policy);
    predictor.prepare(&config.input_path)?;
    predictor.predict()
}
