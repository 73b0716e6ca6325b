//! Reporting utilities: per-metric prediction summaries and terminal output.
//!
//! Formatting lives here so the pipeline stays free of presentation code.

pub mod format;

pub use format::*;

use crate::domain::TargetMetric;

/// Descriptive statistics for one metric's predictions.
#[derive(Debug, Clone, PartialEq)]
pub struct PredictionSummary {
    pub metric: TargetMetric,
    pub n: usize,
    /// Finite predictions only.
    pub min: Option<f64>,
    pub mean: Option<f64>,
    pub max: Option<f64>,
    pub negatives: usize,
    pub non_finite: usize,
}

/// Summarize each metric's predictions.
pub fn summarize(predictions: &[(TargetMetric, Vec<f64>)]) -> Vec<PredictionSummary> {
    predictions
        .iter()
        .map(|(metric, values)| {
            let finite: Vec<f64> = values.iter().copied().filter(|v| v.is_finite()).collect();
            let (min, max, mean) = if finite.is_empty() {
                (None, None, None)
            } else {
                let min = finite.iter().copied().fold(f64::INFINITY, f64::min);
                let max = finite.iter().copied().fold(f64::NEG_INFINITY, f64::max);
                let mean = finite.iter().sum::<f64>() / finite.len() as f64;
                (Some(min), Some(max), Some(mean))
            };

            PredictionSummary {
                metric: *metric,
                n: values.len(),
                min,
                mean,
                max,
                negatives: values.iter().filter(|v| **v < 0.0).count(),
                non_finite: values.len() - finite.len(),
            }
        })
        .collect()
}
