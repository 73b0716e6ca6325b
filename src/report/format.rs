//! Formatted terminal output for `pricing predict` and `pricing inspect`.

use crate::app::pipeline::PredictionRun;
use crate::features::{Encoder, FeatureEncoder, FeatureScaler};
use crate::models::{Model, ModelBundle};
use crate::report::{PredictionSummary, summarize};

/// Format the run summary printed after a successful prediction.
pub fn format_run_summary(run: &PredictionRun) -> String {
    let mut out = String::new();

    out.push_str("=== pricing - Hospital Pricing Prediction ===\n");
    out.push_str(&format!("Rows: {}\n", run.rows));
    out.push_str(&format!("Output: {}\n", run.output_path.display()));
    out.push_str("\nPredictions:\n");
    out.push_str(&format!(
        "  {:<30} {:>14} {:>14} {:>14} {:>6}\n",
        "column", "min", "mean", "max", "neg"
    ));

    let summaries = summarize(&run.predictions);
    for s in &summaries {
        out.push_str(&format_summary_row(s));
    }

    let negatives: usize = summaries.iter().map(|s| s.negatives).sum();
    if negatives > 0 {
        out.push_str(&format!(
            "\nNote: {negatives} negative prediction(s) were written unmodified.\n"
        ));
    }

    out
}

fn format_summary_row(s: &PredictionSummary) -> String {
    let cell = |v: Option<f64>| v.map(|x| format!("{x:.2}")).unwrap_or_else(|| "-".to_string());
    let mut row = format!(
        "  {:<30} {:>14} {:>14} {:>14} {:>6}",
        s.metric.output_column(),
        cell(s.min),
        cell(s.mean),
        cell(s.max),
        s.negatives
    );
    if s.non_finite > 0 {
        row.push_str(&format!("  ({} non-finite)", s.non_finite));
    }
    row.push('\n');
    row
}

/// Describe loaded bundles: artifact kinds, widths and input columns.
pub fn format_bundles(bundles: &[ModelBundle]) -> String {
    let mut out = String::new();
    out.push_str("=== pricing - Model Artifacts ===\n");

    for b in bundles {
        out.push_str(&format!("\n[{}] -> \"{}\"\n", b.metric, b.metric.output_column()));
        out.push_str(&format!(
            "  encoder: {} ({} columns)\n",
            b.encoder.kind_name(),
            b.encoder.output_width()
        ));
        out.push_str(&format!(
            "  scaler:  {} ({} features)\n",
            b.scaler.kind_name(),
            b.scaler.n_features()
        ));
        out.push_str(&format!(
            "  model:   {} ({} features)\n",
            b.model.kind_name(),
            b.model.n_features()
        ));
        out.push_str("  inputs:\n");
        for name in b.encoder.features() {
            let kind = if is_categorical(&b.encoder, name) { "categorical" } else { "numeric" };
            out.push_str(&format!("    - {name} ({kind})\n"));
        }
    }

    out
}

fn is_categorical(encoder: &Encoder, column: &str) -> bool {
    match encoder {
        Encoder::Target(e) => e.mappings.contains_key(column),
        Encoder::Ordinal(e) => e.mappings.contains_key(column),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::TargetMetric;
    use crate::io::table::Table;

    #[test]
    fn run_summary_mentions_negatives() {
        let run = PredictionRun {
            output_path: "Outputs/result.csv".into(),
            rows: 2,
            output: Table::default(),
            predictions: TargetMetric::ALL
                .iter()
                .map(|&m| (m, vec![-5.0, 15.0]))
                .collect(),
        };
        let text = format_run_summary(&run);
        assert!(text.contains("Rows: 2"));
        assert!(text.contains("Predicted Medicare Payments"));
        assert!(text.contains("5.00"), "{text}");
        assert!(text.contains("3 negative prediction(s)"), "{text}");
    }
}
