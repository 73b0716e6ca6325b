//! Build and write the output table.
//!
//! The output is the base input table plus one column per target metric,
//! written without any index column.

use std::path::Path;

use crate::domain::TargetMetric;
use crate::error::AppError;
use crate::io::table::{Table, write_csv_atomic};

/// Append the prediction columns to a copy of `base`.
///
/// `predictions` must be in [`TargetMetric::ALL`] order, one value per row.
pub fn build_output(base: &Table, predictions: &[(TargetMetric, Vec<f64>)]) -> Result<Table, AppError> {
    let mut out = base.clone();
    for (metric, values) in predictions {
        let cells = values.iter().map(|&v| format_prediction(v)).collect();
        out.push_column(metric.output_column(), cells)?;
    }
    Ok(out)
}

/// Build the output table and write it to `path`, replacing any existing file.
pub fn write_results_csv(
    path: &Path,
    base: &Table,
    predictions: &[(TargetMetric, Vec<f64>)],
) -> Result<Table, AppError> {
    let out = build_output(base, predictions)?;
    write_csv_atomic(path, &out)?;
    Ok(out)
}

/// Render a prediction without rounding.
///
/// Uses the shortest representation that reads back to the same `f64`;
/// integral values keep a trailing `.0` so the column reads as floating
/// point, and `NaN` becomes an empty cell.
pub fn format_prediction(v: f64) -> String {
    if v.is_nan() {
        return String::new();
    }
    if v.is_infinite() {
        return if v > 0.0 { "inf".to_string() } else { "-inf".to_string() };
    }
    let s = v.to_string();
    if s.contains(['.', 'e', 'E']) {
        s
    } else {
        format!("{s}.0")
    }
}
