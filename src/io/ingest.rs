//! Input loading and validation.
//!
//! This module turns the billing CSV into two tables:
//! - the untouched `base` table the output is built on
//! - the `working` table the encoders read (identifying columns dropped,
//!   zip code normalized)
//!
//! Schema problems are reported here, before any artifact transform runs.

use std::path::Path;

use tracing::{info, warn};

use crate::domain::{IDENTIFYING_COLUMNS, PROVIDER_ZIP_CODE, REQUIRED_COLUMNS, ZipPolicy};
use crate::error::AppError;
use crate::features::normalize_zip;
use crate::io::table::{Table, read_csv};
use crate::models::ModelBundle;

/// Ingest output: both views of the same rows, in file order.
#[derive(Debug, Clone)]
pub struct InputBatch {
    pub base: Table,
    pub working: Table,
}

impl InputBatch {
    pub fn n_rows(&self) -> usize {
        self.base.n_rows()
    }
}

/// Load the CSV at `path` and build the working table.
pub fn load_input(path: &Path, zip_policy: ZipPolicy) -> Result<InputBatch, AppError> {
    let base = read_csv(path)?;
    ensure_required_columns_exist(&base)?;

    let mut working = base.without_columns(&IDENTIFYING_COLUMNS);
    let mut line = 1usize;
    working.map_column(PROVIDER_ZIP_CODE, |raw| {
        line += 1;
        normalize_zip(raw, zip_policy).map_err(|msg| AppError::data(format!("line {line}: {msg}")))
    })?;

    if base.n_rows() == 0 {
        warn!(path = %path.display(), "Input has a header but no rows");
    }

    info!(
        path = %path.display(),
        rows = base.n_rows(),
        columns = base.n_cols(),
        features_available = working.n_cols(),
        "Loaded input table"
    );

    Ok(InputBatch { base, working })
}

fn ensure_required_columns_exist(table: &Table) -> Result<(), AppError> {
    for name in REQUIRED_COLUMNS {
        if !table.has_column(name) {
            return Err(AppError::data(format!("Missing required column: `{name}`")));
        }
    }
    Ok(())
}

/// Check that every column an encoder reads exists in the working table.
pub fn ensure_feature_columns_exist(working: &Table, bundles: &[ModelBundle]) -> Result<(), AppError> {
    for bundle in bundles {
        for name in bundle.required_columns() {
            if working.has_column(name) {
                continue;
            }
            let hint = if IDENTIFYING_COLUMNS.contains(&name.as_str()) {
                " (identifying columns are dropped before encoding)"
            } else {
                ""
            };
            return Err(AppError::data(format!(
                "Missing feature column for {}: `{name}`{hint}",
                bundle.metric
            )));
        }
    }
    Ok(())
}
