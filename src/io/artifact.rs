//! Read/write model artifact files.
//!
//! Artifacts are JSON objects carrying a `format_version` and a `kind` tag,
//! e.g.
//!
//! ```text
//! { "format_version": 1, "kind": "standard", "mean": [..], "scale": [..] }
//! ```
//!
//! The version is checked before the body is decoded so an artifact written
//! by a newer exporter fails with a clear message instead of a field error.

use std::fs::File;
use std::io::{BufReader, BufWriter, Write};
use std::path::Path;

use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::error::AppError;

/// The only artifact format this build understands.
pub const FORMAT_VERSION: u64 = 1;

/// Read and decode one artifact.
pub fn read_artifact<T: DeserializeOwned>(path: &Path) -> Result<T, AppError> {
    let file = File::open(path).map_err(|e| AppError::artifact(path, format!("cannot open: {e}")))?;

    let value: Value = serde_json::from_reader(BufReader::new(file))
        .map_err(|e| AppError::artifact(path, format!("not a valid artifact document: {e}")))?;

    match value.get("format_version").and_then(Value::as_u64) {
        Some(FORMAT_VERSION) => {}
        Some(other) => {
            return Err(AppError::artifact(
                path,
                format!("unsupported format_version {other} (expected {FORMAT_VERSION})"),
            ));
        }
        None => return Err(AppError::artifact(path, "missing `format_version`")),
    }

    serde_json::from_value(value).map_err(|e| AppError::artifact(path, format!("invalid contents: {e}")))
}

/// Write `body` as an artifact, stamping the current format version.
///
/// Used by export tooling and test fixtures; the pricing run itself only reads.
pub fn write_artifact<T: Serialize>(path: &Path, body: &T) -> Result<(), AppError> {
    let mut value = serde_json::to_value(body)
        .map_err(|e| AppError::artifact(path, format!("cannot serialize: {e}")))?;
    let Value::Object(map) = &mut value else {
        return Err(AppError::artifact(path, "artifact body must be a JSON object"));
    };
    map.insert("format_version".to_string(), Value::from(FORMAT_VERSION));

    let file = File::create(path).map_err(|e| AppError::io(path, e))?;
    let mut writer = BufWriter::new(file);
    serde_json::to_writer_pretty(&mut writer, &value)
        .map_err(|e| AppError::artifact(path, format!("cannot write: {e}")))?;
    writer.flush().map_err(|e| AppError::io(path, e))
}
