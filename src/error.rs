//! Error taxonomy for a pricing run.
//!
//! Every variant is fatal: the binary prints the message and exits with the
//! variant's code. Messages name the failing stage and, where known, the
//! offending artifact, column or value.

use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum AppError {
    /// An artifact is missing, corrupt, version-incompatible or does not fit
    /// the other members of its bundle.
    #[error("Failed to load artifact '{}': {message}", .path.display())]
    ArtifactLoad { path: PathBuf, message: String },

    /// The input table cannot be parsed or lacks required columns.
    #[error("Invalid input data: {0}")]
    DataFormat(String),

    /// An encoder or scaler rejected a value.
    #[error("Transform failed for {metric}: {message}")]
    Transform { metric: String, message: String },

    /// Operations were called out of order.
    #[error("Invalid predictor state: {0}")]
    State(String),

    /// A model could not run over its prepared matrix.
    #[error("Inference failed for {metric}: {message}")]
    Inference { metric: String, message: String },

    #[error("I/O error on '{}': {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl AppError {
    pub fn artifact(path: impl Into<PathBuf>, message: impl Into<String>) -> Self {
        Self::ArtifactLoad {
            path: path.into(),
            message: message.into(),
        }
    }

    pub fn data(message: impl Into<String>) -> Self {
        Self::DataFormat(message.into())
    }

    pub fn transform(metric: impl std::fmt::Display, message: impl Into<String>) -> Self {
        Self::Transform {
            metric: metric.to_string(),
            message: message.into(),
        }
    }

    pub fn inference(metric: impl std::fmt::Display, message: impl Into<String>) -> Self {
        Self::Inference {
            metric: metric.to_string(),
            message: message.into(),
        }
    }

    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    /// Process exit code for this failure.
    ///
    /// `2` is shared with clap's usage errors since both mean "bad input".
    pub fn exit_code(&self) -> u8 {
        match self {
            AppError::DataFormat(_) => 2,
            AppError::ArtifactLoad { .. } => 3,
            AppError::Transform { .. } => 4,
            AppError::State(_) => 5,
            AppError::Inference { .. } => 6,
            AppError::Io { .. } => 7,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn artifact_message_names_file() {
        let err = AppError::artifact(".bins/model_total_payments", "unsupported format_version 7");
        let msg = err.to_string();
        assert!(msg.contains("model_total_payments"), "{msg}");
        assert!(msg.contains("format_version 7"), "{msg}");
        assert_eq!(err.exit_code(), 3);
    }

    #[test]
    fn exit_codes_are_distinct_per_stage() {
        let codes = [
            AppError::data("x").exit_code(),
            AppError::artifact("a", "x").exit_code(),
            AppError::transform("m", "x").exit_code(),
            AppError::State("x".to_string()).exit_code(),
            AppError::inference("m", "x").exit_code(),
            AppError::io("p", std::io::Error::other("x")).exit_code(),
        ];
        for (i, a) in codes.iter().enumerate() {
            assert_ne!(*a, 0);
            for b in &codes[i + 1..] {
                assert_ne!(a, b);
            }
        }
    }
}
