//! Pre-trained model artifacts.
//!
//! - `regressor`: the regression model kinds and their inference
//! - `bundle`: loading one (encoder, scaler, model) triple per target metric

pub mod bundle;
pub mod regressor;

pub use bundle::ModelBundle;
pub use regressor::{Model, Regressor};
