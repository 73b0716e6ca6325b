//! Feature preparation: zip normalization, encoders and scalers.
//!
//! Encoders and scalers are pre-fit artifacts; nothing here learns from the
//! input batch.

pub mod encoder;
pub mod scaler;
pub mod zip;

pub use encoder::{Encoder, FeatureEncoder, OrdinalEncoder, TargetEncoder, UnseenPolicy};
pub use scaler::{FeatureScaler, Scaler};
pub use zip::normalize_zip;
