//! Pre-fit numeric scalers applied after encoding.
//!
//! All kinds are per-column affine maps, so scaling never reorders or drops
//! rows. A zero scale entry is treated as `1.0`.

use nalgebra::DMatrix;
use serde::{Deserialize, Serialize};

pub trait FeatureScaler {
    fn n_features(&self) -> usize;

    /// Scale `matrix` in place and hand it back.
    fn scale(&self, matrix: DMatrix<f64>) -> Result<DMatrix<f64>, String>;
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Scaler {
    /// `(x - mean) / scale`
    Standard { mean: Vec<f64>, scale: Vec<f64> },
    /// `x * scale + min`
    MinMax { min: Vec<f64>, scale: Vec<f64> },
    /// `(x - center) / scale`
    Robust { center: Vec<f64>, scale: Vec<f64> },
    /// Pass-through for models trained on unscaled features.
    Identity { n_features: usize },
}

impl Scaler {
    pub fn kind_name(&self) -> &'static str {
        match self {
            Scaler::Standard { .. } => "standard",
            Scaler::MinMax { .. } => "min_max",
            Scaler::Robust { .. } => "robust",
            Scaler::Identity { .. } => "identity",
        }
    }

    pub fn validate(&self) -> Result<(), String> {
        let (a, b) = match self {
            Scaler::Standard { mean, scale } => (mean, scale),
            Scaler::MinMax { min, scale } => (min, scale),
            Scaler::Robust { center, scale } => (center, scale),
            Scaler::Identity { n_features } => {
                return if *n_features == 0 {
                    Err("identity scaler has zero features".to_string())
                } else {
                    Ok(())
                };
            }
        };
        if a.is_empty() {
            return Err("scaler has no features".to_string());
        }
        if a.len() != b.len() {
            return Err(format!(
                "scaler parameter lengths differ ({} vs {})",
                a.len(),
                b.len()
            ));
        }
        if a.iter().chain(b).any(|v| !v.is_finite()) {
            return Err("scaler parameters must be finite".to_string());
        }
        Ok(())
    }
}

impl FeatureScaler for Scaler {
    fn n_features(&self) -> usize {
        match self {
            Scaler::Standard { mean, .. } => mean.len(),
            Scaler::MinMax { min, .. } => min.len(),
            Scaler::Robust { center, .. } => center.len(),
            Scaler::Identity { n_features } => *n_features,
        }
    }

    fn scale(&self, mut matrix: DMatrix<f64>) -> Result<DMatrix<f64>, String> {
        if matrix.ncols() != self.n_features() {
            return Err(format!(
                "scaler expects {} features, encoder produced {}",
                self.n_features(),
                matrix.ncols()
            ));
        }

        match self {
            Scaler::Standard { mean, scale } => shift_then_divide(&mut matrix, mean, scale),
            Scaler::Robust { center, scale } => shift_then_divide(&mut matrix, center, scale),
            Scaler::MinMax { min, scale } => {
                for (j, mut col) in matrix.column_iter_mut().enumerate() {
                    let (s, m) = (nonzero(scale[j]), min[j]);
                    col.apply(|x| *x = *x * s + m);
                }
            }
            Scaler::Identity { .. } => {}
        }
        Ok(matrix)
    }
}

fn shift_then_divide(matrix: &mut DMatrix<f64>, shift: &[f64], scale: &[f64]) {
    for (j, mut col) in matrix.column_iter_mut().enumerate() {
        let (c, s) = (shift[j], nonzero(scale[j]));
        col.apply(|x| *x = (*x - c) / s);
    }
}

fn nonzero(s: f64) -> f64 {
    if s == 0.0 { 1.0 } else { s }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn matrix() -> DMatrix<f64> {
        DMatrix::from_row_slice(2, 2, &[1.0, 10.0, 3.0, 30.0])
    }

    #[test]
    fn standard_scaling() {
        let s = Scaler::Standard {
            mean: vec![2.0, 20.0],
            scale: vec![1.0, 0.0],
        };
        let m = s.scale(matrix()).unwrap();
        assert_eq!(m, DMatrix::from_row_slice(2, 2, &[-1.0, -10.0, 1.0, 10.0]));
    }

    #[test]
    fn min_max_scaling() {
        let s = Scaler::MinMax {
            min: vec![-0.5, 0.0],
            scale: vec![0.5, 0.1],
        };
        let m = s.scale(matrix()).unwrap();
        assert!((m[(1, 0)] - 1.0).abs() < 1e-12);
        assert!((m[(1, 1)] - 3.0).abs() < 1e-12);
    }

    #[test]
    fn width_mismatch_is_reported() {
        let s = Scaler::Identity { n_features: 3 };
        let err = s.scale(matrix()).unwrap_err();
        assert!(err.contains("expects 3"), "{err}");
    }

    #[test]
    fn validate_catches_length_mismatch() {
        let s = Scaler::Robust {
            center: vec![0.0],
            scale: vec![1.0, 2.0],
        };
        assert!(s.validate().is_err());
        assert!(Scaler::Identity { n_features: 0 }.validate().is_err());
    }

    #[test]
    fn nan_passes_through() {
        let s = Scaler::Standard {
            mean: vec![0.0],
            scale: vec![2.0],
        };
        let m = s.scale(DMatrix::from_element(1, 1, f64::NAN)).unwrap();
        assert!(m[(0, 0)].is_nan());
    }
}
