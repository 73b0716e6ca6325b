//! Pre-trained regressors.
//!
//! Two families are supported:
//! - `linear`: `y = X·β + intercept`
//! - `tree_ensemble`: regression trees combined by sum (boosting) or mean
//!   (bagging), offset by `base_score`
//!
//! Both return exactly one prediction per matrix row, in row order.

use nalgebra::{DMatrix, DVector};
use serde::{Deserialize, Serialize};

pub trait Model {
    /// Number of input features the model was trained on.
    fn n_features(&self) -> usize;

    /// Predict one value per row of `features`.
    fn infer(&self, features: &DMatrix<f64>) -> Result<Vec<f64>, String>;
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LinearModel {
    pub coefficients: Vec<f64>,
    pub intercept: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Aggregation {
    #[default]
    Sum,
    Mean,
}

/// A tree node. Split nodes send a row left when `x[feature] < threshold`
/// or when the value is `NaN`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Node {
    Split {
        feature: usize,
        threshold: f64,
        left: usize,
        right: usize,
    },
    Leaf {
        value: f64,
    },
}

/// Flat node array; node `0` is the root.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Tree {
    pub nodes: Vec<Node>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TreeEnsemble {
    pub n_features: usize,
    #[serde(default)]
    pub base_score: f64,
    #[serde(default)]
    pub aggregation: Aggregation,
    pub trees: Vec<Tree>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Regressor {
    Linear(LinearModel),
    TreeEnsemble(TreeEnsemble),
}

impl Regressor {
    pub fn kind_name(&self) -> &'static str {
        match self {
            Regressor::Linear(_) => "linear",
            Regressor::TreeEnsemble(_) => "tree_ensemble",
        }
    }

    pub fn validate(&self) -> Result<(), String> {
        match self {
            Regressor::Linear(m) => {
                if m.coefficients.is_empty() {
                    return Err("linear model has no coefficients".to_string());
                }
                Ok(())
            }
            Regressor::TreeEnsemble(e) => {
                if e.n_features == 0 {
                    return Err("tree ensemble declares zero features".to_string());
                }
                if e.trees.is_empty() {
                    return Err("tree ensemble has no trees".to_string());
                }
                for (t, tree) in e.trees.iter().enumerate() {
                    tree.validate(e.n_features)
                        .map_err(|msg| format!("tree {t}: {msg}"))?;
                }
                Ok(())
            }
        }
    }
}

impl Tree {
    /// Children must point forward so traversal always terminates.
    fn validate(&self, n_features: usize) -> Result<(), String> {
        if self.nodes.is_empty() {
            return Err("empty tree".to_string());
        }
        for (i, node) in self.nodes.iter().enumerate() {
            if let Node::Split {
                feature, left, right, ..
            } = *node
            {
                if feature >= n_features {
                    return Err(format!("node {i} splits on feature {feature} of {n_features}"));
                }
                for child in [left, right] {
                    if child <= i || child >= self.nodes.len() {
                        return Err(format!("node {i} has invalid child {child}"));
                    }
                }
            }
        }
        Ok(())
    }

    fn evaluate(&self, row: impl Fn(usize) -> f64) -> f64 {
        let mut idx = 0;
        loop {
            match self.nodes[idx] {
                Node::Leaf { value } => return value,
                Node::Split {
                    feature,
                    threshold,
                    left,
                    right,
                } => {
                    let x = row(feature);
                    idx = if x.is_nan() || x < threshold { left } else { right };
                }
            }
        }
    }
}

impl Model for Regressor {
    fn n_features(&self) -> usize {
        match self {
            Regressor::Linear(m) => m.coefficients.len(),
            Regressor::TreeEnsemble(e) => e.n_features,
        }
    }

    fn infer(&self, features: &DMatrix<f64>) -> Result<Vec<f64>, String> {
        if features.ncols() != self.n_features() {
            return Err(format!(
                "model expects {} features, prepared matrix has {}",
                self.n_features(),
                features.ncols()
            ));
        }

        match self {
            Regressor::Linear(m) => {
                // Trees route NaN left; a linear model has no such rule.
                if let Some((r, f)) = (0..features.nrows())
                    .flat_map(|r| (0..features.ncols()).map(move |f| (r, f)))
                    .find(|&(r, f)| !features[(r, f)].is_finite())
                {
                    return Err(format!(
                        "row {}: feature {f} is {} (linear model needs finite inputs)",
                        r + 1,
                        features[(r, f)]
                    ));
                }
                let beta = DVector::from_column_slice(&m.coefficients);
                let y = features * beta;
                Ok(y.iter().map(|v| v + m.intercept).collect())
            }
            Regressor::TreeEnsemble(e) => {
                let n_trees = e.trees.len() as f64;
                let out = (0..features.nrows())
                    .map(|r| {
                        let total: f64 = e.trees.iter().map(|t| t.evaluate(|f| features[(r, f)])).sum();
                        let combined = match e.aggregation {
                            Aggregation::Sum => total,
                            Aggregation::Mean => total / n_trees,
                        };
                        e.base_score + combined
                    })
                    .collect();
                Ok(out)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn stump(threshold: f64, lo: f64, hi: f64) -> Tree {
        Tree {
            nodes: vec![
                Node::Split {
                    feature: 0,
                    threshold,
                    left: 1,
                    right: 2,
                },
                Node::Leaf { value: lo },
                Node::Leaf { value: hi },
            ],
        }
    }

    #[test]
    fn linear_prediction() {
        let model = Regressor::Linear(LinearModel {
            coefficients: vec![2.0, -1.0],
            intercept: 0.5,
        });
        let x = DMatrix::from_row_slice(2, 2, &[1.0, 1.0, 3.0, 10.0]);
        assert_eq!(model.infer(&x).unwrap(), vec![1.5, -3.5]);
    }

    #[test]
    fn shape_mismatch_is_an_error() {
        let model = Regressor::Linear(LinearModel {
            coefficients: vec![1.0; 3],
            intercept: 0.0,
        });
        let err = model.infer(&DMatrix::zeros(4, 2)).unwrap_err();
        assert!(err.contains("expects 3"), "{err}");
    }

    #[test]
    fn ensemble_sum_and_mean() {
        let trees = vec![stump(0.0, 1.0, 3.0), stump(5.0, 10.0, 20.0)];
        let x = DMatrix::from_row_slice(3, 1, &[-1.0, 1.0, f64::NAN]);

        let sum = Regressor::TreeEnsemble(TreeEnsemble {
            n_features: 1,
            base_score: 100.0,
            aggregation: Aggregation::Sum,
            trees: trees.clone(),
        });
        assert_eq!(sum.infer(&x).unwrap(), vec![111.0, 113.0, 111.0]);

        let mean = Regressor::TreeEnsemble(TreeEnsemble {
            n_features: 1,
            base_score: 0.0,
            aggregation: Aggregation::Mean,
            trees,
        });
        assert_eq!(mean.infer(&x).unwrap(), vec![5.5, 6.5, 5.5]);
    }

    #[test]
    fn linear_rejects_missing_feature_values() {
        let model = Regressor::Linear(LinearModel {
            coefficients: vec![1.0, 1.0],
            intercept: 0.0,
        });
        let x = DMatrix::from_row_slice(2, 2, &[1.0, 2.0, 3.0, f64::NAN]);
        let err = model.infer(&x).unwrap_err();
        assert!(err.contains("row 2") && err.contains("feature 1"), "{err}");
    }

    #[test]
    fn negative_predictions_pass_through() {
        let model = Regressor::Linear(LinearModel {
            coefficients: vec![1.0],
            intercept: -1000.0,
        });
        let y = model.infer(&DMatrix::from_element(1, 1, 1.0)).unwrap();
        assert_eq!(y, vec![-999.0]);
    }

    #[test]
    fn validate_rejects_backward_children() {
        let tree = Tree {
            nodes: vec![
                Node::Split {
                    feature: 0,
                    threshold: 0.0,
                    left: 0,
                    right: 1,
                },
                Node::Leaf { value: 1.0 },
            ],
        };
        let model = Regressor::TreeEnsemble(TreeEnsemble {
            n_features: 1,
            base_score: 0.0,
            aggregation: Aggregation::Sum,
            trees: vec![tree],
        });
        assert!(model.validate().unwrap_err().contains("invalid child"));
    }

    #[test]
    fn untagged_nodes_deserialize() {
        let json = r#"{"kind":"tree_ensemble","n_features":1,"trees":[{"nodes":[
            {"feature":0,"threshold":2.0,"left":1,"right":2},
            {"value":-1.0},{"value":1.0}]}]}"#;
        let model: Regressor = serde_json::from_str(json).unwrap();
        assert!(model.validate().is_ok());
        assert_eq!(model.infer(&DMatrix::from_element(1, 1, 3.0)).unwrap(), vec![1.0]);
    }
}
