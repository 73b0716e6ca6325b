//! Pre-fit categorical encoders.
//!
//! An encoder turns the working table (identifying columns already removed)
//! into a dense numeric matrix with one row per input row and one column per
//! entry of its `features` list, in that order. Columns that have a category
//! mapping are treated as categorical; every other feature column must hold
//! numbers (an empty cell becomes `NaN`, as a missing value).
//!
//! The mappings were fit during training and are applied as-is here.

use std::collections::BTreeMap;

use nalgebra::DMatrix;
use serde::{Deserialize, Serialize};

use crate::io::table::Table;

/// What to do with a categorical value the encoder has no mapping for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UnseenPolicy {
    /// Substitute the encoder's fallback value.
    #[default]
    Value,
    /// Fail the transform, naming the column and value.
    Error,
}

/// Capability shared by every encoder kind.
pub trait FeatureEncoder {
    /// Input columns consumed, in output-column order.
    fn features(&self) -> &[String];

    /// Encode every row of `table`. Row order is preserved.
    fn encode(&self, table: &Table) -> Result<DMatrix<f64>, String>;

    fn output_width(&self) -> usize {
        self.features().len()
    }
}

/// Target-statistic encoding: each category maps to the training mean of the
/// target for that category (leave-one-out at fit time, plain lookup here).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TargetEncoder {
    pub features: Vec<String>,
    pub mappings: BTreeMap<String, BTreeMap<String, f64>>,
    /// Fallback for unseen or missing categories under [`UnseenPolicy::Value`].
    pub global_mean: f64,
    #[serde(default)]
    pub handle_unknown: UnseenPolicy,
    #[serde(default)]
    pub handle_missing: UnseenPolicy,
}

/// Integer-code encoding.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrdinalEncoder {
    pub features: Vec<String>,
    pub mappings: BTreeMap<String, BTreeMap<String, f64>>,
    #[serde(default)]
    pub handle_unknown: UnseenPolicy,
    #[serde(default = "default_unknown_code")]
    pub unknown_value: f64,
    #[serde(default)]
    pub handle_missing: UnseenPolicy,
    #[serde(default = "default_missing_code")]
    pub missing_value: f64,
}

fn default_unknown_code() -> f64 {
    -1.0
}

fn default_missing_code() -> f64 {
    -2.0
}

/// Every encoder kind a bundle may carry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Encoder {
    Target(TargetEncoder),
    Ordinal(OrdinalEncoder),
}

impl Encoder {
    pub fn kind_name(&self) -> &'static str {
        match self {
            Encoder::Target(_) => "target",
            Encoder::Ordinal(_) => "ordinal",
        }
    }

    /// Structural checks run once at load time.
    pub fn validate(&self) -> Result<(), String> {
        let (features, mappings) = match self {
            Encoder::Target(e) => (&e.features, &e.mappings),
            Encoder::Ordinal(e) => (&e.features, &e.mappings),
        };

        if features.is_empty() {
            return Err("encoder has no features".to_string());
        }
        for (i, name) in features.iter().enumerate() {
            if features[..i].contains(name) {
                return Err(format!("feature `{name}` listed twice"));
            }
        }
        if let Some(orphan) = mappings.keys().find(|k| !features.contains(k)) {
            return Err(format!("mapping for `{orphan}` which is not a feature"));
        }
        Ok(())
    }
}

impl FeatureEncoder for Encoder {
    fn features(&self) -> &[String] {
        match self {
            Encoder::Target(e) => &e.features,
            Encoder::Ordinal(e) => &e.features,
        }
    }

    fn encode(&self, table: &Table) -> Result<DMatrix<f64>, String> {
        match self {
            Encoder::Target(e) => encode_with(table, &e.features, &e.mappings, |column, value| match value {
                Lookup::Missing => fallback(e.handle_missing, e.global_mean, column, "missing value"),
                Lookup::Unseen(v) => fallback(e.handle_unknown, e.global_mean, column, &format!("unseen category '{v}'")),
            }),
            Encoder::Ordinal(e) => encode_with(table, &e.features, &e.mappings, |column, value| match value {
                Lookup::Missing => fallback(e.handle_missing, e.missing_value, column, "missing value"),
                Lookup::Unseen(v) => fallback(e.handle_unknown, e.unknown_value, column, &format!("unseen category '{v}'")),
            }),
        }
    }
}

enum Lookup<'a> {
    Missing,
    Unseen(&'a str),
}

fn fallback(policy: UnseenPolicy, value: f64, column: &str, what: &str) -> Result<f64, String> {
    match policy {
        UnseenPolicy::Value => Ok(value),
        UnseenPolicy::Error => Err(format!("{what} in column `{column}`")),
    }
}

fn encode_with<F>(
    table: &Table,
    features: &[String],
    mappings: &BTreeMap<String, BTreeMap<String, f64>>,
    on_miss: F,
) -> Result<DMatrix<f64>, String>
where
    F: Fn(&str, Lookup<'_>) -> Result<f64, String>,
{
    let columns = features
        .iter()
        .map(|name| {
            table
                .column_index(name)
                .map(|idx| (name.as_str(), idx, mappings.get(name)))
                .ok_or_else(|| format!("missing feature column `{name}`"))
        })
        .collect::<Result<Vec<_>, _>>()?;

    let mut data = Vec::with_capacity(table.n_rows() * columns.len());
    for (row_idx, row) in table.rows().iter().enumerate() {
        for &(name, idx, mapping) in &columns {
            let cell = row[idx].as_str();
            let value = match mapping {
                Some(categories) => {
                    let key = cell.trim();
                    if key.is_empty() {
                        on_miss(name, Lookup::Missing)
                    } else {
                        match categories.get(key) {
                            Some(&v) => Ok(v),
                            None => on_miss(name, Lookup::Unseen(key)),
                        }
                    }
                }
                None => parse_numeric(cell).ok_or_else(|| format!("non-numeric value '{cell}' in column `{name}`")),
            };
            data.push(value.map_err(|e| format!("row {}: {e}", row_idx + 1))?);
        }
    }

    Ok(DMatrix::from_row_slice(table.n_rows(), columns.len(), &data))
}

fn parse_numeric(cell: &str) -> Option<f64> {
    let s = cell.trim();
    if s.is_empty() {
        return Some(f64::NAN);
    }
    s.parse::<f64>().ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn table() -> Table {
        Table::new(
            vec!["DRG".into(), "Provider Zip Code".into(), "Discharges".into()],
            vec![
                vec!["039".into(), "01234".into(), "12".into()],
                vec!["057".into(), "99999".into(), "".into()],
                vec!["".into(), "01234".into(), "3.5".into()],
            ],
        )
        .unwrap()
    }

    fn target(handle_unknown: UnseenPolicy) -> Encoder {
        let mut mappings = BTreeMap::new();
        mappings.insert(
            "DRG".to_string(),
            BTreeMap::from([("039".to_string(), 10.0), ("057".to_string(), 20.0)]),
        );
        mappings.insert(
            "Provider Zip Code".to_string(),
            BTreeMap::from([("01234".to_string(), 1.5)]),
        );
        Encoder::Target(TargetEncoder {
            features: vec!["Discharges".into(), "DRG".into(), "Provider Zip Code".into()],
            mappings,
            global_mean: 7.0,
            handle_unknown,
            handle_missing: UnseenPolicy::Value,
        })
    }

    #[test]
    fn target_encoding_follows_feature_order() {
        let m = target(UnseenPolicy::Value).encode(&table()).unwrap();
        assert_eq!(m.shape(), (3, 3));
        assert_eq!(m[(0, 0)], 12.0);
        assert_eq!(m[(0, 1)], 10.0);
        assert_eq!(m[(0, 2)], 1.5);
        assert!(m[(1, 0)].is_nan());
        assert_eq!(m[(1, 2)], 7.0, "unseen zip falls back to global mean");
        assert_eq!(m[(2, 1)], 7.0, "missing category falls back to global mean");
    }

    #[test]
    fn unseen_category_error_names_column_and_value() {
        let err = target(UnseenPolicy::Error).encode(&table()).unwrap_err();
        assert!(err.contains("Provider Zip Code"), "{err}");
        assert!(err.contains("99999"), "{err}");
        assert!(err.contains("row 2"), "{err}");
    }

    #[test]
    fn non_numeric_feature_is_rejected() {
        let t = Table::new(vec!["Discharges".into()], vec![vec!["many".into()]]).unwrap();
        let enc = Encoder::Ordinal(OrdinalEncoder {
            features: vec!["Discharges".into()],
            mappings: BTreeMap::new(),
            handle_unknown: UnseenPolicy::Value,
            unknown_value: -1.0,
            handle_missing: UnseenPolicy::Value,
            missing_value: -2.0,
        });
        assert!(enc.encode(&t).unwrap_err().contains("many"));
    }

    #[test]
    fn ordinal_uses_sentinel_codes() {
        let enc = Encoder::Ordinal(OrdinalEncoder {
            features: vec!["DRG".into()],
            mappings: BTreeMap::from([(
                "DRG".to_string(),
                BTreeMap::from([("039".to_string(), 1.0)]),
            )]),
            handle_unknown: UnseenPolicy::Value,
            unknown_value: -1.0,
            handle_missing: UnseenPolicy::Value,
            missing_value: -2.0,
        });
        let m = enc.encode(&table()).unwrap();
        assert_eq!(m.column(0).iter().copied().collect::<Vec<_>>(), [1.0, -1.0, -2.0]);
    }

    #[test]
    fn validate_rejects_orphan_mapping() {
        let mut enc = target(UnseenPolicy::Value);
        if let Encoder::Target(e) = &mut enc {
            e.features.retain(|f| f != "DRG");
        }
        assert!(enc.validate().unwrap_err().contains("DRG"));
    }

    #[test]
    fn deserializes_from_tagged_json() {
        let json = r#"{
            "kind": "target",
            "format_version": 1,
            "features": ["DRG"],
            "mappings": {"DRG": {"039": 2.5}},
            "global_mean": 1.0
        }"#;
        let enc: Encoder = serde_json::from_str(json).unwrap();
        assert_eq!(enc.kind_name(), "target");
        assert_eq!(enc.output_width(), 1);
    }
}
