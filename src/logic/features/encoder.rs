//! Categorical Encoder - one-hot expansion + reindex onto the encoded schema
//!
//! Expansion only ever sees one row, so most indicator columns are never
//! produced. Reindexing fills them with zero, which is correct because the
//! encoded schema already lists the full training-time category set.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::layout::ColumnSchema;
use super::vector::{EncodedRow, FeatureRow, FeatureValue};

/// Columns expanded into `<Column>_<Category>` indicators
pub const CATEGORICAL_COLUMNS: &[&str] = &["Gender", "EducationStage", "Medication", "SchoolSupport"];

// ============================================================================
// POLICY
// ============================================================================

/// How the reference (dropped) category is chosen
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EncodingPolicy {
    /// Emit the selected category's indicator and let the encoded schema
    /// decide: the reference level is the indicator the schema lacks.
    #[default]
    Schema,
    /// Drop the lexically first category observed in the current row.
    /// With a single row this drops every indicator.
    Observed,
}

impl std::str::FromStr for EncodingPolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "schema" => Ok(EncodingPolicy::Schema),
            "observed" => Ok(EncodingPolicy::Observed),
            other => Err(format!("unknown encoding policy '{}' (expected schema|observed)", other)),
        }
    }
}

impl std::fmt::Display for EncodingPolicy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            EncodingPolicy::Schema => write!(f, "schema"),
            EncodingPolicy::Observed => write!(f, "observed"),
        }
    }
}

// ============================================================================
// ERRORS
// ============================================================================

#[derive(Debug, Clone, PartialEq, Error)]
pub enum EncodeError {
    #[error("feature row has {actual} values but the raw layout has {expected} columns")]
    RowLength { expected: usize, actual: usize },

    #[error("column '{column}' holds category '{value}' but is not one-hot encoded")]
    NonNumeric { column: String, value: String },
}

// ============================================================================
// ENCODER
// ============================================================================

pub fn indicator_name(column: &str, category: &str) -> String {
    format!("{}_{}", column, category)
}

pub fn is_categorical(column: &str) -> bool {
    CATEGORICAL_COLUMNS.contains(&column)
}

/// Expand categoricals, then align onto `encoded` with zero fill
pub fn encode(
    row: &FeatureRow,
    raw: &ColumnSchema,
    encoded: &ColumnSchema,
    policy: EncodingPolicy,
) -> Result<EncodedRow, EncodeError> {
    if row.len() != raw.len() {
        return Err(EncodeError::RowLength { expected: raw.len(), actual: row.len() });
    }

    let expanded = expand(row, raw, policy);
    reindex(&expanded, encoded)
}

/// One-hot expansion of a single row. Non-categorical columns pass through.
fn expand<'a>(
    row: &'a FeatureRow,
    raw: &'a ColumnSchema,
    policy: EncodingPolicy,
) -> HashMap<String, &'a FeatureValue> {
    static ONE: FeatureValue = FeatureValue::Int(1);

    let mut expanded: HashMap<String, &FeatureValue> = HashMap::with_capacity(row.len());
    let mut categorical: Vec<(&str, String)> = Vec::new();

    for (column, value) in row.named(raw) {
        if is_categorical(column) {
            categorical.push((column, value.to_string()));
        } else {
            expanded.entry(column.to_string()).or_insert(value);
        }
    }

    for (column, category) in categorical {
        match policy {
            EncodingPolicy::Schema => {
                expanded.entry(indicator_name(column, &category)).or_insert(&ONE);
            }
            EncodingPolicy::Observed => {
                // One observed category per column: it is the first, and it is dropped
                log::trace!("Dropping reference level {}={}", column, category);
            }
        }
    }

    expanded
}

/// Align to the encoded layout. Absent columns become 0, extras are dropped.
fn reindex(
    expanded: &HashMap<String, &FeatureValue>,
    encoded: &ColumnSchema,
) -> Result<EncodedRow, EncodeError> {
    let values = encoded
        .iter()
        .map(|column| match expanded.get(column) {
            Some(value) => value.as_f64().ok_or_else(|| EncodeError::NonNumeric {
                column: column.to_string(),
                value: value.to_string(),
            }),
            None => Ok(0.0),
        })
        .collect::<Result<Vec<_>, _>>()?;

    Ok(EncodedRow {
        layout_fingerprint: encoded.fingerprint(),
        values,
    })
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn raw_schema() -> ColumnSchema {
        ColumnSchema::raw(["Age", "Gender", "Medication", "RSD"])
    }

    fn row(values: Vec<FeatureValue>) -> FeatureRow {
        FeatureRow { layout_fingerprint: raw_schema().fingerprint(), values }
    }

    fn encoded_schema() -> ColumnSchema {
        ColumnSchema::encoded([
            "Age",
            "RSD",
            "Gender_Male",
            "Gender_Nonbinary",
            "Medication_Non-stimulant",
            "Medication_Stimulant",
        ])
    }

    #[test]
    fn test_schema_policy_sets_selected_indicator() {
        let row = row(vec![
            FeatureValue::Int(30),
            FeatureValue::from("Male"),
            FeatureValue::from("Stimulant"),
            FeatureValue::Int(1),
        ]);
        let encoded = encode(&row, &raw_schema(), &encoded_schema(), EncodingPolicy::Schema).unwrap();
        assert_eq!(encoded.values, vec![30.0, 1.0, 1.0, 0.0, 0.0, 1.0]);
    }

    #[test]
    fn test_schema_policy_reference_level_is_all_zero() {
        // Female and No are absent from the encoded schema
        let row = row(vec![
            FeatureValue::Int(30),
            FeatureValue::from("Female"),
            FeatureValue::from("No"),
            FeatureValue::Int(0),
        ]);
        let encoded = encode(&row, &raw_schema(), &encoded_schema(), EncodingPolicy::Schema).unwrap();
        assert_eq!(encoded.values, vec![30.0, 0.0, 0.0, 0.0, 0.0, 0.0]);
    }

    #[test]
    fn test_observed_policy_drops_every_indicator() {
        let row = row(vec![
            FeatureValue::Int(30),
            FeatureValue::from("Male"),
            FeatureValue::from("Stimulant"),
            FeatureValue::Int(1),
        ]);
        let encoded = encode(&row, &raw_schema(), &encoded_schema(), EncodingPolicy::Observed).unwrap();
        assert_eq!(encoded.values, vec![30.0, 1.0, 0.0, 0.0, 0.0, 0.0]);
    }

    #[test]
    fn test_extra_columns_dropped_missing_zero_filled() {
        let row = row(vec![
            FeatureValue::Int(30),
            FeatureValue::from("Male"),
            FeatureValue::from("No"),
            FeatureValue::Int(1),
        ]);
        let encoded_schema = ColumnSchema::encoded(["SleepHours", "Age"]);
        let encoded = encode(&row, &raw_schema(), &encoded_schema, EncodingPolicy::Schema).unwrap();
        assert_eq!(encoded.values, vec![0.0, 30.0]);
        assert_eq!(encoded.layout_fingerprint, encoded_schema.fingerprint());
    }

    #[test]
    fn test_zero_filled_categorical_encodes_as_zero_category() {
        let row = row(vec![
            FeatureValue::Int(30),
            FeatureValue::Int(0),
            FeatureValue::from("No"),
            FeatureValue::Int(0),
        ]);
        let schema = ColumnSchema::encoded(["Gender_0", "Gender_Male"]);
        let encoded = encode(&row, &raw_schema(), &schema, EncodingPolicy::Schema).unwrap();
        assert_eq!(encoded.values, vec![1.0, 0.0]);
    }

    #[test]
    fn test_surviving_category_is_an_error() {
        let raw = ColumnSchema::raw(["Age", "Region"]);
        let row = FeatureRow {
            layout_fingerprint: raw.fingerprint(),
            values: vec![FeatureValue::Int(30), FeatureValue::from("North")],
        };
        let schema = ColumnSchema::encoded(["Age", "Region"]);
        let err = encode(&row, &raw, &schema, EncodingPolicy::Schema).unwrap_err();
        assert_eq!(
            err,
            EncodeError::NonNumeric { column: "Region".to_string(), value: "North".to_string() }
        );

        // Dropped by reindex: not an error
        let schema = ColumnSchema::encoded(["Age"]);
        assert!(encode(&row, &raw, &schema, EncodingPolicy::Schema).is_ok());
    }

    #[test]
    fn test_row_length_mismatch() {
        let short = FeatureRow { layout_fingerprint: 0, values: vec![FeatureValue::Int(1)] };
        let err = encode(&short, &raw_schema(), &encoded_schema(), EncodingPolicy::Schema).unwrap_err();
        assert_eq!(err, EncodeError::RowLength { expected: 4, actual: 1 });
    }

    #[test]
    fn test_policy_from_str() {
        assert_eq!("schema".parse::<EncodingPolicy>().unwrap(), EncodingPolicy::Schema);
        assert_eq!("Observed".parse::<EncodingPolicy>().unwrap(), EncodingPolicy::Observed);
        assert!("lexical".parse::<EncodingPolicy>().is_err());
    }
}
