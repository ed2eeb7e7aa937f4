//! Feature Rows - Data carried between pipeline stages
//!
//! Every row carries the fingerprint of the layout it was aligned to, which
//! shows up in trace logs next to the values.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::layout::ColumnSchema;

// ============================================================================
// FEATURE VALUE
// ============================================================================

/// A single typed cell before encoding
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FeatureValue {
    Int(i64),
    Float(f64),
    Category(String),
}

impl FeatureValue {
    /// Numeric view of the cell, `None` for categories
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            FeatureValue::Int(v) => Some(*v as f64),
            FeatureValue::Float(v) => Some(*v),
            FeatureValue::Category(_) => None,
        }
    }
}

impl std::fmt::Display for FeatureValue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FeatureValue::Int(v) => write!(f, "{}", v),
            FeatureValue::Float(v) => write!(f, "{:?}", v),
            FeatureValue::Category(v) => write!(f, "{}", v),
        }
    }
}

impl From<i64> for FeatureValue {
    fn from(v: i64) -> Self {
        FeatureValue::Int(v)
    }
}

impl From<f64> for FeatureValue {
    fn from(v: f64) -> Self {
        FeatureValue::Float(v)
    }
}

impl From<&str> for FeatureValue {
    fn from(v: &str) -> Self {
        FeatureValue::Category(v.to_string())
    }
}

// ============================================================================
// INPUT RECORD
// ============================================================================

/// Semantic field name -> value, built fresh per interaction
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct InputRecord {
    fields: BTreeMap<String, FeatureValue>,
}

impl InputRecord {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<FeatureValue>) {
        self.fields.insert(name.into(), value.into());
    }

    pub fn get(&self, name: &str) -> Option<&FeatureValue> {
        self.fields.get(name)
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }
}

// ============================================================================
// FEATURE ROW (raw schema order)
// ============================================================================

/// Values aligned to the raw column schema
#[derive(Debug, Clone, PartialEq)]
pub struct FeatureRow {
    pub layout_fingerprint: u32,
    pub values: Vec<FeatureValue>,
}

impl FeatureRow {
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Pair each value with its raw column name
    pub fn named<'a>(
        &'a self,
        schema: &'a ColumnSchema,
    ) -> impl Iterator<Item = (&'a str, &'a FeatureValue)> {
        schema.iter().zip(self.values.iter())
    }
}

// ============================================================================
// ENCODED / SCALED ROWS (encoded schema order)
// ============================================================================

/// Numeric values aligned to the encoded column schema
#[derive(Debug, Clone, PartialEq)]
pub struct EncodedRow {
    pub layout_fingerprint: u32,
    pub values: Vec<f64>,
}

impl EncodedRow {
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Get value by encoded column name
    pub fn get_by_name(&self, schema: &ColumnSchema, name: &str) -> Option<f64> {
        schema.position(name).and_then(|i| self.values.get(i).copied())
    }
}

/// Scaler output, same length and order as [`EncodedRow`]
#[derive(Debug, Clone, PartialEq)]
pub struct ScaledRow {
    pub layout_fingerprint: u32,
    pub values: Vec<f64>,
}

impl ScaledRow {
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Model input dtype
    pub fn to_f32(&self) -> Vec<f32> {
        self.values.iter().map(|v| *v as f32).collect()
    }

    /// Convert to JSON-serializable format for debug logging
    pub fn to_log_entry(&self, schema: &ColumnSchema) -> serde_json::Value {
        serde_json::json!({
            "layout_fingerprint": self.layout_fingerprint,
            "named_values": schema.iter()
                .zip(self.values.iter())
                .map(|(name, value)| (name.to_string(), *value))
                .collect::<BTreeMap<_, _>>(),
        })
    }
}
