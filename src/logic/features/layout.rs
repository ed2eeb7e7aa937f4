//! Column Layout - Training-time column schemas
//!
//! **CRITICAL: the loaded schemas control the feature contract**
//!
//! ## Rules:
//! 1. Column order is taken verbatim from the artifact
//! 2. Schemas are immutable once loaded
//! 3. Drift against the fitted scaler/model is NOT detected, only fingerprinted
//!
//! ## Why fingerprints:
//! - Spot swapped artifact sets in logs
//! - Compare two deployments with `check`

use std::collections::HashMap;

use crc32fast::Hasher;
use serde::{Deserialize, Serialize};

// ============================================================================
// SCHEMA KIND
// ============================================================================

/// Which side of the encoder a schema describes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SchemaKind {
    /// Columns before one-hot encoding
    Raw,
    /// Columns after one-hot encoding (scaler/model input)
    Encoded,
}

impl SchemaKind {
    fn tag(self) -> u8 {
        match self {
            SchemaKind::Raw => 1,
            SchemaKind::Encoded => 2,
        }
    }
}

impl std::fmt::Display for SchemaKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SchemaKind::Raw => write!(f, "raw"),
            SchemaKind::Encoded => write!(f, "encoded"),
        }
    }
}

// ============================================================================
// COLUMN SCHEMA
// ============================================================================

/// Ordered column names as fitted at training time
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnSchema {
    kind: SchemaKind,
    names: Vec<String>,
    index: HashMap<String, usize>,
}

impl ColumnSchema {
    /// Build a schema from ordered names.
    ///
    /// Duplicate names keep their first position for lookups, matching how a
    /// label-based reindex resolves them.
    pub fn new(kind: SchemaKind, names: Vec<String>) -> Self {
        let mut index = HashMap::with_capacity(names.len());
        for (i, name) in names.iter().enumerate() {
            index.entry(name.clone()).or_insert(i);
        }
        Self { kind, names, index }
    }

    pub fn raw<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::new(SchemaKind::Raw, names.into_iter().map(Into::into).collect())
    }

    pub fn encoded<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::new(SchemaKind::Encoded, names.into_iter().map(Into::into).collect())
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.names.iter().map(String::as_str)
    }

    /// Get column index by name
    pub fn position(&self, name: &str) -> Option<usize> {
        self.index.get(name).copied()
    }

    /// CRC32 over the kind tag and the ordered names
    pub fn fingerprint(&self) -> u32 {
        let mut hasher = Hasher::new();
        hasher.update(&[self.kind.tag()]);

        for name in &self.names {
            hasher.update(name.as_bytes());
            hasher.update(&[0]); // Separator
        }

        hasher.finalize()
    }

    pub fn info(&self) -> LayoutInfo {
        LayoutInfo {
            kind: self.kind,
            fingerprint: self.fingerprint(),
            column_count: self.len(),
            column_names: self.names.clone(),
        }
    }
}

// ============================================================================
// LAYOUT INFO
// ============================================================================

/// Layout summary for logging and `check` output
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LayoutInfo {
    pub kind: SchemaKind,
    pub fingerprint: u32,
    pub column_count: usize,
    pub column_names: Vec<String>,
}

impl std::fmt::Display for LayoutInfo {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} layout: {} columns (fingerprint: {:08x})",
            self.kind, self.column_count, self.fingerprint
        )
    }
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_position() {
        let schema = ColumnSchema::raw(["Age", "Gender", "SleepHours"]);
        assert_eq!(schema.position("Age"), Some(0));
        assert_eq!(schema.position("SleepHours"), Some(2));
        assert_eq!(schema.position("nonexistent"), None);
    }

    #[test]
    fn test_fingerprint_consistency() {
        let a = ColumnSchema::raw(["Age", "Gender"]);
        let b = ColumnSchema::raw(["Age", "Gender"]);
        assert_eq!(a.fingerprint(), b.fingerprint());
        assert_ne!(a.fingerprint(), 0);
    }

    #[test]
    fn test_fingerprint_detects_order_change() {
        let a = ColumnSchema::raw(["Age", "Gender"]);
        let b = ColumnSchema::raw(["Gender", "Age"]);
        assert_ne!(a.fingerprint(), b.fingerprint());
    }

    #[test]
    fn test_fingerprint_separates_kinds() {
        let raw = ColumnSchema::raw(["Age"]);
        let encoded = ColumnSchema::encoded(["Age"]);
        assert_ne!(raw.fingerprint(), encoded.fingerprint());
    }

    #[test]
    fn test_fingerprint_separator() {
        // "ab"+"c" must not collide with "a"+"bc"
        let a = ColumnSchema::raw(["ab", "c"]);
        let b = ColumnSchema::raw(["a", "bc"]);
        assert_ne!(a.fingerprint(), b.fingerprint());
    }

    #[test]
    fn test_duplicate_names_keep_first_position() {
        let schema = ColumnSchema::raw(["Age", "Age"]);
        assert_eq!(schema.len(), 2);
        assert_eq!(schema.position("Age"), Some(0));
    }

    #[test]
    fn test_layout_info() {
        let schema = ColumnSchema::encoded(["Age", "Gender_Male"]);
        let info = schema.info();
        assert_eq!(info.kind, SchemaKind::Encoded);
        assert_eq!(info.column_count, 2);
        assert_eq!(info.fingerprint, schema.fingerprint());
        assert!(info.to_string().starts_with("encoded layout: 2 columns"));
    }
}
