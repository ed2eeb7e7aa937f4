//! Feature Assembler - InputRecord -> FeatureRow in raw column order

use super::layout::ColumnSchema;
use super::vector::{FeatureRow, FeatureValue, InputRecord};

/// What to do with a raw column the input record does not provide
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MissingFieldPolicy {
    /// Fill with integer zero. Lossy, but it is what the model was trained against.
    #[default]
    ZeroFill,
}

impl MissingFieldPolicy {
    pub fn default_value(self) -> FeatureValue {
        match self {
            MissingFieldPolicy::ZeroFill => FeatureValue::Int(0),
        }
    }
}

/// Lookup-or-default over the record, one cell per raw column
pub fn assemble(record: &InputRecord, schema: &ColumnSchema, policy: MissingFieldPolicy) -> FeatureRow {
    let mut missing = Vec::new();

    let values = schema
        .iter()
        .map(|column| match record.get(column) {
            Some(value) => value.clone(),
            None => {
                missing.push(column);
                policy.default_value()
            }
        })
        .collect();

    if !missing.is_empty() {
        log::debug!("Raw columns not provided by the form, defaulted: {:?}", missing);
    }

    FeatureRow {
        layout_fingerprint: schema.fingerprint(),
        values,
    }
}
