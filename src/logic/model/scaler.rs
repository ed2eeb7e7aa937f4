//! Fitted Scalers - training-time normalization replayed at inference
//!
//! The statistics come from the artifact verbatim. Their length must equal
//! the encoded layout; that is checked once at load.

use serde::{Deserialize, Serialize};

use super::ModelError;
use crate::logic::features::{EncodedRow, ScaledRow};

/// Smallest range used for min/max scaling
const MIN_RANGE: f64 = 1e-8;

/// Capability: apply the fitted transform to one row
pub trait Scaler: Send + Sync {
    fn transform(&self, row: &EncodedRow) -> Result<ScaledRow, ModelError>;

    /// Number of columns the scaler was fitted on
    fn n_features(&self) -> usize;

    fn kind(&self) -> &'static str;
}

// ============================================================================
// ARTIFACT FORMAT
// ============================================================================

/// Serialized scaler artifact
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ScalerParams {
    /// `(x - mean) / scale`
    Standard { mean: Vec<f64>, scale: Vec<f64> },
    /// `(x - min) / (max - min)`
    MinMax { min: Vec<f64>, max: Vec<f64> },
}

impl ScalerParams {
    pub fn into_scaler(self) -> Result<Box<dyn Scaler>, ModelError> {
        match self {
            ScalerParams::Standard { mean, scale } => Ok(Box::new(StandardScaler::new(mean, scale)?)),
            ScalerParams::MinMax { min, max } => Ok(Box::new(MinMaxScaler::new(min, max)?)),
        }
    }
}

fn check_lengths(a: usize, b: usize) -> Result<(), ModelError> {
    if a != b {
        return Err(ModelError::ShapeMismatch {
            what: "scaler statistics",
            expected: a,
            actual: b,
        });
    }
    Ok(())
}

fn check_row(row_len: usize, fitted: usize) -> Result<(), ModelError> {
    if row_len != fitted {
        return Err(ModelError::ShapeMismatch {
            what: "scaler input",
            expected: fitted,
            actual: row_len,
        });
    }
    Ok(())
}

// ============================================================================
// STANDARD SCALER
// ============================================================================

#[derive(Debug, Clone)]
pub struct StandardScaler {
    mean: Vec<f64>,
    scale: Vec<f64>,
}

impl StandardScaler {
    pub fn new(mean: Vec<f64>, scale: Vec<f64>) -> Result<Self, ModelError> {
        check_lengths(mean.len(), scale.len())?;

        // Constant columns are stored with scale 0; they divide by 1 instead
        let scale = scale
            .into_iter()
            .map(|s| if s == 0.0 { 1.0 } else { s })
            .collect();

        Ok(Self { mean, scale })
    }
}

impl Scaler for StandardScaler {
    fn transform(&self, row: &EncodedRow) -> Result<ScaledRow, ModelError> {
        check_row(row.len(), self.mean.len())?;

        let values = row
            .values
            .iter()
            .zip(self.mean.iter().zip(self.scale.iter()))
            .map(|(x, (mean, scale))| (x - mean) / scale)
            .collect();

        Ok(ScaledRow { layout_fingerprint: row.layout_fingerprint, values })
    }

    fn n_features(&self) -> usize {
        self.mean.len()
    }

    fn kind(&self) -> &'static str {
        "standard"
    }
}

// ============================================================================
// MIN-MAX SCALER
// ============================================================================

#[derive(Debug, Clone)]
pub struct MinMaxScaler {
    min: Vec<f64>,
    max: Vec<f64>,
}

impl MinMaxScaler {
    pub fn new(min: Vec<f64>, max: Vec<f64>) -> Result<Self, ModelError> {
        check_lengths(min.len(), max.len())?;
        Ok(Self { min, max })
    }
}

impl Scaler for MinMaxScaler {
    fn transform(&self, row: &EncodedRow) -> Result<ScaledRow, ModelError> {
        check_row(row.len(), self.min.len())?;

        let values = row
            .values
            .iter()
            .zip(self.min.iter().zip(self.max.iter()))
            .map(|(x, (min, max))| {
                let range = (max - min).max(MIN_RANGE);
                (x - min) / range
            })
            .collect();

        Ok(ScaledRow { layout_fingerprint: row.layout_fingerprint, values })
    }

    fn n_features(&self) -> usize {
        self.min.len()
    }

    fn kind(&self) -> &'static str {
        "min_max"
    }
}

// ============================================================================
// TESTS
// ============================================================================
