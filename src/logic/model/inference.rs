//! Inference Engine - ONNX Runtime + linear fallback
//!
//! The classifier is an opaque capability: one scaled row in, P(positive) out.
//! The backend is chosen by the artifact's file extension.

use std::path::Path;

use ndarray::Array2;
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use ort::session::{Session, builder::GraphOptimizationLevel};
use ort::value::Value;

use super::ModelError;
use crate::logic::features::ScaledRow;

// ============================================================================
// DATA STRUCTURES
// ============================================================================

/// Which runtime produced the probability
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Backend {
    Onnx,
    Linear,
}

impl std::fmt::Display for Backend {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Backend::Onnx => write!(f, "onnx"),
            Backend::Linear => write!(f, "linear"),
        }
    }
}

/// Model metadata
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelMetadata {
    pub model_path: String,
    pub backend: Backend,
    /// Expected input width, when the artifact declares one
    pub features: Option<usize>,
    pub loaded_at: chrono::DateTime<chrono::Utc>,
}

// ============================================================================
// CLASSIFIER TRAIT
// ============================================================================

/// Capability: binary classifier over one scaled row
pub trait Classifier: Send + Sync {
    /// P(positive class), in [0, 1]
    fn predict(&self, row: &ScaledRow) -> Result<f64, ModelError>;

    fn metadata(&self) -> &ModelMetadata;
}

/// Load a classifier, picking the backend from the extension
pub fn load_classifier(path: &Path) -> Result<Box<dyn Classifier>, ModelError> {
    let is_json = path
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.eq_ignore_ascii_case("json"))
        .unwrap_or(false);

    if is_json {
        Ok(Box::new(LinearClassifier::load(path)?))
    } else {
        Ok(Box::new(OnnxClassifier::load(path)?))
    }
}

/// Reject NaN/inf, clamp the rest into [0, 1]
fn finish_probability(raw: f64) -> Result<f64, ModelError> {
    if !raw.is_finite() {
        return Err(ModelError::Inference(format!("non-finite probability: {}", raw)));
    }
    Ok(raw.clamp(0.0, 1.0))
}

/// P(positive) from a flattened output tensor.
///
/// `[[p]]` comes from a sigmoid head, `[[p0, p1]]` from a two-class head.
fn positive_probability(data: &[f32]) -> Result<f64, ModelError> {
    let raw = match data {
        [] => return Err(ModelError::Inference("Empty output".to_string())),
        [p] => *p,
        [_, p, ..] => *p,
    };

    finish_probability(f64::from(raw))
}

// ============================================================================
// ONNX IMPLEMENTATION
// ============================================================================

pub struct OnnxClassifier {
    // `run` needs exclusive access to the session
    session: Mutex<Session>,
    output_name: String,
    metadata: ModelMetadata,
}

impl OnnxClassifier {
    /// Load ONNX model from file
    pub fn load(model_path: &Path) -> Result<Self, ModelError> {
        log::info!("Loading ONNX model from: {}", model_path.display());

        if !model_path.exists() {
            return Err(ModelError::Load(format!("Model not found: {}", model_path.display())));
        }

        let session = Session::builder()
            .map_err(|e| ModelError::Load(format!("Failed to create session builder: {}", e)))?
            .with_optimization_level(GraphOptimizationLevel::Level3)
            .map_err(|e| ModelError::Load(format!("Failed to set optimization: {}", e)))?
            .commit_from_file(model_path)
            .map_err(|e| ModelError::Load(format!("Failed to load model: {}", e)))?;

        let output_name = session.outputs.first()
            .map(|o| o.name.clone())
            .ok_or_else(|| ModelError::Load("No output defined".to_string()))?;

        log::info!("ONNX model loaded successfully (output: {})", output_name);

        Ok(Self {
            session: Mutex::new(session),
            output_name,
            metadata: ModelMetadata {
                model_path: model_path.display().to_string(),
                backend: Backend::Onnx,
                features: None,
                loaded_at: chrono::Utc::now(),
            },
        })
    }
}

impl Classifier for OnnxClassifier {
    fn predict(&self, row: &ScaledRow) -> Result<f64, ModelError> {
        let input_array = Array2::<f32>::from_shape_vec((1, row.len()), row.to_f32())
            .map_err(|e| ModelError::Inference(format!("Array error: {}", e)))?;

        let input_tensor = Value::from_array(input_array)
            .map_err(|e| ModelError::Inference(format!("Tensor error: {}", e)))?;

        let mut session = self.session.lock();
        let outputs = session.run(ort::inputs![input_tensor])
            .map_err(|e| ModelError::Inference(format!("Inference failed: {}", e)))?;

        let output = outputs.get(&self.output_name)
            .ok_or_else(|| ModelError::Inference("No output".to_string()))?;

        let output_tensor = output.try_extract_tensor::<f32>()
            .map_err(|e| ModelError::Inference(format!("Extract error: {}", e)))?;

        positive_probability(output_tensor.1)
    }

    fn metadata(&self) -> &ModelMetadata {
        &self.metadata
    }
}

// ============================================================================
// LINEAR IMPLEMENTATION
// ============================================================================

/// Serialized logistic model
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LinearParams {
    pub weights: Vec<f64>,
    pub bias: f64,
}

/// `sigmoid(w·x + b)`
#[derive(Debug, Clone)]
pub struct LinearClassifier {
    params: LinearParams,
    metadata: ModelMetadata,
}

impl LinearClassifier {
    pub fn new(params: LinearParams, model_path: impl Into<String>) -> Self {
        let features = Some(params.weights.len());
        Self {
            params,
            metadata: ModelMetadata {
                model_path: model_path.into(),
                backend: Backend::Linear,
                features,
                loaded_at: chrono::Utc::now(),
            },
        }
    }

    pub fn load(model_path: &Path) -> Result<Self, ModelError> {
        log::info!("Loading linear model from: {}", model_path.display());

        let bytes = std::fs::read(model_path)
            .map_err(|e| ModelError::Load(format!("{}: {}", model_path.display(), e)))?;
        let params: LinearParams = serde_json::from_slice(&bytes)
            .map_err(|e| ModelError::Load(format!("{}: {}", model_path.display(), e)))?;

        Ok(Self::new(params, model_path.display().to_string()))
    }
}

impl Classifier for LinearClassifier {
    fn predict(&self, row: &ScaledRow) -> Result<f64, ModelError> {
        if row.len() != self.params.weights.len() {
            return Err(ModelError::ShapeMismatch {
                what: "model input",
                expected: self.params.weights.len(),
                actual: row.len(),
            });
        }

        let logit: f64 = row
            .values
            .iter()
            .zip(self.params.weights.iter())
            .map(|(x, w)| x * w)
            .sum::<f64>()
            + self.params.bias;

        let probability = 1.0 / (1.0 + (-logit).exp());
        finish_probability(probability)
    }

    fn metadata(&self) -> &ModelMetadata {
        &self.metadata
    }
}

// ============================================================================
// TESTS
// ============================================================================
