//! Model Module - Scaling + Inference
//!
//! Replays the fitted scaler and runs the pretrained classifier.
//! Both are capabilities behind traits, so backends can be swapped.

pub mod inference;
pub mod scaler;
pub mod threshold;

use thiserror::Error;

// Re-export common types
pub use inference::{load_classifier, Backend, Classifier, LinearClassifier, LinearParams, ModelMetadata};
pub use scaler::{Scaler, ScalerParams};
pub use threshold::{Label, ThresholdConfig};

#[derive(Debug, Clone, PartialEq, Error)]
pub enum ModelError {
    #[error("{what} expects {expected} columns, got {actual}")]
    ShapeMismatch {
        what: &'static str,
        expected: usize,
        actual: usize,
    },

    #[error("model load failed: {0}")]
    Load(String),

    #[error("inference failed: {0}")]
    Inference(String),
}
