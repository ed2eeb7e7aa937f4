//! Central Configuration Constants
//!
//! Single source of truth for all configuration defaults.
//! Flags override environment variables, which override these defaults.

use std::path::PathBuf;

use crate::logic::features::EncodingPolicy;

/// Default raw column list
pub const DEFAULT_COLUMNS_PATH: &str = "artifacts/columns.json";

/// Default encoded column list
pub const DEFAULT_ENCODED_COLUMNS_PATH: &str = "artifacts/encoded_columns.json";

/// Default fitted scaler
pub const DEFAULT_SCALER_PATH: &str = "artifacts/scaler.json";

/// Default classifier (ONNX; a `.json` path selects the linear backend)
pub const DEFAULT_MODEL_PATH: &str = "artifacts/model.onnx";

/// Decision threshold (strict `>`)
pub const DEFAULT_THRESHOLD: f64 = 0.5;

/// Stand-in for the academic score, which the form does not collect
pub const ACADEMIC_SCORE_PLACEHOLDER: f64 = 75.0;

/// App version
pub const APP_VERSION: &str = env!("CARGO_PKG_VERSION");

/// App name
pub const APP_NAME: &str = "ADHD Predictor";

// ============================================
// Helper functions to read from env with fallback
// ============================================

fn path_from_env(var: &str, default: &str) -> PathBuf {
    std::env::var(var)
        .map(PathBuf::from)
        .unwrap_or_else(|_| PathBuf::from(default))
}

/// Get raw column list path from environment or use default
pub fn get_columns_path() -> PathBuf {
    path_from_env("ADHD_COLUMNS", DEFAULT_COLUMNS_PATH)
}

/// Get encoded column list path from environment or use default
pub fn get_encoded_columns_path() -> PathBuf {
    path_from_env("ADHD_ENCODED_COLUMNS", DEFAULT_ENCODED_COLUMNS_PATH)
}

/// Get scaler path from environment or use default
pub fn get_scaler_path() -> PathBuf {
    path_from_env("ADHD_SCALER", DEFAULT_SCALER_PATH)
}

/// Get model path from environment or use default
pub fn get_model_path() -> PathBuf {
    path_from_env("ADHD_MODEL", DEFAULT_MODEL_PATH)
}

/// Get decision threshold from environment or use default
pub fn get_threshold() -> f64 {
    std::env::var("ADHD_THRESHOLD")
        .ok()
        .and_then(|s| s.parse().ok())
        .filter(|t: &f64| (0.0..=1.0).contains(t))
        .unwrap_or(DEFAULT_THRESHOLD)
}

/// Get encoding policy from environment or use default
pub fn get_encoding_policy() -> EncodingPolicy {
    std::env::var("ADHD_ENCODING")
        .ok()
        .and_then(|s| s.parse().ok())
        .unwrap_or_default()
}
