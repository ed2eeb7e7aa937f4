//! Artifacts Module - Training outputs the form depends on
//!
//! Four files: raw columns, encoded columns, fitted scaler, classifier.
//! All four must exist before anything else runs.

pub mod loader;


use std::path::PathBuf;

use thiserror::Error;

use crate::logic::model::ModelError;

// Re-export common types
pub use loader::{check_required, load, ArtifactDigest, ArtifactPaths, LoadedArtifacts};

#[derive(Debug, Error)]
pub enum ArtifactError {
    #[error("missing required artifacts: {}", display_paths(.paths))]
    Missing { paths: Vec<PathBuf> },

    #[error("cannot read {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("cannot parse {}: {source}", .path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("{} is invalid: {reason}", .path.display())]
    Invalid { path: PathBuf, reason: String },

    #[error("{artifact} at {} has {actual} columns, encoded layout has {expected}", .path.display())]
    ShapeMismatch {
        artifact: &'static str,
        path: PathBuf,
        expected: usize,
        actual: usize,
    },

    #[error("{}: {source}", .path.display())]
    Model {
        path: PathBuf,
        #[source]
        source: ModelError,
    },
}

fn display_paths(paths: &[PathBuf]) -> String {
    paths
        .iter()
        .map(|p| p.display().to_string())
        .collect::<Vec<_>>()
        .join(", ")
}
