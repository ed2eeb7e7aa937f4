//! Artifact Loader - fail-fast startup loading
//!
//! No partial operation and no retry: every missing file is reported at once,
//! then the first unreadable or inconsistent artifact aborts the load.

use std::fs::File;
use std::path::{Path, PathBuf};

use serde::de::DeserializeOwned;
use serde::Serialize;
use sha2::{Digest, Sha256};

use super::ArtifactError;
use crate::logic::features::{ColumnSchema, SchemaKind};
use crate::logic::model::{load_classifier, Classifier, Scaler, ScalerParams};

// ============================================================================
// PATHS
// ============================================================================

/// Locations of the four training artifacts
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ArtifactPaths {
    pub columns: PathBuf,
    pub encoded_columns: PathBuf,
    pub scaler: PathBuf,
    pub model: PathBuf,
}

impl ArtifactPaths {
    /// Role name and path, in load order
    pub fn required(&self) -> [(&'static str, &Path); 4] {
        [
            ("columns", self.columns.as_path()),
            ("encoded_columns", self.encoded_columns.as_path()),
            ("scaler", self.scaler.as_path()),
            ("model", self.model.as_path()),
        ]
    }

    pub fn missing(&self) -> Vec<PathBuf> {
        self.required()
            .iter()
            .filter(|(_, path)| !path.exists())
            .map(|(_, path)| path.to_path_buf())
            .collect()
    }
}

/// Startup check: every artifact must exist
pub fn check_required(paths: &ArtifactPaths) -> Result<(), ArtifactError> {
    let missing = paths.missing();
    if !missing.is_empty() {
        return Err(ArtifactError::Missing { paths: missing });
    }
    Ok(())
}

// ============================================================================
// DIGESTS
// ============================================================================

/// SHA-256 of one artifact file, for `check` output and logs
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ArtifactDigest {
    pub role: &'static str,
    pub path: PathBuf,
    pub sha256: String,
    pub bytes: u64,
}

/// Compute SHA256 hash of file
fn compute_file_hash(path: &Path) -> Result<(String, u64), std::io::Error> {
    let mut file = File::open(path)?;
    let mut hasher = Sha256::new();
    let bytes = std::io::copy(&mut file, &mut hasher)?;
    Ok((hex::encode(hasher.finalize()), bytes))
}

fn digest(role: &'static str, path: &Path) -> Result<ArtifactDigest, ArtifactError> {
    let (sha256, bytes) = compute_file_hash(path).map_err(|source| ArtifactError::Io {
        path: path.to_path_buf(),
        source,
    })?;

    Ok(ArtifactDigest {
        role,
        path: path.to_path_buf(),
        sha256,
        bytes,
    })
}

// ============================================================================
// LOADING
// ============================================================================

/// Everything the pipeline needs, loaded once
pub struct LoadedArtifacts {
    pub raw_schema: ColumnSchema,
    pub encoded_schema: ColumnSchema,
    pub scaler: Box<dyn Scaler>,
    pub model: Box<dyn Classifier>,
    pub digests: Vec<ArtifactDigest>,
}

impl std::fmt::Debug for LoadedArtifacts {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LoadedArtifacts")
            .field("raw_schema", &self.raw_schema.info().to_string())
            .field("encoded_schema", &self.encoded_schema.info().to_string())
            .field("scaler", &self.scaler.kind())
            .field("model", self.model.metadata())
            .finish()
    }
}

fn read_json<T: DeserializeOwned>(path: &Path) -> Result<T, ArtifactError> {
    let bytes = std::fs::read(path).map_err(|source| ArtifactError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    serde_json::from_slice(&bytes).map_err(|source| ArtifactError::Parse {
        path: path.to_path_buf(),
        source,
    })
}

fn load_schema(path: &Path, kind: SchemaKind) -> Result<ColumnSchema, ArtifactError> {
    let names: Vec<String> = read_json(path)?;
    if names.is_empty() {
        return Err(ArtifactError::Invalid {
            path: path.to_path_buf(),
            reason: "column list is empty".to_string(),
        });
    }

    let schema = ColumnSchema::new(kind, names);
    log::info!("{} <- {}", schema.info(), path.display());
    Ok(schema)
}

/// Load and cross-check all four artifacts
pub fn load(paths: &ArtifactPaths) -> Result<LoadedArtifacts, ArtifactError> {
    check_required(paths)?;

    let digests = paths
        .required()
        .iter()
        .map(|&(role, path)| digest(role, path))
        .collect::<Result<Vec<_>, _>>()?;

    for d in &digests {
        log::debug!("{} sha256={} ({} bytes)", d.role, d.sha256, d.bytes);
    }

    let raw_schema = load_schema(&paths.columns, SchemaKind::Raw)?;
    let encoded_schema = load_schema(&paths.encoded_columns, SchemaKind::Encoded)?;

    let params: ScalerParams = read_json(&paths.scaler)?;
    let scaler = params.into_scaler().map_err(|source| ArtifactError::Model {
        path: paths.scaler.clone(),
        source,
    })?;

    if scaler.n_features() != encoded_schema.len() {
        return Err(ArtifactError::ShapeMismatch {
            artifact: "scaler",
            path: paths.scaler.clone(),
            expected: encoded_schema.len(),
            actual: scaler.n_features(),
        });
    }
    log::info!("Scaler loaded: {} over {} columns", scaler.kind(), scaler.n_features());

    let model = load_classifier(&paths.model).map_err(|source| ArtifactError::Model {
        path: paths.model.clone(),
        source,
    })?;

    if let Some(features) = model.metadata().features {
        if features != encoded_schema.len() {
            return Err(ArtifactError::ShapeMismatch {
                artifact: "model",
                path: paths.model.clone(),
                expected: encoded_schema.len(),
                actual: features,
            });
        }
    }
    log::info!("Classifier loaded: {} backend", model.metadata().backend);

    Ok(LoadedArtifacts {
        raw_schema,
        encoded_schema,
        scaler,
        model,
        digests,
    })
}
