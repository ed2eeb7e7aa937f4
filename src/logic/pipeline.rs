//! Prediction Pipeline
//!
//! form → record → raw row → encoded row → scaled row → probability → label.
//! The context is built once at startup and borrowed by every run; nothing is
//! mutated between runs.

use std::time::Instant;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::logic::artifacts::{ArtifactDigest, LoadedArtifacts};
use crate::logic::features::{
    assemble, encode, ColumnSchema, EncodeError, EncodedRow, EncodingPolicy, FeatureRow,
    FormInput, InputError, MissingFieldPolicy, ScaledRow,
};
use crate::logic::model::{Backend, Classifier, Label, ModelError, Scaler, ThresholdConfig};

// ============================================================================
// ERRORS
// ============================================================================

#[derive(Debug, Clone, PartialEq, Error)]
pub enum PipelineError {
    #[error(transparent)]
    Input(#[from] InputError),

    #[error(transparent)]
    Encode(#[from] EncodeError),

    #[error(transparent)]
    Model(#[from] ModelError),
}

// ============================================================================
// OPTIONS / RESULT
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct PipelineOptions {
    pub threshold: ThresholdConfig,
    pub encoding: EncodingPolicy,
    pub missing: MissingFieldPolicy,
}

/// Prediction output
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PredictionResult {
    pub probability: f64,
    pub label: Label,
    pub threshold: f64,
    pub inference_time_us: u64,
    pub backend: Backend,
}

/// Intermediate rows of one run, for `--explain` and tests
#[derive(Debug, Clone, PartialEq)]
pub struct PipelineTrace {
    pub feature_row: FeatureRow,
    pub encoded_row: EncodedRow,
    pub scaled_row: ScaledRow,
    pub result: PredictionResult,
}

// ============================================================================
// CONTEXT
// ============================================================================

/// Immutable state shared by every prediction
pub struct PredictionContext {
    raw_schema: ColumnSchema,
    encoded_schema: ColumnSchema,
    scaler: Box<dyn Scaler>,
    model: Box<dyn Classifier>,
    digests: Vec<ArtifactDigest>,
    options: PipelineOptions,
}

impl PredictionContext {
    pub fn new(artifacts: LoadedArtifacts, options: PipelineOptions) -> Self {
        log::info!(
            "Pipeline ready: threshold={}, encoding={}",
            options.threshold.base_threshold,
            options.encoding
        );

        Self {
            raw_schema: artifacts.raw_schema,
            encoded_schema: artifacts.encoded_schema,
            scaler: artifacts.scaler,
            model: artifacts.model,
            digests: artifacts.digests,
            options,
        }
    }

    pub fn raw_schema(&self) -> &ColumnSchema {
        &self.raw_schema
    }

    pub fn encoded_schema(&self) -> &ColumnSchema {
        &self.encoded_schema
    }

    pub fn digests(&self) -> &[ArtifactDigest] {
        &self.digests
    }

    pub fn options(&self) -> &PipelineOptions {
        &self.options
    }

    pub fn model(&self) -> &dyn Classifier {
        self.model.as_ref()
    }

    pub fn scaler(&self) -> &dyn Scaler {
        self.scaler.as_ref()
    }

    /// Run the whole pipeline for one form state
    pub fn predict(&self, form: &FormInput) -> Result<PredictionResult, PipelineError> {
        self.trace(form).map(|trace| trace.result)
    }

    /// Same as [`predict`](Self::predict), keeping every intermediate row
    pub fn trace(&self, form: &FormInput) -> Result<PipelineTrace, PipelineError> {
        form.validate()?;

        let record = form.to_record();
        log::trace!("Input record: {} fields", record.len());
        let feature_row = assemble(&record, &self.raw_schema, self.options.missing);
        let encoded_row = encode(
            &feature_row,
            &self.raw_schema,
            &self.encoded_schema,
            self.options.encoding,
        )?;
        let scaled_row = self.scaler.transform(&encoded_row)?;

        let start_time = Instant::now();
        let probability = self.model.predict(&scaled_row)?;
        let inference_time_us = start_time.elapsed().as_micros() as u64;

        let threshold = self.options.threshold;
        let result = PredictionResult {
            probability,
            label: threshold.label(probability),
            threshold: threshold.base_threshold,
            inference_time_us,
            backend: self.model.metadata().backend,
        };

        log::debug!(
            "Prediction: p={:.4} label={} ({}us, {})",
            result.probability,
            result.label,
            result.inference_time_us,
            result.backend
        );
        log::trace!("Scaled row: {}", scaled_row.to_log_entry(&self.encoded_schema));

        Ok(PipelineTrace {
            feature_row,
            encoded_row,
            scaled_row,
            result,
        })
    }
}

impl std::fmt::Debug for PredictionContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PredictionContext")
            .field("raw_schema", &self.raw_schema.info().to_string())
            .field("encoded_schema", &self.encoded_schema.info().to_string())
            .field("scaler", &self.scaler.kind())
            .field("model", self.model.metadata())
            .field("options", &self.options)
            .finish()
    }
}

// ============================================================================
// TESTS
// ============================================================================
