//! Logic Module - Artifacts, Features, Model, Pipeline
//!
//! - `artifacts/` - Startup loading and fingerprints of the training outputs
//! - `features/` - Form input, raw assembly, categorical encoding
//! - `model/` - Scaler replay, classifier backends, threshold
//! - `pipeline` - The per-interaction prediction run

pub mod artifacts;
pub mod features;
pub mod model;
pub mod pipeline;

#[cfg(test)]
pub(crate) mod testing;
