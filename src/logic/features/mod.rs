//! Features Module - Form input to model-ready rows
//!
//! Input collection, raw-order assembly and categorical encoding live here,
//! separate from scaling and inference.

pub mod assembler;
pub mod encoder;
pub mod input;
pub mod layout;
pub mod vector;


// Re-export common types
pub use assembler::{assemble, MissingFieldPolicy};
pub use encoder::{encode, EncodeError, EncodingPolicy, CATEGORICAL_COLUMNS};
pub use input::{FormField, FormInput, InputError};
pub use layout::{ColumnSchema, LayoutInfo, SchemaKind};
pub use vector::{EncodedRow, FeatureRow, FeatureValue, InputRecord, ScaledRow};
