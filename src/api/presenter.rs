//! Presenter - text/JSON rendering of results and reports

use std::fmt::Write as _;

use serde::Serialize;

use crate::logic::artifacts::ArtifactDigest;
use crate::logic::features::{FormField, FormInput, LayoutInfo};
use crate::logic::pipeline::{PipelineTrace, PredictionContext, PredictionResult};

/// Probability with 3 decimals, then the label
pub fn render_result(result: &PredictionResult) -> String {
    format!(
        "Prediction probability: {:.3}\n{}",
        result.probability, result.label
    )
}

pub fn render_json<T: Serialize>(value: &T) -> Result<String, serde_json::Error> {
    serde_json::to_string_pretty(value)
}

/// Current field values, one per line
pub fn render_form(form: &FormInput) -> String {
    let width = FormField::ALL
        .iter()
        .map(|f| f.column().len())
        .max()
        .unwrap_or(0);

    let mut out = String::new();
    for field in FormField::ALL {
        let _ = writeln!(
            out,
            "  {:<width$}  {}",
            field.column(),
            form.display_value(*field),
            width = width
        );
    }
    out
}

/// Encoded and scaled value of every model input column
pub fn render_trace(ctx: &PredictionContext, trace: &PipelineTrace) -> String {
    let schema = ctx.encoded_schema();
    let width = schema.iter().map(str::len).max().unwrap_or(0);

    let mut out = String::new();
    let _ = writeln!(out, "{:<width$}  {:>10}  {:>10}", "column", "encoded", "scaled", width = width);
    for (i, column) in schema.iter().enumerate() {
        let _ = writeln!(
            out,
            "{:<width$}  {:>10.4}  {:>10.4}",
            column,
            trace.encoded_row.values[i],
            trace.scaled_row.values[i],
            width = width
        );
    }
    out
}

/// `check` output
#[derive(Debug, Clone, Serialize)]
pub struct CheckReport {
    pub digests: Vec<ArtifactDigest>,
    pub raw_layout: LayoutInfo,
    pub encoded_layout: LayoutInfo,
    pub scaler: &'static str,
    pub backend: String,
    pub threshold: f64,
    pub encoding: String,
}

impl CheckReport {
    pub fn from_context(ctx: &PredictionContext) -> Self {
        Self {
            digests: ctx.digests().to_vec(),
            raw_layout: ctx.raw_schema().info(),
            encoded_layout: ctx.encoded_schema().info(),
            scaler: ctx.scaler().kind(),
            backend: ctx.model().metadata().backend.to_string(),
            threshold: ctx.options().threshold.base_threshold,
            encoding: ctx.options().encoding.to_string(),
        }
    }

    pub fn render(&self) -> String {
        let mut out = String::new();
        for d in &self.digests {
            let _ = writeln!(
                out,
                "{:<16} {}  sha256:{}  ({} bytes)",
                d.role,
                d.path.display(),
                d.sha256,
                d.bytes
            );
        }
        let _ = writeln!(out, "{}", self.raw_layout);
        let _ = writeln!(out, "{}", self.encoded_layout);
        let _ = writeln!(out, "scaler: {}, backend: {}", self.scaler, self.backend);
        let _ = write!(out, "threshold: {}, encoding: {}", self.threshold, self.encoding);
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::logic::model::{Backend, Label};

    fn result(probability: f64, label: Label) -> PredictionResult {
        PredictionResult {
            probability,
            label,
            threshold: 0.5,
            inference_time_us: 12,
            backend: Backend::Onnx,
        }
    }

    #[test]
    fn test_render_three_decimals() {
        let text = render_result(&result(0.73456, Label::Likely));
        assert_eq!(text, "Prediction probability: 0.735\nLikely ADHD");
    }

    #[test]
    fn test_render_json() {
        let json = render_json(&result(0.25, Label::Unlikely)).unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(value["label"], "Unlikely ADHD");
        assert_eq!(value["backend"], "onnx");
    }

    #[test]
    fn test_render_form_lists_every_field() {
        let text = render_form(&FormInput::default());
        assert_eq!(text.lines().count(), FormField::ALL.len());
        assert!(text.contains("SchoolSupport"));
        assert!(text.contains("7.0"));
    }
}
