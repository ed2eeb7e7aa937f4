//! Decision Threshold
//!
//! Turns P(positive) into the displayed label.
//! Comparison is strict: a probability equal to the threshold is negative.

use serde::{Deserialize, Serialize};

use crate::constants::DEFAULT_THRESHOLD;

/// Threshold Configuration
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ThresholdConfig {
    /// Base threshold (0.0 - 1.0)
    pub base_threshold: f64,
}

impl Default for ThresholdConfig {
    fn default() -> Self {
        Self {
            base_threshold: DEFAULT_THRESHOLD,
        }
    }
}

impl ThresholdConfig {
    pub fn new(base: f64) -> Self {
        Self {
            base_threshold: base,
        }
    }

    pub fn is_positive(&self, probability: f64) -> bool {
        probability > self.base_threshold
    }

    pub fn label(&self, probability: f64) -> Label {
        if self.is_positive(probability) {
            Label::Likely
        } else {
            Label::Unlikely
        }
    }
}

/// Displayed outcome
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Label {
    #[serde(rename = "Likely ADHD")]
    Likely,
    #[serde(rename = "Unlikely ADHD")]
    Unlikely,
}

impl Label {
    pub fn as_str(self) -> &'static str {
        match self {
            Label::Likely => "Likely ADHD",
            Label::Unlikely => "Unlikely ADHD",
        }
    }
}

impl std::fmt::Display for Label {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
