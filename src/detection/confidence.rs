use serde::{Deserialize, Serialize};

/// Coarse confidence band used to colour a box and its label.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum ConfidenceTier {
    High,
    Medium,
    Low,
}

impl ConfidenceTier {
    pub const HIGH_THRESHOLD: f32 = 0.8;
    pub const MEDIUM_THRESHOLD: f32 = 0.5;

    /// Both thresholds are inclusive lower bounds.
    pub fn from_confidence(confidence: f32) -> Self {
        if confidence >= Self::HIGH_THRESHOLD {
            ConfidenceTier::High
        } else if confidence >= Self::MEDIUM_THRESHOLD {
            ConfidenceTier::Medium
        } else {
            ConfidenceTier::Low
        }
    }

    /// Display colour as `#RRGGBB`.
    pub fn color(&self) -> &'static str {
        match self {
            ConfidenceTier::High => "#27AE60",
            ConfidenceTier::Medium => "#F39C12",
            ConfidenceTier::Low => "#E74C3C",
        }
    }
}
