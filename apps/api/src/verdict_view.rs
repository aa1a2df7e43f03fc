use serde::Serialize;

use crate::schema::PredictionVerdict;

pub const FAKE_LABEL: &str = "Fake";
pub const REAL_LABEL: &str = "Real";
pub const UNKNOWN_CONFIDENCE: &str = "Unknown";

/// What the result panel shows for a verdict.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct VerdictView {
    pub label: &'static str,
    /// Rounded, 0 – 100.
    pub probability_percent: u8,
    pub confidence: String,
    pub explanation: Option<String>,
}

impl From<&PredictionVerdict> for VerdictView {
    fn from(verdict: &PredictionVerdict) -> Self {
        Self {
            label: if verdict.is_fake { FAKE_LABEL } else { REAL_LABEL },
            probability_percent: (verdict.probability.clamp(0.0, 1.0) * 100.0).round() as u8,
            confidence: verdict
                .confidence
                .clone()
                .unwrap_or_else(|| UNKNOWN_CONFIDENCE.to_string()),
            explanation: verdict.explanation.clone(),
        }
    }
}
