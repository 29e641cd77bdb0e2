//! Risk prediction carried by `classification_result` frames.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Confidence as reported by the classifier.
///
/// Producers send either one number (on a 0–1 or 0–100 scale) or a
/// per-class map of percentages.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Confidence {
    Scalar(f64),
    PerClass(BTreeMap<String, f64>),
}

/// Typed view of a `classification_result` payload.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RiskPrediction {
    pub risk_level: String,
    #[serde(default)]
    pub confidence: Option<Confidence>,
    #[serde(default)]
    pub max_confidence: Option<f64>,
}

impl RiskPrediction {
    /// Confidence in the predicted level on a 0–100 scale.
    ///
    /// Scalars at or below 1.0 are taken as fractions. For a per-class map the
    /// entry for `risk_level` is used, falling back to `max_confidence`.
    pub fn confidence_percent(&self) -> Option<f64> {
        match &self.confidence {
            Some(Confidence::Scalar(value)) => Some(normalize_percent(*value)),
            Some(Confidence::PerClass(classes)) => classes
                .get(&self.risk_level)
                .copied()
                .or(self.max_confidence)
                .map(normalize_percent),
            None => self.max_confidence.map(normalize_percent),
        }
    }
}

fn normalize_percent(value: f64) -> f64 {
    if (0.0..=1.0).contains(&value) {
        value * 100.0
    } else {
        value
    }
}
