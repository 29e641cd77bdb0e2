//! Final verdict carried by `cmo_verdict` frames.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// A test in the consolidated workup, with the specialists that asked for it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorkupItem {
    pub test: String,
    #[serde(default)]
    pub priority: Option<String>,
    #[serde(default)]
    pub ordered_by: Vec<String>,
}

/// Typed view of a `cmo_verdict` payload.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CmoVerdict {
    pub final_risk_level: String,
    #[serde(default)]
    pub priority_score: Option<f64>,
    #[serde(default)]
    pub primary_department: Option<String>,
    #[serde(default)]
    pub secondary_department: Option<String>,
    /// Alert shapes vary by producer version, so they stay untyped.
    #[serde(default)]
    pub safety_alerts: Vec<Value>,
    #[serde(default)]
    pub consolidated_workup: Vec<WorkupItem>,
    #[serde(default)]
    pub explanation: String,
    #[serde(default)]
    pub key_factors: Vec<String>,
}

impl CmoVerdict {
    /// Priority clamped to 0–100.
    pub fn priority(&self) -> Option<f64> {
        self.priority_score.map(|score| score.clamp(0.0, 100.0))
    }
}
