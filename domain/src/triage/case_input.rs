//! The case submitted to start a run.

use crate::core::error::DomainError;
use serde::{Deserialize, Serialize};

/// Patient case data sent with the run-initiation request.
///
/// This is the session's input snapshot; the session owns it exclusively.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CaseInput {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub patient_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    pub age: u32,
    pub gender: String,
    #[serde(default)]
    pub symptoms: Vec<String>,
    pub bp_systolic: u32,
    pub bp_diastolic: u32,
    pub heart_rate: u32,
    pub temperature: f64,
    pub spo2: u32,
    #[serde(default)]
    pub conditions: Vec<String>,
}

impl CaseInput {
    /// Reject cases the pipeline cannot classify.
    pub fn validate(&self) -> Result<(), DomainError> {
        if self.gender.trim().is_empty() {
            return Err(DomainError::InvalidCaseInput("gender is empty".into()));
        }
        if self.age > 130 {
            return Err(DomainError::InvalidCaseInput(format!(
                "age {} is out of range",
                self.age
            )));
        }
        if self.spo2 > 100 {
            return Err(DomainError::InvalidCaseInput(format!(
                "spo2 {} is above 100",
                self.spo2
            )));
        }
        if self.bp_diastolic > self.bp_systolic {
            return Err(DomainError::InvalidCaseInput(format!(
                "diastolic pressure {} exceeds systolic {}",
                self.bp_diastolic, self.bp_systolic
            )));
        }
        if !self.temperature.is_finite() {
            return Err(DomainError::InvalidCaseInput(
                "temperature is not a number".into(),
            ));
        }
        Ok(())
    }

    /// Display label: name, then patient id, then a placeholder.
    pub fn label(&self) -> &str {
        self.name
            .as_deref()
            .or(self.patient_id.as_deref())
            .unwrap_or("unnamed patient")
    }
}

#[cfg(test)]
pub(crate) fn sample_case() -> CaseInput {
    CaseInput {
        patient_id: Some("PT-TEST-002".to_string()),
        name: Some("Ravi Kumar".to_string()),
        age: 55,
        gender: "Male".to_string(),
        symptoms: vec!["chest_pain".to_string(), "sweating".to_string()],
        bp_systolic: 160,
        bp_diastolic: 100,
        heart_rate: 105,
        temperature: 98.6,
        spo2: 96,
        conditions: vec!["hypertension".to_string()],
    }
}
