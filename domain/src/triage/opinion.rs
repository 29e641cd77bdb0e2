//! Specialist council payloads.

use crate::stream::payload::Payload;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum FlagSeverity {
    RedFlag,
    YellowFlag,
    Info,
    #[serde(other)]
    Other,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SpecialistFlag {
    pub severity: FlagSeverity,
    pub label: String,
}

/// Typed view of a `specialist_opinion` payload.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SpecialistOpinion {
    pub specialty: String,
    #[serde(default)]
    pub relevance_score: f64,
    #[serde(default)]
    pub urgency_score: f64,
    #[serde(default)]
    pub one_liner: String,
    #[serde(default)]
    pub flags: Vec<SpecialistFlag>,
    #[serde(default)]
    pub claims_primary: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub recommended_department: Option<String>,
}

impl SpecialistOpinion {
    pub fn red_flags(&self) -> impl Iterator<Item = &SpecialistFlag> {
        self.flags
            .iter()
            .filter(|flag| flag.severity == FlagSeverity::RedFlag)
    }
}

/// One department scored by the out-of-council specialty pass.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OtherSpecialtyScore {
    pub department: String,
    pub relevance: f64,
    #[serde(default)]
    pub reason: Option<String>,
}

impl OtherSpecialtyScore {
    /// Decode an `other_specialty_scores` payload.
    ///
    /// Accepts a bare array or an object wrapping it under `departments`.
    pub fn list_from(payload: &Payload) -> Vec<OtherSpecialtyScore> {
        #[derive(Deserialize)]
        struct Wrapped {
            departments: Vec<OtherSpecialtyScore>,
        }

        payload
            .decode::<Vec<OtherSpecialtyScore>>()
            .or_else(|| payload.decode::<Wrapped>().map(|w| w.departments))
            .unwrap_or_default()
    }
}
