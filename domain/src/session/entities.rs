//! Session domain entities

use crate::core::error::DomainError;
use crate::pipeline::machine::PhaseMachine;
use crate::pipeline::phase::Phase;
use crate::stream::frame::Frame;
use crate::stream::payload::Payload;
use crate::triage::case_input::CaseInput;
use crate::triage::classification::RiskPrediction;
use crate::triage::opinion::{OtherSpecialtyScore, SpecialistOpinion};
use crate::triage::verdict::CmoVerdict;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Opaque identifier of a session (Value Object)
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SessionId(String);

impl SessionId {
    pub fn new(id: impl Into<String>) -> Result<Self, DomainError> {
        let id = id.into();
        if id.trim().is_empty() {
            return Err(DomainError::InvalidSessionId(
                "session id must not be empty".into(),
            ));
        }
        Ok(Self(id))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Something unexpected about a frame, recorded on its log entry.
///
/// Anomalies never abort the stream; they exist for audit and for a human
/// reading the log.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Anomaly {
    /// A status label earlier than the current phase.
    PhaseRegression { current: Phase, requested: Phase },
    /// A phase change requested after a terminal phase was reached.
    PhaseLocked { current: Phase, requested: Phase },
    /// A status frame without a usable phase label.
    InvalidStatus { detail: String },
    /// A frame arriving after the session terminated.
    LateFrame,
    /// A single-valued field was overwritten by a later frame.
    Replaced { field: String },
}

impl fmt::Display for Anomaly {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Anomaly::PhaseRegression { current, requested } => write!(
                f,
                "phase regression ignored: {} -> {}",
                current.as_str(),
                requested.as_str()
            ),
            Anomaly::PhaseLocked { current, requested } => write!(
                f,
                "phase is terminal ({}), ignored {}",
                current.as_str(),
                requested.as_str()
            ),
            Anomaly::InvalidStatus { detail } => write!(f, "invalid status frame: {}", detail),
            Anomaly::LateFrame => write!(f, "frame received after termination"),
            Anomaly::Replaced { field } => write!(f, "{} replaced by a later frame", field),
        }
    }
}

/// One entry of the session's append-only audit log.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LogEntry {
    pub frame: Frame,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub anomaly: Option<Anomaly>,
}

/// The reconstructed state of one pipeline run (Entity)
///
/// Mutated only through [`Session::apply`](super::aggregate); once
/// `terminated` is set, business fields are frozen and later frames are
/// only appended to the log.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Session {
    pub(super) id: SessionId,
    pub(super) input: CaseInput,
    pub(super) created_at: DateTime<Utc>,
    pub(super) phase: PhaseMachine,
    pub(super) classification: Option<Payload>,
    pub(super) opinions: Vec<Payload>,
    pub(super) other_specialty_scores: Option<Payload>,
    pub(super) verdict: Option<Payload>,
    pub(super) error: Option<String>,
    pub(super) log: Vec<LogEntry>,
    pub(super) terminated: bool,
}

impl Session {
    pub fn new(id: SessionId, input: CaseInput) -> Self {
        Self {
            id,
            input,
            created_at: Utc::now(),
            phase: PhaseMachine::new(),
            classification: None,
            opinions: Vec::new(),
            other_specialty_scores: None,
            verdict: None,
            error: None,
            log: Vec::new(),
            terminated: false,
        }
    }

    pub fn id(&self) -> &SessionId {
        &self.id
    }

    pub fn input(&self) -> &CaseInput {
        &self.input
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn phase(&self) -> Phase {
        self.phase.current()
    }

    pub fn classification(&self) -> Option<&Payload> {
        self.classification.as_ref()
    }

    pub fn opinions(&self) -> &[Payload] {
        &self.opinions
    }

    pub fn other_specialty_scores(&self) -> Option<&Payload> {
        self.other_specialty_scores.as_ref()
    }

    pub fn verdict(&self) -> Option<&Payload> {
        self.verdict.as_ref()
    }

    /// Error detail recorded from an `error` frame.
    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn log(&self) -> &[LogEntry] {
        &self.log
    }

    pub fn is_terminated(&self) -> bool {
        self.terminated
    }

    // ==================== Typed Views ====================

    pub fn risk_prediction(&self) -> Option<RiskPrediction> {
        self.classification.as_ref()?.decode()
    }

    /// Opinions that decode as [`SpecialistOpinion`], in arrival order.
    pub fn specialist_opinions(&self) -> Vec<SpecialistOpinion> {
        self.opinions.iter().filter_map(Payload::decode).collect()
    }

    pub fn other_specialties(&self) -> Vec<OtherSpecialtyScore> {
        self.other_specialty_scores
            .as_ref()
            .map(OtherSpecialtyScore::list_from)
            .unwrap_or_default()
    }

    pub fn cmo_verdict(&self) -> Option<CmoVerdict> {
        self.verdict.as_ref()?.decode()
    }

    /// Log entries that carry an anomaly.
    pub fn anomalies(&self) -> impl Iterator<Item = &LogEntry> {
        self.log.iter().filter(|entry| entry.anomaly.is_some())
    }
}
