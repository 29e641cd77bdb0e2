//! Event-type vocabulary of the triage event stream.

use serde::{Deserialize, Serialize};
use std::fmt;

/// The declared type of a [`Frame`](super::frame::Frame).
///
/// The recognized vocabulary is closed, but the stream is not: any tag the
/// client does not know lands in [`EventType::Unknown`] so that new
/// producer-side event types degrade gracefully instead of failing decode.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum EventType {
    /// Pipeline progress report carrying an explicit phase label.
    Status,
    /// Risk prediction from the classification stage.
    ClassificationResult,
    /// One specialist's structured assessment.
    SpecialistOpinion,
    /// Relevance scores for departments outside the specialist council.
    OtherSpecialtyScores,
    /// The synthesized final verdict.
    CmoVerdict,
    /// Terminal: the run finished.
    Complete,
    /// Terminal: the run failed.
    Error,
    /// Any tag outside the recognized vocabulary.
    Unknown(String),
}

impl EventType {
    /// Every recognized (non-`Unknown`) event type, in pipeline order.
    pub const RECOGNIZED: [EventType; 7] = [
        EventType::Status,
        EventType::ClassificationResult,
        EventType::SpecialistOpinion,
        EventType::OtherSpecialtyScores,
        EventType::CmoVerdict,
        EventType::Complete,
        EventType::Error,
    ];

    /// Resolve a wire tag. Never fails; unrecognized tags become `Unknown`.
    pub fn from_wire(tag: &str) -> Self {
        match tag {
            "status" => EventType::Status,
            "classification_result" => EventType::ClassificationResult,
            "specialist_opinion" => EventType::SpecialistOpinion,
            "other_specialty_scores" => EventType::OtherSpecialtyScores,
            "cmo_verdict" => EventType::CmoVerdict,
            "complete" => EventType::Complete,
            "error" => EventType::Error,
            other => EventType::Unknown(other.to_string()),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            EventType::Status => "status",
            EventType::ClassificationResult => "classification_result",
            EventType::SpecialistOpinion => "specialist_opinion",
            EventType::OtherSpecialtyScores => "other_specialty_scores",
            EventType::CmoVerdict => "cmo_verdict",
            EventType::Complete => "complete",
            EventType::Error => "error",
            EventType::Unknown(tag) => tag,
        }
    }

    /// Returns true for `complete` and `error`.
    pub fn is_terminal(&self) -> bool {
        matches!(self, EventType::Complete | EventType::Error)
    }

    pub fn is_recognized(&self) -> bool {
        !matches!(self, EventType::Unknown(_))
    }
}

impl fmt::Display for EventType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<String> for EventType {
    fn from(tag: String) -> Self {
        match EventType::from_wire(&tag) {
            EventType::Unknown(_) => EventType::Unknown(tag),
            known => known,
        }
    }
}

impl From<EventType> for String {
    fn from(event_type: EventType) -> Self {
        match event_type {
            EventType::Unknown(tag) => tag,
            known => known.as_str().to_string(),
        }
    }
}
