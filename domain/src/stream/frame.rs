//! Decoded frames.

use super::event_type::EventType;
use super::payload::Payload;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Message carried by the synthetic `error` frame emitted when the
/// connection ends before a terminal frame was seen.
pub const TRANSPORT_FAILURE_MESSAGE: &str =
    "connection to the triage pipeline was lost before the run finished";

/// One decoded unit of the event stream.
///
/// Frames are immutable once built. `received_at` is stamped locally at
/// decode time; nothing on the wire is trusted for it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Frame {
    event_type: EventType,
    payload: Payload,
    received_at: DateTime<Utc>,
    /// True for frames produced by the client itself (transport failure,
    /// idle timeout) rather than read off the wire.
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    synthetic: bool,
}

impl Frame {
    /// Create a frame received now.
    pub fn new(event_type: EventType, payload: Payload) -> Self {
        Self {
            event_type,
            payload,
            received_at: Utc::now(),
            synthetic: false,
        }
    }

    /// Create a client-side `error` frame with the given message.
    pub fn synthetic_error(message: impl Into<String>) -> Self {
        let payload = Payload::Json(serde_json::json!({ "message": message.into() }));
        Self {
            synthetic: true,
            ..Self::new(EventType::Error, payload)
        }
    }

    /// The synthetic `error` frame for a dropped connection.
    pub fn transport_failure() -> Self {
        Self::synthetic_error(TRANSPORT_FAILURE_MESSAGE)
    }

    pub fn event_type(&self) -> &EventType {
        &self.event_type
    }

    pub fn payload(&self) -> &Payload {
        &self.payload
    }

    pub fn received_at(&self) -> DateTime<Utc> {
        self.received_at
    }

    pub fn is_synthetic(&self) -> bool {
        self.synthetic
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn transport_failure_is_synthetic_error() {
        let frame = Frame::transport_failure();
        assert_eq!(frame.event_type(), &EventType::Error);
        assert!(frame.is_synthetic());
        assert_eq!(
            frame.payload().str_field("message"),
            Some(TRANSPORT_FAILURE_MESSAGE)
        );
    }

    #[test]
    fn wire_frames_are_not_synthetic() {
        let frame = Frame::new(EventType::Complete, Payload::Empty);
        assert!(!frame.is_synthetic());
        let json = serde_json::to_value(&frame).unwrap();
        assert!(json.get("synthetic").is_none());
        assert_eq!(json["event_type"], "complete");
    }
}
