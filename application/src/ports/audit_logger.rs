//! Port for structured audit logging.
//!
//! Defines the [`AuditLogger`] trait for recording every frame a session
//! receives, and how each stream ended, to a machine-readable log (JSONL).
//!
//! This is separate from `tracing`-based operation logs: tracing handles
//! human-readable diagnostics, while this port captures the full frame
//! transcript for audit and replay.

use serde_json::{Value, json};
use triage_domain::{Frame, SessionId};

/// A structured audit event.
///
/// Each event has a type string and a JSON payload containing event-specific
/// fields. The logger adds the timestamp when it writes the record.
pub struct AuditEvent {
    /// Event type identifier (e.g., "frame", "stream_end").
    pub event_type: &'static str,
    /// JSON payload with event-specific data.
    pub payload: Value,
}

impl AuditEvent {
    pub fn new(event_type: &'static str, payload: Value) -> Self {
        Self {
            event_type,
            payload,
        }
    }

    /// A frame received (or synthesized) for a session.
    pub fn frame(session_id: &SessionId, frame: &Frame) -> Self {
        Self::new(
            "frame",
            json!({
                "session_id": session_id,
                "event": frame.event_type(),
                "received_at": frame.received_at(),
                "synthetic": frame.is_synthetic(),
                "payload": frame.payload(),
            }),
        )
    }
}

/// Port for logging audit events to a structured log.
///
/// The `log` method is synchronous and non-fallible so that logging never
/// disrupts stream consumption; failures are ignored by implementations.
pub trait AuditLogger: Send + Sync {
    /// Record an audit event.
    fn log(&self, event: AuditEvent);
}

/// No-op implementation for tests and when audit logging is disabled.
pub struct NoAuditLogger;

impl AuditLogger for NoAuditLogger {
    fn log(&self, _event: AuditEvent) {}
}
