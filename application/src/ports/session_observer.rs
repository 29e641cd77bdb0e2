//! Session observer port
//!
//! Defines the callbacks an external renderer can register to follow a
//! session while its stream is consumed. The session snapshot itself stays
//! readable at any time through the session store; observers only get told
//! that something changed.

use triage_domain::{Anomaly, Frame, Phase, SessionId};

/// Callback for session updates during stream consumption
///
/// Implementations live in the presentation layer. Callbacks run inline on
/// the consuming task, so they must not block.
pub trait SessionObserver: Send + Sync {
    /// Called for every frame applied to the session
    fn on_frame(&self, _session_id: &SessionId, _frame: &Frame) {}

    /// Called when the session's phase changes
    fn on_phase_change(&self, session_id: &SessionId, from: Phase, to: Phase);

    /// Called after a specialist opinion was appended
    fn on_opinion(&self, _session_id: &SessionId, _count: usize) {}

    /// Called when a frame was recorded with an anomaly
    fn on_anomaly(&self, _session_id: &SessionId, _anomaly: &Anomaly) {}

    /// Called once, when a terminal frame ends the session
    fn on_terminated(&self, session_id: &SessionId, phase: Phase, error: Option<&str>);
}

/// No-op observer for when nobody is watching
pub struct NoObserver;

impl SessionObserver for NoObserver {
    fn on_phase_change(&self, _session_id: &SessionId, _from: Phase, _to: Phase) {}
    fn on_terminated(&self, _session_id: &SessionId, _phase: Phase, _error: Option<&str>) {}
}
