//! Session domain.
//!
//! - [`entities::Session`] — the reconstructed state of one pipeline run
//! - [`entities::LogEntry`] / [`entities::Anomaly`] — the append-only audit log
//! - [`aggregate`] — how dispatched frames are folded into a session

pub mod aggregate;
pub mod entities;
