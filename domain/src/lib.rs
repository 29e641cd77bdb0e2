//! Domain layer for triage-stream
//!
//! This crate contains the core types of the streaming client: decoded
//! frames, the pipeline phase order, and the session aggregate that frames
//! are folded into. It has no I/O and no dependency on the transport.
//!
//! # Core Concepts
//!
//! ## Frame
//!
//! One typed unit of the server-pushed event stream. The event-type
//! vocabulary is closed but tolerant: unknown tags decode to
//! [`EventType::Unknown`] instead of failing.
//!
//! ## Phase
//!
//! `idle → init → classification → specialist_council → cmo_synthesis → complete`,
//! plus the absorbing `error`. The [`PhaseMachine`] never regresses.
//!
//! ## Session
//!
//! Classification, specialist opinions and the CMO verdict accumulated for
//! one run, with an append-only log of every frame applied.

pub mod config;
pub mod core;
pub mod pipeline;
pub mod session;
pub mod stream;
pub mod triage;

// Re-export commonly used types
pub use config::OutputFormat;
pub use core::error::DomainError;
pub use pipeline::{
    machine::{PhaseMachine, PhaseTransition},
    phase::Phase,
};
pub use session::{
    aggregate::{Applied, UNKNOWN_ERROR_DETAIL},
    entities::{Anomaly, LogEntry, Session, SessionId},
};
pub use stream::{
    event_type::EventType,
    frame::{Frame, TRANSPORT_FAILURE_MESSAGE},
    payload::Payload,
};
pub use triage::{
    case_input::CaseInput,
    classification::{Confidence, RiskPrediction},
    opinion::{FlagSeverity, OtherSpecialtyScore, SpecialistFlag, SpecialistOpinion},
    verdict::{CmoVerdict, WorkupItem},
};
