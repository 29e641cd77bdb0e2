//! Application layer for triage-stream
//!
//! This crate contains the event dispatcher, the session store, the stream
//! consumer loop and the run lifecycle, plus the ports infrastructure and
//! presentation plug into. It depends only on the domain layer.

pub mod aggregate;
pub mod config;
pub mod dispatch;
pub mod ports;
pub mod session_store;
pub mod use_cases;

// Re-export commonly used types
pub use aggregate::AggregateBuilder;
pub use config::StreamConfig;
pub use dispatch::{
    dispatcher::{Dispatch, DispatchStats, EventDispatcher, FrameSink},
    handlers::{FrameHandler, HandlerError, Handlers},
};
pub use ports::{
    audit_logger::{AuditEvent, AuditLogger, NoAuditLogger},
    frame_source::{FrameSource, SourceError},
    session_observer::{NoObserver, SessionObserver},
    triage_gateway::{GatewayError, RunRequest, TriageGateway},
};
pub use session_store::{SessionStore, SessionTicket, StoreError};
pub use use_cases::run_triage::{RunTriageError, RunTriageUseCase, Subscription};
pub use use_cases::stream_session::{StreamEnd, StreamOutcome, StreamSessionUseCase};
