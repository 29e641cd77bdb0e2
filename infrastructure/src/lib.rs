//! Infrastructure layer for triage-stream
//!
//! This crate contains adapters that implement the ports defined in the
//! application layer: the SSE decoder and frame source, the HTTP and replay
//! gateways, the JSONL audit logger, and configuration file loading.

pub mod config;
pub mod http;
pub mod logging;
pub mod replay;
pub mod sse;

// Re-export commonly used types
pub use config::{
    ConfigLoader, ConfigValidationError, FileConfig, FileLoggingConfig, FileOutputConfig,
    FileServerConfig, FileStreamConfig,
};
pub use http::HttpTriageGateway;
pub use logging::JsonlAuditLogger;
pub use replay::FileReplayGateway;
pub use sse::{FrameDecoder, SseFrameSource};
