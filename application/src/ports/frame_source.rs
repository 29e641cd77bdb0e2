//! Frame source port
//!
//! A [`FrameSource`] is a lazy, ordered sequence of decoded frames read from
//! one long-lived connection. It is finite when the connection closes and is
//! not restartable: a new connection means a new source.

use async_trait::async_trait;
use thiserror::Error;
use triage_domain::Frame;

/// Errors surfaced by a frame source.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SourceError {
    #[error("Transport error: {0}")]
    Transport(String),

    #[error("I/O error: {0}")]
    Io(String),
}

/// Ordered stream of frames from one connection.
///
/// Implementations live in the infrastructure layer (SSE over HTTP, captured
/// stream files). Frame corruption is not an error here: undecodable payloads
/// come through as raw-text frames.
#[async_trait]
pub trait FrameSource: Send {
    /// The next frame, an error if the connection broke, or `None` once the
    /// connection has closed cleanly.
    async fn next_frame(&mut self) -> Option<Result<Frame, SourceError>>;
}
