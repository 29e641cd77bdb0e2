//! Stream Session use case
//!
//! The cooperative consumer loop for one session: pull the next frame from
//! the source, audit it, dispatch it, repeat. The only suspend point is the
//! wait for the next frame; everything between two waits runs to completion.

use crate::config::StreamConfig;
use crate::dispatch::dispatcher::{DispatchStats, EventDispatcher};
use crate::ports::audit_logger::{AuditEvent, AuditLogger, NoAuditLogger};
use crate::ports::frame_source::{FrameSource, SourceError};
use serde_json::json;
use std::fmt;
use std::sync::Arc;
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};
use triage_domain::{Frame, SessionId};

/// Why a stream stopped being consumed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StreamEnd {
    /// The source ended after a terminal frame.
    Finished,
    /// The connection broke (or closed) before a terminal frame.
    TransportFailure(String),
    /// The consumer closed the subscription.
    Closed,
    /// No frame arrived within the configured idle timeout.
    IdleTimeout,
    /// The consumer task itself died.
    Aborted(String),
}

impl StreamEnd {
    pub fn as_str(&self) -> &'static str {
        match self {
            StreamEnd::Finished => "finished",
            StreamEnd::TransportFailure(_) => "transport_failure",
            StreamEnd::Closed => "closed",
            StreamEnd::IdleTimeout => "idle_timeout",
            StreamEnd::Aborted(_) => "aborted",
        }
    }

    /// True when the run did not reach a terminal frame on its own.
    pub fn is_failure(&self) -> bool {
        matches!(
            self,
            StreamEnd::TransportFailure(_) | StreamEnd::IdleTimeout | StreamEnd::Aborted(_)
        )
    }
}

impl fmt::Display for StreamEnd {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StreamEnd::TransportFailure(reason) | StreamEnd::Aborted(reason) => {
                write!(f, "{} ({})", self.as_str(), reason)
            }
            _ => f.write_str(self.as_str()),
        }
    }
}

/// Summary of one consumed stream.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StreamOutcome {
    pub session_id: SessionId,
    pub end: StreamEnd,
    /// Frames dispatched, synthetic ones included.
    pub frames: usize,
    pub stats: DispatchStats,
}

/// What the wait for the next frame produced.
enum Next {
    Frame(Frame),
    Ended,
    Failed(SourceError),
    Idle,
}

/// Use case for consuming one session's frame stream
#[derive(Clone)]
pub struct StreamSessionUseCase {
    config: StreamConfig,
    audit: Arc<dyn AuditLogger>,
}

impl Default for StreamSessionUseCase {
    fn default() -> Self {
        Self::new(StreamConfig::default())
    }
}

impl StreamSessionUseCase {
    pub fn new(config: StreamConfig) -> Self {
        Self {
            config,
            audit: Arc::new(NoAuditLogger),
        }
    }

    pub fn with_audit_logger(mut self, audit: Arc<dyn AuditLogger>) -> Self {
        self.audit = audit;
        self
    }

    pub fn config(&self) -> &StreamConfig {
        &self.config
    }

    /// Consume `source` until it ends, fails, idles out or `cancel` fires.
    ///
    /// A stream that stops without a terminal frame gets one synthetic
    /// `error` frame so the session terminates. Cancellation never does:
    /// after `cancel` fires no handler runs again.
    pub async fn consume(
        &self,
        mut source: Box<dyn FrameSource>,
        dispatcher: &mut EventDispatcher,
        session_id: &SessionId,
        cancel: &CancellationToken,
    ) -> StreamOutcome {
        info!("Consuming stream for session {}", session_id);
        let mut frames = 0usize;
        let mut terminal_seen = false;

        let end = loop {
            let next = tokio::select! {
                biased;
                _ = cancel.cancelled() => break StreamEnd::Closed,
                next = next_frame(source.as_mut(), self.config.idle_timeout) => next,
            };
            if cancel.is_cancelled() {
                break StreamEnd::Closed;
            }

            match next {
                Next::Frame(frame) => {
                    debug!(
                        "Session {}: frame #{} '{}'",
                        session_id,
                        frames + 1,
                        frame.event_type()
                    );
                    terminal_seen |= frame.event_type().is_terminal();
                    self.deliver(frame, dispatcher, session_id);
                    frames += 1;
                }
                Next::Ended if terminal_seen => break StreamEnd::Finished,
                Next::Ended => {
                    warn!(
                        "Session {}: stream closed before a terminal frame",
                        session_id
                    );
                    self.deliver(Frame::transport_failure(), dispatcher, session_id);
                    frames += 1;
                    break StreamEnd::TransportFailure("stream closed".to_string());
                }
                Next::Failed(e) if terminal_seen => {
                    debug!("Session {}: source error after terminal frame: {}", session_id, e);
                    break StreamEnd::Finished;
                }
                Next::Failed(e) => {
                    warn!("Session {}: {}", session_id, e);
                    self.deliver(Frame::transport_failure(), dispatcher, session_id);
                    frames += 1;
                    break StreamEnd::TransportFailure(e.to_string());
                }
                Next::Idle => {
                    let secs = self.config.idle_timeout.map_or(0, |d| d.as_secs());
                    warn!("Session {}: no frame for {}s, closing", session_id, secs);
                    if !terminal_seen {
                        let message = format!("stream idle timeout after {}s", secs);
                        self.deliver(Frame::synthetic_error(message), dispatcher, session_id);
                        frames += 1;
                    }
                    break StreamEnd::IdleTimeout;
                }
            }
        };

        let stats = dispatcher.stats();
        info!(
            "Session {} stream ended: {} ({} frames, {} handler failures)",
            session_id, end, frames, stats.failed
        );
        self.audit.log(AuditEvent::new(
            "stream_end",
            json!({
                "session_id": session_id,
                "end": end.as_str(),
                "detail": end.to_string(),
                "frames": frames,
                "handled": stats.handled,
                "ignored": stats.ignored,
                "failed": stats.failed,
            }),
        ));

        StreamOutcome {
            session_id: session_id.clone(),
            end,
            frames,
            stats,
        }
    }

    fn deliver(&self, frame: Frame, dispatcher: &mut EventDispatcher, session_id: &SessionId) {
        self.audit.log(AuditEvent::frame(session_id, &frame));
        dispatcher.dispatch(&frame);
    }
}

async fn next_frame(source: &mut dyn FrameSource, idle_timeout: Option<Duration>) -> Next {
    let next = match idle_timeout {
        Some(limit) => match tokio::time::timeout(limit, source.next_frame()).await {
            Ok(next) => next,
            Err(_) => return Next::Idle,
        },
        None => source.next_frame().await,
    };
    match next {
        Some(Ok(frame)) => Next::Frame(frame),
        Some(Err(e)) => Next::Failed(e),
        None => Next::Ended,
    }
}
