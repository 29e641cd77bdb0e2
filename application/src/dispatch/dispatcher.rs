//! Event dispatcher — routes frames to handlers by event type.
//!
//! Frames are dispatched strictly in the order they are given, one at a
//! time, and each frame reaches at most one handler exactly once. The
//! dispatcher adds no concurrency, batching or reordering.

use super::handlers::{HandlerError, Handlers};
use std::any::Any;
use std::panic::{self, AssertUnwindSafe};
use tracing::{trace, warn};
use triage_domain::Frame;

/// What happened to one frame.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Dispatch {
    /// The registered handler ran and returned `Ok`.
    Handled,
    /// The event type is not recognized; forward compatibility.
    Ignored,
    /// The event type is recognized but its slot is empty.
    NoHandler,
    /// The handler returned an error or panicked.
    Failed(HandlerError),
}

/// Running totals of dispatch outcomes.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DispatchStats {
    pub handled: usize,
    pub ignored: usize,
    pub unhandled: usize,
    pub failed: usize,
}

impl DispatchStats {
    pub fn total(&self) -> usize {
        self.handled + self.ignored + self.unhandled + self.failed
    }
}

/// Receives frames of unrecognized event types. Not a handler: it cannot
/// fail the frame, and the frame still counts as ignored.
pub type FrameSink = Box<dyn FnMut(&Frame) + Send>;

pub struct EventDispatcher {
    handlers: Handlers,
    unrecognized: Option<FrameSink>,
    stats: DispatchStats,
}

impl EventDispatcher {
    pub fn new(handlers: Handlers) -> Self {
        Self {
            handlers,
            unrecognized: None,
            stats: DispatchStats::default(),
        }
    }

    /// Pass unrecognized frames to `sink` (for the session log) instead of
    /// dropping them silently.
    pub fn with_unrecognized<F>(mut self, sink: F) -> Self
    where
        F: FnMut(&Frame) + Send + 'static,
    {
        self.unrecognized = Some(Box::new(sink));
        self
    }

    /// Route one frame to its handler.
    ///
    /// Handler faults are contained here: an `Err` or a panic is reported
    /// as [`Dispatch::Failed`] and the dispatcher stays usable.
    pub fn dispatch(&mut self, frame: &Frame) -> Dispatch {
        let Some(slot) = self.handlers.slot_mut(frame.event_type()) else {
            trace!("Dispatch: ignoring unknown event '{}'", frame.event_type());
            self.stats.ignored += 1;
            if let Some(sink) = self.unrecognized.as_mut()
                && let Err(payload) = panic::catch_unwind(AssertUnwindSafe(|| sink(frame)))
            {
                warn!(
                    "Sink for unrecognized '{}' panicked: {}",
                    frame.event_type(),
                    panic_message(payload.as_ref())
                );
            }
            return Dispatch::Ignored;
        };
        let Some(handler) = slot.as_mut() else {
            trace!("Dispatch: no handler for '{}'", frame.event_type());
            self.stats.unhandled += 1;
            return Dispatch::NoHandler;
        };

        let error = match panic::catch_unwind(AssertUnwindSafe(|| handler(frame))) {
            Ok(Ok(())) => {
                self.stats.handled += 1;
                return Dispatch::Handled;
            }
            Ok(Err(e)) => e,
            Err(payload) => HandlerError::Panicked(panic_message(payload.as_ref())),
        };

        warn!(
            "Handler for '{}' failed, continuing with next frame: {}",
            frame.event_type(),
            error
        );
        self.stats.failed += 1;
        Dispatch::Failed(error)
    }

    pub fn stats(&self) -> DispatchStats {
        self.stats
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        s.to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "non-string panic payload".to_string()
    }
}
