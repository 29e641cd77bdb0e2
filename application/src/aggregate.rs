//! Aggregate builder — the dispatcher handlers that fold frames into the
//! session store.

use crate::dispatch::dispatcher::EventDispatcher;
use crate::dispatch::handlers::{HandlerError, Handlers};
use crate::ports::session_observer::SessionObserver;
use crate::session_store::{SessionStore, SessionTicket};
use std::sync::Arc;
use tracing::{debug, info, warn};
use triage_domain::{Applied, EventType, Frame};

/// Applies dispatched frames to one session and tells the observer.
pub struct AggregateBuilder {
    store: SessionStore,
    ticket: SessionTicket,
    observer: Arc<dyn SessionObserver>,
}

impl AggregateBuilder {
    pub fn new(store: SessionStore, ticket: SessionTicket, observer: Arc<dyn SessionObserver>) -> Self {
        Self {
            store,
            ticket,
            observer,
        }
    }

    pub fn ticket(&self) -> &SessionTicket {
        &self.ticket
    }

    /// Apply `frame` to the session.
    ///
    /// Fails only when the session was removed or reset underneath this
    /// builder; the frame is then dropped.
    pub fn ingest(&self, frame: &Frame) -> Result<Applied, HandlerError> {
        let session_id = self.ticket.session_id();
        let (applied, (opinions, phase, error)) = self
            .store
            .apply_then(&self.ticket, frame.clone(), |s| {
                (s.opinions().len(), s.phase(), s.error().map(str::to_string))
            })
            .map_err(|e| HandlerError::Rejected(e.to_string()))?;

        self.observer.on_frame(session_id, frame);

        if let Some((from, to)) = applied.phase_change() {
            debug!("Session {}: phase {} -> {}", session_id, from, to);
            self.observer.on_phase_change(session_id, from, to);
        }
        if let Some(anomaly) = &applied.anomaly {
            warn!("Session {}: {}", session_id, anomaly);
            self.observer.on_anomaly(session_id, anomaly);
        }
        if applied.anomaly.is_none() && *frame.event_type() == EventType::SpecialistOpinion {
            self.observer.on_opinion(session_id, opinions);
        }
        if applied.terminated {
            match &error {
                Some(detail) => warn!("Session {} failed: {}", session_id, detail),
                None => info!("Session {} complete", session_id),
            }
            self.observer
                .on_terminated(session_id, phase, error.as_deref());
        }

        Ok(applied)
    }

    /// Append a frame no handler takes (an unrecognized event type) to the
    /// session log.
    pub fn record(&self, frame: &Frame) {
        if let Err(e) = self.ingest(frame) {
            debug!(
                "Session {}: '{}' frame not recorded: {}",
                self.ticket.session_id(),
                frame.event_type(),
                e
            );
        }
    }

    /// Dispatcher configuration routing every recognized event here.
    pub fn into_handlers(self) -> Handlers {
        Self::handlers(Arc::new(self))
    }

    /// A dispatcher that routes recognized events here and still records
    /// the ones it ignores, so the session log keeps every frame in order.
    pub fn into_dispatcher(self) -> EventDispatcher {
        let builder = Arc::new(self);
        let recorder = Arc::clone(&builder);
        EventDispatcher::new(Self::handlers(builder))
            .with_unrecognized(move |frame: &Frame| recorder.record(frame))
    }

    fn handlers(builder: Arc<Self>) -> Handlers {
        EventType::RECOGNIZED
            .into_iter()
            .fold(Handlers::new(), |handlers, event_type| {
                let builder = Arc::clone(&builder);
                handlers.on(event_type, move |frame: &Frame| {
                    builder.ingest(frame).map(|_| ())
                })
            })
    }
}
