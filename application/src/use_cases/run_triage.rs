//! Run Triage use case
//!
//! Owns the lifecycle of runs: creating the session, opening its stream,
//! spawning the consumer and handing back a [`Subscription`]. At most one
//! live stream exists per session id; only `restart` replaces a running one.

use super::stream_session::{StreamEnd, StreamOutcome, StreamSessionUseCase};
use crate::aggregate::AggregateBuilder;
use crate::dispatch::dispatcher::DispatchStats;
use crate::ports::frame_source::FrameSource;
use crate::ports::session_observer::{NoObserver, SessionObserver};
use crate::ports::triage_gateway::{GatewayError, RunRequest, TriageGateway};
use crate::session_store::{SessionStore, SessionTicket, StoreError};
use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use thiserror::Error;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};
use triage_domain::{CaseInput, DomainError, Frame, Session, SessionId};

/// Errors that can occur when starting a run
#[derive(Error, Debug)]
pub enum RunTriageError {
    #[error("Invalid case: {0}")]
    InvalidInput(#[from] DomainError),

    #[error("Session store error: {0}")]
    Store(#[from] StoreError),

    #[error("Gateway error: {0}")]
    Gateway(#[from] GatewayError),
}

struct LiveRun {
    epoch: u64,
    token: CancellationToken,
}

type LiveRuns = Arc<Mutex<HashMap<SessionId, LiveRun>>>;

/// Use case for running triage sessions
pub struct RunTriageUseCase<G: TriageGateway + 'static> {
    gateway: Arc<G>,
    store: SessionStore,
    stream: StreamSessionUseCase,
    observer: Arc<dyn SessionObserver>,
    live: LiveRuns,
}

impl<G: TriageGateway + 'static> RunTriageUseCase<G> {
    pub fn new(gateway: Arc<G>) -> Self {
        Self {
            gateway,
            store: SessionStore::new(),
            stream: StreamSessionUseCase::default(),
            observer: Arc::new(NoObserver),
            live: Arc::new(Mutex::new(HashMap::new())),
        }
    }

    // ==================== Builder Methods ====================

    pub fn with_store(mut self, store: SessionStore) -> Self {
        self.store = store;
        self
    }

    pub fn with_stream(mut self, stream: StreamSessionUseCase) -> Self {
        self.stream = stream;
        self
    }

    pub fn with_observer(mut self, observer: Arc<dyn SessionObserver>) -> Self {
        self.observer = observer;
        self
    }

    // ==================== Operations ====================

    /// Start a run: create the session, open its stream and consume it in
    /// the background.
    ///
    /// Fails if a session with this id already exists; use
    /// [`restart`](Self::restart) to replace it. If the stream cannot be
    /// opened the session is kept, terminated by a synthetic `error` frame.
    pub async fn start(&self, request: RunRequest) -> Result<Subscription, RunTriageError> {
        let ticket = self.prepare(&request.session_id, &request.patient_data)?;
        info!(
            "Starting triage run {} for {}",
            request.session_id,
            request.patient_data.label()
        );

        match self.gateway.open_stream(&request).await {
            Ok(source) => Ok(self.spawn(ticket, source)),
            Err(e) => {
                warn!("Could not open stream for {}: {}", request.session_id, e);
                let builder = self.builder(ticket);
                if let Err(handler_error) = builder.ingest(&Frame::transport_failure()) {
                    debug!("Transport failure not recorded: {}", handler_error);
                }
                Err(e.into())
            }
        }
    }

    /// Start a session fed by a caller-supplied source.
    pub fn attach(
        &self,
        session_id: SessionId,
        input: CaseInput,
        source: Box<dyn FrameSource>,
    ) -> Result<Subscription, RunTriageError> {
        let ticket = self.prepare(&session_id, &input)?;
        info!("Attaching source to session {}", session_id);
        Ok(self.spawn(ticket, source))
    }

    /// Discard the current session for this id, then start a new run.
    pub async fn restart(&self, request: RunRequest) -> Result<Subscription, RunTriageError> {
        self.reset(&request.session_id);
        self.start(request).await
    }

    /// Close the live stream (if any) and remove the session.
    pub fn reset(&self, session_id: &SessionId) -> Option<Session> {
        self.close_live(session_id);
        let removed = self.store.remove(session_id);
        if removed.is_some() {
            info!("Session {} reset", session_id);
        }
        removed
    }

    pub fn snapshot(&self, session_id: &SessionId) -> Option<Session> {
        self.store.snapshot(session_id)
    }

    pub fn store(&self) -> &SessionStore {
        &self.store
    }

    /// True while a stream is being consumed for this session.
    pub fn is_live(&self, session_id: &SessionId) -> bool {
        lock(&self.live).contains_key(session_id)
    }

    // ==================== Internals ====================

    fn prepare(&self, session_id: &SessionId, input: &CaseInput) -> Result<SessionTicket, RunTriageError> {
        input.validate()?;
        let ticket = self.store.create(session_id.clone(), input.clone())?;
        // A consumer left over from a session removed straight from the store.
        self.close_live(session_id);
        Ok(ticket)
    }

    fn close_live(&self, session_id: &SessionId) {
        if let Some(run) = lock(&self.live).remove(session_id) {
            debug!("Closing live stream for session {}", session_id);
            run.token.cancel();
        }
    }

    fn builder(&self, ticket: SessionTicket) -> AggregateBuilder {
        AggregateBuilder::new(self.store.clone(), ticket, Arc::clone(&self.observer))
    }

    fn spawn(&self, ticket: SessionTicket, source: Box<dyn FrameSource>) -> Subscription {
        let token = CancellationToken::new();
        let session_id = ticket.session_id().clone();
        lock(&self.live).insert(
            session_id.clone(),
            LiveRun {
                epoch: ticket.epoch(),
                token: token.clone(),
            },
        );

        let mut dispatcher = self.builder(ticket.clone()).into_dispatcher();
        let stream = self.stream.clone();
        let live = Arc::clone(&self.live);
        let cancel = token.clone();

        let handle = tokio::spawn(async move {
            let outcome = stream
                .consume(source, &mut dispatcher, ticket.session_id(), &cancel)
                .await;
            release(&live, &ticket);
            outcome
        });

        Subscription {
            session_id,
            token,
            handle: Some(handle),
        }
    }
}

/// Drop the live entry, unless a newer run already replaced it.
fn release(live: &LiveRuns, ticket: &SessionTicket) {
    let mut live = lock(live);
    if live
        .get(ticket.session_id())
        .is_some_and(|run| run.epoch == ticket.epoch())
    {
        live.remove(ticket.session_id());
    }
}

fn lock(live: &LiveRuns) -> MutexGuard<'_, HashMap<SessionId, LiveRun>> {
    live.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Handle to a running stream consumer.
///
/// Dropping the handle closes the stream. The session itself stays in the
/// store with whatever state was committed.
#[derive(Debug)]
pub struct Subscription {
    session_id: SessionId,
    token: CancellationToken,
    handle: Option<JoinHandle<StreamOutcome>>,
}

impl Subscription {
    pub fn session_id(&self) -> &SessionId {
        &self.session_id
    }

    /// Stop consuming. No handler runs after this returns control to the
    /// consumer task.
    pub fn close(&self) {
        self.token.cancel();
    }

    pub fn is_closed(&self) -> bool {
        self.token.is_cancelled()
    }

    /// True once the consumer task has stopped.
    pub fn is_finished(&self) -> bool {
        self.handle.as_ref().is_none_or(JoinHandle::is_finished)
    }

    /// Wait for the consumer to stop and return how the stream ended.
    ///
    /// Dropping the returned future before it completes closes the stream.
    pub async fn join(mut self) -> StreamOutcome {
        let session_id = self.session_id.clone();
        let Some(handle) = self.handle.as_mut() else {
            return aborted(session_id, "already joined".to_string());
        };
        let result = handle.await;
        self.handle = None;
        match result {
            Ok(outcome) => outcome,
            Err(e) => {
                warn!("Consumer task for {} failed: {}", session_id, e);
                aborted(session_id, e.to_string())
            }
        }
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        if self.handle.is_some() {
            self.token.cancel();
        }
    }
}

fn aborted(session_id: SessionId, reason: String) -> StreamOutcome {
    StreamOutcome {
        session_id,
        end: StreamEnd::Aborted(reason),
        frames: 0,
        stats: DispatchStats::default(),
    }
}
