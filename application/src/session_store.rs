//! Session store — the process-wide table of sessions.
//!
//! Owns every [`Session`] by id. A consumer writes through a
//! [`SessionTicket`] obtained at creation; readers take snapshots. Snapshots
//! are taken under the same lock writes use, so a reader never observes a
//! half-applied frame.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};
use thiserror::Error;
use tracing::debug;
use triage_domain::{Applied, CaseInput, Frame, Session, SessionId};

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum StoreError {
    #[error("Session already exists: {0}")]
    AlreadyExists(SessionId),

    #[error("Session not found: {0}")]
    NotFound(SessionId),

    /// The ticket belongs to a session that has since been removed and
    /// recreated under the same id.
    #[error("Session {0} was reset; stale writer rejected")]
    Stale(SessionId),
}

/// Write capability for one session incarnation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionTicket {
    id: SessionId,
    epoch: u64,
}

impl SessionTicket {
    pub fn session_id(&self) -> &SessionId {
        &self.id
    }

    pub fn epoch(&self) -> u64 {
        self.epoch
    }
}

struct Entry {
    epoch: u64,
    session: Session,
}

/// Shared, cloneable handle to the session table.
#[derive(Clone, Default)]
pub struct SessionStore {
    sessions: Arc<RwLock<HashMap<SessionId, Entry>>>,
    next_epoch: Arc<AtomicU64>,
}

impl SessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an empty session for `id`.
    pub fn create(&self, id: SessionId, input: CaseInput) -> Result<SessionTicket, StoreError> {
        let mut sessions = self.sessions_mut();
        if sessions.contains_key(&id) {
            return Err(StoreError::AlreadyExists(id));
        }
        let epoch = self.next_epoch.fetch_add(1, Ordering::Relaxed);
        sessions.insert(
            id.clone(),
            Entry {
                epoch,
                session: Session::new(id.clone(), input),
            },
        );
        debug!("Created session {} (epoch {})", id, epoch);
        Ok(SessionTicket { id, epoch })
    }

    /// Apply one frame to the session the ticket was issued for.
    pub fn apply(&self, ticket: &SessionTicket, frame: Frame) -> Result<Applied, StoreError> {
        self.apply_then(ticket, frame, |_| ()).map(|(applied, ())| applied)
    }

    /// Apply one frame, then run `f` against the updated session before the
    /// write lock is released.
    pub fn apply_then<R>(
        &self,
        ticket: &SessionTicket,
        frame: Frame,
        f: impl FnOnce(&Session) -> R,
    ) -> Result<(Applied, R), StoreError> {
        let mut sessions = self.sessions_mut();
        let entry = sessions
            .get_mut(&ticket.id)
            .ok_or_else(|| StoreError::NotFound(ticket.id.clone()))?;
        if entry.epoch != ticket.epoch {
            return Err(StoreError::Stale(ticket.id.clone()));
        }
        let applied = entry.session.apply(frame);
        Ok((applied, f(&entry.session)))
    }

    /// A consistent copy of the session.
    pub fn snapshot(&self, id: &SessionId) -> Option<Session> {
        self.sessions().get(id).map(|entry| entry.session.clone())
    }

    /// Run `f` against the live session without cloning it.
    pub fn read<R>(&self, id: &SessionId, f: impl FnOnce(&Session) -> R) -> Option<R> {
        self.sessions().get(id).map(|entry| f(&entry.session))
    }

    /// Drop the session. Outstanding tickets for it become stale.
    pub fn remove(&self, id: &SessionId) -> Option<Session> {
        let removed = self.sessions_mut().remove(id).map(|entry| entry.session);
        if removed.is_some() {
            debug!("Removed session {}", id);
        }
        removed
    }

    /// True if `ticket` still refers to the live session.
    pub fn is_current(&self, ticket: &SessionTicket) -> bool {
        self.sessions()
            .get(&ticket.id)
            .is_some_and(|entry| entry.epoch == ticket.epoch)
    }

    pub fn contains(&self, id: &SessionId) -> bool {
        self.sessions().contains_key(id)
    }

    /// Ids of all sessions, sorted.
    pub fn ids(&self) -> Vec<SessionId> {
        let mut ids: Vec<SessionId> = self.sessions().keys().cloned().collect();
        ids.sort();
        ids
    }

    pub fn len(&self) -> usize {
        self.sessions().len()
    }

    pub fn is_empty(&self) -> bool {
        self.sessions().is_empty()
    }

    // `apply_then` runs its reader only after the frame is fully applied, so
    // a poisoned lock still guards a consistent table.
    fn sessions(&self) -> RwLockReadGuard<'_, HashMap<SessionId, Entry>> {
        self.sessions.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn sessions_mut(&self) -> RwLockWriteGuard<'_, HashMap<SessionId, Entry>> {
        self.sessions.write().unwrap_or_else(PoisonError::into_inner)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use triage_domain::{EventType, Payload, Phase};

    fn case() -> CaseInput {
        serde_json::from_value(json!({
            "age": 40,
            "gender": "Female",
            "symptoms": ["headache"],
            "bp_systolic": 120,
            "bp_diastolic": 80,
            "heart_rate": 72,
            "temperature": 37.0,
            "spo2": 99
        }))
        .unwrap()
    }

    fn id(s: &str) -> SessionId {
        SessionId::new(s).unwrap()
    }

    fn status(phase: &str) -> Frame {
        Frame::new(EventType::Status, Payload::Json(json!({"phase": phase})))
    }

    #[test]
    fn create_rejects_duplicate_id() {
        let store = SessionStore::new();
        store.create(id("a"), case()).unwrap();
        assert_eq!(
            store.create(id("a"), case()),
            Err(StoreError::AlreadyExists(id("a")))
        );
    }

    #[test]
    fn apply_updates_snapshot() {
        let store = SessionStore::new();
        let ticket = store.create(id("a"), case()).unwrap();
        let applied = store.apply(&ticket, status("init")).unwrap();

        assert_eq!(applied.phase_change(), Some((Phase::Idle, Phase::Init)));
        let snapshot = store.snapshot(&id("a")).unwrap();
        assert_eq!(snapshot.phase(), Phase::Init);
        assert_eq!(snapshot.log().len(), 1);
    }

    #[test]
    fn snapshot_is_a_copy() {
        let store = SessionStore::new();
        let ticket = store.create(id("a"), case()).unwrap();
        let before = store.snapshot(&id("a")).unwrap();
        store.apply(&ticket, status("classification")).unwrap();

        assert_eq!(before.phase(), Phase::Idle);
        assert_eq!(
            store.read(&id("a"), |s| s.phase()),
            Some(Phase::Classification)
        );
    }

    #[test]
    fn stale_ticket_cannot_write_to_recreated_session() {
        let store = SessionStore::new();
        let old = store.create(id("a"), case()).unwrap();
        store.remove(&id("a"));
        let new = store.create(id("a"), case()).unwrap();

        assert!(!store.is_current(&old));
        assert!(store.is_current(&new));
        assert_eq!(
            store.apply(&old, status("init")),
            Err(StoreError::Stale(id("a")))
        );
        assert!(store.snapshot(&id("a")).unwrap().log().is_empty());
    }

    #[test]
    fn apply_then_reads_the_ticket_incarnation() {
        let store = SessionStore::new();
        let old = store.create(id("a"), case()).unwrap();
        store.apply(&old, status("classification")).unwrap();
        store.remove(&id("a"));
        let new = store.create(id("a"), case()).unwrap();

        let mut called = false;
        assert_eq!(
            store.apply_then(&old, status("cmo_synthesis"), |_| called = true),
            Err(StoreError::Stale(id("a")))
        );
        assert!(!called);

        let (applied, seen) = store
            .apply_then(&new, status("init"), |s| (s.phase(), s.log().len()))
            .unwrap();
        assert_eq!(applied.phase_change(), Some((Phase::Idle, Phase::Init)));
        assert_eq!(seen, (Phase::Init, 1));
    }

    #[test]
    fn apply_after_remove_is_not_found() {
        let store = SessionStore::new();
        let ticket = store.create(id("a"), case()).unwrap();
        assert!(store.remove(&id("a")).is_some());
        assert_eq!(
            store.apply(&ticket, status("init")),
            Err(StoreError::NotFound(id("a")))
        );
        assert!(store.snapshot(&id("a")).is_none());
    }

    #[test]
    fn sessions_are_independent() {
        let store = SessionStore::new();
        let a = store.create(id("a"), case()).unwrap();
        store.create(id("b"), case()).unwrap();
        store.apply(&a, status("cmo_synthesis")).unwrap();

        assert_eq!(store.snapshot(&id("b")).unwrap().phase(), Phase::Idle);
        assert_eq!(store.ids(), vec![id("a"), id("b")]);
        assert_eq!(store.len(), 2);
    }
}
