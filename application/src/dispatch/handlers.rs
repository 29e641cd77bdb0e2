//! Dispatcher configuration: one optional handler per recognized event type.

use std::fmt;
use thiserror::Error;
use tracing::warn;
use triage_domain::{EventType, Frame};

/// Errors a handler can report for a single frame.
///
/// A handler fault is local to its frame; dispatch of later frames goes on.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum HandlerError {
    #[error("Handler rejected frame: {0}")]
    Rejected(String),

    #[error("Handler panicked: {0}")]
    Panicked(String),
}

/// A frame handler. Invoked synchronously; must not block.
pub type FrameHandler = Box<dyn FnMut(&Frame) -> Result<(), HandlerError> + Send>;

/// Handler configuration for an [`EventDispatcher`](super::dispatcher::EventDispatcher).
///
/// Each recognized event type has exactly one slot. There is no slot for
/// unknown types: those are always ignored.
#[derive(Default)]
pub struct Handlers {
    pub status: Option<FrameHandler>,
    pub classification_result: Option<FrameHandler>,
    pub specialist_opinion: Option<FrameHandler>,
    pub other_specialty_scores: Option<FrameHandler>,
    pub cmo_verdict: Option<FrameHandler>,
    pub complete: Option<FrameHandler>,
    pub error: Option<FrameHandler>,
}

impl Handlers {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `handler` for `event_type`, replacing any previous one.
    ///
    /// Registering for [`EventType::Unknown`] has no effect.
    pub fn on<F>(mut self, event_type: EventType, handler: F) -> Self
    where
        F: FnMut(&Frame) -> Result<(), HandlerError> + Send + 'static,
    {
        match self.slot_mut(&event_type) {
            Some(slot) => *slot = Some(Box::new(handler)),
            None => warn!(
                "Ignoring handler registered for unrecognized event type '{}'",
                event_type
            ),
        }
        self
    }

    // ==================== Builder Methods ====================

    pub fn on_status<F>(self, handler: F) -> Self
    where
        F: FnMut(&Frame) -> Result<(), HandlerError> + Send + 'static,
    {
        self.on(EventType::Status, handler)
    }

    pub fn on_classification_result<F>(self, handler: F) -> Self
    where
        F: FnMut(&Frame) -> Result<(), HandlerError> + Send + 'static,
    {
        self.on(EventType::ClassificationResult, handler)
    }

    pub fn on_specialist_opinion<F>(self, handler: F) -> Self
    where
        F: FnMut(&Frame) -> Result<(), HandlerError> + Send + 'static,
    {
        self.on(EventType::SpecialistOpinion, handler)
    }

    pub fn on_other_specialty_scores<F>(self, handler: F) -> Self
    where
        F: FnMut(&Frame) -> Result<(), HandlerError> + Send + 'static,
    {
        self.on(EventType::OtherSpecialtyScores, handler)
    }

    pub fn on_cmo_verdict<F>(self, handler: F) -> Self
    where
        F: FnMut(&Frame) -> Result<(), HandlerError> + Send + 'static,
    {
        self.on(EventType::CmoVerdict, handler)
    }

    pub fn on_complete<F>(self, handler: F) -> Self
    where
        F: FnMut(&Frame) -> Result<(), HandlerError> + Send + 'static,
    {
        self.on(EventType::Complete, handler)
    }

    pub fn on_error<F>(self, handler: F) -> Self
    where
        F: FnMut(&Frame) -> Result<(), HandlerError> + Send + 'static,
    {
        self.on(EventType::Error, handler)
    }

    /// Event types that currently have a handler.
    pub fn registered(&self) -> Vec<EventType> {
        EventType::RECOGNIZED
            .into_iter()
            .filter(|event_type| {
                self.slot(event_type)
                    .is_some_and(|handler| handler.is_some())
            })
            .collect()
    }

    fn slot(&self, event_type: &EventType) -> Option<&Option<FrameHandler>> {
        match event_type {
            EventType::Status => Some(&self.status),
            EventType::ClassificationResult => Some(&self.classification_result),
            EventType::SpecialistOpinion => Some(&self.specialist_opinion),
            EventType::OtherSpecialtyScores => Some(&self.other_specialty_scores),
            EventType::CmoVerdict => Some(&self.cmo_verdict),
            EventType::Complete => Some(&self.complete),
            EventType::Error => Some(&self.error),
            EventType::Unknown(_) => None,
        }
    }

    /// The slot for `event_type`; `None` for unknown types.
    pub(crate) fn slot_mut(&mut self, event_type: &EventType) -> Option<&mut Option<FrameHandler>> {
        match event_type {
            EventType::Status => Some(&mut self.status),
            EventType::ClassificationResult => Some(&mut self.classification_result),
            EventType::SpecialistOpinion => Some(&mut self.specialist_opinion),
            EventType::OtherSpecialtyScores => Some(&mut self.other_specialty_scores),
            EventType::CmoVerdict => Some(&mut self.cmo_verdict),
            EventType::Complete => Some(&mut self.complete),
            EventType::Error => Some(&mut self.error),
            EventType::Unknown(_) => None,
        }
    }
}

impl fmt::Debug for Handlers {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Handlers")
            .field("registered", &self.registered())
            .finish()
    }
}
