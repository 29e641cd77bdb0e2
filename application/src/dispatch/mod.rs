//! Event dispatch.
//!
//! - [`handlers::Handlers`] — the per-event-type handler configuration
//! - [`dispatcher::EventDispatcher`] — FIFO routing with per-frame fault isolation

pub mod dispatcher;
pub mod handlers;
