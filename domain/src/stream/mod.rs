//! Event stream vocabulary.
//!
//! - [`frame::Frame`] — one decoded unit of the stream
//! - [`event_type::EventType`] — the declared type tag of a frame
//! - [`payload::Payload`] — parsed JSON, or raw text when parsing failed

pub mod event_type;
pub mod frame;
pub mod payload;
