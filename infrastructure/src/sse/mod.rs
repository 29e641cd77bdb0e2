//! Server-sent events
//!
//! - [`decoder::FrameDecoder`] — byte chunks in, frames out
//! - [`stream::SseFrameSource`] — the decoder behind the `FrameSource` port

pub mod decoder;
pub mod stream;

pub use decoder::FrameDecoder;
pub use stream::SseFrameSource;
