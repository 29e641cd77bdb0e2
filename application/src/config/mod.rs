//! Application-level configuration.
//!
//! - [`StreamConfig`] — stream consumption control (idle timeout)

pub mod stream_config;

pub use stream_config::StreamConfig;
