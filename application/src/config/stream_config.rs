//! Stream consumption parameters.

use std::time::Duration;

/// Controls how a frame stream is consumed.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StreamConfig {
    /// Close the stream when no frame arrives for this long.
    ///
    /// `None` (the default) waits indefinitely: a CMO synthesis step can
    /// legitimately stay silent for minutes.
    pub idle_timeout: Option<Duration>,
}

impl StreamConfig {
    /// Creates a StreamConfig from an optional idle timeout in seconds.
    ///
    /// `None` and `Some(0)` both disable the timeout.
    pub fn from_idle_timeout_seconds(seconds: Option<u64>) -> Self {
        Self {
            idle_timeout: seconds.filter(|s| *s > 0).map(Duration::from_secs),
        }
    }

    pub fn with_idle_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.idle_timeout = timeout;
        self
    }
}
