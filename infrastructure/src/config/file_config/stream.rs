//! Stream consumption settings (`[stream]` section)

use serde::{Deserialize, Serialize};
use triage_application::StreamConfig;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileStreamConfig {
    /// Fail a run after this many silent seconds; unset or 0 waits forever
    pub idle_timeout_secs: Option<u64>,
    /// Chunk size used when replaying a captured stream file
    pub replay_chunk_bytes: usize,
}

impl Default for FileStreamConfig {
    fn default() -> Self {
        Self {
            idle_timeout_secs: None,
            replay_chunk_bytes: 4096,
        }
    }
}

impl FileStreamConfig {
    pub fn to_stream_config(&self) -> StreamConfig {
        StreamConfig::from_idle_timeout_seconds(self.idle_timeout_secs)
    }
}
