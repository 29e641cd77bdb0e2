//! Replay of captured event streams.
//!
//! A capture is the raw `text/event-stream` body of a past run saved to a
//! file. Replaying feeds it through the same decoder as a live connection,
//! in fixed-size chunks, so chunk reassembly is exercised exactly as on the
//! wire.

use crate::sse::SseFrameSource;
use async_trait::async_trait;
use std::path::{Path, PathBuf};
use tokio_util::io::ReaderStream;
use tracing::info;
use triage_application::ports::frame_source::FrameSource;
use triage_application::ports::triage_gateway::{GatewayError, RunRequest, TriageGateway};

/// Gateway that "starts" every run by replaying one capture file.
pub struct FileReplayGateway {
    path: PathBuf,
    chunk_bytes: usize,
}

impl FileReplayGateway {
    pub fn new(path: impl Into<PathBuf>, chunk_bytes: usize) -> Self {
        Self {
            path: path.into(),
            chunk_bytes: chunk_bytes.max(1),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Open the capture as a frame source.
    pub async fn open(&self) -> std::io::Result<Box<dyn FrameSource>> {
        let file = tokio::fs::File::open(&self.path).await?;
        let chunks = ReaderStream::with_capacity(file, self.chunk_bytes);
        Ok(Box::new(SseFrameSource::new(Box::pin(chunks))))
    }
}

#[async_trait]
impl TriageGateway for FileReplayGateway {
    async fn open_stream(&self, request: &RunRequest) -> Result<Box<dyn FrameSource>, GatewayError> {
        info!(
            "Replaying {} for session {}",
            self.path.display(),
            request.session_id
        );
        self.open().await.map_err(|e| {
            GatewayError::InvalidRequest(format!("cannot open {}: {}", self.path.display(), e))
        })
    }
}
