//! [`FrameSource`] over any byte-chunk stream.

use super::decoder::FrameDecoder;
use async_trait::async_trait;
use futures::{Stream, StreamExt};
use std::collections::VecDeque;
use std::fmt;
use tracing::warn;
use triage_application::ports::frame_source::{FrameSource, SourceError};
use triage_domain::Frame;

/// Decodes frames lazily from a stream of byte chunks (an HTTP body, a
/// file read in chunks). One source per connection; not restartable.
pub struct SseFrameSource<S> {
    chunks: S,
    decoder: FrameDecoder,
    ready: VecDeque<Frame>,
    done: bool,
}

impl<S> SseFrameSource<S> {
    pub fn new(chunks: S) -> Self {
        Self {
            chunks,
            decoder: FrameDecoder::new(),
            ready: VecDeque::new(),
            done: false,
        }
    }

    fn close(&mut self) {
        self.done = true;
        std::mem::take(&mut self.decoder).finish();
    }
}

#[async_trait]
impl<S, B, E> FrameSource for SseFrameSource<S>
where
    S: Stream<Item = Result<B, E>> + Unpin + Send,
    B: AsRef<[u8]> + Send,
    E: fmt::Display + Send,
{
    async fn next_frame(&mut self) -> Option<Result<Frame, SourceError>> {
        loop {
            if let Some(frame) = self.ready.pop_front() {
                return Some(Ok(frame));
            }
            if self.done {
                return None;
            }

            match self.chunks.next().await {
                Some(Ok(chunk)) => {
                    let frames = self.decoder.feed(chunk.as_ref());
                    self.ready.extend(frames);
                }
                Some(Err(e)) => {
                    warn!("SSE transport error: {}", e);
                    self.close();
                    return Some(Err(SourceError::Transport(e.to_string())));
                }
                None => {
                    self.close();
                    return None;
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use futures::stream;
    use triage_domain::EventType;

    fn chunks(parts: &[&str]) -> stream::Iter<std::vec::IntoIter<Result<Vec<u8>, String>>> {
        let owned: Vec<Result<Vec<u8>, String>> =
            parts.iter().map(|p| Ok(p.as_bytes().to_vec())).collect();
        stream::iter(owned)
    }

    async fn drain(source: &mut dyn FrameSource) -> Vec<Result<Frame, SourceError>> {
        let mut out = Vec::new();
        while let Some(item) = source.next_frame().await {
            out.push(item);
        }
        out
    }

    #[tokio::test]
    async fn yields_frames_across_chunk_boundaries() {
        let mut source = SseFrameSource::new(chunks(&[
            "event: sta",
            "tus\ndata: {\"phase\": \"in",
            "it\"}\n\nevent: complete\ndata: {}\n",
            "\n",
        ]));
        let frames = drain(&mut source).await;

        assert_eq!(frames.len(), 2);
        let first = frames[0].as_ref().unwrap();
        assert_eq!(first.event_type(), &EventType::Status);
        assert_eq!(first.payload().str_field("phase"), Some("init"));
        assert_eq!(frames[1].as_ref().unwrap().event_type(), &EventType::Complete);
    }

    #[tokio::test]
    async fn one_chunk_many_frames_keeps_order() {
        let mut source = SseFrameSource::new(chunks(&[
            "event: status\ndata: {\"phase\":\"init\"}\n\nevent: status\ndata: {\"phase\":\"classification\"}\n\n",
        ]));
        let phases: Vec<String> = drain(&mut source)
            .await
            .into_iter()
            .map(|f| f.unwrap().payload().str_field("phase").unwrap().to_string())
            .collect();
        assert_eq!(phases, vec!["init", "classification"]);
    }

    #[tokio::test]
    async fn transport_error_ends_source() {
        let parts: Vec<Result<Vec<u8>, String>> = vec![
            Ok(b"event: status\ndata: {\"phase\":\"init\"}\n\n".to_vec()),
            Err("connection reset".to_string()),
            Ok(b"event: complete\n\n".to_vec()),
        ];
        let mut source = SseFrameSource::new(stream::iter(parts));
        let items = drain(&mut source).await;

        assert_eq!(items.len(), 2);
        assert!(items[0].is_ok());
        assert_eq!(
            items[1],
            Err(SourceError::Transport("connection reset".into()))
        );
    }

    #[tokio::test]
    async fn partial_trailing_frame_is_dropped() {
        let mut source = SseFrameSource::new(chunks(&[
            "event: status\ndata: {\"phase\":\"init\"}\n\nevent: complete\ndata: {}",
        ]));
        let items = drain(&mut source).await;
        assert_eq!(items.len(), 1);
        assert!(source.next_frame().await.is_none());
    }

    #[tokio::test]
    async fn corrupt_opinion_bytes_do_not_interrupt_the_run() {
        use crate::replay::FileReplayGateway;
        use std::sync::Arc;
        use triage_application::{RunTriageUseCase, StreamEnd};
        use triage_domain::{CaseInput, Phase, SessionId};

        let case: CaseInput = serde_json::from_value(serde_json::json!({
            "age": 55, "gender": "Male", "symptoms": ["chest_pain"],
            "bp_systolic": 160, "bp_diastolic": 100, "heart_rate": 105,
            "temperature": 98.6, "spo2": 96
        }))
        .unwrap();
        let source = SseFrameSource::new(chunks(&[
            "event: status\ndata: {\"phase\": \"specialist_council\"}\n\n",
            "event: specialist_opinion\ndata: {\"specialty\": \"Card",
            "\n\nevent: specialist_opinion\ndata: {\"specialty\": \"Neurology\", ",
            "\"relevance_score\": 6, \"urgency_score\": 4}\n\n",
            "event: complete\ndata: {}\n\n",
        ]));
        let use_case = RunTriageUseCase::new(Arc::new(FileReplayGateway::new("unused.sse", 64)));
        let id = SessionId::new("corrupt").unwrap();

        let outcome = use_case
            .attach(id.clone(), case, Box::new(source))
            .unwrap()
            .join()
            .await;

        assert_eq!(outcome.end, StreamEnd::Finished);
        assert_eq!(outcome.frames, 4);
        let session = use_case.snapshot(&id).unwrap();
        assert_eq!(session.log().len(), 4);
        assert!(session.log()[1].frame.payload().is_raw());
        assert_eq!(session.opinions().len(), 2);
        assert_eq!(session.specialist_opinions().len(), 1);
        assert_eq!(session.phase(), Phase::Complete);
    }
}
