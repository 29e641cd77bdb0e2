//! Incremental decoder for `text/event-stream` bodies.
//!
//! Bytes arrive in arbitrary chunks; a frame is only emitted once the blank
//! line that closes it has been seen. Everything before that is buffered:
//! at most the current partial line plus the fields of the frame being
//! assembled.
//!
//! ```text
//! event: status\n
//! data: {"phase": "init"}\n
//! \n                          <- frame boundary
//! ```

use std::borrow::Cow;
use tracing::{debug, trace};
use triage_domain::{EventType, Frame, Payload};

/// Type given to frames that carry data but no `event:` line.
pub const DEFAULT_EVENT_TYPE: &str = "message";

#[derive(Debug, Default)]
pub struct FrameDecoder {
    /// Bytes of the current, not yet terminated line.
    line: Vec<u8>,
    event: Option<String>,
    /// Joined `data:` lines; `None` until the first one.
    data: Option<String>,
}

impl FrameDecoder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Process one chunk and return every frame it completes, in order.
    pub fn feed(&mut self, chunk: &[u8]) -> Vec<Frame> {
        trace!("SSE chunk: {} bytes", chunk.len());
        let mut frames = Vec::new();
        let mut rest = chunk;

        while let Some(pos) = rest.iter().position(|b| *b == b'\n') {
            let (head, tail) = rest.split_at(pos);
            rest = &tail[1..];

            let line: Cow<'_, [u8]> = if self.line.is_empty() {
                Cow::Borrowed(head)
            } else {
                self.line.extend_from_slice(head);
                Cow::Owned(std::mem::take(&mut self.line))
            };
            if let Some(frame) = self.process_line(&line) {
                frames.push(frame);
            }
        }

        self.line.extend_from_slice(rest);
        frames
    }

    /// Bytes (or field data) held for a frame that has not been closed yet.
    pub fn pending_bytes(&self) -> usize {
        self.line.len()
            + self.event.as_ref().map_or(0, String::len)
            + self.data.as_ref().map_or(0, String::len)
    }

    /// End of input. A partial frame is discarded; returns its size.
    pub fn finish(self) -> usize {
        let discarded = self.pending_bytes();
        if discarded > 0 {
            debug!(
                "SSE stream ended mid-frame; discarding {} buffered bytes",
                discarded
            );
        }
        discarded
    }

    fn process_line(&mut self, raw: &[u8]) -> Option<Frame> {
        let raw = raw.strip_suffix(b"\r").unwrap_or(raw);
        if raw.is_empty() {
            return self.take_frame();
        }

        let line = String::from_utf8_lossy(raw);
        if line.starts_with(':') {
            return None;
        }

        let (field, value) = match line.split_once(':') {
            Some((field, value)) => (field, value.strip_prefix(' ').unwrap_or(value)),
            None => (&*line, ""),
        };

        match field {
            "event" => self.event = Some(value.to_string()),
            "data" => match &mut self.data {
                Some(data) => {
                    data.push('\n');
                    data.push_str(value);
                }
                None => self.data = Some(value.to_string()),
            },
            _ => trace!("SSE: ignoring field '{}'", field),
        }
        None
    }

    fn take_frame(&mut self) -> Option<Frame> {
        let event = self.event.take();
        let data = self.data.take();
        if event.is_none() && data.is_none() {
            return None;
        }

        let event_type = EventType::from_wire(event.as_deref().unwrap_or(DEFAULT_EVENT_TYPE));
        let payload = data.as_deref().map_or(Payload::Empty, Payload::from_data);
        Some(Frame::new(event_type, payload))
    }
}
