//! Incremental Server-Sent Events decoder.
//!
//! Network chunks do not respect event boundaries, so [`SseDecoder`]
//! buffers partial lines across calls to [`SseDecoder::feed`] and emits
//! an [`SseEvent`] each time a blank line terminates a frame. Both `\n`
//! and `\r\n` line endings are accepted.

/// One dispatched event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SseEvent {
    /// Value of the `event:` field, if the frame set one.
    pub event: Option<String>,
    /// All `data:` lines of the frame joined with `\n`.
    pub data: String,
    /// Last `id:` seen on the stream.
    pub id: Option<String>,
}

/// Longest partial line held while waiting for its terminator. Anything
/// longer is dropped up to the next newline.
pub const MAX_LINE_BYTES: usize = 1024 * 1024;

/// Stateful line decoder for a `text/event-stream` body.
#[derive(Debug, Default)]
pub struct SseDecoder {
    buffer: Vec<u8>,
    /// Bytes of `buffer` already searched for a newline.
    scanned: usize,
    /// Set while skipping the tail of an oversized line.
    discarding: bool,
    data: Vec<String>,
    event: Option<String>,
    last_id: Option<String>,
}

impl SseDecoder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Consume one chunk and return every event it completes.
    pub fn feed(&mut self, chunk: &[u8]) -> Vec<SseEvent> {
        self.buffer.extend_from_slice(chunk);

        let mut events = Vec::new();
        let mut start = 0;
        let mut from = self.scanned;
        while let Some(pos) = self.buffer[from..].iter().position(|&b| b == b'\n') {
            let end = from + pos;
            if !std::mem::take(&mut self.discarding) {
                let mut line = &self.buffer[start..end];
                if line.last() == Some(&b'\r') {
                    line = &line[..line.len() - 1];
                }
                let line = String::from_utf8_lossy(line).into_owned();
                if let Some(event) = self.process_line(&line) {
                    events.push(event);
                }
            }
            start = end + 1;
            from = start;
        }

        self.buffer.drain(..start);
        self.scanned = self.buffer.len();
        if self.buffer.len() > MAX_LINE_BYTES {
            tracing::warn!(bytes = self.buffer.len(), "SSE line too long; discarding");
            self.buffer.clear();
            self.scanned = 0;
            self.discarding = true;
        }
        events
    }

    fn process_line(&mut self, line: &str) -> Option<SseEvent> {
        if line.is_empty() {
            return self.dispatch();
        }
        if line.starts_with(':') {
            // Comment / keepalive.
            return None;
        }

        let (field, value) = match line.split_once(':') {
            Some((field, value)) => (field, value.strip_prefix(' ').unwrap_or(value)),
            None => (line, ""),
        };

        match field {
            "data" => self.data.push(value.to_string()),
            "event" => self.event = Some(value.to_string()),
            "id" => self.last_id = Some(value.to_string()),
            "retry" => {}
            other => tracing::trace!(field = other, "Ignoring unknown SSE field"),
        }
        None
    }

    fn dispatch(&mut self) -> Option<SseEvent> {
        let event = self.event.take();
        if self.data.is_empty() {
            return None;
        }
        let data = std::mem::take(&mut self.data).join("\n");
        Some(SseEvent {
            event,
            data,
            id: self.last_id.clone(),
        })
    }
}
