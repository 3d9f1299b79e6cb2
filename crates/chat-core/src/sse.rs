//! Incremental SSE decoder.
//!
//! Turns successive raw byte chunks from an open response body into discrete
//! `data:` events. Chunk boundaries may fall anywhere — mid-line and even
//! mid-code-point — without changing the decoded event sequence.

const DATA_PREFIX: &str = "data: ";
const TERMINATOR: &str = "[DONE]";

/// One decoded SSE record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SseEvent {
    pub payload: String,
    pub terminator: bool,
}

impl SseEvent {
    /// Parse a single complete line. Lines without the `data: ` prefix
    /// (comments, `event:` fields, blank keep-alives) produce nothing.
    fn from_line(line: &str) -> Option<SseEvent> {
        let line = line.strip_suffix('\r').unwrap_or(line);
        let payload = line.strip_prefix(DATA_PREFIX)?;
        Some(SseEvent {
            terminator: payload == TERMINATOR,
            payload: payload.to_string(),
        })
    }
}

/// Stateful decoder over a single response body. Lazy, finite and
/// non-restartable: once the terminator line is seen, later input is ignored.
#[derive(Debug, Default)]
pub struct SseDecoder {
    bytes: Vec<u8>,
    line_buf: String,
    finished: bool,
}

impl SseDecoder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether the terminator line has been observed.
    pub fn finished(&self) -> bool {
        self.finished
    }

    /// Feed one raw chunk, returning every event completed by it.
    /// The terminator itself is consumed, never yielded.
    pub fn push(&mut self, chunk: &[u8]) -> Vec<SseEvent> {
        let mut events = Vec::new();
        if self.finished {
            return events;
        }

        self.bytes.extend_from_slice(chunk);

        // Decode as much valid UTF-8 as possible, carrying any incomplete
        // trailing code point over to the next chunk.
        let decoded = match std::str::from_utf8(&self.bytes) {
            Ok(s) => {
                let decoded = s.to_string();
                self.bytes.clear();
                decoded
            }
            Err(e) => {
                let valid_up_to = e.valid_up_to();
                if valid_up_to == 0 {
                    return events;
                }
                let decoded = std::str::from_utf8(&self.bytes[..valid_up_to])
                    .unwrap()
                    .to_string();
                self.bytes.drain(..valid_up_to);
                decoded
            }
        };

        self.line_buf.push_str(&decoded);

        while let Some(newline) = self.line_buf.find('\n') {
            let line: String = self.line_buf[..newline].to_string();
            self.line_buf.drain(..=newline);

            if let Some(event) = SseEvent::from_line(&line) {
                if event.terminator {
                    self.finished = true;
                    break;
                }
                events.push(event);
            }
        }

        events
    }
}
