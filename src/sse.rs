//! Server-Sent Events (SSE) line reading and frame decoding.
//!
//! SSE format as emitted by the API:
//! ```text
//! event: message
//! data: {"key": "value"}
//!
//! event: done
//! data: [DONE]
//! ```
//!
//! [`LineReader`] turns a body byte stream into lines and [`FrameDecoder`]
//! turns lines into frames. Neither interprets payloads; that is the job of
//! [`crate::stream::StreamReader`].

use bytes::{Bytes, BytesMut};
use futures::{Stream, StreamExt};

use crate::client::ClientError;

/// Payload that marks the intentional end of a stream.
pub const DONE_MARKER: &str = "[DONE]";

/// Incremental line reader over a response body.
///
/// Owns the body stream until it is exhausted, fails, or [`LineReader::close`]
/// is called; the stream is dropped at that point.
pub struct LineReader<S> {
    inner: Option<S>,
    buffer: BytesMut,
    /// Bytes of `buffer` already searched for a terminator.
    scanned: usize,
    eof: bool,
}

impl<S, B, E> LineReader<S>
where
    S: Stream<Item = Result<B, E>> + Unpin,
    B: AsRef<[u8]>,
    E: Into<ClientError>,
{
    /// Next line without its `\n` (and without a trailing `\r`).
    ///
    /// Returns `Ok(None)` once the body is exhausted, and on every call after.
    /// A final line without terminator is still returned before that.
    pub async fn next_line(&mut self) -> Result<Option<Bytes>, ClientError> {
        loop {
            if let Some(offset) = self.buffer[self.scanned..].iter().position(|b| *b == b'\n') {
                let mut line = self.buffer.split_to(self.scanned + offset + 1);
                self.scanned = 0;
                line.truncate(line.len() - 1);
                if line.last() == Some(&b'\r') {
                    line.truncate(line.len() - 1);
                }
                return Ok(Some(line.freeze()));
            }
            self.scanned = self.buffer.len();

            if self.eof {
                if self.buffer.is_empty() {
                    return Ok(None);
                }
                self.scanned = 0;
                return Ok(Some(self.buffer.split().freeze()));
            }

            let Some(inner) = self.inner.as_mut() else {
                self.eof = true;
                continue;
            };

            match inner.next().await {
                Some(Ok(chunk)) => self.buffer.extend_from_slice(chunk.as_ref()),
                Some(Err(e)) => {
                    self.close();
                    return Err(e.into());
                }
                None => {
                    // Body exhausted; release it and drain what is buffered.
                    self.inner = None;
                    self.eof = true;
                }
            }
        }
    }
}

impl<S> LineReader<S> {
    pub fn new(inner: S) -> Self {
        Self {
            inner: Some(inner),
            buffer: BytesMut::new(),
            scanned: 0,
            eof: false,
        }
    }

    /// Drop the body stream and any buffered bytes. Idempotent.
    pub fn close(&mut self) {
        self.inner = None;
        self.eof = true;
        self.buffer.clear();
        self.scanned = 0;
    }

    /// Whether the body stream has been dropped.
    pub fn is_released(&self) -> bool {
        self.inner.is_none()
    }
}

/// Kind announced by an `event:` line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EventKind {
    Message,
    Done,
    Error,
    Unknown(String),
}

impl EventKind {
    pub fn parse(name: &str) -> Self {
        match name {
            "message" => EventKind::Message,
            "done" => EventKind::Done,
            "error" => EventKind::Error,
            other => EventKind::Unknown(other.to_string()),
        }
    }
}

/// One complete event: its kind and the raw `data:` payload, byte for byte.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Frame {
    pub kind: EventKind,
    pub payload: Bytes,
}

/// Result of decoding one line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Decoded {
    Frame(Frame),
    /// A line without data: a keep-alive blank, an `event:` header, a comment,
    /// or stray text. Stray text is kept as `residue`.
    Empty { residue: Option<String> },
}

/// Groups lines into frames. A `data:` line completes a frame immediately,
/// taking the kind of the preceding `event:` line if there was one.
#[derive(Debug, Default)]
pub struct FrameDecoder {
    pending_kind: Option<EventKind>,
}

impl FrameDecoder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Pull one line from `reader` and decode it. `Ok(None)` is end of stream.
    pub async fn next_frame<S, B, E>(
        &mut self,
        reader: &mut LineReader<S>,
    ) -> Result<Option<Decoded>, ClientError>
    where
        S: Stream<Item = Result<B, E>> + Unpin,
        B: AsRef<[u8]>,
        E: Into<ClientError>,
    {
        match reader.next_line().await? {
            Some(line) => Ok(Some(self.decode_line(&line))),
            None => {
                self.pending_kind = None;
                Ok(None)
            }
        }
    }

    pub fn decode_line(&mut self, raw: &[u8]) -> Decoded {
        let line = raw.trim_ascii();

        if let Some(data) = parse_sse_line(line) {
            let kind = self.pending_kind.take().unwrap_or(EventKind::Message);
            let kind = if is_done_marker(data) { EventKind::Done } else { kind };
            return Decoded::Frame(Frame {
                kind,
                payload: Bytes::copy_from_slice(data),
            });
        }

        // Only payloads are kept as bytes; headers and residue are read as
        // text, with invalid UTF-8 replaced.
        let text = String::from_utf8_lossy(line);

        if let Some(name) = parse_event_line(&text) {
            self.pending_kind = Some(EventKind::parse(name));
            return Decoded::Empty { residue: None };
        }

        if text.is_empty() || is_ignored_field(&text) {
            return Decoded::Empty { residue: None };
        }

        Decoded::Empty {
            residue: Some(text.into_owned()),
        }
    }
}

/// Parse an SSE line to extract the data portion.
///
/// SSE lines are in the format: `data: <content>`
///
/// # Example
/// ```
/// use oaiclient::sse::parse_sse_line;
///
/// let line = b"data: {\"key\": \"value\"}";
/// assert_eq!(parse_sse_line(line), Some(&b"{\"key\": \"value\"}"[..]));
///
/// let line = b"invalid";
/// assert_eq!(parse_sse_line(line), None);
/// ```
pub fn parse_sse_line(line: &[u8]) -> Option<&[u8]> {
    line.strip_prefix(b"data:").map(|s| s.trim_ascii())
}

/// Parse an `event: <name>` line.
pub fn parse_event_line(line: &str) -> Option<&str> {
    line.strip_prefix("event:").map(|s| s.trim())
}

/// Check if an SSE data line indicates the stream is done.
///
/// # Example
/// ```
/// use oaiclient::sse::is_done_marker;
///
/// assert!(is_done_marker(b"[DONE]"));
/// assert!(!is_done_marker(b""));
/// assert!(!is_done_marker(b"{\"data\": \"value\"}"));
/// ```
pub fn is_done_marker(data: &[u8]) -> bool {
    data == DONE_MARKER.as_bytes()
}

// Comments and fields this client has no use for.
fn is_ignored_field(line: &str) -> bool {
    line.starts_with(':') || line.starts_with("id:") || line.starts_with("retry:")
}
