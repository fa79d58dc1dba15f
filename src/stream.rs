//! Pull-based demultiplexer over an SSE response body.
//!
//! [`StreamReader`] drives the [`LineReader`] and [`FrameDecoder`], and turns
//! every frame into one of three outcomes: a decoded item, the end of the
//! stream, or an error. Terminal outcomes are sticky.

use std::fmt;
use std::marker::PhantomData;
use std::pin::Pin;

use bytes::Bytes;
use futures::stream::{self, Stream};
use reqwest::header::HeaderMap;
use serde::de::DeserializeOwned;
use serde_json::Value;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

use crate::client::ClientError;
use crate::context::RequestContext;
use crate::model::{ApiError, ErrorResponse};
use crate::sse::{Decoded, EventKind, Frame, FrameDecoder, LineReader};

/// Body type of a live HTTP response.
pub type ByteStream = Pin<Box<dyn Stream<Item = Result<Bytes, reqwest::Error>> + Send>>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StreamState {
    Open,
    /// Ended by the sentinel, by the server closing the body, or by `close()`.
    Done,
    /// Ended by an error that was returned to the caller.
    Errored,
}

/// A typed event stream. `T` is the schema of each `data:` payload.
///
/// `recv` returns `Ok(Some(item))` for each item, `Ok(None)` at the end of the
/// stream and `Err` on failure. After the first `Ok(None)` or `Err`, every
/// call returns `Ok(None)` without reading the body again.
///
/// # Example
/// ```ignore
/// let mut stream = client.create_completion_stream(&ctx, request).await?;
/// while let Some(chunk) = stream.recv().await? {
///     print!("{}", chunk.choices[0].text);
/// }
/// ```
pub struct StreamReader<T, S = ByteStream> {
    lines: LineReader<S>,
    decoder: FrameDecoder,
    ctx: RequestContext,
    headers: HeaderMap,
    empty_messages_limit: usize,
    empty_messages: usize,
    /// Stray non-SSE lines since the last data frame, checked for an error
    /// envelope at end of stream.
    error_buffer: String,
    state: StreamState,
    _item: PhantomData<fn() -> T>,
}

impl<T, S> fmt::Debug for StreamReader<T, S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StreamReader")
            .field("state", &self.state)
            .field("empty_messages", &self.empty_messages)
            .field("empty_messages_limit", &self.empty_messages_limit)
            .field("headers", &self.headers)
            .finish_non_exhaustive()
    }
}

impl<T> StreamReader<T, ByteStream> {
    /// Take ownership of a streaming response body.
    pub fn from_response(
        response: reqwest::Response,
        ctx: RequestContext,
        empty_messages_limit: usize,
    ) -> Self {
        let headers = response.headers().clone();
        let body: ByteStream = Box::pin(response.bytes_stream());
        Self::new(body, ctx, empty_messages_limit).with_headers(headers)
    }
}

impl<T, S> StreamReader<T, S> {
    pub fn new(body: S, ctx: RequestContext, empty_messages_limit: usize) -> Self {
        Self {
            lines: LineReader::new(body),
            decoder: FrameDecoder::new(),
            ctx,
            headers: HeaderMap::new(),
            empty_messages_limit,
            empty_messages: 0,
            error_buffer: String::new(),
            state: StreamState::Open,
            _item: PhantomData,
        }
    }

    pub fn with_headers(mut self, headers: HeaderMap) -> Self {
        self.headers = headers;
        self
    }

    /// Response headers, e.g. `x-ratelimit-remaining-requests`.
    pub fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    pub fn state(&self) -> StreamState {
        self.state
    }

    pub fn is_finished(&self) -> bool {
        self.state != StreamState::Open
    }

    /// Token that aborts an in-flight `recv` from another task. The aborted
    /// call returns [`ClientError::Cancelled`].
    pub fn cancellation_token(&self) -> CancellationToken {
        self.ctx.cancellation_token()
    }

    /// Release the response body. Safe to call more than once.
    pub fn close(&mut self) {
        if self.state == StreamState::Open {
            self.state = StreamState::Done;
            debug!("stream closed by caller");
        }
        self.lines.close();
    }

    fn finish(&mut self, state: StreamState) {
        self.state = state;
        self.lines.close();
    }
}

impl<T, S, B, E> StreamReader<T, S>
where
    T: DeserializeOwned,
    S: Stream<Item = Result<B, E>> + Unpin,
    B: AsRef<[u8]>,
    E: Into<ClientError>,
{
    /// Receive the next item.
    pub async fn recv(&mut self) -> Result<Option<T>, ClientError> {
        if self.state != StreamState::Open {
            return Ok(None);
        }

        let ctx = self.ctx.clone();
        let result = tokio::select! {
            biased;
            err = ctx.done() => Err(err),
            result = self.process_lines() => result,
        };

        match &result {
            Ok(Some(_)) => {}
            Ok(None) => {
                debug!("stream reached end");
                self.finish(StreamState::Done);
            }
            Err(e) => {
                warn!(error = %e, "stream terminated");
                self.finish(StreamState::Errored);
            }
        }
        result
    }

    /// Adapt into a `futures::Stream`. The stream ends after the first error.
    pub fn into_stream(self) -> impl Stream<Item = Result<T, ClientError>> {
        stream::unfold(self, |mut reader| async move {
            match reader.recv().await {
                Ok(Some(item)) => Some((Ok(item), reader)),
                Ok(None) => None,
                Err(e) => Some((Err(e), reader)),
            }
        })
    }

    async fn process_lines(&mut self) -> Result<Option<T>, ClientError> {
        loop {
            let Some(decoded) = self.decoder.next_frame(&mut self.lines).await? else {
                return match self.take_buffered_error() {
                    Some(api_error) => Err(api_error.into()),
                    None => Ok(None),
                };
            };

            match decoded {
                Decoded::Empty { residue } => {
                    if let Some(text) = residue {
                        self.error_buffer.push_str(&text);
                    }
                    self.empty_messages += 1;
                    if self.empty_messages > self.empty_messages_limit {
                        return Err(ClientError::TooManyEmptyStreamMessages);
                    }
                }
                Decoded::Frame(frame) => {
                    self.empty_messages = 0;
                    self.error_buffer.clear();
                    return self.decode_frame(frame);
                }
            }
        }
    }

    fn decode_frame(&self, frame: Frame) -> Result<Option<T>, ClientError> {
        if frame.kind == EventKind::Done {
            return Ok(None);
        }

        let value: Value = serde_json::from_slice(&frame.payload)?;
        if let Some(api_error) = ErrorResponse::from_value(&value) {
            return Err(api_error.into());
        }
        if frame.kind == EventKind::Error {
            // An error event may carry the bare error object.
            let api_error: ApiError = serde_json::from_value(value)?;
            return Err(api_error.into());
        }

        Ok(Some(serde_json::from_value(value)?))
    }

    fn take_buffered_error(&mut self) -> Option<ApiError> {
        if self.error_buffer.is_empty() {
            return None;
        }
        let buffered = std::mem::take(&mut self.error_buffer);
        ErrorResponse::parse(buffered.as_bytes())
    }
}
