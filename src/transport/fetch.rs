//! Streaming transport adapter.
//!
//! Pumps an asynchronous chunk reader into the response queue. The next read
//! is issued as soon as a chunk is pushed, regardless of whether the consumer
//! has taken earlier chunks.

use crate::base::context::BodyResultExt;
use crate::base::neterror::NetError;
use crate::http::responsebody::BodySink;
use bytes::Bytes;
use futures::stream::BoxStream;
use futures::{Stream, StreamExt};
use http_body_util::BodyStream;
use tokio::task::JoinHandle;

/// Chunk reader of a streaming response: a chunk, a failure, or `None` once
/// exhausted.
pub type BodyReader = BoxStream<'static, Result<Bytes, NetError>>;

/// A streaming response whose status line and headers are available.
pub struct FetchResponse {
    /// Final URL of the response.
    pub url: String,
    /// Numeric status code.
    pub status: u16,
    /// Status reason phrase.
    pub status_text: String,
    /// Header pairs in arrival order.
    pub headers: Vec<(String, String)>,
    /// Body chunk reader.
    pub body: BodyReader,
}

impl FetchResponse {
    pub fn new<S>(
        url: impl Into<String>,
        status: u16,
        status_text: impl Into<String>,
        headers: Vec<(String, String)>,
        body: S,
    ) -> Self
    where
        S: Stream<Item = Result<Bytes, NetError>> + Send + 'static,
    {
        Self {
            url: url.into(),
            status,
            status_text: status_text.into(),
            headers,
            body: body.boxed(),
        }
    }

    /// Adapt an `http::Response` with any bytes body (e.g. `hyper::body::Incoming`).
    ///
    /// `http` lowercases header names, so raw header casing is not preserved.
    /// Trailer frames are dropped. The status text is the canonical reason.
    pub fn from_http<B>(url: impl Into<String>, response: http::Response<B>) -> Self
    where
        B: http_body::Body<Data = Bytes> + Send + 'static,
        B::Error: std::fmt::Display,
    {
        let url = url.into();
        let (parts, body) = response.into_parts();

        let headers = parts
            .headers
            .iter()
            .map(|(name, value)| {
                (
                    name.as_str().to_string(),
                    String::from_utf8_lossy(value.as_bytes()).into_owned(),
                )
            })
            .collect();
        let status_text = parts.status.canonical_reason().unwrap_or_default();

        let body_url = url.clone();
        let body = BodyStream::new(body).filter_map(move |frame| {
            let item = match frame.body_context(&body_url) {
                Ok(frame) => frame.into_data().ok().map(Ok),
                Err(err) => Some(Err(err)),
            };
            futures::future::ready(item)
        });

        Self::new(url, parts.status.as_u16(), status_text, headers, body)
    }
}

/// Moves chunks from a [`BodyReader`] into a [`BodySink`].
// TODO: bound the body queue and await capacity before issuing the next read.
pub struct StreamingAdapter {
    body: BodyReader,
    sink: BodySink,
}

impl StreamingAdapter {
    pub(crate) fn new(body: BodyReader, sink: BodySink) -> Self {
        Self { body, sink }
    }

    /// Read until the body is exhausted, fails, or the stream is destroyed.
    /// The reader is dropped as soon as the stream is destroyed, even while a
    /// read is outstanding.
    pub async fn run(mut self) {
        loop {
            let next = tokio::select! {
                _ = self.sink.cancelled() => None,
                next = self.body.next() => Some(next),
            };
            let next = match next {
                Some(next) if !self.sink.is_destroyed() => next,
                _ => {
                    tracing::trace!("response destroyed, stopping body reads");
                    return;
                }
            };

            match next {
                Some(Ok(chunk)) => {
                    if !self.sink.push(chunk) {
                        tracing::trace!("response no longer accepts chunks, stopping body reads");
                        return;
                    }
                }
                Some(Err(err)) => {
                    self.sink.fail(err);
                    return;
                }
                None => {
                    self.sink.push_end();
                    return;
                }
            }
        }
    }

    pub fn spawn(self) -> JoinHandle<()> {
        tokio::spawn(self.run())
    }
}
