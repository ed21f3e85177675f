//! Response stream with status line, headers and a pull-consumable body.

use crate::base::neterror::NetError;
use crate::http::charset::CharsetResolver;
use crate::http::config::StreamConfig;
use crate::http::headers::{HeaderNormalizer, Headers, RawHeaders};
use crate::http::responsebody::{self, BodySink, BodyStream, StreamEvent};
use crate::transport::extract::ResponseMode;
use crate::transport::fetch::{FetchResponse, StreamingAdapter};
use crate::transport::legacy::{LegacyTransport, ProgressEvent};
use crate::transport::polling::PollingAdapter;
use bytes::{Bytes, BytesMut};
use cookie::Cookie;
use futures::{Stream, StreamExt};
use http::HeaderMap;
use hyper::body::Incoming;
use std::pin::Pin;
use std::sync::Arc;
use std::task::{Context, Poll};
use tokio::sync::broadcast;
use url::Url;

/// An incoming HTTP response, whichever transport produced it.
///
/// Implements `Stream<Item = Bytes>`: chunks arrive in transport order and
/// the stream finishes after the end-of-stream marker (or on destroy).
/// Lifecycle events are available through [`subscribe`](Self::subscribe).
pub struct ResponseStream {
    /// Final URL of the response.
    pub url: String,
    /// Numeric status code.
    pub status_code: u16,
    /// Status reason phrase.
    pub status_message: String,
    /// Normalized headers keyed by lowercase name.
    pub headers: Headers,
    /// Header names and values in arrival order and casing.
    pub raw_headers: RawHeaders,
    /// Normalized trailers.
    pub trailers: Headers,
    /// Trailer names and values in arrival order and casing.
    pub raw_trailers: RawHeaders,
    body: BodyStream,
    first_subscriber: Option<broadcast::Receiver<StreamEvent>>,
}

impl std::fmt::Debug for ResponseStream {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ResponseStream")
            .field("url", &self.url)
            .field("status_code", &self.status_code)
            .field("status_message", &self.status_message)
            .field("headers", &self.headers)
            .finish_non_exhaustive()
    }
}

impl ResponseStream {
    fn with_body(
        url: String,
        status_code: u16,
        status_message: String,
        (headers, raw_headers): (Headers, RawHeaders),
        config: &StreamConfig,
    ) -> (Self, BodySink) {
        let (sink, body, first_subscriber) = responsebody::channel(config);
        let response = Self {
            url,
            status_code,
            status_message,
            headers,
            raw_headers,
            trailers: Headers::new(),
            raw_trailers: RawHeaders::new(),
            body,
            first_subscriber: Some(first_subscriber),
        };
        (response, sink)
    }

    /// Wrap a streaming transport and start pumping its body.
    ///
    /// Must be called inside a tokio runtime.
    pub fn from_fetch(response: FetchResponse, config: &StreamConfig) -> Self {
        let FetchResponse {
            url,
            status,
            status_text,
            headers,
            body,
        } = response;

        let normalized = HeaderNormalizer::from_pairs(headers);
        let (stream, sink) = Self::with_body(url, status, status_text, normalized, config);
        tracing::debug!(url = %stream.url, status = stream.status_code, "streaming response started");

        StreamingAdapter::new(body, sink).spawn();
        stream
    }

    /// Wrap a hyper response. Must be called inside a tokio runtime.
    pub fn from_hyper(
        url: impl Into<String>,
        response: http::Response<Incoming>,
        config: &StreamConfig,
    ) -> Self {
        Self::from_fetch(FetchResponse::from_http(url, response), config)
    }

    /// Wrap a legacy transport and the adapter that feeds it, without
    /// starting anything. The caller forwards notifications to
    /// [`PollingAdapter::on_progress`] or hands them to [`PollingAdapter::run`].
    pub fn with_polling_adapter(
        transport: Arc<dyn LegacyTransport>,
        mode: ResponseMode,
        config: &StreamConfig,
    ) -> (Self, PollingAdapter) {
        let normalized = HeaderNormalizer::from_raw_block(&transport.all_response_headers());
        let charset = CharsetResolver::resolve(config, &normalized.0);
        let (stream, sink) = Self::with_body(
            transport.response_url(),
            transport.status(),
            transport.status_text(),
            normalized,
            config,
        );
        tracing::debug!(
            url = %stream.url,
            status = stream.status_code,
            mode = %mode,
            charset = %charset,
            "polling response started"
        );

        let adapter = PollingAdapter::new(transport, sink, mode, charset);
        (stream, adapter)
    }

    /// Wrap a legacy transport and drive it from `events` on a spawned task.
    ///
    /// Must be called inside a tokio runtime.
    pub fn from_legacy<S>(
        transport: Arc<dyn LegacyTransport>,
        mode: ResponseMode,
        config: &StreamConfig,
        events: S,
    ) -> Self
    where
        S: Stream<Item = ProgressEvent> + Send + 'static,
    {
        let (stream, adapter) = Self::with_polling_adapter(transport, mode, config);
        tokio::spawn(adapter.run(events));
        stream
    }

    /// Subscribe to lifecycle events. The first call observes every event
    /// since construction; later calls only see events sent after them.
    pub fn subscribe(&mut self) -> broadcast::Receiver<StreamEvent> {
        let events = self
            .first_subscriber
            .take()
            .unwrap_or_else(|| self.body.shared().subscribe());
        self.body.shared().flush_close();
        events
    }

    /// Stop the stream. Queued chunks are discarded, the adapter stops
    /// pushing and `Close` follows on a later turn. Dropping an unfinished
    /// stream does the same.
    pub fn destroy(&mut self) {
        if self.body.shared().destroy() {
            tracing::debug!(url = %self.url, "response destroyed");
        }
    }

    pub fn is_destroyed(&self) -> bool {
        self.body.shared().is_destroyed()
    }

    /// Record trailers delivered by an external source.
    pub fn set_trailers<I, N, V>(&mut self, pairs: I)
    where
        I: IntoIterator<Item = (N, V)>,
        N: AsRef<str>,
        V: AsRef<str>,
    {
        let (trailers, raw_trailers) = HeaderNormalizer::from_pairs(pairs);
        self.trailers = trailers;
        self.raw_trailers = raw_trailers;
    }

    /// Parsed `Set-Cookie` headers. Unparseable entries are skipped.
    pub fn cookies(&self) -> Vec<Cookie<'static>> {
        self.headers
            .get_all("set-cookie")
            .into_iter()
            .filter_map(|raw| match Cookie::parse(raw.to_string()) {
                Ok(cookie) => Some(cookie),
                Err(e) => {
                    tracing::debug!(error = %e, "skipping malformed set-cookie");
                    None
                }
            })
            .collect()
    }

    /// The response URL, parsed.
    pub fn parsed_url(&self) -> Result<Url, NetError> {
        Url::parse(&self.url).map_err(|_| NetError::InvalidUrl)
    }

    /// Headers as a standard `http::HeaderMap`.
    pub fn header_map(&self) -> HeaderMap {
        self.raw_headers.to_header_map()
    }

    /// Read the remaining body into memory.
    pub async fn bytes(mut self) -> Result<Bytes, NetError> {
        let mut events = self.subscribe();
        let mut buf = BytesMut::new();
        while let Some(chunk) = self.next().await {
            buf.extend_from_slice(&chunk);
        }

        if self.is_destroyed() {
            while let Ok(event) = events.try_recv() {
                if let StreamEvent::Error(err) = event {
                    return Err(err);
                }
            }
            return Err(NetError::Aborted);
        }
        Ok(buf.freeze())
    }

    /// Read the remaining body as UTF-8 text.
    pub async fn text(self) -> Result<String, NetError> {
        let bytes = self.bytes().await?;
        String::from_utf8(bytes.to_vec()).map_err(|_| NetError::InvalidUtf8)
    }

    /// Read the remaining body as JSON, deserializing to type T.
    #[cfg(feature = "json")]
    pub async fn json<T: serde::de::DeserializeOwned>(self) -> Result<T, NetError> {
        let bytes = self.bytes().await?;
        serde_json::from_slice(&bytes).map_err(|_| NetError::JsonParseError)
    }
}

impl Stream for ResponseStream {
    type Item = Bytes;

    fn poll_next(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Bytes>> {
        Pin::new(&mut self.body).poll_next(cx)
    }
}
