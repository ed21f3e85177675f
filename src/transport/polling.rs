//! Polling adapter for the legacy transport.
//!
//! Every progress notification runs one extraction pass for the current mode
//! and then applies the end-of-stream rule: once the transport is `DONE`,
//! the stream ends, unless the mode signals the end itself (`ms-stream`).

use crate::base::neterror::NetError;
use crate::base::readystate::ReadyState;
use crate::http::charset::Charset;
use crate::http::responsebody::BodySink;
use crate::transport::extract::{ModeExtractor, ResponseMode};
use crate::transport::legacy::{LegacyTransport, MsStreamEvent, ProgressEvent};
use futures::stream::BoxStream;
use futures::{Stream, StreamExt};
use std::sync::Arc;

type MsReader = BoxStream<'static, MsStreamEvent>;

/// Drives one legacy transport into a response stream.
pub struct PollingAdapter {
    transport: Arc<dyn LegacyTransport>,
    sink: BodySink,
    mode: ResponseMode,
    cursor: usize,
    charset: Charset,
    reader: Option<MsReader>,
    reader_opened: bool,
}

impl PollingAdapter {
    pub(crate) fn new(
        transport: Arc<dyn LegacyTransport>,
        sink: BodySink,
        mode: ResponseMode,
        charset: Charset,
    ) -> Self {
        Self {
            transport,
            sink,
            mode,
            cursor: 0,
            charset,
            reader: None,
            reader_opened: false,
        }
    }

    /// Current delivery mode. Only changes through the text fallback.
    pub fn mode(&self) -> ResponseMode {
        self.mode
    }

    /// Offset already delivered downstream.
    pub fn cursor(&self) -> usize {
        self.cursor
    }

    pub fn charset(&self) -> &Charset {
        &self.charset
    }

    /// Handle one progress notification of the transport.
    pub fn on_progress(&mut self) {
        if self.sink.is_destroyed() {
            return;
        }

        let extraction = ModeExtractor::new(self.transport.as_ref(), &self.charset)
            .extract(self.mode, self.cursor);

        for chunk in extraction.chunks {
            if !self.sink.push(chunk) {
                tracing::trace!(mode = %self.mode, "response no longer accepts chunks");
                return;
            }
        }
        if extraction.next_mode != self.mode {
            tracing::debug!(from = %self.mode, to = %extraction.next_mode, "response mode changed");
            self.mode = extraction.next_mode;
        }
        debug_assert!(extraction.cursor >= self.cursor);
        self.cursor = extraction.cursor;

        if extraction.open_reader && !self.reader_opened {
            self.reader_opened = true;
            self.reader = self.transport.open_ms_stream();
            if self.reader.is_none() {
                tracing::debug!("transport has no ms-stream reader");
            }
        }

        if self.transport.ready_state() == ReadyState::Done && !self.mode.owns_end_of_stream() {
            self.sink.push_end();
        }
    }

    /// Handle one event of the `ms-stream` reader.
    pub fn on_ms_stream_event(&mut self, event: MsStreamEvent) {
        match event {
            MsStreamEvent::Progress(result) => {
                if result.len() > self.cursor {
                    self.sink.push(result.slice(self.cursor..));
                    self.cursor = result.len();
                }
            }
            MsStreamEvent::Load => {
                self.sink.push_end();
            }
            MsStreamEvent::Error(err) => self.sink.fail(err),
        }
    }

    /// Hand the opened `ms-stream` reader to whoever drives the adapter.
    pub fn take_ms_reader(&mut self) -> Option<BoxStream<'static, MsStreamEvent>> {
        self.reader.take()
    }

    /// Consume transport notifications until the stream ends or is destroyed.
    ///
    /// On destruction, including the response stream being dropped before
    /// its end, the transport is aborted and the notification source is
    /// dropped.
    pub async fn run<S>(mut self, events: S)
    where
        S: Stream<Item = ProgressEvent> + Send,
    {
        let mut events = std::pin::pin!(events);
        let mut events_done = false;
        let mut reader: Option<MsReader> = None;

        loop {
            if self.sink.is_destroyed() || self.sink.is_ended() {
                break;
            }
            if reader.is_none() {
                reader = self.take_ms_reader();
            }
            if events_done && reader.is_none() {
                tracing::debug!(mode = %self.mode, "transport went quiet before end of stream");
                break;
            }

            tokio::select! {
                _ = self.sink.cancelled() => break,
                event = events.next(), if !events_done => match event {
                    Some(ProgressEvent::Progress) => self.on_progress(),
                    Some(ProgressEvent::Error(err)) => self.sink.fail(err),
                    Some(ProgressEvent::Abort) => self.sink.fail(NetError::Aborted),
                    None => events_done = true,
                },
                event = next_reader_event(&mut reader), if reader.is_some() => match event {
                    Some(event) => self.on_ms_stream_event(event),
                    None => reader = None,
                },
            }
        }

        if self.sink.is_destroyed() {
            tracing::debug!(mode = %self.mode, "response destroyed, aborting transport");
            self.transport.abort();
        }
    }
}

async fn next_reader_event(reader: &mut Option<MsReader>) -> Option<MsStreamEvent> {
    match reader.as_mut() {
        Some(reader) => reader.next().await,
        None => None,
    }
}
