//! Per-mode extraction for the legacy transport.
//!
//! Each progress notification runs the handler of the current
//! [`ResponseMode`]. Handlers only read the transport; they report what to
//! push and what the next mode and cursor are as an [`Extraction`], which the
//! polling adapter applies.

use crate::base::neterror::NetError;
use crate::base::readystate::ReadyState;
use crate::http::charset::Charset;
use crate::transport::legacy::LegacyTransport;
use bytes::Bytes;
use std::fmt;
use std::str::FromStr;

/// How the legacy transport hands over the response body.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ResponseMode {
    /// Incremental text, sliced by cursor.
    Text,
    /// Whole-body byte conversion at `DONE`, for platforms whose text accessor
    /// fails mid-stream.
    TextFallbackArray,
    /// Whole binary value at `DONE`.
    ArrayBuffer,
    /// Fresh binary increment on every `LOADING` notification.
    ChunkedArrayBuffer,
    /// Secondary reader over a stream object.
    MsStream,
}

impl ResponseMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            ResponseMode::Text => "text",
            ResponseMode::TextFallbackArray => "text:fallback-array",
            ResponseMode::ArrayBuffer => "arraybuffer",
            ResponseMode::ChunkedArrayBuffer => "chunked-arraybuffer",
            ResponseMode::MsStream => "ms-stream",
        }
    }

    /// Whether this mode signals end of stream itself instead of following
    /// the transport's `DONE` state.
    pub fn owns_end_of_stream(&self) -> bool {
        matches!(self, ResponseMode::MsStream)
    }
}

impl fmt::Display for ResponseMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ResponseMode {
    type Err = NetError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "text" => Ok(ResponseMode::Text),
            "text:fallback-array" | "text:vbarray" => Ok(ResponseMode::TextFallbackArray),
            "arraybuffer" => Ok(ResponseMode::ArrayBuffer),
            "chunked-arraybuffer" | "moz-chunked-arraybuffer" => {
                Ok(ResponseMode::ChunkedArrayBuffer)
            }
            "ms-stream" => Ok(ResponseMode::MsStream),
            _ => Err(NetError::InvalidArgument),
        }
    }
}

/// Outcome of one extraction pass.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Extraction {
    /// Chunks to push, in order.
    pub chunks: Vec<Bytes>,
    /// Mode for the next notification.
    pub next_mode: ResponseMode,
    /// Delivered offset after pushing `chunks`.
    pub cursor: usize,
    /// Start the `ms-stream` reader.
    pub open_reader: bool,
}

impl Extraction {
    fn idle(mode: ResponseMode, cursor: usize) -> Self {
        Self {
            chunks: Vec::new(),
            next_mode: mode,
            cursor,
            open_reader: false,
        }
    }

    fn push(chunk: Bytes, mode: ResponseMode, cursor: usize) -> Self {
        Self {
            chunks: vec![chunk],
            next_mode: mode,
            cursor,
            open_reader: false,
        }
    }
}

/// Runs the mode handlers against one transport.
pub struct ModeExtractor<'a> {
    transport: &'a dyn LegacyTransport,
    charset: &'a Charset,
}

impl<'a> ModeExtractor<'a> {
    pub fn new(transport: &'a dyn LegacyTransport, charset: &'a Charset) -> Self {
        Self { transport, charset }
    }

    /// Handle one progress notification in `mode`.
    pub fn extract(&self, mode: ResponseMode, cursor: usize) -> Extraction {
        let state = self.transport.ready_state();
        match mode {
            ResponseMode::TextFallbackArray => self.fallback_array(state, cursor),
            ResponseMode::Text => self.text(mode, cursor),
            ResponseMode::ArrayBuffer => match self.transport.response() {
                Some(value) if state == ReadyState::Done => Extraction::push(value, mode, cursor),
                _ => Extraction::idle(mode, cursor),
            },
            ResponseMode::ChunkedArrayBuffer => match self.transport.response() {
                Some(value) if state == ReadyState::Loading => {
                    Extraction::push(value, mode, cursor)
                }
                _ => Extraction::idle(mode, cursor),
            },
            ResponseMode::MsStream => Extraction {
                open_reader: state == ReadyState::Loading,
                ..Extraction::idle(mode, cursor)
            },
        }
    }

    /// Whole-body conversion at `DONE`. When the conversion is unavailable the
    /// same notification is handed to the text handler, since the text
    /// accessor usually works once the request is complete.
    fn fallback_array(&self, state: ReadyState, cursor: usize) -> Extraction {
        let mode = ResponseMode::TextFallbackArray;
        if state != ReadyState::Done {
            return Extraction::idle(mode, cursor);
        }

        match self.transport.response_body() {
            Ok(Some(body)) => return Extraction::push(body, mode, cursor),
            Ok(None) => tracing::debug!("legacy body conversion returned nothing"),
            Err(err) => tracing::debug!(error = %err, "legacy body conversion failed"),
        }
        self.text(mode, cursor)
    }

    /// Push the text beyond `cursor`. A failing text accessor switches to
    /// `text:fallback-array` and pushes nothing.
    fn text(&self, mode: ResponseMode, cursor: usize) -> Extraction {
        let value = match self.transport.response_text() {
            Ok(value) => value,
            Err(err) => {
                tracing::debug!(error = %err, "response text unavailable, switching to fallback");
                return Extraction::idle(ResponseMode::TextFallbackArray, cursor);
            }
        };

        match value.get(cursor..) {
            Some(slice) if !slice.is_empty() => {
                Extraction::push(self.charset.encode(slice), mode, value.len())
            }
            _ => Extraction::idle(mode, cursor),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    #[derive(Default)]
    struct Fake {
        state: Mutex<Option<ReadyState>>,
        text: Mutex<Option<String>>,
        body: Mutex<Option<Result<Option<Bytes>, NetError>>>,
        response: Mutex<Option<Bytes>>,
    }

    impl Fake {
        fn at(state: ReadyState) -> Self {
            let fake = Fake::default();
            *fake.state.lock().unwrap() = Some(state);
            fake
        }

        fn with_text(self, text: &str) -> Self {
            *self.text.lock().unwrap() = Some(text.to_string());
            self
        }

        fn with_body(self, body: Result<Option<Bytes>, NetError>) -> Self {
            *self.body.lock().unwrap() = Some(body);
            self
        }

        fn with_response(self, value: &'static [u8]) -> Self {
            *self.response.lock().unwrap() = Some(Bytes::from_static(value));
            self
        }
    }

    impl LegacyTransport for Fake {
        fn ready_state(&self) -> ReadyState {
            self.state.lock().unwrap().unwrap_or_default()
        }
        fn response_url(&self) -> String {
            String::new()
        }
        fn status(&self) -> u16 {
            200
        }
        fn status_text(&self) -> String {
            "OK".into()
        }
        fn all_response_headers(&self) -> String {
            String::new()
        }
        fn response_text(&self) -> Result<String, NetError> {
            self.text.lock().unwrap().clone().ok_or(NetError::Failed)
        }
        fn response_body(&self) -> Result<Option<Bytes>, NetError> {
            self.body
                .lock()
                .unwrap()
                .clone()
                .unwrap_or(Err(NetError::NotImplemented))
        }
        fn response(&self) -> Option<Bytes> {
            self.response.lock().unwrap().clone()
        }
    }

    fn run(fake: &Fake, mode: ResponseMode, cursor: usize) -> Extraction {
        let charset = Charset::UserDefined;
        ModeExtractor::new(fake, &charset).extract(mode, cursor)
    }

    #[test]
    fn test_mode_names() {
        for mode in [
            ResponseMode::Text,
            ResponseMode::TextFallbackArray,
            ResponseMode::ArrayBuffer,
            ResponseMode::ChunkedArrayBuffer,
            ResponseMode::MsStream,
        ] {
            assert_eq!(mode.as_str().parse::<ResponseMode>(), Ok(mode));
        }
        assert_eq!("text:vbarray".parse::<ResponseMode>(), Ok(ResponseMode::TextFallbackArray));
        assert_eq!(
            "moz-chunked-arraybuffer".parse::<ResponseMode>(),
            Ok(ResponseMode::ChunkedArrayBuffer)
        );
        assert!("fetch".parse::<ResponseMode>().is_err());
    }

    #[test]
    fn test_text_slices_from_cursor() {
        let fake = Fake::at(ReadyState::Loading).with_text("hello world");
        let out = run(&fake, ResponseMode::Text, 5);
        assert_eq!(out.chunks, vec![Bytes::from_static(b" world")]);
        assert_eq!(out.cursor, 11);
        assert_eq!(out.next_mode, ResponseMode::Text);
    }

    #[test]
    fn test_text_nothing_new() {
        let fake = Fake::at(ReadyState::Loading).with_text("hello");
        let out = run(&fake, ResponseMode::Text, 5);
        assert!(out.chunks.is_empty());
        assert_eq!(out.cursor, 5);
    }

    #[test]
    fn test_text_failure_switches_mode() {
        let fake = Fake::at(ReadyState::Loading);
        let out = run(&fake, ResponseMode::Text, 0);
        assert!(out.chunks.is_empty());
        assert_eq!(out.next_mode, ResponseMode::TextFallbackArray);
    }

    #[test]
    fn test_fallback_waits_for_done() {
        let fake = Fake::at(ReadyState::Loading)
            .with_text("abc")
            .with_body(Ok(Some(Bytes::from_static(b"abc"))));
        let out = run(&fake, ResponseMode::TextFallbackArray, 0);
        assert!(out.chunks.is_empty());
        assert_eq!(out.next_mode, ResponseMode::TextFallbackArray);
    }

    #[test]
    fn test_fallback_pushes_whole_body() {
        let fake = Fake::at(ReadyState::Done)
            .with_text("ignored")
            .with_body(Ok(Some(Bytes::from_static(b"\x00\xff"))));
        let out = run(&fake, ResponseMode::TextFallbackArray, 0);
        assert_eq!(out.chunks, vec![Bytes::from_static(b"\x00\xff")]);
        assert_eq!(out.cursor, 0);
    }

    #[test]
    fn test_fallback_chains_to_text_on_conversion_failure() {
        let fake = Fake::at(ReadyState::Done)
            .with_text("abcdef")
            .with_body(Err(NetError::NotImplemented));
        let out = run(&fake, ResponseMode::TextFallbackArray, 2);
        assert_eq!(out.chunks, vec![Bytes::from_static(b"cdef")]);
        assert_eq!(out.cursor, 6);
        assert_eq!(out.next_mode, ResponseMode::TextFallbackArray);
    }

    #[test]
    fn test_fallback_chains_to_text_on_empty_conversion() {
        let fake = Fake::at(ReadyState::Done).with_text("xy").with_body(Ok(None));
        let out = run(&fake, ResponseMode::TextFallbackArray, 0);
        assert_eq!(out.chunks, vec![Bytes::from_static(b"xy")]);
    }

    #[test]
    fn test_arraybuffer_only_at_done() {
        let loading = Fake::at(ReadyState::Loading).with_response(b"partial");
        assert!(run(&loading, ResponseMode::ArrayBuffer, 0).chunks.is_empty());

        let done = Fake::at(ReadyState::Done).with_response(b"whole");
        let out = run(&done, ResponseMode::ArrayBuffer, 0);
        assert_eq!(out.chunks, vec![Bytes::from_static(b"whole")]);

        let missing = Fake::at(ReadyState::Done);
        assert!(run(&missing, ResponseMode::ArrayBuffer, 0).chunks.is_empty());
    }

    #[test]
    fn test_chunked_arraybuffer_only_while_loading() {
        let loading = Fake::at(ReadyState::Loading).with_response(b"piece");
        let out = run(&loading, ResponseMode::ChunkedArrayBuffer, 0);
        assert_eq!(out.chunks, vec![Bytes::from_static(b"piece")]);
        assert_eq!(out.cursor, 0);

        let done = Fake::at(ReadyState::Done).with_response(b"piece");
        assert!(run(&done, ResponseMode::ChunkedArrayBuffer, 0).chunks.is_empty());
    }

    #[test]
    fn test_ms_stream_opens_reader_while_loading() {
        let loading = Fake::at(ReadyState::Loading);
        assert!(run(&loading, ResponseMode::MsStream, 0).open_reader);
        let received = Fake::at(ReadyState::HeadersReceived);
        assert!(!run(&received, ResponseMode::MsStream, 0).open_reader);
    }
}
