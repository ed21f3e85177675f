//! Legacy polling transport interface.
//!
//! A legacy request object exposes its response only through state
//! inspection: the owner is told "something changed" and then reads the
//! ready state and whichever accumulated value the delivery mode uses.

use crate::base::neterror::NetError;
use crate::base::readystate::ReadyState;
use bytes::Bytes;
use futures::stream::BoxStream;

/// Notification delivered by the legacy transport.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProgressEvent {
    /// Ready state or accumulated response changed.
    Progress,
    /// The request failed.
    Error(NetError),
    /// The request was aborted by its owner.
    Abort,
}

/// Event of the secondary reader used by `ms-stream` mode.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MsStreamEvent {
    /// The reader's accumulated result so far.
    Progress(Bytes),
    /// The reader reached the end of the response.
    Load,
    /// The reader failed.
    Error(NetError),
}

/// A polling request object whose headers are already available.
///
/// Accessors that can fail on some platforms return `Result`; the adapter
/// treats those failures as recoverable (see the `text` and
/// `text:fallback-array` modes).
pub trait LegacyTransport: Send + Sync {
    /// Current progress of the request.
    fn ready_state(&self) -> ReadyState;

    /// Final URL of the response. May be empty.
    fn response_url(&self) -> String;

    /// Numeric status code.
    fn status(&self) -> u16;

    /// Status reason phrase.
    fn status_text(&self) -> String;

    /// All response headers as one `"Name: value\r\n"` block.
    fn all_response_headers(&self) -> String;

    /// Text accumulated so far. Some platforms refuse this before `DONE`.
    fn response_text(&self) -> Result<String, NetError>;

    /// Whole-body conversion of the legacy byte accessor.
    fn response_body(&self) -> Result<Option<Bytes>, NetError> {
        Err(NetError::NotImplemented)
    }

    /// Binary response value. Cumulative in `arraybuffer` mode, the latest
    /// increment in `chunked-arraybuffer` mode.
    fn response(&self) -> Option<Bytes> {
        None
    }

    /// Start the secondary reader over the `ms-stream` response.
    fn open_ms_stream(&self) -> Option<BoxStream<'static, MsStreamEvent>> {
        None
    }

    /// Stop the underlying request.
    fn abort(&self) {}
}
