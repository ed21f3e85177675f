//! Transport adapters.
//!
//! - [`fetch`]: streaming transport with an asynchronous chunk reader
//! - [`legacy`]: interface of the polling transport
//! - [`extract`]: per-mode extraction for the polling transport
//! - [`polling`]: adapter driving the polling transport

pub mod extract;
pub mod fetch;
pub mod legacy;
pub mod polling;

pub use extract::ResponseMode;
pub use fetch::{FetchResponse, StreamingAdapter};
pub use legacy::{LegacyTransport, MsStreamEvent, ProgressEvent};
pub use polling::PollingAdapter;
