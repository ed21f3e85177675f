//! # respbridge
//!
//! Adapts client-side HTTP transports into one response byte stream.
//!
//! `respbridge` takes an already-initiated response from either a streaming
//! transport (an asynchronous chunk reader) or a legacy polling transport
//! (a request object that only reports progress and exposes accumulated
//! values) and republishes it as a [`ResponseStream`]: status line,
//! normalized headers, and a `futures::Stream` of body chunks with
//! end-of-stream and deferred close notifications.
//!
//! ## Features
//!
//! - **Header Normalization**: case-insensitive map plus raw pairs, `set-cookie` kept as a list
//! - **Streaming Transport**: any `http_body::Body`, including `hyper::body::Incoming`
//! - **Legacy Transport**: `text`, `text:fallback-array`, `arraybuffer`,
//!   `chunked-arraybuffer` and `ms-stream` delivery modes
//! - **Lifecycle Events**: `End`, `Error` and a deferred `Close`
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use futures::StreamExt;
//! use respbridge::{FetchResponse, ResponseStream, StreamConfig};
//!
//! #[tokio::main]
//! async fn main() {
//!     let fetch = FetchResponse::from_http("https://example.com/", response);
//!     let mut stream = ResponseStream::from_fetch(fetch, &StreamConfig::default());
//!     println!("Status: {}", stream.status_code);
//!     while let Some(chunk) = stream.next().await {
//!         println!("{} bytes", chunk.len());
//!     }
//! }
//! ```
//!
//! ## Modules
//!
//! - [`base`] - Core types and error definitions
//! - [`http`] - Headers, charset, configuration and the response stream
//! - [`transport`] - Streaming and polling transport adapters

pub mod base;
pub mod http;
pub mod transport;

// Re-exports for convenience
pub use base::neterror::NetError;
pub use base::readystate::ReadyState;
pub use crate::http::{ResponseStream, StreamConfig, StreamEvent};
pub use transport::{FetchResponse, LegacyTransport, ProgressEvent, ResponseMode};
