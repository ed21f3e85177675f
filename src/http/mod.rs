pub mod charset;
pub mod config;
pub mod headers;
pub mod response;
pub mod responsebody;

// Re-exports for convenience
pub use config::StreamConfig;
pub use headers::{FieldValue, HeaderNormalizer, Headers, RawHeaders};
pub use response::ResponseStream;
pub use responsebody::{BodySink, BodyStream, StreamEvent};
