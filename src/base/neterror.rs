use thiserror::Error;

/// Network error codes.
///
/// Standard variants keep the numeric value Chromium assigns in
/// `net_error_list.h`; codes specific to this crate live in the `-10000`
/// range so they never collide with upstream codes.
#[derive(Debug, Error, PartialEq, Eq, Clone, Copy)]
pub enum NetError {
    // Generic Errors
    #[error("Generic failure")]
    Failed,
    #[error("Operation aborted")]
    Aborted,
    #[error("Invalid argument")]
    InvalidArgument,
    #[error("Not implemented")]
    NotImplemented,

    // Connection Errors
    #[error("Connection closed (TCP FIN)")]
    ConnectionClosed,
    #[error("Connection reset (TCP RST)")]
    ConnectionReset,
    #[error("Connection aborted")]
    ConnectionAborted,
    #[error("Connection failed")]
    ConnectionFailed,

    // HTTP Errors
    #[error("Invalid URL")]
    InvalidUrl,
    #[error("Invalid response")]
    InvalidResponse,
    #[error("Empty response")]
    EmptyResponse,
    #[error("Content decoding failed")]
    ContentDecodingFailed,
    #[error("Incomplete chunked encoding")]
    IncompleteChunkedEncoding,

    // Custom Errors
    #[error("Response body read failed")]
    HttpBodyError,
    #[error("Response body is not valid UTF-8")]
    InvalidUtf8,
    #[error("Response body is not valid JSON")]
    JsonParseError,
    #[error("Response body already consumed")]
    BodyConsumed,

    #[error("Unknown error: {0}")]
    Unknown(i32),
}

impl NetError {
    pub fn as_i32(&self) -> i32 {
        match self {
            NetError::Failed => -2,
            NetError::Aborted => -3,
            NetError::InvalidArgument => -4,
            NetError::NotImplemented => -11,

            NetError::ConnectionClosed => -100,
            NetError::ConnectionReset => -101,
            NetError::ConnectionAborted => -103,
            NetError::ConnectionFailed => -104,

            NetError::InvalidUrl => -300,
            NetError::InvalidResponse => -320,
            NetError::EmptyResponse => -324,
            NetError::ContentDecodingFailed => -330,
            NetError::IncompleteChunkedEncoding => -355,

            NetError::HttpBodyError => -10000,
            NetError::InvalidUtf8 => -10001,
            NetError::JsonParseError => -10002,
            NetError::BodyConsumed => -10003,

            NetError::Unknown(code) => *code,
        }
    }

    /// Whether the error ended the stream because the consumer or owner gave up,
    /// as opposed to a transport failure.
    pub fn is_abort(&self) -> bool {
        matches!(self, NetError::Aborted | NetError::ConnectionAborted)
    }
}

impl From<i32> for NetError {
    fn from(code: i32) -> Self {
        match code {
            -2 => NetError::Failed,
            -3 => NetError::Aborted,
            -4 => NetError::InvalidArgument,
            -11 => NetError::NotImplemented,

            -100 => NetError::ConnectionClosed,
            -101 => NetError::ConnectionReset,
            -103 => NetError::ConnectionAborted,
            -104 => NetError::ConnectionFailed,

            -300 => NetError::InvalidUrl,
            -320 => NetError::InvalidResponse,
            -324 => NetError::EmptyResponse,
            -330 => NetError::ContentDecodingFailed,
            -355 => NetError::IncompleteChunkedEncoding,

            -10000 => NetError::HttpBodyError,
            -10001 => NetError::InvalidUtf8,
            -10002 => NetError::JsonParseError,
            -10003 => NetError::BodyConsumed,
            _ => NetError::Unknown(code),
        }
    }
}
