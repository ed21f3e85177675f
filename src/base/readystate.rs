use crate::base::neterror::NetError;
use std::fmt;

/// Progress of a legacy request object.
/// Values match the `readyState` codes of the polling transport.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
#[repr(u8)]
pub enum ReadyState {
    /// The request has not been opened.
    #[default]
    Unsent = 0,

    /// The request has been opened but not sent.
    Opened = 1,

    /// Status line and headers are available.
    HeadersReceived = 2,

    /// The body is being received.
    Loading = 3,

    /// The response is complete (or failed).
    Done = 4,
}

impl ReadyState {
    pub const ALL: [ReadyState; 5] = [
        ReadyState::Unsent,
        ReadyState::Opened,
        ReadyState::HeadersReceived,
        ReadyState::Loading,
        ReadyState::Done,
    ];

    pub fn as_u8(self) -> u8 {
        self as u8
    }

    /// Whether status line and headers can be read in this state.
    pub fn has_headers(self) -> bool {
        self >= ReadyState::HeadersReceived
    }
}

impl TryFrom<u8> for ReadyState {
    type Error = NetError;

    fn try_from(code: u8) -> Result<Self, Self::Error> {
        match code {
            0 => Ok(ReadyState::Unsent),
            1 => Ok(ReadyState::Opened),
            2 => Ok(ReadyState::HeadersReceived),
            3 => Ok(ReadyState::Loading),
            4 => Ok(ReadyState::Done),
            _ => Err(NetError::InvalidArgument),
        }
    }
}

impl fmt::Display for ReadyState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ReadyState::Unsent => "UNSENT",
            ReadyState::Opened => "OPENED",
            ReadyState::HeadersReceived => "HEADERS_RECEIVED",
            ReadyState::Loading => "LOADING",
            ReadyState::Done => "DONE",
        };
        f.write_str(name)
    }
}
