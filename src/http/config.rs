//! Response stream configuration.

/// Default capacity of the lifecycle event channel.
pub const DEFAULT_EVENT_CAPACITY: usize = 16;

/// Settings injected into every [`ResponseStream`](crate::http::ResponseStream)
/// at construction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StreamConfig {
    /// Whether the legacy transport can override the response MIME type.
    /// When it can, text mode reads `x-user-defined` text and recovers raw
    /// bytes from it (default: true).
    pub override_mime_type: bool,
    /// Capacity of the broadcast channel carrying lifecycle events (default: 16).
    pub event_capacity: usize,
}

impl Default for StreamConfig {
    fn default() -> Self {
        Self {
            override_mime_type: true,
            event_capacity: DEFAULT_EVENT_CAPACITY,
        }
    }
}

impl StreamConfig {
    /// Create a new config with defaults.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set MIME type override support.
    pub fn override_mime_type(mut self, supported: bool) -> Self {
        self.override_mime_type = supported;
        self
    }

    /// Set event channel capacity. Clamped to at least 1.
    pub fn event_capacity(mut self, capacity: usize) -> Self {
        self.event_capacity = capacity.max(1);
        self
    }
}
