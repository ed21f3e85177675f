//! Ergonomic error context helpers.
//!
//! Provides an extension trait for converting transport body errors into
//! `NetError` while logging the underlying cause.

use crate::base::neterror::NetError;
use std::fmt::Display;

/// Extension trait for adding context to body read Results.
pub trait BodyResultExt<T> {
    /// Map a body read failure to [`NetError::HttpBodyError`].
    ///
    /// # Example
    /// ```ignore
    /// use respbridge::base::context::BodyResultExt;
    ///
    /// let frame = frame.body_context("https://example.com/a.bin")?;
    /// ```
    fn body_context(self, url: &str) -> Result<T, NetError>;
}

impl<T, E: Display> BodyResultExt<T> for Result<T, E> {
    fn body_context(self, url: &str) -> Result<T, NetError> {
        self.map_err(|e| {
            tracing::debug!(url = %url, error = %e, "response body read failed");
            NetError::HttpBodyError
        })
    }
}
