//! Base types and error handling.
//!
//! Provides foundational types shared by every transport:
//! - [`NetError`](neterror::NetError): Network error codes in the style of `net_error_list.h`
//! - [`ReadyState`](readystate::ReadyState): Progress states of the legacy polling transport

pub mod context;
pub mod neterror;
pub mod readystate;
