//! Charset selection for legacy `text` mode.
//!
//! The polling transport only exposes the body as text. When the platform
//! lets us force `x-user-defined`, every char carries one raw byte in its low
//! eight bits. Otherwise the text was already decoded by the platform and we
//! re-encode it with the charset the server announced.

use crate::http::config::StreamConfig;
use crate::http::headers::Headers;
use bytes::Bytes;
use encoding_rs::{Encoding, UTF_8};
use std::fmt;

/// Byte-preserving pseudo charset.
pub const USER_DEFINED: &str = "x-user-defined";

/// Fallback when the override is unavailable and the server sent no charset.
pub const BEST_GUESS: &str = "utf-8";

/// Charset used to turn `text` mode slices back into bytes.
#[derive(Clone, PartialEq, Eq, Default)]
pub enum Charset {
    /// Each char is masked to its low 8 bits.
    #[default]
    UserDefined,
    /// Encode with the named encoding.
    Label {
        label: String,
        encoding: &'static Encoding,
    },
}

impl Charset {
    /// Resolve a charset label. Unknown labels encode as UTF-8.
    pub fn from_label(label: &str) -> Self {
        let label = label.trim().to_ascii_lowercase();
        if label == USER_DEFINED {
            return Charset::UserDefined;
        }
        let encoding = Encoding::for_label(label.as_bytes()).unwrap_or_else(|| {
            tracing::debug!(charset = %label, "unknown charset label, encoding as utf-8");
            UTF_8
        });
        Charset::Label { label, encoding }
    }

    /// The label as announced (lowercased).
    pub fn label(&self) -> &str {
        match self {
            Charset::UserDefined => USER_DEFINED,
            Charset::Label { label, .. } => label,
        }
    }

    /// Turn a text slice into body bytes.
    pub fn encode(&self, text: &str) -> Bytes {
        match self {
            Charset::UserDefined => text.chars().map(|c| (c as u32 & 0xff) as u8).collect(),
            Charset::Label { label, encoding } => {
                let (bytes, _, had_unmappable) = encoding.encode(text);
                if had_unmappable {
                    tracing::debug!(
                        charset = %label,
                        "unmappable characters encoded as numeric character references"
                    );
                }
                Bytes::copy_from_slice(&bytes)
            }
        }
    }
}

impl fmt::Debug for Charset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Charset({})", self.label())
    }
}

impl fmt::Display for Charset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Picks the charset for a legacy response once, at construction.
pub struct CharsetResolver;

impl CharsetResolver {
    /// `x-user-defined` when the platform supports overriding the MIME type.
    /// Otherwise the `charset` parameter of `Content-Type`, or `utf-8`.
    pub fn resolve(config: &StreamConfig, headers: &Headers) -> Charset {
        if config.override_mime_type {
            return Charset::UserDefined;
        }

        match headers.get_str("content-type").and_then(charset_param) {
            Some(label) => Charset::from_label(&label),
            None => Charset::from_label(BEST_GUESS),
        }
    }
}

/// Extract the lowercased `charset` parameter of a MIME type.
pub fn charset_param(content_type: &str) -> Option<String> {
    let mime: mime::Mime = content_type.parse().ok()?;
    mime.get_param(mime::CHARSET)
        .map(|charset| charset.as_str().to_ascii_lowercase())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::http::headers::HeaderNormalizer;

    fn headers(content_type: &str) -> Headers {
        HeaderNormalizer::from_pairs([("Content-Type", content_type)]).0
    }

    #[test]
    fn test_override_supported_uses_user_defined() {
        let config = StreamConfig::default();
        let charset = CharsetResolver::resolve(&config, &headers("text/plain; charset=latin1"));
        assert_eq!(charset, Charset::UserDefined);
    }

    #[test]
    fn test_header_charset_when_override_unsupported() {
        let config = StreamConfig::new().override_mime_type(false);
        let charset =
            CharsetResolver::resolve(&config, &headers("text/html; charset=ISO-8859-1"));
        assert_eq!(charset.label(), "iso-8859-1");
    }

    #[test]
    fn test_best_guess_without_charset() {
        let config = StreamConfig::new().override_mime_type(false);
        let charset = CharsetResolver::resolve(&config, &headers("application/octet-stream"));
        assert_eq!(charset.label(), BEST_GUESS);
        let charset = CharsetResolver::resolve(&config, &Headers::new());
        assert_eq!(charset.label(), BEST_GUESS);
    }

    #[test]
    fn test_user_defined_masks_low_byte() {
        let text: String = ['\u{f780}', 'A', '\u{f7ff}'].iter().collect();
        assert_eq!(Charset::UserDefined.encode(&text).as_ref(), &[0x80, b'A', 0xff]);
    }

    #[test]
    fn test_label_encoding() {
        let latin1 = Charset::from_label("windows-1252");
        assert_eq!(latin1.encode("caf\u{e9}").as_ref(), b"caf\xe9");
        assert_eq!(Charset::from_label("utf-8").encode("\u{e9}").as_ref(), "\u{e9}".as_bytes());
    }

    #[test]
    fn test_unmappable_becomes_numeric_reference() {
        let latin1 = Charset::from_label("windows-1252");
        assert_eq!(latin1.encode("a\u{101}").as_ref(), b"a&#257;");
    }

    #[test]
    fn test_unknown_label_falls_back_to_utf8() {
        let charset = Charset::from_label("no-such-charset");
        assert_eq!(charset.label(), "no-such-charset");
        assert_eq!(charset.encode("ok").as_ref(), b"ok");
    }

    #[test]
    fn test_charset_param() {
        assert_eq!(charset_param("text/plain;charset=UTF-8").as_deref(), Some("utf-8"));
        assert_eq!(charset_param("text/plain"), None);
        assert_eq!(charset_param("not a mime"), None);
    }
}
