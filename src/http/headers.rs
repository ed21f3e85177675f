//! Response header normalization.
//!
//! Transports hand over headers either as `(name, value)` pairs or as one raw
//! `"Name: value\r\n"` block. Both are folded into a case-insensitive
//! [`Headers`] map plus an order-preserving [`RawHeaders`] list.

use http::header::{HeaderName, HeaderValue};
use http::HeaderMap;

/// The only header whose repeated occurrences are kept as a list.
const SET_COOKIE: &str = "set-cookie";

/// Value stored under a normalized header name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldValue {
    /// A single header value, or repeated values joined with `", "`.
    Single(String),
    /// Every `set-cookie` occurrence in arrival order.
    List(Vec<String>),
}

impl FieldValue {
    /// The value as one string. `None` for lists.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            FieldValue::Single(v) => Some(v.as_str()),
            FieldValue::List(_) => None,
        }
    }

    /// All values, one per occurrence for lists.
    pub fn values(&self) -> Vec<&str> {
        match self {
            FieldValue::Single(v) => vec![v.as_str()],
            FieldValue::List(list) => list.iter().map(String::as_str).collect(),
        }
    }
}

impl From<&str> for FieldValue {
    fn from(value: &str) -> Self {
        FieldValue::Single(value.to_string())
    }
}

impl From<Vec<&str>> for FieldValue {
    fn from(values: Vec<&str>) -> Self {
        FieldValue::List(values.into_iter().map(str::to_string).collect())
    }
}

/// Case-insensitive header map keyed by lowercase names.
/// Iteration follows the order in which each name was first seen.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Headers {
    entries: Vec<(String, FieldValue)>,
}

impl Headers {
    pub fn new() -> Self {
        Self {
            entries: Vec::new(),
        }
    }

    /// Fold one header into the map.
    fn append(&mut self, name: &str, value: &str) {
        let key = name.to_ascii_lowercase();

        // Only set-cookie is ever stored as a list.
        match self.entries.iter_mut().find(|(n, _)| *n == key) {
            Some((_, FieldValue::List(list))) => list.push(value.to_string()),
            Some((_, FieldValue::Single(existing))) => {
                existing.push_str(", ");
                existing.push_str(value);
            }
            None if key == SET_COOKIE => self
                .entries
                .push((key, FieldValue::List(vec![value.to_string()]))),
            None => self
                .entries
                .push((key, FieldValue::Single(value.to_string()))),
        }
    }

    /// Case-insensitive lookup.
    pub fn get(&self, name: &str) -> Option<&FieldValue> {
        self.entries
            .iter()
            .find(|(n, _)| n.eq_ignore_ascii_case(name))
            .map(|(_, v)| v)
    }

    /// Case-insensitive lookup of a single-valued header.
    pub fn get_str(&self, name: &str) -> Option<&str> {
        self.get(name).and_then(FieldValue::as_str)
    }

    /// All values stored under `name`; empty if absent.
    pub fn get_all(&self, name: &str) -> Vec<&str> {
        self.get(name).map(FieldValue::values).unwrap_or_default()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    /// Number of distinct header names.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &FieldValue)> {
        self.entries.iter().map(|(n, v)| (n.as_str(), v))
    }
}

/// Flat `[name, value, name, value, ...]` list in arrival order and casing.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RawHeaders {
    items: Vec<String>,
}

impl RawHeaders {
    pub fn new() -> Self {
        Self { items: Vec::new() }
    }

    fn push(&mut self, name: &str, value: &str) {
        self.items.push(name.to_string());
        self.items.push(value.to_string());
    }

    /// Length of the flat list. Always even.
    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn as_slice(&self) -> &[String] {
        &self.items
    }

    /// Rebuild the original `(name, value)` sequence.
    pub fn pairs(&self) -> impl Iterator<Item = (&str, &str)> {
        self.items
            .chunks_exact(2)
            .map(|pair| (pair[0].as_str(), pair[1].as_str()))
    }

    /// Convert to a standard `http::HeaderMap`, appending every occurrence.
    /// Names or values `http` rejects are skipped.
    pub fn to_header_map(&self) -> HeaderMap {
        let mut map = HeaderMap::with_capacity(self.items.len() / 2);
        for (name, value) in self.pairs() {
            match (
                HeaderName::from_bytes(name.as_bytes()),
                HeaderValue::from_str(value),
            ) {
                (Ok(name), Ok(value)) => {
                    map.append(name, value);
                }
                _ => tracing::debug!(header = %name, "skipping header rejected by http"),
            }
        }
        map
    }
}

/// Builds [`Headers`] and [`RawHeaders`] together so both always describe
/// the same input.
#[derive(Debug, Clone, Default)]
pub struct HeaderNormalizer {
    headers: Headers,
    raw: RawHeaders,
}

impl HeaderNormalizer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record one header occurrence.
    pub fn append(&mut self, name: &str, value: &str) {
        self.headers.append(name, value);
        self.raw.push(name, value);
    }

    /// Normalize `(name, value)` pairs from the streaming transport.
    pub fn from_pairs<I, N, V>(pairs: I) -> (Headers, RawHeaders)
    where
        I: IntoIterator<Item = (N, V)>,
        N: AsRef<str>,
        V: AsRef<str>,
    {
        let mut normalizer = Self::new();
        for (name, value) in pairs {
            normalizer.append(name.as_ref(), value.as_ref());
        }
        normalizer.finish()
    }

    /// Normalize the raw header block of the legacy transport.
    /// Lines without a `name:` prefix are skipped.
    pub fn from_raw_block(block: &str) -> (Headers, RawHeaders) {
        let mut normalizer = Self::new();
        for line in block.split('\n') {
            let line = line.strip_suffix('\r').unwrap_or(line);
            if let Some((name, value)) = parse_header_line(line) {
                normalizer.append(name, value);
            }
        }
        normalizer.finish()
    }

    pub fn finish(self) -> (Headers, RawHeaders) {
        (self.headers, self.raw)
    }
}

/// Split `"Name: value"` into its parts. Leading whitespace of the value is
/// dropped; the name must be non-empty.
pub fn parse_header_line(line: &str) -> Option<(&str, &str)> {
    let (name, value) = line.split_once(':')?;
    if name.is_empty() {
        return None;
    }
    Some((name, value.trim_start()))
}
