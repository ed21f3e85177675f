//! Header Stress Tests
//!
//! Covers:
//! - `Headers` joining with large repeat counts
//! - `RawHeaders` exact casing and order retention with large blocks

use respbridge::http::headers::HeaderNormalizer;

#[test]
fn test_many_distinct_headers() {
    let count = 1000;
    let block: String = (0..count).map(|i| format!("X-{}: value\r\n", i)).collect();

    let (headers, raw) = HeaderNormalizer::from_raw_block(&block);
    assert_eq!(headers.len(), count);
    assert_eq!(raw.len(), count * 2);

    // Volume must not lose data or order.
    for (i, (name, value)) in raw.pairs().enumerate() {
        assert_eq!(name, format!("X-{}", i));
        assert_eq!(value, "value");
    }
    assert_eq!(raw.to_header_map().len(), count);
}

#[test]
fn test_many_repeats_of_one_header() {
    let count = 500;
    let pairs: Vec<_> = (0..count)
        .map(|i| ("Warning".to_string(), i.to_string()))
        .collect();
    let (headers, _) = HeaderNormalizer::from_pairs(pairs);

    let joined = headers.get_str("warning").unwrap();
    let parts: Vec<_> = joined.split(", ").collect();
    assert_eq!(parts.len(), count);
    assert_eq!(parts[0], "0");
    assert_eq!(parts[count - 1], (count - 1).to_string());
}

#[test]
fn test_many_set_cookies() {
    let count = 300;
    let pairs: Vec<_> = (0..count)
        .map(|i| ("Set-Cookie".to_string(), format!("c{}=v", i)))
        .collect();
    let (headers, _) = HeaderNormalizer::from_pairs(pairs);
    let cookies = headers.get_all("set-cookie");
    assert_eq!(cookies.len(), count);
    assert_eq!(cookies[42], "c42=v");
}

#[test]
fn test_mixed_case_names_kept_exactly() {
    let (headers, raw) = HeaderNormalizer::from_pairs([
        ("Content-Type", "json"),
        ("User-AGENT", "test"),
        ("x-custom-HEADER", "val"),
    ]);

    let stored: Vec<_> = raw.pairs().map(|(k, _)| k).collect();
    assert_eq!(stored, ["Content-Type", "User-AGENT", "x-custom-HEADER"]);

    let keys: Vec<_> = headers.iter().map(|(k, _)| k).collect();
    assert_eq!(keys, ["content-type", "user-agent", "x-custom-header"]);
}
