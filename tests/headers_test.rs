use respbridge::http::headers::{FieldValue, HeaderNormalizer};

#[test]
fn test_duplicate_headers_normalize() {
    let (headers, raw) = HeaderNormalizer::from_pairs([
        ("Set-Cookie", "a=1"),
        ("Set-Cookie", "b=2"),
        ("X-Foo", "x"),
        ("X-Foo", "y"),
    ]);

    assert_eq!(
        headers.get("set-cookie"),
        Some(&FieldValue::List(vec!["a=1".into(), "b=2".into()]))
    );
    assert_eq!(headers.get("x-foo"), Some(&FieldValue::Single("x, y".into())));
    assert_eq!(headers.len(), 2);
    assert_eq!(raw.len(), 8);
}

#[test]
fn test_raw_block_matches_pairs() {
    let block = "Set-Cookie: a=1\r\nSet-Cookie: b=2\r\nX-Foo: x\r\nX-Foo: y\r\n";
    let from_block = HeaderNormalizer::from_raw_block(block);
    let from_pairs = HeaderNormalizer::from_pairs([
        ("Set-Cookie", "a=1"),
        ("Set-Cookie", "b=2"),
        ("X-Foo", "x"),
        ("X-Foo", "y"),
    ]);
    assert_eq!(from_block, from_pairs);
}

#[test]
fn test_raw_headers_reproduce_input() {
    let input = [
        ("Content-Type", "text/html"),
        ("x-LOWER-upper", "MiXeD"),
        ("Set-Cookie", "id=1; Path=/"),
        ("content-type", "charset=utf-8"),
    ];
    let (_, raw) = HeaderNormalizer::from_pairs(input);

    assert_eq!(raw.len() % 2, 0);
    let pairs: Vec<_> = raw.pairs().collect();
    assert_eq!(pairs, input.to_vec());
}

#[test]
fn test_join_keeps_encounter_order_across_casing() {
    let (headers, _) =
        HeaderNormalizer::from_pairs([("Via", "1.1 a"), ("VIA", "1.1 b"), ("via", "1.1 c")]);
    assert_eq!(headers.get_str("Via"), Some("1.1 a, 1.1 b, 1.1 c"));
}

#[test]
fn test_set_cookie_values_are_not_joined() {
    let (headers, _) = HeaderNormalizer::from_pairs([
        ("set-cookie", "a=1; Expires=Wed, 21 Oct 2015 07:28:00 GMT"),
        ("SET-COOKIE", "b=2"),
    ]);
    assert_eq!(
        headers.get_all("Set-Cookie"),
        vec!["a=1; Expires=Wed, 21 Oct 2015 07:28:00 GMT", "b=2"]
    );
}

#[test]
fn test_malformed_lines_are_skipped() {
    let (headers, raw) = HeaderNormalizer::from_raw_block(
        "HTTP/1.1 200 OK\r\nno-colon\r\n\r\nGood: yes\r\n:empty-name\r\n",
    );
    assert_eq!(headers.get_str("good"), Some("yes"));
    assert_eq!(headers.len(), 1);
    assert_eq!(raw.as_slice(), ["Good", "yes"]);
}
