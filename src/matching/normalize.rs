//! Canonical forms used to compare a live request with a stored one.
//!
//! Every normalization here erases input ordering (pair order, header
//! order, key order) but keeps every value intact.

use std::collections::BTreeMap;

use serde_json::Value;

use crate::body::{Body, Payload};
use crate::headers::Headers;
use crate::json;

/// Query parameters as name to sorted values.
pub type NormalizedQuery = BTreeMap<String, Vec<String>>;

/// Headers as lowercase name to sorted values.
pub type NormalizedHeaders = BTreeMap<String, Vec<String>>;

/// Parses a raw query string, percent-decoding names and values.
///
/// Repeated names keep every value, so `a=1&a=1` and `a=1` differ.
#[must_use]
pub fn query(raw: &str) -> NormalizedQuery {
    let raw = raw.strip_prefix('?').unwrap_or(raw);
    let mut params = NormalizedQuery::new();
    for (name, value) in url::form_urlencoded::parse(raw.as_bytes()) {
        params.entry(name.into_owned()).or_default().push(value.into_owned());
    }
    for values in params.values_mut() {
        values.sort_unstable();
    }
    params
}

/// Lowercases names, merges case variants of the same name and sorts values.
#[must_use]
pub fn headers(headers: &Headers) -> NormalizedHeaders {
    let mut normalized = NormalizedHeaders::new();
    for (name, values) in headers {
        normalized
            .entry(name.to_ascii_lowercase())
            .or_default()
            .extend(values.iter().cloned());
    }
    for values in normalized.values_mut() {
        values.sort_unstable();
    }
    normalized
}

/// Methods compare without regard to case.
#[must_use]
pub fn methods_equal(left: &str, right: &str) -> bool {
    left.eq_ignore_ascii_case(right)
}

/// Compares a stored body with a live payload.
///
/// When both sides parse as JSON they compare structurally with object keys
/// sorted and arrays elementwise; otherwise the decoded bytes must be identical.
#[must_use]
pub fn bodies_equal(stored: &Body, live: &Payload) -> bool {
    let stored_bytes = stored.to_bytes();
    let live_bytes = live.to_bytes();
    match (as_json(stored, &stored_bytes), as_json_payload(live, &live_bytes)) {
        (Some(left), Some(right)) => json::sort_keys(left) == json::sort_keys(right),
        _ => stored_bytes[..] == live_bytes[..],
    }
}

fn as_json(body: &Body, bytes: &[u8]) -> Option<Value> {
    match body {
        Body::Json(value) => Some(value.clone()),
        Body::Text(_) | Body::Blob(_) => serde_json::from_slice(bytes).ok(),
    }
}

fn as_json_payload(payload: &Payload, bytes: &[u8]) -> Option<Value> {
    match payload {
        Payload::Structured(value) => Some(value.clone()),
        Payload::Empty | Payload::Bytes(_) => serde_json::from_slice(bytes).ok(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::headers;
    use serde_json::json;

    #[test]
    fn query_ignores_pair_order() {
        assert_eq!(query("b=2&a=1&a=0"), query("a=0&b=2&a=1"));
        assert_eq!(query("?x=1"), query("x=1"));
        assert_ne!(query("a=1"), query("a=2"));
    }

    #[test]
    fn query_decodes_and_keeps_duplicates() {
        let parsed = query("q=hello+world&tag=a%26b&tag=a%26b&flag");
        assert_eq!(parsed["q"], vec!["hello world"]);
        assert_eq!(parsed["tag"], vec!["a&b", "a&b"]);
        assert_eq!(parsed["flag"], vec![""]);
        assert_ne!(query("a=1&a=1"), query("a=1"));
    }

    #[test]
    fn empty_query_is_empty_map() {
        assert!(query("").is_empty());
    }

    #[test]
    fn headers_ignore_name_case_and_order() {
        let mut left = Headers::new();
        headers::append(&mut left, "Accept", "text/html");
        headers::append(&mut left, "accept", "application/json");
        headers::append(&mut left, "X-Trace", "1");

        let mut right = Headers::new();
        headers::append(&mut right, "x-trace", "1");
        headers::append(&mut right, "ACCEPT", "application/json");
        headers::append(&mut right, "ACCEPT", "text/html");

        assert_eq!(super::headers(&left), super::headers(&right));
    }

    #[test]
    fn header_values_are_case_sensitive() {
        let mut left = Headers::new();
        headers::append(&mut left, "Authorization", "Bearer ABC");
        let mut right = Headers::new();
        headers::append(&mut right, "authorization", "Bearer abc");
        assert_ne!(super::headers(&left), super::headers(&right));
    }

    #[test]
    fn json_bodies_compare_structurally() {
        let stored = Body::Json(json!({"a": 1, "b": [1, 2]}));
        assert!(bodies_equal(&stored, &Payload::from(r#"{"b":[1,2],"a":1}"#)));
        assert!(bodies_equal(&stored, &Payload::from(json!({"b": [1, 2], "a": 1}))));
        assert!(!bodies_equal(&stored, &Payload::from(r#"{"a":1,"b":[2,1]}"#)));
        assert!(!bodies_equal(&stored, &Payload::from(r#"{"a":"1","b":[1,2]}"#)));
    }

    #[test]
    fn text_stored_json_still_compares_structurally() {
        let stored = Body::Text(r#"{"x": true, "y": null}"#.into());
        assert!(bodies_equal(&stored, &Payload::from(r#"{"y":null,"x":true}"#)));
    }

    #[test]
    fn non_json_bodies_compare_exactly() {
        assert!(bodies_equal(&Body::Text("a=1&b=2".into()), &Payload::from("a=1&b=2")));
        assert!(!bodies_equal(&Body::Text("a=1&b=2".into()), &Payload::from("b=2&a=1")));
        assert!(bodies_equal(&Body::Blob(vec![0, 159, 146]), &Payload::from(vec![0, 159, 146])));
        assert!(bodies_equal(&Body::default(), &Payload::Empty));
        assert!(!bodies_equal(&Body::default(), &Payload::from("x")));
    }
}
