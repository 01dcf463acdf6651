//! Regex substitution over stored fields and bodies.

use std::borrow::Cow;

use regex::Regex;
use serde_json::Value;

use crate::body::Body;
use crate::json;

/// A compiled `(pattern, replacement)` pair.
///
/// The replacement uses `regex` expansion syntax, so `$1` or `${name}`
/// refer to capture groups.
#[derive(Debug, Clone)]
pub struct PatternFilter {
    text: Regex,
    bytes: regex::bytes::Regex,
    replacement: String,
}

impl PatternFilter {
    /// Compiles `pattern`.
    ///
    /// # Errors
    ///
    /// Returns an error if `pattern` is not a valid regular expression.
    pub fn new(pattern: &str, replacement: impl Into<String>) -> Result<Self, regex::Error> {
        Ok(Self {
            text: Regex::new(pattern)?,
            bytes: regex::bytes::Regex::new(pattern)?,
            replacement: replacement.into(),
        })
    }

    /// The source pattern.
    #[must_use]
    pub fn pattern(&self) -> &str {
        self.text.as_str()
    }

    /// The replacement template.
    #[must_use]
    pub fn replacement(&self) -> &str {
        &self.replacement
    }

    /// Substitutes every match in `input`.
    #[must_use]
    pub fn apply_str<'a>(&self, input: &'a str) -> Cow<'a, str> {
        self.text.replace_all(input, self.replacement.as_str())
    }

    /// Substitutes every match in a stored body, whatever its type.
    ///
    /// JSON bodies are first filtered through their canonical serialization so
    /// patterns can span keys and values. If that form does not match, or the
    /// substituted text no longer parses, each string leaf is filtered instead.
    /// Blob bytes are filtered in place.
    #[must_use]
    pub fn apply_body(&self, body: Body) -> Body {
        match body {
            Body::Text(text) => Body::Text(self.apply_str(&text).into_owned()),
            Body::Blob(bytes) => {
                Body::Blob(self.bytes.replace_all(&bytes, self.replacement.as_bytes()).into_owned())
            }
            Body::Json(value) => Body::Json(self.apply_json(value)),
        }
    }

    fn apply_json(&self, mut value: Value) -> Value {
        let canonical = json::canonical_string(&value);
        if self.text.is_match(&canonical) {
            let substituted = self.apply_str(&canonical);
            match serde_json::from_str(&substituted) {
                Ok(reparsed) => return reparsed,
                Err(err) => {
                    tracing::debug!(
                        pattern = %self.pattern(),
                        error = %err,
                        "substitution broke the JSON body, filtering string leaves instead"
                    );
                }
            }
        }
        json::map_strings(&mut value, |leaf| {
            self.text.is_match(leaf).then(|| self.apply_str(leaf).into_owned())
        });
        value
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn rejects_invalid_patterns() {
        assert!(PatternFilter::new("(unclosed", "x").is_err());
    }

    #[test]
    fn replaces_in_text_with_capture_groups() {
        let filter = PatternFilter::new(r"key=(\w)\w+", "key=${1}***").unwrap();
        assert_eq!(filter.apply_str("a=1&key=secret&b=2"), "a=1&key=s***&b=2");
        assert_eq!(filter.apply_body(Body::Text("key=abc".into())), Body::Text("key=a***".into()));
    }

    #[test]
    fn json_bodies_are_filtered_through_canonical_form() {
        let filter = PatternFilter::new(r#""token":"[^"]+""#, r#""token":"<REDACTED>""#).unwrap();
        let body = Body::Json(json!({"user": "ann", "token": "abc123"}));
        assert_eq!(
            filter.apply_body(body),
            Body::Json(json!({"user": "ann", "token": "<REDACTED>"}))
        );
    }

    #[test]
    fn json_leaves_are_filtered_when_canonical_form_does_not_match() {
        let filter = PatternFilter::new(r"^sk-\w+$", "sk-***").unwrap();
        let body = Body::Json(json!({"keys": ["sk-live1", "pk-x"], "nested": {"k": "sk-test"}}));
        assert_eq!(
            filter.apply_body(body),
            Body::Json(json!({"keys": ["sk-***", "pk-x"], "nested": {"k": "sk-***"}}))
        );
    }

    #[test]
    fn broken_substitution_falls_back_to_leaves() {
        // Matches the canonical text but the result would not parse.
        let filter = PatternFilter::new(r"secret", "\"").unwrap();
        let body = Body::Json(json!({"value": "my secret"}));
        assert_eq!(filter.apply_body(body), Body::Json(json!({"value": "my \""})));
    }

    #[test]
    fn blob_bodies_are_filtered_as_bytes() {
        let filter = PatternFilter::new("password", "********").unwrap();
        let mut bytes = vec![0xff, 0x00];
        bytes.extend_from_slice(b"password");
        bytes.push(0xfe);
        let filtered = filter.apply_body(Body::Blob(bytes));
        let mut expected = vec![0xff, 0x00];
        expected.extend_from_slice(b"********");
        expected.push(0xfe);
        assert_eq!(filtered, Body::Blob(expected));
    }
}
