//! Body codec: classifies payloads as json, text or blob and converts them
//! between their wire form (raw bytes) and their cassette form.
//!
//! JSON bodies are stored as the decoded structure so cassettes stay
//! readable and diffable; blobs are stored as standard base64.

use std::borrow::Cow;

use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::headers::{self, Headers};
use crate::json;

/// Storage classification of a body.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BodyType {
    /// Structured JSON, stored under `body_json`.
    Json,
    /// UTF-8 text, stored under `body`.
    Text,
    /// Arbitrary bytes, stored base64-encoded under `body_blob`.
    Blob,
}

impl BodyType {
    /// Lowercase name as written to cassettes.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Json => "json",
            Self::Text => "text",
            Self::Blob => "blob",
        }
    }
}

/// A live body as handed over by the interception layer.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum Payload {
    /// No body at all.
    #[default]
    Empty,
    /// Raw bytes as they travel on the wire.
    Bytes(Vec<u8>),
    /// A body the caller already holds as a JSON value.
    Structured(Value),
}

impl Payload {
    /// Wire bytes of this payload. Structured payloads serialize with sorted keys.
    #[must_use]
    pub fn to_bytes(&self) -> Cow<'_, [u8]> {
        match self {
            Self::Empty => Cow::Borrowed(&[]),
            Self::Bytes(bytes) => Cow::Borrowed(bytes),
            Self::Structured(value) => Cow::Owned(json::canonical_string(value).into_bytes()),
        }
    }

    /// `true` for [`Payload::Empty`] and zero-length byte payloads.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        match self {
            Self::Empty => true,
            Self::Bytes(bytes) => bytes.is_empty(),
            Self::Structured(_) => false,
        }
    }
}

impl From<Vec<u8>> for Payload {
    fn from(bytes: Vec<u8>) -> Self {
        Self::Bytes(bytes)
    }
}

impl From<&[u8]> for Payload {
    fn from(bytes: &[u8]) -> Self {
        Self::Bytes(bytes.to_vec())
    }
}

impl From<&str> for Payload {
    fn from(text: &str) -> Self {
        Self::Bytes(text.as_bytes().to_vec())
    }
}

impl From<String> for Payload {
    fn from(text: String) -> Self {
        Self::Bytes(text.into_bytes())
    }
}

impl From<Value> for Payload {
    fn from(value: Value) -> Self {
        Self::Structured(value)
    }
}

/// A body in its cassette representation.
///
/// Serializes as the flat `body_type` + `body` | `body_json` | `body_blob`
/// fields of a stored request or response.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "BodyRepr", into = "BodyRepr")]
pub enum Body {
    /// Decoded JSON structure.
    Json(Value),
    /// Raw text.
    Text(String),
    /// Raw bytes.
    Blob(Vec<u8>),
}

impl Default for Body {
    fn default() -> Self {
        Self::Text(String::new())
    }
}

impl Body {
    /// Classifies `payload` and encodes it in one step.
    #[must_use]
    pub fn from_payload(payload: &Payload, headers: &Headers) -> Self {
        encode(payload, detect_type(payload, headers))
    }

    /// The storage classification of this body.
    #[must_use]
    pub fn body_type(&self) -> BodyType {
        match self {
            Self::Json(_) => BodyType::Json,
            Self::Text(_) => BodyType::Text,
            Self::Blob(_) => BodyType::Blob,
        }
    }

    /// Wire bytes of this body. See [`decode`].
    #[must_use]
    pub fn to_bytes(&self) -> Vec<u8> {
        decode(self)
    }
}

/// Decides how a payload should be stored.
///
/// Absent bodies are text and already-structured collections are json. A
/// usable `Content-Type` decides next, except that a json-ish type whose
/// payload does not parse falls through to sniffing the bytes: JSON, then
/// printable text, then blob.
#[must_use]
pub fn detect_type(payload: &Payload, headers: &Headers) -> BodyType {
    if payload.is_empty() {
        return BodyType::Text;
    }
    if let Payload::Structured(value) = payload {
        if value.is_object() || value.is_array() {
            return BodyType::Json;
        }
    }

    let bytes = payload.to_bytes();
    if let Some(mime) = headers::content_type(headers) {
        if is_json_mime(&mime) {
            if parses_as_json(&bytes) {
                return BodyType::Json;
            }
        } else if is_binary_mime(&mime) {
            return BodyType::Blob;
        } else if is_text_mime(&mime) {
            return BodyType::Text;
        }
    }

    sniff(&bytes)
}

fn sniff(bytes: &[u8]) -> BodyType {
    if parses_as_json(bytes) {
        BodyType::Json
    } else if is_printable_text(bytes) {
        BodyType::Text
    } else {
        BodyType::Blob
    }
}

fn parses_as_json(bytes: &[u8]) -> bool {
    serde_json::from_slice::<Value>(bytes).is_ok()
}

fn is_json_mime(mime: &str) -> bool {
    mime == "application/json" || mime == "text/json" || mime.ends_with("+json")
}

fn is_binary_mime(mime: &str) -> bool {
    const BINARY: &[&str] = &[
        "application/octet-stream",
        "application/pdf",
        "application/zip",
        "application/gzip",
        "application/x-gzip",
        "application/x-tar",
        "application/protobuf",
        "application/x-protobuf",
        "application/msgpack",
        "application/x-msgpack",
    ];
    mime.starts_with("image/")
        || mime.starts_with("video/")
        || mime.starts_with("audio/")
        || BINARY.contains(&mime)
}

fn is_text_mime(mime: &str) -> bool {
    mime.starts_with("text/")
        || mime == "application/xml"
        || mime.ends_with("+xml")
        || mime == "application/x-www-form-urlencoded"
        || mime == "application/javascript"
}

/// Valid UTF-8 without control characters other than tab, CR and LF.
#[must_use]
pub fn is_printable_text(bytes: &[u8]) -> bool {
    std::str::from_utf8(bytes)
        .map(|text| text.chars().all(|c| !c.is_control() || matches!(c, '\t' | '\n' | '\r')))
        .unwrap_or(false)
}

/// Encodes `payload` for storage as `body_type`.
///
/// Never fails: a json classification whose bytes do not parse is stored as
/// text, and text that is not valid UTF-8 is stored as a blob.
#[must_use]
pub fn encode(payload: &Payload, body_type: BodyType) -> Body {
    match (payload, body_type) {
        (Payload::Structured(value), BodyType::Json) => Body::Json(value.clone()),
        (_, BodyType::Json) => {
            let bytes = payload.to_bytes();
            match serde_json::from_slice::<Value>(&bytes) {
                Ok(value) => Body::Json(value),
                Err(err) => {
                    tracing::debug!(error = %err, "json body does not parse, storing as text");
                    encode_text(bytes.into_owned())
                }
            }
        }
        (_, BodyType::Text) => encode_text(payload.to_bytes().into_owned()),
        (_, BodyType::Blob) => Body::Blob(payload.to_bytes().into_owned()),
    }
}

fn encode_text(bytes: Vec<u8>) -> Body {
    match String::from_utf8(bytes) {
        Ok(text) => Body::Text(text),
        Err(err) => Body::Blob(err.into_bytes()),
    }
}

/// Wire bytes for a stored body. JSON is re-serialized compactly with
/// sorted keys.
#[must_use]
pub fn decode(body: &Body) -> Vec<u8> {
    match body {
        Body::Json(value) => json::canonical_string(value).into_bytes(),
        Body::Text(text) => text.as_bytes().to_vec(),
        Body::Blob(bytes) => bytes.clone(),
    }
}

#[derive(Serialize, Deserialize)]
struct BodyRepr {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    body_type: Option<BodyType>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    body: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    body_json: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    body_blob: Option<String>,
}

impl From<Body> for BodyRepr {
    fn from(body: Body) -> Self {
        let body_type = Some(body.body_type());
        match body {
            Body::Json(value) => Self {
                body_type,
                body: None,
                body_json: Some(value),
                body_blob: None,
            },
            Body::Text(text) => Self {
                body_type,
                body: Some(text),
                body_json: None,
                body_blob: None,
            },
            Body::Blob(bytes) => Self {
                body_type,
                body: None,
                body_json: None,
                body_blob: Some(STANDARD.encode(bytes)),
            },
        }
    }
}

impl TryFrom<BodyRepr> for Body {
    type Error = String;

    fn try_from(repr: BodyRepr) -> Result<Self, Self::Error> {
        let body_type = repr.body_type.unwrap_or(match (&repr.body_json, &repr.body_blob) {
            (Some(_), _) => BodyType::Json,
            (None, Some(_)) => BodyType::Blob,
            (None, None) => BodyType::Text,
        });

        match body_type {
            // `"body_json": null` deserializes as `None`.
            BodyType::Json => match (repr.body_json, repr.body) {
                (Some(value), _) => Ok(Self::Json(value)),
                (None, Some(text)) => {
                    Ok(serde_json::from_str(&text).map_or(Self::Text(text), Self::Json))
                }
                (None, None) => Ok(Self::Json(Value::Null)),
            },
            BodyType::Text => Ok(Self::Text(repr.body.unwrap_or_default())),
            BodyType::Blob => {
                let encoded = repr.body_blob.unwrap_or_default();
                STANDARD
                    .decode(encoded.as_bytes())
                    .map(Self::Blob)
                    .map_err(|e| format!("invalid base64 in body_blob: {e}"))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn with_content_type(mime: &str) -> Headers {
        let mut headers = Headers::new();
        headers::append(&mut headers, "Content-Type", mime);
        headers
    }

    #[test]
    fn empty_payload_is_text() {
        assert_eq!(detect_type(&Payload::Empty, &with_content_type("image/png")), BodyType::Text);
        assert_eq!(detect_type(&Payload::from(""), &Headers::new()), BodyType::Text);
    }

    #[test]
    fn structured_collections_are_json() {
        let payload = Payload::from(json!({"a": 1}));
        assert_eq!(detect_type(&payload, &with_content_type("text/plain")), BodyType::Json);
        assert_eq!(detect_type(&Payload::from(json!([1, 2])), &Headers::new()), BodyType::Json);
    }

    #[test]
    fn json_content_type_requires_a_parse() {
        let headers = with_content_type("application/vnd.api+json; charset=utf-8");
        assert_eq!(detect_type(&Payload::from(r#"{"ok":true}"#), &headers), BodyType::Json);
        assert_eq!(detect_type(&Payload::from("not json"), &headers), BodyType::Text);
        assert_eq!(detect_type(&Payload::from(vec![0xff, 0x00, 0x81]), &headers), BodyType::Blob);
    }

    #[test]
    fn binary_and_text_content_types() {
        let bytes = Payload::from("plain words");
        assert_eq!(detect_type(&bytes, &with_content_type("image/png")), BodyType::Blob);
        assert_eq!(
            detect_type(&bytes, &with_content_type("application/octet-stream")),
            BodyType::Blob
        );
        assert_eq!(
            detect_type(&Payload::from("{}"), &with_content_type("text/html")),
            BodyType::Text
        );
        assert_eq!(
            detect_type(
                &Payload::from("a=1&b=2"),
                &with_content_type("application/x-www-form-urlencoded")
            ),
            BodyType::Text
        );
    }

    #[test]
    fn sniffing_without_headers() {
        assert_eq!(detect_type(&Payload::from("[1,2,3]"), &Headers::new()), BodyType::Json);
        assert_eq!(detect_type(&Payload::from("hello\nworld\t!"), &Headers::new()), BodyType::Text);
        assert_eq!(
            detect_type(&Payload::from(vec![0x89, b'P', b'N', b'G']), &Headers::new()),
            BodyType::Blob
        );
        assert_eq!(detect_type(&Payload::from("bell\u{7}"), &Headers::new()), BodyType::Blob);
    }

    #[test]
    fn unknown_content_type_falls_back_to_sniffing() {
        let headers = with_content_type("application/x-custom");
        assert_eq!(detect_type(&Payload::from(r#"{"a":1}"#), &headers), BodyType::Json);
        assert_eq!(detect_type(&Payload::from("abc"), &headers), BodyType::Text);
    }

    #[test]
    fn json_is_stored_as_structure_not_string() {
        let body = encode(&Payload::from(r#"{"b":2,"a":1}"#), BodyType::Json);
        assert_eq!(body, Body::Json(json!({"a": 1, "b": 2})));
        let stored = serde_json::to_value(&body).unwrap();
        assert_eq!(stored, json!({"body_type": "json", "body_json": {"a": 1, "b": 2}}));
    }

    #[test]
    fn unparsable_json_degrades_to_text() {
        let body = encode(&Payload::from("{broken"), BodyType::Json);
        assert_eq!(body, Body::Text("{broken".into()));
    }

    #[test]
    fn invalid_utf8_text_degrades_to_blob() {
        let body = encode(&Payload::from(vec![0xc3, 0x28]), BodyType::Text);
        assert_eq!(body, Body::Blob(vec![0xc3, 0x28]));
    }

    #[test]
    fn text_and_blob_round_trip_byte_for_byte() {
        let text = "line one\r\nline two ✓";
        assert_eq!(decode(&encode(&Payload::from(text), BodyType::Text)), text.as_bytes());

        let bytes: Vec<u8> = (0..=255).collect();
        let body = encode(&Payload::from(bytes.clone()), BodyType::Blob);
        let stored = serde_json::to_string(&body).unwrap();
        let restored: Body = serde_json::from_str(&stored).unwrap();
        assert_eq!(decode(&restored), bytes);
    }

    #[test]
    fn json_round_trip_is_structural() {
        let original = r#"{ "z": [1, {"y": null}], "a": "x" }"#;
        let decoded = decode(&encode(&Payload::from(original), BodyType::Json));
        let left: Value = serde_json::from_slice(&decoded).unwrap();
        let right: Value = serde_json::from_str(original).unwrap();
        assert_eq!(left, right);
        assert_eq!(decoded, br#"{"a":"x","z":[1,{"y":null}]}"#);
    }

    #[test]
    fn untagged_stored_body_is_text() {
        let body: Body = serde_json::from_value(json!({"body": "ok"})).unwrap();
        assert_eq!(body, Body::Text("ok".into()));
        let empty: Body = serde_json::from_value(json!({})).unwrap();
        assert_eq!(empty, Body::Text(String::new()));
    }

    #[test]
    fn json_null_survives_storage() {
        let stored = serde_json::to_string(&Body::Json(Value::Null)).unwrap();
        let restored: Body = serde_json::from_str(&stored).unwrap();
        assert_eq!(restored, Body::Json(Value::Null));
    }

    #[test]
    fn invalid_base64_is_rejected() {
        let result: Result<Body, _> =
            serde_json::from_value(json!({"body_type": "blob", "body_blob": "***"}));
        assert!(result.is_err());
    }
}
