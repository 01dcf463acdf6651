//! Cassette data structures as persisted on disk.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::body::Body;
use crate::headers::{self, Headers};

/// Schema version written into every cassette.
pub const SCHEMA_VERSION: &str = "1.0";

/// Placeholder for request fields and timestamps a legacy cassette never recorded.
pub const UNKNOWN: &str = "UNKNOWN";

/// A live request as seen by the interception layer, without its body.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct RequestDescriptor {
    /// HTTP method as sent.
    pub method: String,
    /// Scheme, host, non-default port and path. Never includes the query.
    pub uri: String,
    /// Raw query string without the leading `?`; empty when absent.
    pub query_string: String,
    /// Request headers.
    pub headers: Headers,
}

impl RequestDescriptor {
    /// Creates a descriptor with no query and no headers.
    pub fn new(method: impl Into<String>, uri: impl Into<String>) -> Self {
        Self {
            method: method.into(),
            uri: uri.into(),
            ..Self::default()
        }
    }

    /// Splits a full URL into the uri and query parts.
    ///
    /// The port is kept only when it differs from the scheme's default, and
    /// the fragment is dropped.
    ///
    /// # Errors
    ///
    /// Returns an error if `url` is not an absolute URL.
    pub fn from_url(method: impl Into<String>, url: &str) -> Result<Self, url::ParseError> {
        let parsed = url::Url::parse(url)?;
        let mut uri = format!("{}://", parsed.scheme());
        if let Some(host) = parsed.host_str() {
            uri.push_str(host);
        }
        if let Some(port) = parsed.port() {
            uri.push_str(&format!(":{port}"));
        }
        uri.push_str(parsed.path());
        Ok(Self {
            method: method.into(),
            uri,
            query_string: parsed.query().unwrap_or_default().to_string(),
            headers: Headers::new(),
        })
    }

    /// Builder-style helper that appends one header value.
    #[must_use]
    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        headers::append(&mut self.headers, name, value);
        self
    }

    /// Builder-style helper that sets the raw query string.
    #[must_use]
    pub fn with_query(mut self, query_string: impl Into<String>) -> Self {
        self.query_string = query_string.into();
        self
    }

    /// The uri with the query string re-attached.
    #[must_use]
    pub fn full_url(&self) -> String {
        if self.query_string.is_empty() {
            self.uri.clone()
        } else {
            format!("{}?{}", self.uri, self.query_string)
        }
    }
}

/// A live response as seen by the interception layer, without its body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResponseDescriptor {
    /// HTTP status code.
    pub status: u16,
    /// Response headers.
    pub headers: Headers,
}

impl ResponseDescriptor {
    /// Creates a descriptor with no headers.
    #[must_use]
    pub fn new(status: u16) -> Self {
        Self {
            status,
            headers: Headers::new(),
        }
    }

    /// Builder-style helper that appends one header value.
    #[must_use]
    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        headers::append(&mut self.headers, name, value);
        self
    }
}

/// The request half of a stored interaction.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RecordedRequest {
    /// HTTP method.
    pub method: String,
    /// Scheme, host, non-default port and path.
    pub uri: String,
    /// Raw query string without the leading `?`.
    #[serde(default)]
    pub query_string: String,
    /// Request headers.
    #[serde(default, deserialize_with = "headers::deserialize_lenient")]
    pub headers: Headers,
    /// Encoded request body.
    #[serde(flatten)]
    pub body: Body,
}

impl RecordedRequest {
    /// The stored request as a live descriptor.
    #[must_use]
    pub fn descriptor(&self) -> RequestDescriptor {
        RequestDescriptor {
            method: self.method.clone(),
            uri: self.uri.clone(),
            query_string: self.query_string.clone(),
            headers: self.headers.clone(),
        }
    }
}

/// The response half of a stored interaction.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RecordedResponse {
    /// HTTP status code.
    pub status: u16,
    /// Response headers.
    #[serde(default, deserialize_with = "headers::deserialize_lenient")]
    pub headers: Headers,
    /// Encoded response body.
    #[serde(flatten)]
    pub body: Body,
}

impl RecordedResponse {
    /// The stored response as a live descriptor.
    #[must_use]
    pub fn descriptor(&self) -> ResponseDescriptor {
        ResponseDescriptor {
            status: self.status,
            headers: self.headers.clone(),
        }
    }
}

/// One recorded request/response exchange.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Interaction {
    /// What was sent.
    pub request: RecordedRequest,
    /// What came back.
    pub response: RecordedResponse,
    /// When the exchange was captured; `None` for migrated legacy cassettes.
    #[serde(default, with = "recorded_at")]
    pub recorded_at: Option<DateTime<Utc>>,
}

/// An ordered, versioned list of interactions.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Cassette {
    /// Schema version, see [`SCHEMA_VERSION`].
    #[serde(default = "current_version")]
    pub version: String,
    /// Interactions in recording order.
    #[serde(default)]
    pub interactions: Vec<Interaction>,
}

impl Cassette {
    /// An empty cassette at the current schema version.
    #[must_use]
    pub fn new() -> Self {
        Self {
            version: current_version(),
            interactions: Vec::new(),
        }
    }

    /// Number of stored interactions.
    #[must_use]
    pub fn len(&self) -> usize {
        self.interactions.len()
    }

    /// `true` when nothing has been recorded yet.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.interactions.is_empty()
    }
}

impl Default for Cassette {
    fn default() -> Self {
        Self::new()
    }
}

fn current_version() -> String {
    SCHEMA_VERSION.to_string()
}

/// The pre-versioning file shape: a single bare response.
#[derive(Debug, Clone, Deserialize)]
pub(crate) struct LegacyResponse {
    status: u16,
    #[serde(default, deserialize_with = "headers::deserialize_lenient")]
    headers: Headers,
    #[serde(default)]
    body: Value,
}

impl LegacyResponse {
    /// Wraps the bare response in a one-interaction cassette at the current
    /// schema version. The request side was never captured.
    pub(crate) fn migrate(self) -> Cassette {
        let body = match self.body {
            Value::Null => Body::Text(String::new()),
            Value::String(text) => Body::Text(text),
            structured => Body::Json(structured),
        };
        let interaction = Interaction {
            request: RecordedRequest {
                method: UNKNOWN.to_string(),
                uri: UNKNOWN.to_string(),
                query_string: String::new(),
                headers: Headers::new(),
                body: Body::default(),
            },
            response: RecordedResponse {
                status: self.status,
                headers: self.headers,
                body,
            },
            recorded_at: None,
        };
        Cassette {
            version: current_version(),
            interactions: vec![interaction],
        }
    }
}

/// `recorded_at` is an RFC 3339 timestamp, or [`UNKNOWN`] for migrated data.
mod recorded_at {
    use chrono::{DateTime, NaiveDateTime, SecondsFormat, Utc};
    use serde::{Deserialize, Deserializer, Serializer};

    use super::UNKNOWN;

    pub fn serialize<S>(value: &Option<DateTime<Utc>>, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match value {
            Some(at) => serializer.serialize_str(&at.to_rfc3339_opts(SecondsFormat::Micros, true)),
            None => serializer.serialize_str(UNKNOWN),
        }
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Option<DateTime<Utc>>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = Option::<String>::deserialize(deserializer)?;
        Ok(raw.as_deref().and_then(parse))
    }

    fn parse(raw: &str) -> Option<DateTime<Utc>> {
        if raw == UNKNOWN {
            return None;
        }
        if let Ok(at) = DateTime::parse_from_rfc3339(raw) {
            return Some(at.with_timezone(&Utc));
        }
        // Naive ISO-8601 timestamps are taken as UTC.
        NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f").ok().map(|at| at.and_utc())
    }
}
