//! Request equivalence: decides whether a stored request satisfies a live one.
//!
//! A [`MatchCriteria`] names the request dimensions that must agree. Every
//! selected dimension must hold; there is no scoring, so the caller's scan
//! order decides between several satisfying interactions.

pub mod normalize;

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::body::Payload;
use crate::cassette::format::{RecordedRequest, RequestDescriptor};

/// One comparable aspect of a request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Dimension {
    /// HTTP method, case-insensitive.
    Method,
    /// Scheme, host, port and path, exact.
    Uri,
    /// Query parameters, order-insensitive.
    Query,
    /// Headers, name-case and order-insensitive.
    Headers,
    /// Body, structural for JSON and exact otherwise.
    Body,
}

impl Dimension {
    /// Every dimension, in canonical order.
    pub const ALL: [Self; 5] = [Self::Method, Self::Uri, Self::Query, Self::Headers, Self::Body];

    /// Lowercase name as used in configuration.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Method => "method",
            Self::Uri => "uri",
            Self::Query => "query",
            Self::Headers => "headers",
            Self::Body => "body",
        }
    }
}

impl fmt::Display for Dimension {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Dimension {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|dimension| dimension.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| {
                format!(
                    "unknown match dimension `{s}`; \
                     expected one of method, uri, query, headers, body"
                )
            })
    }
}

/// The ordered set of dimensions a stored request must agree on.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MatchCriteria {
    dimensions: Vec<Dimension>,
}

impl MatchCriteria {
    /// Criteria over the given dimensions. Duplicates are dropped, first
    /// occurrence wins.
    pub fn new(dimensions: impl IntoIterator<Item = Dimension>) -> Self {
        let mut unique = Vec::new();
        for dimension in dimensions {
            if !unique.contains(&dimension) {
                unique.push(dimension);
            }
        }
        Self { dimensions: unique }
    }

    /// All five dimensions.
    #[must_use]
    pub fn all() -> Self {
        Self::new(Dimension::ALL)
    }

    /// The selected dimensions in evaluation order.
    #[must_use]
    pub fn dimensions(&self) -> &[Dimension] {
        &self.dimensions
    }

    /// `true` if `dimension` is selected.
    #[must_use]
    pub fn contains(&self, dimension: Dimension) -> bool {
        self.dimensions.contains(&dimension)
    }
}

impl Default for MatchCriteria {
    fn default() -> Self {
        Self::all()
    }
}

/// `true` when `stored` agrees with the live request on every selected dimension.
#[must_use]
pub fn matches(
    stored: &RecordedRequest,
    live: &RequestDescriptor,
    body: &Payload,
    criteria: &MatchCriteria,
) -> bool {
    criteria.dimensions().iter().all(|&dimension| holds(dimension, stored, live, body))
}

/// The selected dimensions on which `stored` disagrees with the live request.
#[must_use]
pub fn mismatches(
    stored: &RecordedRequest,
    live: &RequestDescriptor,
    body: &Payload,
    criteria: &MatchCriteria,
) -> Vec<Dimension> {
    criteria
        .dimensions()
        .iter()
        .copied()
        .filter(|&dimension| !holds(dimension, stored, live, body))
        .collect()
}

fn holds(
    dimension: Dimension,
    stored: &RecordedRequest,
    live: &RequestDescriptor,
    body: &Payload,
) -> bool {
    match dimension {
        Dimension::Method => normalize::methods_equal(&stored.method, &live.method),
        Dimension::Uri => stored.uri == live.uri,
        Dimension::Query => {
            normalize::query(&stored.query_string) == normalize::query(&live.query_string)
        }
        Dimension::Headers => {
            normalize::headers(&stored.headers) == normalize::headers(&live.headers)
        }
        Dimension::Body => normalize::bodies_equal(&stored.body, body),
    }
}
