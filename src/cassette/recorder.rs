//! Builds stored interactions from live exchanges.

use chrono::{DateTime, Utc};

use super::format::{
    Cassette, Interaction, RecordedRequest, RecordedResponse, RequestDescriptor,
    ResponseDescriptor,
};
use crate::body::{Body, Payload};
use crate::filter::FilterChain;

/// Encodes a live exchange without filtering it.
#[must_use]
pub fn capture(
    request: &RequestDescriptor,
    request_body: &Payload,
    response: &ResponseDescriptor,
    response_body: &[u8],
    recorded_at: DateTime<Utc>,
) -> Interaction {
    let response_payload = Payload::from(response_body);
    Interaction {
        request: RecordedRequest {
            method: request.method.clone(),
            uri: request.uri.clone(),
            query_string: request.query_string.clone(),
            headers: request.headers.clone(),
            body: Body::from_payload(request_body, &request.headers),
        },
        response: RecordedResponse {
            status: response.status,
            headers: response.headers.clone(),
            body: Body::from_payload(&response_payload, &response.headers),
        },
        recorded_at: Some(recorded_at),
    }
}

/// Captures a live exchange, filters it and appends it to `cassette`.
///
/// Pure: the returned cassette still has to be saved.
#[must_use]
pub fn add_interaction(
    mut cassette: Cassette,
    request: &RequestDescriptor,
    request_body: &Payload,
    response: &ResponseDescriptor,
    response_body: &[u8],
    filters: &FilterChain,
    recorded_at: DateTime<Utc>,
) -> Cassette {
    let captured = capture(request, request_body, response, response_body, recorded_at);
    cassette.interactions.push(filters.apply(captured));
    cassette
}
