//! Transformations applied to a freshly captured interaction before it is
//! written to a cassette, chiefly to keep secrets out of fixtures.
//!
//! Stages always run in this order:
//!
//! 1. pattern filters over request uri, query string and both bodies;
//! 2. header removal, request and response independently;
//! 3. the request transform;
//! 4. the response transform;
//! 5. the interaction transform, which sees and may override everything.
//!
//! An unconfigured stage leaves the interaction untouched.
//!
//! Stored requests are compared with live requests that went through stages
//! 1 and 2 as well (see [`FilterChain::prepare_live`]), so a redacted secret
//! still matches. The request transform is not replayed on live requests:
//! whatever it stores must equal the live value for any field that is part
//! of the match criteria.

pub mod pattern;

use std::fmt;

pub use pattern::PatternFilter;

use crate::body::{Body, Payload};
use crate::cassette::format::{Interaction, RecordedRequest, RecordedResponse, RequestDescriptor};
use crate::headers;

/// Rewrites the stored request.
pub trait RequestTransform: Send + Sync {
    /// Returns the request to store in place of `request`.
    fn transform(&self, request: RecordedRequest) -> RecordedRequest;
}

impl<F> RequestTransform for F
where
    F: Fn(RecordedRequest) -> RecordedRequest + Send + Sync,
{
    fn transform(&self, request: RecordedRequest) -> RecordedRequest {
        self(request)
    }
}

/// Rewrites the stored response.
pub trait ResponseTransform: Send + Sync {
    /// Returns the response to store in place of `response`.
    fn transform(&self, response: RecordedResponse) -> RecordedResponse;
}

impl<F> ResponseTransform for F
where
    F: Fn(RecordedResponse) -> RecordedResponse + Send + Sync,
{
    fn transform(&self, response: RecordedResponse) -> RecordedResponse {
        self(response)
    }
}

/// Rewrites the whole stored interaction.
pub trait InteractionTransform: Send + Sync {
    /// Returns the interaction to store in place of `interaction`.
    fn transform(&self, interaction: Interaction) -> Interaction;
}

impl<F> InteractionTransform for F
where
    F: Fn(Interaction) -> Interaction + Send + Sync,
{
    fn transform(&self, interaction: Interaction) -> Interaction {
        self(interaction)
    }
}

/// The configured filter stages. The default chain stores interactions as captured.
#[derive(Default)]
pub struct FilterChain {
    patterns: Vec<PatternFilter>,
    request_headers: Vec<String>,
    response_headers: Vec<String>,
    request_transform: Option<Box<dyn RequestTransform>>,
    response_transform: Option<Box<dyn ResponseTransform>>,
    interaction_transform: Option<Box<dyn InteractionTransform>>,
}

impl FilterChain {
    /// An empty chain.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a pattern filter. Pattern filters run in insertion order.
    #[must_use]
    pub fn pattern(mut self, filter: PatternFilter) -> Self {
        self.patterns.push(filter);
        self
    }

    /// Removes the named header from stored requests.
    #[must_use]
    pub fn remove_request_header(mut self, name: impl Into<String>) -> Self {
        self.request_headers.push(name.into());
        self
    }

    /// Removes the named header from stored responses.
    #[must_use]
    pub fn remove_response_header(mut self, name: impl Into<String>) -> Self {
        self.response_headers.push(name.into());
        self
    }

    /// Sets the request transform, replacing any previous one.
    #[must_use]
    pub fn on_request(mut self, transform: impl RequestTransform + 'static) -> Self {
        self.request_transform = Some(Box::new(transform));
        self
    }

    /// Sets the response transform, replacing any previous one.
    #[must_use]
    pub fn on_response(mut self, transform: impl ResponseTransform + 'static) -> Self {
        self.response_transform = Some(Box::new(transform));
        self
    }

    /// Sets the interaction transform, replacing any previous one.
    #[must_use]
    pub fn on_interaction(mut self, transform: impl InteractionTransform + 'static) -> Self {
        self.interaction_transform = Some(Box::new(transform));
        self
    }

    /// `true` when no stage is configured.
    #[must_use]
    pub fn is_identity(&self) -> bool {
        self.patterns.is_empty()
            && self.request_headers.is_empty()
            && self.response_headers.is_empty()
            && self.request_transform.is_none()
            && self.response_transform.is_none()
            && self.interaction_transform.is_none()
    }

    /// Puts a live request through the pattern and request-header stages so
    /// it can be compared with what [`FilterChain::apply`] stored.
    ///
    /// The body is classified with the live headers before any are removed,
    /// as it was at capture time. Transforms are not applied.
    #[must_use]
    pub fn prepare_live(
        &self,
        request: &RequestDescriptor,
        body: &Payload,
    ) -> (RequestDescriptor, Payload) {
        let mut prepared = request.clone();
        let mut payload = body.clone();

        if !self.patterns.is_empty() {
            let mut stored = Body::from_payload(body, &request.headers);
            for filter in &self.patterns {
                prepared.uri = filter.apply_str(&prepared.uri).into_owned();
                prepared.query_string = filter.apply_str(&prepared.query_string).into_owned();
                stored = filter.apply_body(stored);
            }
            if !body.is_empty() {
                payload = match stored {
                    Body::Json(value) => Payload::Structured(value),
                    Body::Text(text) => Payload::Bytes(text.into_bytes()),
                    Body::Blob(bytes) => Payload::Bytes(bytes),
                };
            }
        }

        headers::remove_all(&mut prepared.headers, &self.request_headers);
        (prepared, payload)
    }

    /// Runs every stage over `interaction` in the fixed order.
    #[must_use]
    pub fn apply(&self, mut interaction: Interaction) -> Interaction {
        for filter in &self.patterns {
            let request = &mut interaction.request;
            request.uri = filter.apply_str(&request.uri).into_owned();
            request.query_string = filter.apply_str(&request.query_string).into_owned();
            request.body = filter.apply_body(std::mem::take(&mut request.body));
            let response = &mut interaction.response;
            response.body = filter.apply_body(std::mem::take(&mut response.body));
        }

        headers::remove_all(&mut interaction.request.headers, &self.request_headers);
        headers::remove_all(&mut interaction.response.headers, &self.response_headers);

        if let Some(transform) = &self.request_transform {
            interaction.request = transform.transform(interaction.request);
        }
        if let Some(transform) = &self.response_transform {
            interaction.response = transform.transform(interaction.response);
        }
        match &self.interaction_transform {
            Some(transform) => transform.transform(interaction),
            None => interaction,
        }
    }
}

impl fmt::Debug for FilterChain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FilterChain")
            .field("patterns", &self.patterns)
            .field("request_headers", &self.request_headers)
            .field("response_headers", &self.response_headers)
            .field("request_transform", &self.request_transform.is_some())
            .field("response_transform", &self.response_transform.is_some())
            .field("interaction_transform", &self.interaction_transform.is_some())
            .finish()
    }
}
