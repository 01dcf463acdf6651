//! Live network adapter using a blocking `reqwest` client.

use std::time::Duration;

use reqwest::blocking::Client;
use reqwest::redirect::Policy;
use reqwest::Method;

use crate::cassette::format::{RequestDescriptor, ResponseDescriptor};
use crate::error::ForwardError;
use crate::headers::{self, Headers};
use crate::ports::network::{ForwardedResponse, NetworkBridge};

/// Sends requests over the real network.
///
/// Redirects are not followed, so each hop is its own recorded interaction.
pub struct ReqwestBridge {
    client: Client,
}

impl ReqwestBridge {
    /// Creates a bridge without a request timeout.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be initialized.
    pub fn new() -> Result<Self, ForwardError> {
        Self::build(None)
    }

    /// Creates a bridge whose requests fail after `timeout`.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be initialized.
    pub fn with_timeout(timeout: Duration) -> Result<Self, ForwardError> {
        Self::build(Some(timeout))
    }

    fn build(timeout: Option<Duration>) -> Result<Self, ForwardError> {
        let mut builder = Client::builder().redirect(Policy::none());
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }
        let client = builder
            .build()
            .map_err(|e| ForwardError::Transport(format!("failed to build HTTP client: {e}")))?;
        Ok(Self { client })
    }
}

impl NetworkBridge for ReqwestBridge {
    fn forward(
        &self,
        request: &RequestDescriptor,
        body: &[u8],
    ) -> Result<ForwardedResponse, ForwardError> {
        let method = Method::from_bytes(request.method.to_ascii_uppercase().as_bytes())
            .map_err(|e| {
                ForwardError::Transport(format!("invalid method {}: {e}", request.method))
            })?;

        let mut builder = self.client.request(method, request.full_url());
        for (name, values) in &request.headers {
            for value in values {
                builder = builder.header(name.as_str(), value.as_str());
            }
        }
        if !body.is_empty() {
            builder = builder.body(body.to_vec());
        }

        let response = builder.send().map_err(|e| {
            let url = request.full_url();
            ForwardError::Transport(format!("{} {url} failed: {e}", request.method))
        })?;

        let status = response.status().as_u16();
        let mut response_headers = Headers::new();
        for (name, value) in response.headers() {
            let value = String::from_utf8_lossy(value.as_bytes()).into_owned();
            headers::append(&mut response_headers, name.as_str(), value);
        }
        let bytes = response.bytes().map_err(|e| ForwardError::Body(e.to_string()))?;

        tracing::debug!(
            method = %request.method,
            url = %request.full_url(),
            status,
            bytes = bytes.len(),
            "forwarded live request"
        );

        Ok(ForwardedResponse {
            response: ResponseDescriptor {
                status,
                headers: response_headers,
            },
            body: bytes.to_vec(),
        })
    }
}
