//! Network port: performs a live HTTP exchange on behalf of the recorder.

use crate::cassette::format::{RequestDescriptor, ResponseDescriptor};
use crate::error::ForwardError;

/// A response obtained from the network, with its raw body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ForwardedResponse {
    /// Status and headers.
    pub response: ResponseDescriptor,
    /// Body bytes exactly as received.
    pub body: Vec<u8>,
}

/// Sends a request over the network and returns what came back.
///
/// Implementations must not read or write cassettes; the session owns those.
pub trait NetworkBridge: Send + Sync {
    /// Performs one live exchange.
    ///
    /// # Errors
    ///
    /// Returns an error if no complete response could be obtained.
    fn forward(
        &self,
        request: &RequestDescriptor,
        body: &[u8],
    ) -> Result<ForwardedResponse, ForwardError>;
}

impl<F> NetworkBridge for F
where
    F: Fn(&RequestDescriptor, &[u8]) -> Result<ForwardedResponse, ForwardError> + Send + Sync,
{
    fn forward(
        &self,
        request: &RequestDescriptor,
        body: &[u8],
    ) -> Result<ForwardedResponse, ForwardError> {
        self(request, body)
    }
}
