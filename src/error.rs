//! Error types surfaced by the record/replay core.

use std::path::PathBuf;

use thiserror::Error;

use crate::matching::Dimension;

/// The network port could not complete a live call.
#[derive(Debug, Error)]
pub enum ForwardError {
    /// The transport failed before a response arrived (DNS, connect, TLS, timeout).
    #[error("transport failure: {0}")]
    Transport(String),
    /// A response arrived but could not be read.
    #[error("failed to read response body: {0}")]
    Body(String),
}

/// Errors returned by [`crate::cassette::session::CassetteSession`] and the store.
#[derive(Debug, Error)]
pub enum VcrError {
    /// Replay found nothing equivalent to the live request.
    #[error(
        "no matching interaction in cassette `{cassette}` for {method} {uri}{}",
        describe_mismatches(.mismatches)
    )]
    NoMatchingInteraction {
        /// Sanitized cassette name.
        cassette: String,
        /// Method of the live request.
        method: String,
        /// URI of the live request (without query).
        uri: String,
        /// Dimensions that differed on the closest stored candidate.
        mismatches: Vec<Dimension>,
    },
    /// Record or bypass mode could not reach the network.
    #[error("forwarding failed: {0}")]
    Forwarding(#[from] ForwardError),
    /// The cassette file could not be written.
    #[error("failed to write cassette {}: {source}", .path.display())]
    Io {
        /// Target file.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },
    /// The cassette could not be serialized.
    #[error("failed to serialize cassette: {0}")]
    Serialize(#[from] serde_json::Error),
}

fn describe_mismatches(mismatches: &[Dimension]) -> String {
    if mismatches.is_empty() {
        return String::new();
    }
    let names: Vec<&str> = mismatches.iter().map(|d| d.as_str()).collect();
    format!(" (closest candidate differs on: {})", names.join(", "))
}
