//! Looks up recorded interactions for live requests.

use super::format::{Cassette, Interaction, RequestDescriptor};
use crate::body::Payload;
use crate::matching::{self, Dimension, MatchCriteria};

/// Returns the first interaction, in recording order, whose stored request
/// satisfies every selected criterion.
#[must_use]
pub fn find_interaction<'a>(
    cassette: &'a Cassette,
    request: &RequestDescriptor,
    body: &Payload,
    criteria: &MatchCriteria,
) -> Option<&'a Interaction> {
    cassette
        .interactions
        .iter()
        .find(|interaction| matching::matches(&interaction.request, request, body, criteria))
}

/// The mismatched dimensions of the stored request that comes closest to the
/// live one, for diagnostics. Empty when the cassette is empty.
///
/// Ties go to the earliest recorded interaction.
#[must_use]
pub fn closest_mismatches(
    cassette: &Cassette,
    request: &RequestDescriptor,
    body: &Payload,
    criteria: &MatchCriteria,
) -> Vec<Dimension> {
    cassette
        .interactions
        .iter()
        .map(|interaction| matching::mismatches(&interaction.request, request, body, criteria))
        .reduce(|best, candidate| if candidate.len() < best.len() { candidate } else { best })
        .unwrap_or_default()
}
