//! `vcrkit show` command.

use std::path::Path;

use chrono::SecondsFormat;

use crate::cassette::format::UNKNOWN;
use crate::cassette::{Cassette, Interaction};

/// Execute the `show` command.
///
/// # Errors
///
/// Returns an error string if the cassette cannot be read.
pub fn run(path: &Path) -> Result<(), String> {
    let cassette = super::read_cassette(path)?;
    print!("{}", render(&cassette));
    Ok(())
}

/// One summary line per interaction, after a version header.
#[must_use]
pub fn render(cassette: &Cassette) -> String {
    let header = format!(
        "version {} ({} interaction{})",
        cassette.version,
        cassette.len(),
        if cassette.len() == 1 { "" } else { "s" }
    );
    std::iter::once(header)
        .chain(
            cassette
                .interactions
                .iter()
                .enumerate()
                .map(|(index, interaction)| format!("{index} {}", line(interaction))),
        )
        .map(|text| text + "\n")
        .collect()
}

fn line(interaction: &Interaction) -> String {
    let request = &interaction.request;
    let recorded_at = interaction.recorded_at.map_or_else(
        || UNKNOWN.to_string(),
        |at| at.to_rfc3339_opts(SecondsFormat::Secs, true),
    );
    format!(
        "{} {} -> {} [{} -> {}] {recorded_at}",
        request.method,
        request.descriptor().full_url(),
        interaction.response.status,
        request.body.body_type().as_str(),
        interaction.response.body.body_type().as_str(),
    )
}
