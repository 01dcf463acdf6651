//! Command dispatch and handlers.

pub mod migrate;
pub mod redact;
pub mod sanitize;
pub mod show;

use std::path::Path;

use crate::cassette::{store, Cassette};
use crate::cli::Command;

/// Dispatch a parsed command to its handler.
///
/// # Errors
///
/// Returns an error string if the selected command handler fails.
pub fn dispatch(command: &Command) -> Result<(), String> {
    match command {
        Command::Show { cassette } => show::run(cassette),
        Command::Migrate { cassette } => migrate::run(cassette),
        Command::Redact { cassette, config } => redact::run(cassette, config),
        Command::Sanitize { name } => sanitize::run(name),
    }
}

/// Reads a cassette file for maintenance.
///
/// Unlike a session, a missing or unparsable file is an error here.
fn read_cassette(path: &Path) -> Result<Cassette, String> {
    let content = std::fs::read_to_string(path)
        .map_err(|e| format!("failed to read {}: {e}", path.display()))?;
    store::parse(&content).map_err(|reason| format!("{}: {reason}", path.display()))
}

fn write_cassette(path: &Path, cassette: &Cassette) -> Result<(), String> {
    store::save(path, cassette).map_err(|e| e.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn read_cassette_rejects_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let err = read_cassette(&dir.path().join("absent.json")).unwrap_err();
        assert!(err.contains("failed to read"));
    }

    #[test]
    fn read_cassette_rejects_garbage() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bad.json");
        std::fs::write(&path, "not json").unwrap();
        let err = read_cassette(&path).unwrap_err();
        assert!(err.contains("invalid JSON"));
    }

    #[test]
    fn dispatch_runs_sanitize() {
        let command = Command::Sanitize { name: "a b".into() };
        assert!(dispatch(&command).is_ok());
    }
}
