//! Reading and writing cassette files.
//!
//! A missing or unreadable file is not an error here: it simply means
//! nothing has been recorded yet. Only writes can fail.

use std::path::Path;

use serde_json::Value;

use super::format::{Cassette, LegacyResponse};
use crate::error::VcrError;

/// Loads the cassette at `path`, migrating the legacy single-response shape.
///
/// Returns `None` when the file does not exist, cannot be read, or holds
/// neither schema.
#[must_use]
pub fn load(path: &Path) -> Option<Cassette> {
    let content = match std::fs::read_to_string(path) {
        Ok(content) => content,
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
            tracing::debug!(path = %path.display(), "no cassette yet");
            return None;
        }
        Err(err) => {
            tracing::warn!(
                path = %path.display(),
                error = %err,
                "cannot read cassette, treating as empty"
            );
            return None;
        }
    };

    match parse(&content) {
        Ok(cassette) => {
            tracing::debug!(
                path = %path.display(),
                interactions = cassette.len(),
                "loaded cassette"
            );
            Some(cassette)
        }
        Err(reason) => {
            tracing::warn!(
                path = %path.display(),
                %reason,
                "cannot parse cassette, treating as empty"
            );
            None
        }
    }
}

/// Parses cassette text in either the current or the legacy schema.
///
/// # Errors
///
/// Returns a description of the problem when the text is not JSON or fits
/// neither schema.
pub fn parse(content: &str) -> Result<Cassette, String> {
    let value: Value = serde_json::from_str(content).map_err(|e| format!("invalid JSON: {e}"))?;
    let Some(object) = value.as_object() else {
        return Err("top-level value is not an object".to_string());
    };

    if object.contains_key("interactions") || object.contains_key("version") {
        return serde_json::from_value(value).map_err(|e| format!("invalid cassette: {e}"));
    }
    if object.contains_key("status") {
        let legacy: LegacyResponse = serde_json::from_value(value)
            .map_err(|e| format!("invalid legacy cassette: {e}"))?;
        tracing::info!("migrating legacy single-response cassette");
        return Ok(legacy.migrate());
    }
    Err("neither `interactions` nor legacy `status` present".to_string())
}

/// Serializes `cassette` as pretty-printed JSON with a trailing newline.
///
/// Output is deterministic: header names and JSON object keys are sorted.
///
/// # Errors
///
/// Returns an error if serialization fails.
pub fn to_string(cassette: &Cassette) -> Result<String, VcrError> {
    let mut text = serde_json::to_string_pretty(cassette)?;
    text.push('\n');
    Ok(text)
}

/// Writes `cassette` to `path`, creating parent directories as needed.
///
/// The file is overwritten as a whole; concurrent writers to the same path
/// can lose each other's interactions.
///
/// # Errors
///
/// Returns an error if serialization or any filesystem operation fails.
pub fn save(path: &Path, cassette: &Cassette) -> Result<(), VcrError> {
    let text = to_string(cassette)?;
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)
            .map_err(|source| VcrError::Io {
                path: parent.to_path_buf(),
                source,
            })?;
    }
    std::fs::write(path, text).map_err(|source| VcrError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    tracing::debug!(path = %path.display(), interactions = cassette.len(), "saved cassette");
    Ok(())
}

/// Deletes the cassette at `path` so the next record run starts fresh.
///
/// Returns `true` if a file was removed.
///
/// # Errors
///
/// Returns an error if the file exists but cannot be removed.
pub fn delete(path: &Path) -> Result<bool, VcrError> {
    match std::fs::remove_file(path) {
        Ok(()) => Ok(true),
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(false),
        Err(source) => Err(VcrError::Io {
            path: path.to_path_buf(),
            source,
        }),
    }
}
