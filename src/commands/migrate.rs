//! `vcrkit migrate` command.

use std::path::Path;

/// Execute the `migrate` command: load (upgrading legacy files) and save
/// back in the current schema.
///
/// # Errors
///
/// Returns an error string if the cassette cannot be read or written.
pub fn run(path: &Path) -> Result<(), String> {
    let cassette = super::read_cassette(path)?;
    super::write_cassette(path, &cassette)?;
    println!(
        "{}: version {}, {} interaction(s)",
        path.display(),
        cassette.version,
        cassette.len()
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::run;
    use crate::cassette::format::SCHEMA_VERSION;
    use crate::cassette::store;
    use serde_json::Value;

    #[test]
    fn rewrites_legacy_file_in_current_schema() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("old.json");
        std::fs::write(&path, r#"{"status": 200, "headers": {"X-Id": "7"}, "body": {"ok": true}}"#)
            .unwrap();

        run(&path).unwrap();

        let content = std::fs::read_to_string(&path).unwrap();
        let written: Value = serde_json::from_str(&content).unwrap();
        assert_eq!(written["version"], SCHEMA_VERSION);
        let interaction = &written["interactions"][0];
        assert_eq!(interaction["request"]["method"], "UNKNOWN");
        assert_eq!(interaction["recorded_at"], "UNKNOWN");
        assert_eq!(interaction["response"]["headers"]["X-Id"][0], "7");
        assert_eq!(interaction["response"]["body_json"]["ok"], true);
    }

    #[test]
    fn current_file_is_stable() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("new.json");
        std::fs::write(&path, r#"{"interactions": []}"#).unwrap();

        run(&path).unwrap();
        let first = std::fs::read_to_string(&path).unwrap();
        run(&path).unwrap();
        assert_eq!(std::fs::read_to_string(&path).unwrap(), first);
        assert!(store::load(&path).unwrap().is_empty());
    }
}
