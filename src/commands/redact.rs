//! `vcrkit redact` command.

use std::path::Path;

use crate::cassette::Cassette;
use crate::config::Config;
use crate::filter::FilterChain;

/// Execute the `redact` command: run the configured filters over every
/// stored interaction and save the result in place.
///
/// The config goes through the same `VCRKIT_*` overrides a session would see.
///
/// # Errors
///
/// Returns an error string if the config or cassette cannot be read, an
/// override or pattern is invalid, or the cassette cannot be written.
pub fn run(path: &Path, config_path: &Path) -> Result<(), String> {
    let config = Config::load(config_path)
        .and_then(Config::with_env)
        .map_err(|e| e.to_string())?;
    let chain = config.filter_chain().map_err(|e| e.to_string())?;
    if chain.is_identity() {
        return Err(format!("{} configures no filters", config_path.display()));
    }

    let cassette = super::read_cassette(path)?;
    let (redacted, changed) = redact(cassette, &chain);
    super::write_cassette(path, &redacted)?;
    tracing::info!(path = %path.display(), changed, "redacted cassette");
    println!("{}: {changed} of {} interaction(s) changed", path.display(), redacted.len());
    Ok(())
}

/// Applies `chain` to each interaction, returning the new cassette and how
/// many interactions it altered.
#[must_use]
pub fn redact(cassette: Cassette, chain: &FilterChain) -> (Cassette, usize) {
    let mut changed = 0;
    let interactions = cassette
        .interactions
        .into_iter()
        .map(|interaction| {
            let filtered = chain.apply(interaction.clone());
            if filtered != interaction {
                changed += 1;
            }
            filtered
        })
        .collect();
    (
        Cassette {
            interactions,
            ..cassette
        },
        changed,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::body::Body;
    use crate::cassette::store;

    const CASSETTE: &str = r#"{
  "version": "1.0",
  "interactions": [
    {
      "request": {
        "method": "POST",
        "uri": "https://api.example.com/login",
        "headers": {"Authorization": ["Bearer abc"]},
        "body_type": "json",
        "body_json": {"user": "ann", "token": "s3cret"}
      },
      "response": {"status": 200, "headers": {}, "body_type": "text", "body": "ok"},
      "recorded_at": "2025-01-01T00:00:00Z"
    },
    {
      "request": {
        "method": "GET",
        "uri": "https://api.example.com/health",
        "headers": {},
        "body_type": "text",
        "body": ""
      },
      "response": {"status": 204, "headers": {}, "body_type": "text", "body": ""},
      "recorded_at": "2025-01-01T00:00:01Z"
    }
  ]
}"#;

    const CONFIG: &str = r#"
filters:
  patterns:
    - pattern: 's3cret'
      replacement: '<REDACTED>'
  request_headers: [authorization]
"#;

    #[test]
    fn redact_counts_changed_interactions() {
        let cassette = store::parse(CASSETTE).unwrap();
        let chain = Config::from_yaml_str(CONFIG).unwrap().filter_chain().unwrap();
        let (redacted, changed) = redact(cassette, &chain);

        assert_eq!(changed, 1);
        let request = &redacted.interactions[0].request;
        assert!(request.headers.is_empty());
        assert_eq!(
            request.body,
            Body::Json(serde_json::json!({"user": "ann", "token": "<REDACTED>"}))
        );
        assert_eq!(redacted.interactions[1].response.status, 204);
    }

    #[test]
    fn run_rewrites_the_file() {
        let dir = tempfile::tempdir().unwrap();
        let cassette_path = dir.path().join("login.json");
        let config_path = dir.path().join("vcr.yaml");
        std::fs::write(&cassette_path, CASSETTE).unwrap();
        std::fs::write(&config_path, CONFIG).unwrap();

        run(&cassette_path, &config_path).unwrap();

        let content = std::fs::read_to_string(&cassette_path).unwrap();
        assert!(!content.contains("s3cret"));
        assert!(!content.contains("Bearer"));
        assert_eq!(store::load(&cassette_path).unwrap().len(), 2);
    }

    #[test]
    fn run_refuses_empty_filter_config() {
        let dir = tempfile::tempdir().unwrap();
        let cassette_path = dir.path().join("c.json");
        let config_path = dir.path().join("empty.yaml");
        std::fs::write(&cassette_path, CASSETTE).unwrap();
        std::fs::write(&config_path, "mode: record\n").unwrap();

        let err = run(&cassette_path, &config_path).unwrap_err();
        assert!(err.contains("configures no filters"));
        assert_eq!(std::fs::read_to_string(&cassette_path).unwrap(), CASSETTE);
    }
}
