//! Subscriber setup for the `vcrkit` binary.

use tracing_subscriber::EnvFilter;

const DEFAULT_DIRECTIVE: &str = "warn";

/// Installs a stderr fmt subscriber.
///
/// `cli_level` wins over `RUST_LOG`; with neither set only warnings show.
/// A subscriber that is already installed is left in place.
///
/// # Errors
///
/// Returns an error string if the chosen directive does not parse.
pub fn init(cli_level: Option<&str>) -> Result<(), String> {
    let filter = resolve_filter(cli_level, std::env::var("RUST_LOG").ok().as_deref())?;
    let installed = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
    if installed.is_err() {
        tracing::debug!("logging subscriber already installed");
    }
    Ok(())
}

fn resolve_filter(cli_level: Option<&str>, env: Option<&str>) -> Result<EnvFilter, String> {
    let directive = cli_level
        .or(env)
        .map(str::trim)
        .filter(|value| !value.is_empty())
        .unwrap_or(DEFAULT_DIRECTIVE);
    EnvFilter::try_new(directive.to_ascii_lowercase())
        .map_err(|err| format!("invalid log level `{directive}`: {err}"))
}

#[cfg(test)]
mod tests {
    use super::resolve_filter;

    #[test]
    fn cli_level_wins_over_env() {
        let filter = resolve_filter(Some("DEBUG"), Some("error")).unwrap();
        assert_eq!(filter.to_string(), "debug");
    }

    #[test]
    fn env_used_without_cli_level() {
        let filter = resolve_filter(None, Some("vcrkit=trace")).unwrap();
        assert_eq!(filter.to_string(), "vcrkit=trace");
    }

    #[test]
    fn defaults_to_warn() {
        assert_eq!(resolve_filter(None, None).unwrap().to_string(), "warn");
        assert_eq!(resolve_filter(Some("  "), None).unwrap().to_string(), "warn");
    }

    #[test]
    fn rejects_garbage_directive() {
        let err = resolve_filter(Some("very=loud=please"), None).unwrap_err();
        assert!(err.contains("invalid log level"));
    }
}
