//! Mapping from human cassette names to file paths.

use std::path::{Path, PathBuf};

/// File extension of cassette files.
pub const EXTENSION: &str = "json";

const FALLBACK: &str = "cassette";

/// Reduces `name` to a safe file stem.
///
/// ASCII letters, digits, `-` and `_` are kept; everything else (whitespace,
/// path separators, punctuation, non-ASCII) becomes `_`. Runs of `_`
/// collapse to one and leading or trailing `_` are trimmed.
#[must_use]
pub fn sanitize(name: &str) -> String {
    let mut out = String::with_capacity(name.len());
    for c in name.chars() {
        let mapped = if c.is_ascii_alphanumeric() || c == '-' { c } else { '_' };
        if mapped == '_' && out.ends_with('_') {
            continue;
        }
        out.push(mapped);
    }
    let trimmed = out.trim_matches('_');
    if trimmed.is_empty() {
        FALLBACK.to_string()
    } else {
        trimmed.to_string()
    }
}

/// `<dir>/<sanitized name>.json`.
#[must_use]
pub fn cassette_path(dir: &Path, name: &str) -> PathBuf {
    dir.join(format!("{}.{EXTENSION}", sanitize(name)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn keeps_safe_characters() {
        assert_eq!(sanitize("user-login_v2"), "user-login_v2");
    }

    #[test]
    fn replaces_separators_and_punctuation() {
        assert_eq!(sanitize("tests/api::get user (happy path)"), "tests_api_get_user_happy_path");
        assert_eq!(sanitize(r"..\..\etc\passwd"), "etc_passwd");
        assert_eq!(sanitize("a . b"), "a_b");
    }

    #[test]
    fn collapses_and_trims_underscores() {
        assert_eq!(sanitize("__a___b__"), "a_b");
        assert_eq!(sanitize("  spaced   out  "), "spaced_out");
    }

    #[test]
    fn empty_names_fall_back() {
        assert_eq!(sanitize(""), "cassette");
        assert_eq!(sanitize("///"), "cassette");
    }

    #[test]
    fn path_stays_inside_directory() {
        let path = cassette_path(Path::new("/fixtures"), "../../outside");
        assert_eq!(path, PathBuf::from("/fixtures/outside.json"));
    }
}
