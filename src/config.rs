//! YAML configuration with environment overrides.
//!
//! ```yaml
//! mode: replay
//! cassette_dir: tests/cassettes
//! match_on: [method, uri, query, headers, body]
//! filters:
//!   patterns:
//!     - pattern: '"token":"[^"]+"'
//!       replacement: '"token":"<REDACTED>"'
//!   request_headers: [authorization]
//!   response_headers: [set-cookie]
//! ```
//!
//! `VCRKIT_MODE`, `VCRKIT_CASSETTE_DIR` and `VCRKIT_MATCH_ON` override the file.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::cassette::session::{Mode, VcrOptions};
use crate::filter::{FilterChain, PatternFilter};
use crate::matching::{Dimension, MatchCriteria};

/// Environment variable overriding [`Config::mode`].
pub const MODE_ENV: &str = "VCRKIT_MODE";
/// Environment variable overriding [`Config::cassette_dir`].
pub const CASSETTE_DIR_ENV: &str = "VCRKIT_CASSETTE_DIR";
/// Environment variable overriding [`Config::match_on`], comma separated.
pub const MATCH_ON_ENV: &str = "VCRKIT_MATCH_ON";

const DEFAULT_CASSETTE_DIR: &str = "cassettes";

/// Errors raised while reading or applying configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The config file could not be read.
    #[error("failed to read config {}: {source}", .path.display())]
    Read {
        /// Config file path.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },
    /// The config file is not valid YAML for this schema.
    #[error("failed to parse config: {0}")]
    Parse(#[from] serde_yaml::Error),
    /// A pattern filter does not compile.
    #[error("invalid filter pattern `{pattern}`: {source}")]
    InvalidPattern {
        /// The offending pattern.
        pattern: String,
        /// Regex compile error.
        #[source]
        source: regex::Error,
    },
    /// An environment override names an unknown mode.
    #[error("invalid {MODE_ENV}: {0}")]
    InvalidMode(String),
    /// An environment override names an unknown match dimension.
    #[error("invalid {MATCH_ON_ENV}: {0}")]
    InvalidMatchDimension(String),
}

/// One `(pattern, replacement)` entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PatternConfig {
    /// Regular expression to search for.
    pub pattern: String,
    /// Replacement, with `$1`-style group references.
    #[serde(default)]
    pub replacement: String,
}

/// Declarative part of the filter chain. Transforms are code-only.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FilterConfig {
    /// Substitutions over uri, query and bodies.
    pub patterns: Vec<PatternConfig>,
    /// Request headers to drop.
    pub request_headers: Vec<String>,
    /// Response headers to drop.
    pub response_headers: Vec<String>,
}

/// Top-level configuration. Every field is optional.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Session mode; replay when unset.
    pub mode: Option<Mode>,
    /// Cassette directory; `cassettes` when unset.
    pub cassette_dir: Option<PathBuf>,
    /// Match dimensions; all five when unset.
    pub match_on: Option<Vec<Dimension>>,
    /// Filters applied before recording.
    pub filters: FilterConfig,
}

impl Config {
    /// Reads a YAML config file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)
            .map_err(|source| ConfigError::Read {
                path: path.to_path_buf(),
                source,
            })?;
        Self::from_yaml_str(&content)
    }

    /// Parses YAML config text. An empty document yields the defaults.
    ///
    /// # Errors
    ///
    /// Returns an error if the text is not valid YAML for this schema.
    pub fn from_yaml_str(content: &str) -> Result<Self, ConfigError> {
        if content.trim().is_empty() {
            return Ok(Self::default());
        }
        Ok(serde_yaml::from_str(content)?)
    }

    /// Applies `VCRKIT_*` environment overrides.
    ///
    /// # Errors
    ///
    /// Returns an error if an override names an unknown mode or dimension.
    pub fn with_env(self) -> Result<Self, ConfigError> {
        self.with_overrides(|key| std::env::var(key).ok())
    }

    /// Applies overrides from an arbitrary variable lookup.
    ///
    /// # Errors
    ///
    /// Returns an error if an override names an unknown mode or dimension.
    pub fn with_overrides<F>(mut self, lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(mode) = lookup(MODE_ENV).filter(|v| !v.trim().is_empty()) {
            self.mode = Some(mode.parse().map_err(ConfigError::InvalidMode)?);
        }
        if let Some(dir) = lookup(CASSETTE_DIR_ENV).filter(|v| !v.trim().is_empty()) {
            self.cassette_dir = Some(PathBuf::from(dir));
        }
        if let Some(list) = lookup(MATCH_ON_ENV).filter(|v| !v.trim().is_empty()) {
            let dimensions = list
                .split(',')
                .map(str::trim)
                .filter(|item| !item.is_empty())
                .map(str::parse::<Dimension>)
                .collect::<Result<Vec<_>, _>>()
                .map_err(ConfigError::InvalidMatchDimension)?;
            self.match_on = Some(dimensions);
        }
        Ok(self)
    }

    /// Effective mode.
    #[must_use]
    pub fn mode(&self) -> Mode {
        self.mode.unwrap_or_default()
    }

    /// Effective cassette directory.
    #[must_use]
    pub fn cassette_dir(&self) -> PathBuf {
        self.cassette_dir.clone().unwrap_or_else(|| PathBuf::from(DEFAULT_CASSETTE_DIR))
    }

    /// Effective match criteria.
    #[must_use]
    pub fn match_criteria(&self) -> MatchCriteria {
        self.match_on.as_ref().map_or_else(MatchCriteria::all, |dims| {
            MatchCriteria::new(dims.iter().copied())
        })
    }

    /// Compiles the declarative filters.
    ///
    /// # Errors
    ///
    /// Returns an error if a pattern does not compile.
    pub fn filter_chain(&self) -> Result<FilterChain, ConfigError> {
        let mut chain = FilterChain::new();
        for entry in &self.filters.patterns {
            let filter = PatternFilter::new(&entry.pattern, entry.replacement.clone()).map_err(
                |source| ConfigError::InvalidPattern { pattern: entry.pattern.clone(), source },
            )?;
            chain = chain.pattern(filter);
        }
        for name in &self.filters.request_headers {
            chain = chain.remove_request_header(name.clone());
        }
        for name in &self.filters.response_headers {
            chain = chain.remove_response_header(name.clone());
        }
        Ok(chain)
    }

    /// Session options for the named cassette.
    ///
    /// # Errors
    ///
    /// Returns an error if a pattern does not compile.
    pub fn options(&self, cassette: &str) -> Result<VcrOptions, ConfigError> {
        Ok(VcrOptions::new(cassette, self.cassette_dir())
            .mode(self.mode())
            .match_on(self.match_criteria())
            .filters(self.filter_chain()?))
    }
}
