//! Record, replay and bypass modes over one named cassette.
//!
//! Each [`CassetteSession::handle`] call reads the cassette file, decides
//! what to do from the configured [`Mode`], and writes the file back if it
//! recorded something. Nothing is cached between calls, so two sessions on
//! different cassette names never interact. Two sessions writing the same
//! cassette concurrently can lose interactions: the last writer wins.

use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::format::{Cassette, Interaction, RequestDescriptor, ResponseDescriptor};
use super::{name, recorder, replayer, store};
use crate::adapters::live::LiveClock;
use crate::body::Payload;
use crate::error::VcrError;
use crate::filter::FilterChain;
use crate::matching::MatchCriteria;
use crate::ports::clock::Clock;
use crate::ports::network::{ForwardedResponse, NetworkBridge};

/// How a session treats the network and the cassette.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Mode {
    /// Serve matches from the cassette; record misses from the network.
    Record,
    /// Serve matches from the cassette; fail on misses. Never touches the network.
    #[default]
    Replay,
    /// Always use the network; never read or write the cassette.
    Bypass,
}

impl Mode {
    /// Lowercase name as used in configuration.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Record => "record",
            Self::Replay => "replay",
            Self::Bypass => "bypass",
        }
    }
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Mode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "record" => Ok(Self::Record),
            "replay" => Ok(Self::Replay),
            "bypass" => Ok(Self::Bypass),
            other => Err(format!("unknown mode `{other}`; expected record, replay or bypass")),
        }
    }
}

/// Everything a session needs to know about one cassette.
#[derive(Debug)]
pub struct VcrOptions {
    /// Cassette name as given by the caller; sanitized into a file name.
    pub cassette: String,
    /// Directory holding cassette files.
    pub cassette_dir: PathBuf,
    /// Network and storage behaviour.
    pub mode: Mode,
    /// Dimensions a stored request must agree on.
    pub match_on: MatchCriteria,
    /// Filters applied to new interactions before they are stored.
    pub filters: FilterChain,
}

impl VcrOptions {
    /// Replay-mode options matching on every dimension with no filters.
    pub fn new(cassette: impl Into<String>, cassette_dir: impl Into<PathBuf>) -> Self {
        Self {
            cassette: cassette.into(),
            cassette_dir: cassette_dir.into(),
            mode: Mode::default(),
            match_on: MatchCriteria::default(),
            filters: FilterChain::default(),
        }
    }

    /// Sets the mode.
    #[must_use]
    pub fn mode(mut self, mode: Mode) -> Self {
        self.mode = mode;
        self
    }

    /// Sets the match criteria.
    #[must_use]
    pub fn match_on(mut self, criteria: MatchCriteria) -> Self {
        self.match_on = criteria;
        self
    }

    /// Sets the filter chain.
    #[must_use]
    pub fn filters(mut self, filters: FilterChain) -> Self {
        self.filters = filters;
        self
    }

    /// Sanitized cassette name.
    #[must_use]
    pub fn cassette_name(&self) -> String {
        name::sanitize(&self.cassette)
    }

    /// File backing this cassette.
    #[must_use]
    pub fn cassette_path(&self) -> PathBuf {
        name::cassette_path(&self.cassette_dir, &self.cassette)
    }
}

/// Where a response handed back to the caller came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResponseSource {
    /// Fetched from the network during this call.
    Live,
    /// Served from a stored interaction.
    Replayed,
}

/// The response returned to the interception layer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Exchange {
    /// Status and headers.
    pub response: ResponseDescriptor,
    /// Body bytes; JSON bodies replay in compact, key-sorted form.
    pub body: Vec<u8>,
    /// Whether the network was used.
    pub source: ResponseSource,
}

impl Exchange {
    fn live(forwarded: ForwardedResponse) -> Self {
        Self {
            response: forwarded.response,
            body: forwarded.body,
            source: ResponseSource::Live,
        }
    }

    fn replayed(interaction: &Interaction) -> Self {
        Self {
            response: interaction.response.descriptor(),
            body: interaction.response.body.to_bytes(),
            source: ResponseSource::Replayed,
        }
    }
}

/// The mode state machine for one cassette.
pub struct CassetteSession {
    options: VcrOptions,
    network: Box<dyn NetworkBridge>,
    clock: Box<dyn Clock>,
}

impl CassetteSession {
    /// Creates a session that timestamps recordings with the system clock.
    pub fn new(options: VcrOptions, network: impl NetworkBridge + 'static) -> Self {
        Self {
            options,
            network: Box::new(network),
            clock: Box::new(LiveClock),
        }
    }

    /// Replaces the clock used for `recorded_at`.
    #[must_use]
    pub fn with_clock(mut self, clock: impl Clock + 'static) -> Self {
        self.clock = Box::new(clock);
        self
    }

    /// The options this session was built with.
    #[must_use]
    pub fn options(&self) -> &VcrOptions {
        &self.options
    }

    /// File backing this session's cassette.
    #[must_use]
    pub fn cassette_path(&self) -> PathBuf {
        self.options.cassette_path()
    }

    /// Serves one live request according to the session's mode.
    ///
    /// # Errors
    ///
    /// - [`VcrError::NoMatchingInteraction`] in replay mode when nothing matches.
    /// - [`VcrError::Forwarding`] in record or bypass mode when the network fails;
    ///   nothing is written in that case.
    /// - [`VcrError::Io`] or [`VcrError::Serialize`] if a recording cannot be saved.
    pub fn handle(
        &self,
        request: &RequestDescriptor,
        body: &Payload,
    ) -> Result<Exchange, VcrError> {
        match self.options.mode {
            Mode::Bypass => {
                tracing::debug!(method = %request.method, uri = %request.uri, "bypassing cassette");
                Ok(Exchange::live(self.forward(request, body)?))
            }
            Mode::Replay => {
                let cassette = self.load();
                self.replay(&cassette, request, body)
            }
            Mode::Record => self.record(request, body),
        }
    }

    fn load(&self) -> Cassette {
        store::load(&self.cassette_path()).unwrap_or_default()
    }

    fn replay(
        &self,
        cassette: &Cassette,
        request: &RequestDescriptor,
        body: &Payload,
    ) -> Result<Exchange, VcrError> {
        let criteria = &self.options.match_on;
        let (live, live_body) = self.options.filters.prepare_live(request, body);
        if let Some(hit) = replayer::find_interaction(cassette, &live, &live_body, criteria) {
            tracing::debug!(
                cassette = %self.options.cassette_name(),
                method = %request.method,
                uri = %request.uri,
                "replaying recorded interaction"
            );
            return Ok(Exchange::replayed(hit));
        }

        let mismatches = replayer::closest_mismatches(cassette, &live, &live_body, criteria);
        tracing::debug!(
            cassette = %self.options.cassette_name(),
            method = %request.method,
            uri = %request.uri,
            ?mismatches,
            "no matching interaction"
        );
        Err(VcrError::NoMatchingInteraction {
            cassette: self.options.cassette_name(),
            method: request.method.clone(),
            uri: request.uri.clone(),
            mismatches,
        })
    }

    fn record(&self, request: &RequestDescriptor, body: &Payload) -> Result<Exchange, VcrError> {
        let path = self.cassette_path();
        let cassette = store::load(&path).unwrap_or_default();
        let criteria = &self.options.match_on;
        let (live, live_body) = self.options.filters.prepare_live(request, body);
        if let Some(hit) = replayer::find_interaction(&cassette, &live, &live_body, criteria) {
            tracing::debug!(
                cassette = %self.options.cassette_name(),
                method = %request.method,
                uri = %request.uri,
                "already recorded, replaying"
            );
            return Ok(Exchange::replayed(hit));
        }

        let forwarded = self.forward(request, body)?;
        let updated = recorder::add_interaction(
            cassette,
            request,
            body,
            &forwarded.response,
            &forwarded.body,
            &self.options.filters,
            self.clock.now(),
        );
        store::save(&path, &updated)?;
        tracing::info!(
            cassette = %self.options.cassette_name(),
            method = %request.method,
            uri = %request.uri,
            status = forwarded.response.status,
            interactions = updated.len(),
            "recorded interaction"
        );
        Ok(Exchange::live(forwarded))
    }

    fn forward(
        &self,
        request: &RequestDescriptor,
        body: &Payload,
    ) -> Result<ForwardedResponse, VcrError> {
        self.network.forward(request, &body.to_bytes()).map_err(|err| {
            tracing::warn!(
                method = %request.method,
                uri = %request.uri,
                error = %err,
                "forwarding failed"
            );
            VcrError::from(err)
        })
    }
}

impl fmt::Debug for CassetteSession {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CassetteSession").field("options", &self.options).finish_non_exhaustive()
    }
}
