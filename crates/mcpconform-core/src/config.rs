//! Conformance run configuration
//!
//! Values come from the process environment, optionally seeded from a `.env`
//! file. Every variable has a default so an empty environment yields a config
//! that targets the in-process fixture servers.

use std::time::Duration;

use thiserror::Error;
use tracing::debug;
use url::Url;

use crate::fixture::Fixture;

/// External server base URL (e.g. `http://localhost:8000/zmcp`)
pub const BASE_URL_VAR: &str = "MCPCONFORM_BASE_URL";
/// Per-request timeout in seconds
pub const TIMEOUT_VAR: &str = "MCPCONFORM_TIMEOUT_SECS";
/// Client name reported during initialize
pub const CLIENT_NAME_VAR: &str = "MCPCONFORM_CLIENT_NAME";

const DEFAULT_TIMEOUT_SECS: u64 = 30;
const DEFAULT_CLIENT_NAME: &str = "test-client";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("{var} is not a valid URL: {source}")]
    InvalidUrl {
        var: &'static str,
        #[source]
        source: url::ParseError,
    },

    #[error("{var} must be a positive number of seconds, got '{value}'")]
    InvalidTimeout { var: &'static str, value: String },
}

/// Settings shared by every conformance scenario
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConformanceConfig {
    /// External server to test; `None` means the caller starts fixtures itself
    pub base_url: Option<Url>,
    pub request_timeout: Duration,
    pub client_name: String,
}

impl Default for ConformanceConfig {
    fn default() -> Self {
        Self {
            base_url: None,
            request_timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            client_name: DEFAULT_CLIENT_NAME.to_string(),
        }
    }
}

impl ConformanceConfig {
    /// Load from the process environment after reading `.env` if present.
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load using an arbitrary variable lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();

        if let Some(raw) = non_empty(lookup(BASE_URL_VAR)) {
            let url = Url::parse(raw.trim()).map_err(|source| ConfigError::InvalidUrl {
                var: BASE_URL_VAR,
                source,
            })?;
            config.base_url = Some(url);
        }

        if let Some(raw) = non_empty(lookup(TIMEOUT_VAR)) {
            let secs = raw
                .trim()
                .parse::<u64>()
                .ok()
                .filter(|secs| *secs > 0)
                .ok_or_else(|| ConfigError::InvalidTimeout {
                    var: TIMEOUT_VAR,
                    value: raw.clone(),
                })?;
            config.request_timeout = Duration::from_secs(secs);
        }

        if let Some(name) = non_empty(lookup(CLIENT_NAME_VAR)) {
            config.client_name = name;
        }

        debug!(
            base_url = ?config.base_url.as_ref().map(Url::as_str),
            timeout_secs = config.request_timeout.as_secs(),
            client_name = %config.client_name,
            "Loaded conformance config"
        );

        Ok(config)
    }

    /// Use `base_url` unless an external target was configured.
    pub fn with_fallback_base(mut self, base_url: Url) -> Self {
        if self.base_url.is_none() {
            self.base_url = Some(base_url);
        }
        self
    }

    /// Whether the suite points at a server it did not start
    pub fn is_external(&self) -> bool {
        self.base_url.is_some()
    }

    /// Full endpoint URL for a fixture, or `None` when no base URL is known.
    pub fn fixture_url(&self, fixture: Fixture) -> Option<String> {
        self.base_url
            .as_ref()
            .map(|base| fixture.url_under(base.as_str()))
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}
