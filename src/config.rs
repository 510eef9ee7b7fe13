//! Transport configuration.
//!
//! Use the builder methods to customise a [`TransportConfig`], or load one
//! from the environment with [`TransportConfig::from_env`].
//!
//! # Environment
//!
//! | Variable | Default |
//! |----------|---------|
//! | `AGENTSTREAM_URL` | `http://localhost:8000/v1/stream` |
//! | `AGENTSTREAM_HANDSHAKE_TIMEOUT_MS` | `15000` |
//! | `AGENTSTREAM_AGENT_ID` | `default` |

use std::time::Duration;

use crate::error::ConfigError;
use crate::traits::Headers;

pub const ENV_URL: &str = "AGENTSTREAM_URL";
pub const ENV_HANDSHAKE_TIMEOUT_MS: &str = "AGENTSTREAM_HANDSHAKE_TIMEOUT_MS";
pub const ENV_AGENT_ID: &str = "AGENTSTREAM_AGENT_ID";

pub const DEFAULT_URL: &str = "http://localhost:8000/v1/stream";
pub const DEFAULT_HANDSHAKE_TIMEOUT: Duration = Duration::from_secs(15);
pub const DEFAULT_AGENT_ID: &str = "default";

/// Headers every stream request carries. Extra headers never override these.
pub const FIXED_HEADERS: [(&str, &str); 3] = [
    ("Accept", "text/event-stream"),
    ("Cache-Control", "no-cache"),
    ("Content-Type", "application/json"),
];

/// Configuration for a stream transport.
///
/// # Example
///
/// ```ignore
/// use agentstream::config::TransportConfig;
/// use std::time::Duration;
///
/// let config = TransportConfig::default()
///     .with_url("http://localhost:9000/v1/stream")
///     .with_handshake_timeout(Duration::from_secs(5))
///     .with_header("Authorization", "Bearer token");
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransportConfig {
    /// Endpoint the stream request is POSTed to
    pub url: String,
    /// Maximum time from connect to OPEN
    pub handshake_timeout: Duration,
    /// Extra request headers
    pub headers: Headers,
    /// Agent identifier placed in request bodies built from this config
    pub agent_id: String,
}

impl Default for TransportConfig {
    fn default() -> Self {
        Self {
            url: DEFAULT_URL.to_string(),
            handshake_timeout: DEFAULT_HANDSHAKE_TIMEOUT,
            headers: Headers::new(),
            agent_id: DEFAULT_AGENT_ID.to_string(),
        }
    }
}

impl TransportConfig {
    /// Create a new TransportConfig with default values.
    pub fn new() -> Self {
        Self::default()
    }

    /// Load configuration from `AGENTSTREAM_*` environment variables,
    /// falling back to defaults for anything unset.
    pub fn from_env() -> Result<Self, ConfigError> {
        let mut config = Self::default();

        if let Some(url) = read_env(ENV_URL) {
            config.url = url;
        }
        if let Some(raw) = read_env(ENV_HANDSHAKE_TIMEOUT_MS) {
            let millis = raw
                .parse::<u64>()
                .map_err(|e| ConfigError::InvalidValue {
                    key: ENV_HANDSHAKE_TIMEOUT_MS.to_string(),
                    message: e.to_string(),
                })?;
            config.handshake_timeout = Duration::from_millis(millis);
        }
        if let Some(agent_id) = read_env(ENV_AGENT_ID) {
            config.agent_id = agent_id;
        }

        config.validate()?;
        Ok(config)
    }

    /// Set the endpoint URL.
    pub fn with_url(mut self, url: impl Into<String>) -> Self {
        self.url = url.into();
        self
    }

    /// Set the handshake timeout.
    pub fn with_handshake_timeout(mut self, timeout: Duration) -> Self {
        self.handshake_timeout = timeout;
        self
    }

    /// Add an extra request header.
    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.insert(name.into(), value.into());
        self
    }

    /// Set the agent identifier.
    pub fn with_agent_id(mut self, agent_id: impl Into<String>) -> Self {
        self.agent_id = agent_id.into();
        self
    }

    /// Check the values that would otherwise only fail on first connect.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(self.url.starts_with("http://") || self.url.starts_with("https://")) {
            return Err(ConfigError::InvalidValue {
                key: ENV_URL.to_string(),
                message: format!("expected an http(s) URL, got {:?}", self.url),
            });
        }
        if self.handshake_timeout.is_zero() {
            return Err(ConfigError::InvalidValue {
                key: ENV_HANDSHAKE_TIMEOUT_MS.to_string(),
                message: "must be greater than zero".to_string(),
            });
        }
        if self.agent_id.trim().is_empty() {
            return Err(ConfigError::Missing {
                key: ENV_AGENT_ID.to_string(),
            });
        }
        Ok(())
    }

    /// Headers sent with a stream request: extra headers with the fixed
    /// headers applied on top. Header names compare case-insensitively.
    pub fn request_headers(&self) -> Headers {
        let mut headers: Headers = self
            .headers
            .iter()
            .filter(|(name, _)| {
                !FIXED_HEADERS
                    .iter()
                    .any(|(fixed, _)| fixed.eq_ignore_ascii_case(name))
            })
            .map(|(name, value)| (name.clone(), value.clone()))
            .collect();
        for (name, value) in FIXED_HEADERS {
            headers.insert(name.to_string(), value.to_string());
        }
        headers
    }
}

fn read_env(key: &str) -> Option<String> {
    std::env::var(key)
        .ok()
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
}
