//! Client configuration.
//!
//! Loaded from TOML:
//!
//! ```toml
//! endpoint = "http://catalog.internal:50051"
//! connect_timeout_ms = 5000
//! request_timeout_ms = 30000
//! ```
//!
//! or from `CATALOG_ENDPOINT`, `CATALOG_CONNECT_TIMEOUT_MS` and
//! `CATALOG_REQUEST_TIMEOUT_MS`. A process-wide copy can be installed once
//! with [`init`] and read anywhere with [`global`].

use std::path::Path;
use std::sync::OnceLock;
use std::time::Duration;

use serde::Deserialize;

use crate::error::CatalogError;

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ClientConfig {
    #[serde(default = "default_endpoint")]
    pub endpoint: String,
    #[serde(default = "default_connect_timeout_ms")]
    pub connect_timeout_ms: u64,
    /// Per-call deadline. `0` leaves calls without a deadline.
    #[serde(default)]
    pub request_timeout_ms: u64,
}

fn default_endpoint() -> String {
    "http://127.0.0.1:8080".to_string()
}
fn default_connect_timeout_ms() -> u64 {
    5_000
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            endpoint: default_endpoint(),
            connect_timeout_ms: default_connect_timeout_ms(),
            request_timeout_ms: 0,
        }
    }
}

impl ClientConfig {
    pub fn new(endpoint: impl Into<String>) -> Self {
        Self {
            endpoint: endpoint.into(),
            ..Self::default()
        }
    }

    pub fn with_request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout_ms = u64::try_from(timeout.as_millis()).unwrap_or(u64::MAX);
        self
    }

    pub fn connect_timeout(&self) -> Duration {
        Duration::from_millis(self.connect_timeout_ms)
    }

    pub fn request_timeout(&self) -> Option<Duration> {
        (self.request_timeout_ms > 0).then(|| Duration::from_millis(self.request_timeout_ms))
    }

    pub fn from_toml_str(text: &str) -> Result<Self, CatalogError> {
        toml::from_str(text).map_err(|e| CatalogError::Config(e.to_string()))
    }

    pub fn load(path: &Path) -> Result<Self, CatalogError> {
        let text = std::fs::read_to_string(path).map_err(|e| {
            CatalogError::Config(format!("failed to read {}: {}", path.display(), e))
        })?;
        Self::from_toml_str(&text)
    }

    /// Defaults overridden by any `CATALOG_*` variables that are set.
    pub fn from_env() -> Result<Self, CatalogError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, CatalogError> {
        let mut config = Self::default();
        if let Some(endpoint) = lookup("CATALOG_ENDPOINT") {
            config.endpoint = endpoint;
        }
        if let Some(ms) = lookup("CATALOG_CONNECT_TIMEOUT_MS") {
            config.connect_timeout_ms = parse_ms("CATALOG_CONNECT_TIMEOUT_MS", &ms)?;
        }
        if let Some(ms) = lookup("CATALOG_REQUEST_TIMEOUT_MS") {
            config.request_timeout_ms = parse_ms("CATALOG_REQUEST_TIMEOUT_MS", &ms)?;
        }
        Ok(config)
    }

    /// Build a lazily-connecting channel for this endpoint.
    pub fn endpoint(&self) -> Result<tonic::transport::Endpoint, CatalogError> {
        let endpoint = tonic::transport::Endpoint::from_shared(self.endpoint.clone())
            .map_err(|e| CatalogError::Config(format!("bad endpoint {}: {}", self.endpoint, e)))?
            .connect_timeout(self.connect_timeout());
        Ok(endpoint)
    }
}

fn parse_ms(key: &str, value: &str) -> Result<u64, CatalogError> {
    value
        .trim()
        .parse()
        .map_err(|_| CatalogError::Config(format!("{} must be milliseconds, got {:?}", key, value)))
}

static GLOBAL: OnceLock<ClientConfig> = OnceLock::new();

/// Install the process-wide configuration.
///
/// Fails if a configuration was already installed, including one created
/// implicitly by an earlier [`global`] call.
pub fn init(config: ClientConfig) -> Result<(), CatalogError> {
    GLOBAL
        .set(config)
        .map_err(|_| CatalogError::Config("global configuration already initialized".into()))
}

/// The process-wide configuration.
///
/// Falls back to [`ClientConfig::from_env`] on first use if [`init`] was never
/// called; a malformed environment then yields the defaults.
pub fn global() -> &'static ClientConfig {
    GLOBAL.get_or_init(|| {
        ClientConfig::from_env().unwrap_or_else(|e| {
            tracing::warn!(error = %e, "ignoring catalog environment, using defaults");
            ClientConfig::default()
        })
    })
}
