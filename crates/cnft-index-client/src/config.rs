//! Index client configuration.
//!
//! The index is a single JSON-RPC endpoint. Hosted providers authenticate with
//! an `api-key` query parameter; self-hosted indexes usually need none.

use url::Url;
use zeroize::Zeroizing;

/// Configuration for connecting to the asset index.
///
/// Custom `Debug` implementation redacts the `api_key` field
/// to prevent credential leakage in log output.
#[derive(Clone)]
pub struct IndexConfig {
    /// JSON-RPC endpoint of the index.
    pub url: Url,
    /// Optional API key, sent as the `api-key` query parameter.
    pub api_key: Option<Zeroizing<String>>,
    /// Request timeout in seconds.
    pub timeout_secs: u64,
}

impl std::fmt::Debug for IndexConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("IndexConfig")
            .field("url", &self.url)
            .field("api_key", &self.api_key.as_ref().map(|_| "[REDACTED]"))
            .field("timeout_secs", &self.timeout_secs)
            .finish()
    }
}

impl IndexConfig {
    /// Configuration for `url` with no API key and a 30 second timeout.
    pub fn new(url: Url) -> Self {
        Self {
            url,
            api_key: None,
            timeout_secs: 30,
        }
    }

    /// Create a configuration pointing to a local mock server (for testing).
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::InvalidUrl` if `base` cannot be parsed.
    pub fn local_mock(base: &str) -> Result<Self, ConfigError> {
        let url = Url::parse(base)
            .map_err(|e| ConfigError::InvalidUrl(base.to_string(), e.to_string()))?;
        Ok(Self {
            url,
            api_key: None,
            timeout_secs: 5,
        })
    }
}

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("invalid URL for {0}: {1}")]
    InvalidUrl(String, String),
}
