//! Ledger client configuration.

use url::Url;

pub use cnft_core::Commitment;

/// Configuration for connecting to the ledger RPC.
#[derive(Debug, Clone)]
pub struct LedgerConfig {
    /// JSON-RPC endpoint.
    pub rpc_url: Url,
    /// Commitment for reads, preflight and confirmation.
    pub commitment: Commitment,
    /// Per-request timeout in seconds.
    pub timeout_secs: u64,
    /// How long `confirm` polls before giving up, in seconds.
    pub confirm_timeout_secs: u64,
    /// Delay between signature status polls, in milliseconds.
    pub poll_interval_ms: u64,
}

impl LedgerConfig {
    /// Defaults: `confirmed` commitment, 30s request timeout, 30s
    /// confirmation window polled every 500ms.
    pub fn new(rpc_url: Url) -> Self {
        Self {
            rpc_url,
            commitment: Commitment::Confirmed,
            timeout_secs: 30,
            confirm_timeout_secs: 30,
            poll_interval_ms: 500,
        }
    }

    /// Create a configuration pointing to a local mock server (for testing).
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::InvalidUrl` if `base` cannot be parsed.
    pub fn local_mock(base: &str) -> Result<Self, ConfigError> {
        let rpc_url = Url::parse(base)
            .map_err(|e| ConfigError::InvalidUrl(base.to_string(), e.to_string()))?;
        Ok(Self {
            rpc_url,
            commitment: Commitment::Confirmed,
            timeout_secs: 5,
            confirm_timeout_secs: 1,
            poll_interval_ms: 20,
        })
    }
}

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("invalid URL for {0}: {1}")]
    InvalidUrl(String, String),
}
