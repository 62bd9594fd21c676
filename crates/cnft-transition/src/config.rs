//! Client configuration.
//!
//! Endpoints, credentials and retry tuning for one deployment. Defaults point
//! at devnet. Override via environment variables or explicit construction.
//! The CLI turns this into the concrete index and ledger client configs.

use std::time::Duration;

use cnft_core::programs::DEFAULT_TRANSITION_PROGRAM;
use cnft_core::{decode_address, Commitment, ProgramIds, Pubkey};
use url::Url;
use zeroize::Zeroizing;

use crate::submission::RetryPolicy;

pub const DEFAULT_INDEX_URL: &str = "https://devnet.helius-rpc.com";
pub const DEFAULT_LEDGER_RPC_URL: &str = "https://api.devnet.solana.com";

/// Configuration for reaching the index and the ledger.
///
/// Custom `Debug` implementation redacts `index_api_key`.
#[derive(Clone)]
pub struct CnftConfig {
    /// Asset index (DAS) endpoint.
    pub index_url: Url,
    /// Index API key, sent as the `api-key` query parameter.
    pub index_api_key: Option<Zeroizing<String>>,
    /// Ledger JSON-RPC endpoint.
    pub ledger_rpc_url: Url,
    /// Deployed transition program.
    pub program_id: Pubkey,
    /// Commitment required for reads and confirmation.
    pub commitment: Commitment,
    /// Per-request timeout in seconds.
    pub timeout_secs: u64,
    /// How long to poll for confirmation per attempt, in seconds.
    pub confirm_timeout_secs: u64,
    /// Backoff for submission.
    pub retry: RetryPolicy,
}

impl std::fmt::Debug for CnftConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CnftConfig")
            .field("index_url", &self.index_url)
            .field(
                "index_api_key",
                &self.index_api_key.as_ref().map(|_| "[REDACTED]"),
            )
            .field("ledger_rpc_url", &self.ledger_rpc_url)
            .field("program_id", &self.program_id)
            .field("commitment", &self.commitment)
            .field("timeout_secs", &self.timeout_secs)
            .field("confirm_timeout_secs", &self.confirm_timeout_secs)
            .field("retry", &self.retry)
            .finish()
    }
}

impl CnftConfig {
    /// Load configuration from environment variables.
    ///
    /// Variables:
    /// - `CNFT_INDEX_URL` (default: `https://devnet.helius-rpc.com`)
    /// - `CNFT_INDEX_API_KEY` (optional)
    /// - `CNFT_LEDGER_RPC_URL` (default: `https://api.devnet.solana.com`)
    /// - `CNFT_PROGRAM_ID` (default: the devnet deployment)
    /// - `CNFT_COMMITMENT` (default: `confirmed`)
    /// - `CNFT_TIMEOUT_SECS` (default: 30)
    /// - `CNFT_CONFIRM_TIMEOUT_SECS` (default: 30)
    /// - `CNFT_MAX_RETRIES` (default: 5)
    /// - `CNFT_INITIAL_DELAY_MS` (default: 1000)
    /// - `CNFT_BACKOFF_FACTOR` (default: 2)
    /// - `CNFT_MAX_DELAY_MS` (default: 5000)
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Load configuration through an arbitrary variable lookup.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let defaults = RetryPolicy::default();
        let commitment = match lookup("CNFT_COMMITMENT") {
            Some(raw) => raw
                .parse::<Commitment>()
                .map_err(|e| ConfigError::InvalidValue("CNFT_COMMITMENT".to_string(), e.0))?,
            None => Commitment::default(),
        };
        let program_id = match lookup("CNFT_PROGRAM_ID") {
            Some(raw) => decode_address(&raw)
                .map_err(|_| ConfigError::InvalidValue("CNFT_PROGRAM_ID".to_string(), raw))?,
            None => DEFAULT_TRANSITION_PROGRAM,
        };

        Ok(Self {
            index_url: lookup_url(&lookup, "CNFT_INDEX_URL", DEFAULT_INDEX_URL)?,
            index_api_key: lookup("CNFT_INDEX_API_KEY")
                .filter(|k| !k.is_empty())
                .map(Zeroizing::new),
            ledger_rpc_url: lookup_url(&lookup, "CNFT_LEDGER_RPC_URL", DEFAULT_LEDGER_RPC_URL)?,
            program_id,
            commitment,
            timeout_secs: lookup_num(&lookup, "CNFT_TIMEOUT_SECS", 30)?,
            confirm_timeout_secs: lookup_num(&lookup, "CNFT_CONFIRM_TIMEOUT_SECS", 30)?,
            retry: RetryPolicy {
                max_retries: lookup_num(&lookup, "CNFT_MAX_RETRIES", defaults.max_retries)?,
                initial_delay: Duration::from_millis(lookup_num(
                    &lookup,
                    "CNFT_INITIAL_DELAY_MS",
                    defaults.initial_delay.as_millis() as u64,
                )?),
                backoff_factor: lookup_num(&lookup, "CNFT_BACKOFF_FACTOR", defaults.backoff_factor)?,
                max_delay: Duration::from_millis(lookup_num(
                    &lookup,
                    "CNFT_MAX_DELAY_MS",
                    defaults.max_delay.as_millis() as u64,
                )?),
            },
        })
    }

    /// Configuration pointing at local mock servers (for testing).
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::InvalidUrl` if either URL cannot be parsed.
    pub fn local_mock(index_url: &str, ledger_rpc_url: &str) -> Result<Self, ConfigError> {
        let parse = |name: &str, raw: &str| {
            Url::parse(raw).map_err(|e| ConfigError::InvalidUrl(name.to_string(), e.to_string()))
        };
        Ok(Self {
            index_url: parse("index", index_url)?,
            index_api_key: None,
            ledger_rpc_url: parse("ledger", ledger_rpc_url)?,
            program_id: DEFAULT_TRANSITION_PROGRAM,
            commitment: Commitment::Confirmed,
            timeout_secs: 5,
            confirm_timeout_secs: 1,
            retry: RetryPolicy {
                initial_delay: Duration::from_millis(10),
                max_delay: Duration::from_millis(50),
                ..RetryPolicy::default()
            },
        })
    }

    /// Program set for this deployment.
    pub fn programs(&self) -> ProgramIds {
        ProgramIds::with_transition_program(self.program_id)
    }
}

fn lookup_url(
    lookup: &impl Fn(&str) -> Option<String>,
    var: &str,
    default: &str,
) -> Result<Url, ConfigError> {
    let raw = lookup(var).unwrap_or_else(|| default.to_string());
    Url::parse(&raw).map_err(|e| ConfigError::InvalidUrl(var.to_string(), e.to_string()))
}

fn lookup_num<T: std::str::FromStr>(
    lookup: &impl Fn(&str) -> Option<String>,
    var: &str,
    default: T,
) -> Result<T, ConfigError> {
    match lookup(var) {
        Some(raw) => raw
            .trim()
            .parse()
            .map_err(|_| ConfigError::InvalidValue(var.to_string(), raw)),
        None => Ok(default),
    }
}

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("invalid URL for {0}: {1}")]
    InvalidUrl(String, String),
    #[error("invalid value for {0}: {1:?}")]
    InvalidValue(String, String),
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |name| map.get(name).cloned()
    }

    #[test]
    fn defaults_when_nothing_set() {
        let cfg = CnftConfig::from_lookup(lookup(&[])).unwrap();
        assert_eq!(cfg.index_url.as_str(), "https://devnet.helius-rpc.com/");
        assert_eq!(cfg.ledger_rpc_url.as_str(), "https://api.devnet.solana.com/");
        assert_eq!(cfg.program_id, DEFAULT_TRANSITION_PROGRAM);
        assert_eq!(cfg.commitment, Commitment::Confirmed);
        assert_eq!(cfg.timeout_secs, 30);
        assert_eq!(cfg.retry, RetryPolicy::default());
        assert!(cfg.index_api_key.is_none());
    }

    #[test]
    fn overrides_are_applied() {
        let cfg = CnftConfig::from_lookup(lookup(&[
            ("CNFT_INDEX_URL", "http://127.0.0.1:8899"),
            ("CNFT_INDEX_API_KEY", "secret-key"),
            ("CNFT_COMMITMENT", "Finalized"),
            ("CNFT_MAX_RETRIES", "2"),
            ("CNFT_INITIAL_DELAY_MS", "250"),
            ("CNFT_PROGRAM_ID", "BGUMAp9Gq7iTEuizy4pqaxsTyUCBK68MDfK752saRPUY"),
        ]))
        .unwrap();
        assert_eq!(cfg.index_url.as_str(), "http://127.0.0.1:8899/");
        assert_eq!(cfg.index_api_key.as_deref().map(String::as_str), Some("secret-key"));
        assert_eq!(cfg.commitment, Commitment::Finalized);
        assert_eq!(cfg.retry.max_retries, 2);
        assert_eq!(cfg.retry.initial_delay, Duration::from_millis(250));
        assert_eq!(cfg.programs().transition_program, cnft_core::programs::BUBBLEGUM);
    }

    #[test]
    fn invalid_values_are_rejected() {
        assert!(matches!(
            CnftConfig::from_lookup(lookup(&[("CNFT_LEDGER_RPC_URL", "not a url")])),
            Err(ConfigError::InvalidUrl(var, _)) if var == "CNFT_LEDGER_RPC_URL"
        ));
        assert!(matches!(
            CnftConfig::from_lookup(lookup(&[("CNFT_MAX_RETRIES", "many")])),
            Err(ConfigError::InvalidValue(var, _)) if var == "CNFT_MAX_RETRIES"
        ));
        assert!(matches!(
            CnftConfig::from_lookup(lookup(&[("CNFT_COMMITMENT", "recent")])),
            Err(ConfigError::InvalidValue(var, value)) if var == "CNFT_COMMITMENT" && value == "recent"
        ));
        assert!(matches!(
            CnftConfig::from_lookup(lookup(&[("CNFT_PROGRAM_ID", "0OIl")])),
            Err(ConfigError::InvalidValue(..))
        ));
    }

    #[test]
    fn debug_redacts_api_key() {
        let cfg = CnftConfig::from_lookup(lookup(&[("CNFT_INDEX_API_KEY", "super-secret")])).unwrap();
        let rendered = format!("{cfg:?}");
        assert!(!rendered.contains("super-secret"));
        assert!(rendered.contains("[REDACTED]"));
    }

    #[test]
    fn local_mock_builds_valid_config() {
        let cfg = CnftConfig::local_mock("http://127.0.0.1:9000", "http://127.0.0.1:9001").unwrap();
        assert_eq!(cfg.timeout_secs, 5);
        assert_eq!(cfg.ledger_rpc_url.as_str(), "http://127.0.0.1:9001/");
    }
}
