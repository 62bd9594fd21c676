//! # cnft-ledger-client -- Typed JSON-RPC client for the ledger
//!
//! The handful of ledger calls a compressed asset transition needs, and
//! nothing more:
//!
//! | Method | Operation |
//! |--------|-----------|
//! | `getAccountInfo` | Read and decode a concurrent Merkle tree account ([`tree`]) |
//! | `getLatestBlockhash` | Anchor a new transaction |
//! | `sendTransaction` | Submit a signed transaction (base64) |
//! | `getSignatureStatuses` | Poll until the configured commitment is reached |
//!
//! [`LedgerClient`] implements [`cnft_core::LedgerReader`] and
//! [`cnft_core::LedgerSubmitter`]. It never retries a send on its own; the
//! submission engine in `cnft-transition` owns that policy. [`Keypair`]
//! implements [`cnft_core::TransactionSigner`] over a JSON key file.

pub mod config;
pub mod keypair;
pub(crate) mod rpc;
pub mod tree;

pub use cnft_core::LedgerError;
pub use config::{Commitment, LedgerConfig};
pub use keypair::{Keypair, KeypairError};

use std::time::Duration;

use async_trait::async_trait;
use base64::Engine;
use cnft_core::{
    decode_blockhash, decode_signature, Hash, LedgerReader, LedgerSubmitter, Pubkey, Signature,
    SignedTransaction, TreeState,
};
use serde_json::json;

use crate::rpc::{rpc_call, AccountInfo, LatestBlockhash, SignatureStatus, WithContext};

/// Ledger JSON-RPC client.
#[derive(Debug, Clone)]
pub struct LedgerClient {
    http: reqwest::Client,
    config: LedgerConfig,
}

impl LedgerClient {
    /// Create a new ledger client from configuration.
    pub fn new(config: LedgerConfig) -> Result<Self, LedgerError> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| LedgerError::Unavailable {
                endpoint: "client_init".into(),
                reason: e.to_string(),
            })?;
        Ok(Self { http, config })
    }

    /// Configured commitment level.
    pub fn commitment(&self) -> Commitment {
        self.config.commitment
    }

    /// Raw data of the account at `address`.
    ///
    /// # Errors
    ///
    /// [`LedgerError::AccountNotFound`] when the account does not exist.
    pub async fn account_data(&self, address: &Pubkey) -> Result<Vec<u8>, LedgerError> {
        let info: WithContext<Option<AccountInfo>> = rpc_call(
            &self.http,
            &self.config.rpc_url,
            "getAccountInfo",
            json!([
                address.to_string(),
                { "encoding": "base64", "commitment": self.config.commitment }
            ]),
        )
        .await?;

        let info = info
            .value
            .ok_or(LedgerError::AccountNotFound { address: *address })?;
        tracing::debug!(%address, owner = %info.owner, "account read");

        base64::engine::general_purpose::STANDARD
            .decode(info.data.0.as_bytes())
            .map_err(|e| LedgerError::Unavailable {
                endpoint: "getAccountInfo".into(),
                reason: format!("account data is not base64: {e}"),
            })
    }

    /// Read and decode the tree account at `address`.
    pub async fn get_tree_state(&self, address: &Pubkey) -> Result<TreeState, LedgerError> {
        let data = self.account_data(address).await?;
        let state = tree::decode_tree_account(*address, &data)?;
        tracing::debug!(
            tree = %address,
            root = %state.root,
            seq = state.sequence_number,
            next_leaf = state.next_leaf_index,
            "tree state read"
        );
        Ok(state)
    }

    /// Latest blockhash at the configured commitment.
    pub async fn get_latest_blockhash(&self) -> Result<Hash, LedgerError> {
        let latest: WithContext<LatestBlockhash> = rpc_call(
            &self.http,
            &self.config.rpc_url,
            "getLatestBlockhash",
            json!([{ "commitment": self.config.commitment }]),
        )
        .await?;
        tracing::debug!(
            blockhash = %latest.value.blockhash,
            last_valid_block_height = latest.value.last_valid_block_height,
            "latest blockhash"
        );
        Ok(decode_blockhash(&latest.value.blockhash)?)
    }

    /// Submit `tx` once. Preflight runs at the configured commitment.
    pub async fn send_transaction(&self, tx: &SignedTransaction) -> Result<Signature, LedgerError> {
        let returned: String = rpc_call(
            &self.http,
            &self.config.rpc_url,
            "sendTransaction",
            json!([
                tx.to_base64(),
                {
                    "encoding": "base64",
                    "skipPreflight": false,
                    "preflightCommitment": self.config.commitment
                }
            ]),
        )
        .await?;

        let signature = decode_signature(&returned)?;
        if signature != tx.signature() {
            tracing::warn!(
                returned = %signature,
                expected = %tx.signature(),
                "ledger returned a different signature than the one signed"
            );
        }
        Ok(signature)
    }

    /// Current status of `signature`, or `None` if the ledger does not know it yet.
    async fn signature_status(&self, signature: &Signature) -> Result<Option<SignatureStatus>, LedgerError> {
        let statuses: WithContext<Vec<Option<SignatureStatus>>> = rpc_call(
            &self.http,
            &self.config.rpc_url,
            "getSignatureStatuses",
            json!([[signature.to_string()], { "searchTransactionHistory": false }]),
        )
        .await?;
        Ok(statuses.value.into_iter().next().flatten())
    }

    /// Poll until `signature` reaches the configured commitment.
    ///
    /// # Errors
    ///
    /// - [`LedgerError::TransactionFailed`] when the transaction landed with an error.
    /// - [`LedgerError::ConfirmationTimeout`] when the window elapses first.
    pub async fn confirm_transaction(&self, signature: &Signature) -> Result<(), LedgerError> {
        let started = tokio::time::Instant::now();
        let window = Duration::from_secs(self.config.confirm_timeout_secs);
        let poll = Duration::from_millis(self.config.poll_interval_ms);

        loop {
            if let Some(status) = self.signature_status(signature).await? {
                if let Some(err) = status.err {
                    return Err(LedgerError::TransactionFailed {
                        signature: *signature,
                        reason: err.to_string(),
                    });
                }
                if status
                    .confirmation_status
                    .is_some_and(|reached| reached >= self.config.commitment)
                {
                    tracing::debug!(%signature, slot = status.slot, "transaction confirmed");
                    return Ok(());
                }
            }

            if started.elapsed() >= window {
                return Err(LedgerError::ConfirmationTimeout {
                    signature: *signature,
                    waited_ms: u64::try_from(started.elapsed().as_millis()).unwrap_or(u64::MAX),
                });
            }
            tokio::time::sleep(poll).await;
        }
    }
}

#[async_trait]
impl LedgerReader for LedgerClient {
    async fn tree_state(&self, tree: &Pubkey) -> Result<TreeState, LedgerError> {
        self.get_tree_state(tree).await
    }

    async fn latest_blockhash(&self) -> Result<Hash, LedgerError> {
        self.get_latest_blockhash().await
    }
}

#[async_trait]
impl LedgerSubmitter for LedgerClient {
    async fn send(&self, tx: &SignedTransaction) -> Result<Signature, LedgerError> {
        self.send_transaction(tx).await
    }

    async fn confirm(&self, signature: &Signature) -> Result<(), LedgerError> {
        self.confirm_transaction(signature).await
    }
}
