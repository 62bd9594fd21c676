//! # Error Types: Structured Error Hierarchy
//!
//! Errors raised at the codec layer and across the index/ledger ports. All
//! errors use `thiserror` for derive-based `Display` and `Error`
//! implementations.
//!
//! ## Design
//!
//! - Codec errors carry the offending input so a failed decode can be traced
//!   back to the exact field the index returned.
//! - Port errors separate "the thing does not exist" from "the service could
//!   not be reached". Callers decide retry policy from that distinction alone.

use thiserror::Error;

use solana_sdk::pubkey::Pubkey;
use solana_sdk::signature::Signature;

use crate::pda::PdaError;

/// Error decoding or encoding a textual hash, address or proof path.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CodecError {
    /// The input is not valid base-58, or decodes to the wrong width.
    #[error("malformed encoding for {input:?}: {reason}")]
    Encoding {
        /// The textual value that failed to decode.
        input: String,
        /// Why it was rejected.
        reason: String,
    },

    /// A proof path with no nodes was supplied.
    #[error("inclusion proof is empty")]
    EmptyProof,
}

/// Errors from the off-chain asset index.
#[derive(Error, Debug)]
pub enum IndexError {
    /// The index holds no record for the asset (not yet indexed, or never existed).
    #[error("asset {asset_id} not found in index")]
    AssetNotFound {
        /// Derived asset identifier that was queried.
        asset_id: Pubkey,
    },

    /// The index could not be reached, timed out, or answered with a server error.
    #[error("index unavailable calling {endpoint}: {reason}")]
    Unavailable {
        /// RPC method or path that failed.
        endpoint: String,
        /// Transport-level failure description.
        reason: String,
    },

    /// The index answered with a JSON-RPC error object.
    #[error("index {endpoint} returned error {code}: {message}")]
    Rpc {
        /// RPC method that failed.
        endpoint: String,
        /// JSON-RPC error code.
        code: i64,
        /// JSON-RPC error message.
        message: String,
    },

    /// The response body could not be deserialized.
    #[error("failed to deserialize response from {endpoint}: {reason}")]
    Deserialization {
        /// RPC method whose response was malformed.
        endpoint: String,
        /// Parser error description.
        reason: String,
    },

    /// A hash or address in the response was malformed.
    #[error("codec error: {0}")]
    Codec(#[from] CodecError),

    /// The asset id could not be derived from the tree and leaf index.
    #[error("asset id derivation failed: {0}")]
    Derivation(#[from] PdaError),
}

impl IndexError {
    /// Whether a caller may reasonably retry the same query later.
    ///
    /// Only transport unavailability is retryable. A missing asset is a fatal
    /// condition for a single attempt.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Unavailable { .. })
    }
}

/// Errors from the ledger RPC.
#[derive(Error, Debug)]
pub enum LedgerError {
    /// The ledger RPC could not be reached, timed out, or answered with a server error.
    #[error("ledger unavailable calling {endpoint}: {reason}")]
    Unavailable {
        /// RPC method that failed.
        endpoint: String,
        /// Transport-level failure description.
        reason: String,
    },

    /// The ledger answered with a JSON-RPC error object.
    #[error("ledger {endpoint} returned error {code}: {message}")]
    Rpc {
        /// RPC method that failed.
        endpoint: String,
        /// JSON-RPC error code.
        code: i64,
        /// JSON-RPC error message.
        message: String,
    },

    /// The requested account does not exist.
    #[error("account {address} not found on ledger")]
    AccountNotFound {
        /// Queried account.
        address: Pubkey,
    },

    /// The account exists but is not a decodable concurrent Merkle tree.
    #[error("account {address} is not a valid merkle tree: {reason}")]
    InvalidTreeAccount {
        /// Queried account.
        address: Pubkey,
        /// What failed to decode.
        reason: String,
    },

    /// The transaction landed but the ledger reported an execution error.
    #[error("transaction {signature} failed: {reason}")]
    TransactionFailed {
        /// Signature of the failed transaction.
        signature: Signature,
        /// Ledger-reported error.
        reason: String,
    },

    /// The transaction was not confirmed within the polling window.
    #[error("transaction {signature} not confirmed after {waited_ms} ms")]
    ConfirmationTimeout {
        /// Signature being polled.
        signature: Signature,
        /// How long confirmation was awaited.
        waited_ms: u64,
    },

    /// A hash, address or signature in the response was malformed.
    #[error("codec error: {0}")]
    Codec(#[from] CodecError),
}

/// Error producing a transaction signature.
#[derive(Error, Debug)]
pub enum SigningError {
    /// The message lists a different fee payer than the signer's address.
    #[error("signer {signer} is not the fee payer {fee_payer}")]
    SignerMismatch {
        /// Address of the signer.
        signer: Pubkey,
        /// Fee payer named in the message.
        fee_payer: Pubkey,
    },

    /// The key material could not be used.
    #[error("key error: {0}")]
    Key(String),
}
