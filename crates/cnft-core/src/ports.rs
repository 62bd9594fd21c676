//! # Port Traits
//!
//! The seams between the transition pipeline and the outside world. The
//! pipeline only ever holds `Arc<dyn …>` of these traits, so production
//! clients and in-memory test doubles are interchangeable.
//!
//! Implementations must be `Send + Sync` so they can be shared across async
//! tasks behind an `Arc`. All index and ledger reads are queries; the only
//! state-changing call is [`LedgerSubmitter::send`].

use async_trait::async_trait;
use solana_sdk::hash::Hash;
use solana_sdk::pubkey::Pubkey;
use solana_sdk::signature::Signature;

use crate::asset::{CompressedAsset, InclusionProof, TreeState};
use crate::error::{IndexError, LedgerError, SigningError};
use crate::wire::SignedTransaction;

/// Off-chain asset index.
#[async_trait]
pub trait AssetIndex: Send + Sync {
    /// Resolve the current record of the leaf at `leaf_index` in `tree`.
    ///
    /// The asset id is derived locally from `(tree, leaf_index)`; only the
    /// record itself is fetched.
    async fn resolve(&self, tree: &Pubkey, leaf_index: u64) -> Result<CompressedAsset, IndexError>;

    /// Fetch a fresh inclusion proof for `asset_id`. Never cached.
    async fn fetch_proof(&self, asset_id: &Pubkey) -> Result<InclusionProof, IndexError>;
}

/// Read access to ledger state.
#[async_trait]
pub trait LedgerReader: Send + Sync {
    /// Read and decode the tree account at `tree`, including its live root.
    async fn tree_state(&self, tree: &Pubkey) -> Result<TreeState, LedgerError>;

    /// Latest blockhash to anchor a new transaction to.
    async fn latest_blockhash(&self) -> Result<Hash, LedgerError>;
}

/// Transaction submission and confirmation.
#[async_trait]
pub trait LedgerSubmitter: Send + Sync {
    /// Submit a signed transaction, returning its signature.
    async fn send(&self, tx: &SignedTransaction) -> Result<Signature, LedgerError>;

    /// Wait until `signature` reaches the configured commitment.
    async fn confirm(&self, signature: &Signature) -> Result<(), LedgerError>;
}

/// Something that can sign transaction messages.
pub trait TransactionSigner: Send + Sync {
    /// Public key of the signer.
    fn address(&self) -> Pubkey;

    /// Sign serialized message bytes.
    fn sign(&self, message: &[u8]) -> Result<Signature, SigningError>;
}
