//! # Asset, Proof and Tree Records
//!
//! Decoded, byte-typed views of what the index and the ledger report. None of
//! these types hold text hashes; conversion happens in the clients through
//! [`crate::codec`].

use serde::{Deserialize, Serialize};
use solana_sdk::pubkey::Pubkey;

use crate::hash::Hash32;

/// A compressed asset as recorded by the index.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompressedAsset {
    /// Canonical asset id (program-derived from tree and leaf index).
    #[serde(with = "crate::codec::base58")]
    pub id: Pubkey,
    /// Tree the leaf lives in.
    #[serde(with = "crate::codec::base58")]
    pub tree: Pubkey,
    /// Leaf position; the transfer nonce and index are both derived from it.
    pub leaf_index: u64,
    /// Current owner.
    #[serde(with = "crate::codec::base58")]
    pub owner: Pubkey,
    /// Current delegate, if any.
    #[serde(with = "crate::codec::base58::option")]
    pub delegate: Option<Pubkey>,
    /// Hash of the asset's metadata.
    pub data_hash: Hash32,
    /// Hash of the asset's creator list.
    pub creator_hash: Hash32,
    /// Off-chain metadata URI.
    pub content_uri: String,
    /// Collection mint the asset is grouped under.
    #[serde(with = "crate::codec::base58::option")]
    pub collection: Option<Pubkey>,
}

/// An inclusion proof for one leaf against one tree state.
///
/// Ephemeral: fetched fresh for every operation and never cached. Once the
/// tree root advances past `root` this proof is stale.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InclusionProof {
    /// Asset the proof is for.
    #[serde(with = "crate::codec::base58")]
    pub asset_id: Pubkey,
    /// Tree the proof is against.
    #[serde(with = "crate::codec::base58")]
    pub tree: Pubkey,
    /// Root the index claims the proof reconstructs.
    pub root: Hash32,
    /// Sibling hashes, leaf-adjacent first, root-adjacent last.
    pub proof: Vec<Hash32>,
    /// Leaf hash.
    pub leaf: Hash32,
    /// Position of the leaf in the full binary tree (`2^depth + leaf_index`).
    pub node_index: u64,
}

/// Concurrent Merkle tree state as read from the ledger.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TreeState {
    /// Tree account address.
    #[serde(with = "crate::codec::base58")]
    pub address: Pubkey,
    /// Depth of the tree; fixed at creation.
    pub max_depth: u32,
    /// Change-log buffer size; fixed at creation.
    pub max_buffer_size: u32,
    /// Number of upper levels cached on the ledger.
    pub canopy_depth: u32,
    /// Current root.
    pub root: Hash32,
    /// Tree authority (the tree configuration account for Bubblegum trees).
    #[serde(with = "crate::codec::base58")]
    pub authority: Pubkey,
    /// Slot the tree was created in.
    pub creation_slot: u64,
    /// Number of accepted tree operations.
    pub sequence_number: u64,
    /// Index the next appended leaf will occupy.
    pub next_leaf_index: u64,
}

impl TreeState {
    /// Maximum number of leaves the tree can hold.
    pub fn capacity(&self) -> u64 {
        1u64.checked_shl(self.max_depth).unwrap_or(u64::MAX)
    }

    /// Whether no further leaves can be appended.
    pub fn is_full(&self) -> bool {
        self.next_leaf_index >= self.capacity()
    }

    /// Number of proof nodes the ledger needs once the canopy is accounted for.
    pub fn required_proof_len(&self) -> usize {
        self.max_depth.saturating_sub(self.canopy_depth) as usize
    }
}
