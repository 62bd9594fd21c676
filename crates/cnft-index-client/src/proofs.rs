//! Inclusion proofs from the index `getAssetProof` method.
//!
//! Proofs are fetched fresh for every call. Nothing here caches: a proof
//! is only meaningful against the tree root it was computed for, and that
//! root moves with every write to the tree.

use cnft_core::{codec, CodecError, InclusionProof, IndexError, Pubkey};
use serde::Deserialize;

use crate::assets::IdParams;
use crate::rpc::RpcTransport;

const GET_ASSET_PROOF: &str = "getAssetProof";

/// Proof record as returned by `getAssetProof`.
#[derive(Debug, Clone, Deserialize)]
pub struct IndexedProof {
    pub root: String,
    pub proof: Vec<String>,
    pub node_index: u64,
    pub leaf: String,
    pub tree_id: String,
}

impl IndexedProof {
    /// Decode into a byte-typed proof for `asset_id`.
    ///
    /// An empty path fails with [`CodecError::EmptyProof`] before any node is
    /// decoded.
    pub fn decode(&self, asset_id: Pubkey) -> Result<InclusionProof, CodecError> {
        let proof = codec::decode_proof(&self.proof)?;
        Ok(InclusionProof {
            asset_id,
            tree: codec::decode_address(&self.tree_id)?,
            root: codec::decode_hash(&self.root)?,
            proof,
            leaf: codec::decode_hash(&self.leaf)?,
            node_index: self.node_index,
        })
    }
}

/// Fetches inclusion proofs.
#[derive(Debug, Clone)]
pub struct ProofProvider {
    rpc: RpcTransport,
}

impl ProofProvider {
    pub(crate) fn new(rpc: RpcTransport) -> Self {
        Self { rpc }
    }

    /// Fetch the current inclusion proof of `asset_id`.
    ///
    /// # Errors
    ///
    /// - [`IndexError::AssetNotFound`] when the index has no proof for the asset.
    /// - [`IndexError::Codec`] when the path is empty or a node is malformed.
    /// - [`IndexError::Unavailable`] on transport or server failure.
    pub async fn fetch_proof(&self, asset_id: &Pubkey) -> Result<InclusionProof, IndexError> {
        let id = asset_id.to_string();
        tracing::debug!(asset_id = %id, "fetching inclusion proof");

        let raw: IndexedProof = self
            .rpc
            .call(GET_ASSET_PROOF, &IdParams { id: &id })
            .await?
            .ok_or(IndexError::AssetNotFound {
                asset_id: *asset_id,
            })?;

        let proof = raw.decode(*asset_id)?;
        tracing::debug!(
            asset_id = %id,
            root = %proof.root,
            nodes = proof.proof.len(),
            "inclusion proof fetched"
        );
        Ok(proof)
    }
}
