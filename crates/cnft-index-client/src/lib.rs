//! # cnft-index-client -- Typed Rust client for the compressed asset index
//!
//! Provides typed access to the two index queries a transition needs:
//! - **Asset resolution** via `getAsset` ([`assets::AssetResolver`])
//! - **Inclusion proofs** via `getAssetProof` ([`proofs::ProofProvider`])
//!
//! ## Architecture
//!
//! The index is a single JSON-RPC 2.0 endpoint. Both sub-clients share one
//! `reqwest::Client` and one transport. Each query is sent exactly once; a
//! transport failure surfaces as `IndexError::Unavailable` and the caller
//! decides whether to ask again. Records are decoded into the byte-typed
//! `cnft-core` types before they leave this crate; no base-58 text crosses
//! the crate boundary.
//!
//! [`IndexClient`] implements [`cnft_core::AssetIndex`], which is the only
//! way the transition pipeline sees it.

pub mod assets;
pub mod config;
pub mod proofs;
pub(crate) mod rpc;

pub use cnft_core::IndexError;
pub use config::IndexConfig;

use std::time::Duration;

use async_trait::async_trait;
use cnft_core::{AssetIndex, CompressedAsset, InclusionProof, Pubkey};

/// Top-level index client. Holds the resolver and the proof provider.
#[derive(Debug, Clone)]
pub struct IndexClient {
    assets: assets::AssetResolver,
    proofs: proofs::ProofProvider,
}

impl IndexClient {
    /// Create a new index client from configuration.
    pub fn new(config: IndexConfig) -> Result<Self, IndexError> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| IndexError::Unavailable {
                endpoint: "client_init".into(),
                reason: e.to_string(),
            })?;

        let rpc = rpc::RpcTransport::new(http, config.url, config.api_key);
        Ok(Self {
            assets: assets::AssetResolver::new(rpc.clone()),
            proofs: proofs::ProofProvider::new(rpc),
        })
    }

    /// Access the asset resolver.
    pub fn assets(&self) -> &assets::AssetResolver {
        &self.assets
    }

    /// Access the proof provider.
    pub fn proofs(&self) -> &proofs::ProofProvider {
        &self.proofs
    }
}

#[async_trait]
impl AssetIndex for IndexClient {
    async fn resolve(&self, tree: &Pubkey, leaf_index: u64) -> Result<CompressedAsset, IndexError> {
        self.assets.resolve(tree, leaf_index).await
    }

    async fn fetch_proof(&self, asset_id: &Pubkey) -> Result<InclusionProof, IndexError> {
        self.proofs.fetch_proof(asset_id).await
    }
}
