//! Asset resolution against the index `getAsset` method.
//!
//! The asset id of a leaf is derived locally from `(tree, leaf_index)` and
//! only the record itself is fetched. The record the index returns is checked
//! against the request before it is handed on: it must name the same id, the
//! same tree and the same leaf.
//!
//! | Method | Params | Operation |
//! |--------|--------|-----------|
//! | `getAsset` | `{ "id": <asset id> }` | Current record of one asset |

use cnft_core::{codec, leaf_asset_id, CodecError, CompressedAsset, IndexError, Pubkey};
use serde::{Deserialize, Serialize};

use crate::rpc::RpcTransport;

const GET_ASSET: &str = "getAsset";

// -- Response types matching the index schema ---------------------------------

/// Asset record as returned by `getAsset`.
///
/// Only the fields the transition pipeline needs are modeled. Unknown fields
/// are ignored so the client survives schema additions.
#[derive(Debug, Clone, Deserialize)]
pub struct IndexedAsset {
    pub id: String,
    #[serde(default)]
    pub content: Option<IndexedContent>,
    pub compression: IndexedCompression,
    pub ownership: IndexedOwnership,
    #[serde(default)]
    pub grouping: Vec<IndexedGroup>,
    #[serde(default)]
    pub burnt: bool,
}

/// `content` block of an asset record.
#[derive(Debug, Clone, Deserialize)]
pub struct IndexedContent {
    #[serde(default)]
    pub json_uri: String,
}

/// `compression` block of an asset record.
#[derive(Debug, Clone, Deserialize)]
pub struct IndexedCompression {
    #[serde(default)]
    pub compressed: bool,
    pub data_hash: String,
    pub creator_hash: String,
    pub leaf_id: u64,
    pub tree: String,
    #[serde(default)]
    pub seq: u64,
}

/// `ownership` block of an asset record.
#[derive(Debug, Clone, Deserialize)]
pub struct IndexedOwnership {
    pub owner: String,
    #[serde(default)]
    pub delegate: Option<String>,
    #[serde(default)]
    pub delegated: bool,
    #[serde(default)]
    pub frozen: bool,
}

/// One `grouping` entry, e.g. `{ "group_key": "collection", "group_value": ... }`.
#[derive(Debug, Clone, Deserialize)]
pub struct IndexedGroup {
    pub group_key: String,
    pub group_value: String,
}

impl TryFrom<IndexedAsset> for CompressedAsset {
    type Error = CodecError;

    fn try_from(raw: IndexedAsset) -> Result<Self, Self::Error> {
        let delegate = match raw.ownership.delegate.as_deref() {
            Some(text) if raw.ownership.delegated && !text.is_empty() => {
                Some(codec::decode_address(text)?)
            }
            _ => None,
        };
        let collection = raw
            .grouping
            .iter()
            .find(|g| g.group_key == "collection")
            .map(|g| codec::decode_address(&g.group_value))
            .transpose()?;

        Ok(CompressedAsset {
            id: codec::decode_address(&raw.id)?,
            tree: codec::decode_address(&raw.compression.tree)?,
            leaf_index: raw.compression.leaf_id,
            owner: codec::decode_address(&raw.ownership.owner)?,
            delegate,
            data_hash: codec::decode_hash(&raw.compression.data_hash)?,
            creator_hash: codec::decode_hash(&raw.compression.creator_hash)?,
            content_uri: raw.content.map(|c| c.json_uri).unwrap_or_default(),
            collection,
        })
    }
}

/// `{ "id": ... }` parameter object shared by `getAsset` and `getAssetProof`.
#[derive(Serialize)]
pub(crate) struct IdParams<'a> {
    pub(crate) id: &'a str,
}

// -- Client -------------------------------------------------------------------

/// Resolves leaves to their current asset records.
#[derive(Debug, Clone)]
pub struct AssetResolver {
    rpc: RpcTransport,
}

impl AssetResolver {
    pub(crate) fn new(rpc: RpcTransport) -> Self {
        Self { rpc }
    }

    /// Resolve the asset stored at `leaf_index` of `tree`.
    ///
    /// # Errors
    ///
    /// - [`IndexError::AssetNotFound`] when the index has no record, or the
    ///   record is burnt.
    /// - [`IndexError::Deserialization`] when the record describes a different
    ///   asset, tree or leaf than the one requested.
    /// - [`IndexError::Unavailable`] on transport or server failure.
    pub async fn resolve(&self, tree: &Pubkey, leaf_index: u64) -> Result<CompressedAsset, IndexError> {
        let asset_id = leaf_asset_id(tree, leaf_index)?;
        let asset = self.get(&asset_id).await?;

        if asset.tree != *tree || asset.leaf_index != leaf_index {
            return Err(IndexError::Deserialization {
                endpoint: GET_ASSET.into(),
                reason: format!(
                    "index returned leaf {} of tree {} for leaf {leaf_index} of tree {tree}",
                    asset.leaf_index, asset.tree
                ),
            });
        }
        Ok(asset)
    }

    /// Fetch the record of `asset_id` directly.
    pub async fn get(&self, asset_id: &Pubkey) -> Result<CompressedAsset, IndexError> {
        let id = asset_id.to_string();
        tracing::debug!(asset_id = %id, "resolving asset");

        let raw: IndexedAsset = self
            .rpc
            .call(GET_ASSET, &IdParams { id: &id })
            .await?
            .ok_or(IndexError::AssetNotFound {
                asset_id: *asset_id,
            })?;

        if raw.burnt {
            return Err(IndexError::AssetNotFound {
                asset_id: *asset_id,
            });
        }

        let asset = CompressedAsset::try_from(raw)?;
        if asset.id != *asset_id {
            return Err(IndexError::Deserialization {
                endpoint: GET_ASSET.into(),
                reason: format!("index returned asset {} for {asset_id}", asset.id),
            });
        }
        Ok(asset)
    }
}
