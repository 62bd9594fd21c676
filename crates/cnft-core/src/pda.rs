//! # Program-Derived Addresses
//!
//! Names the accounts a transition touches that have no private key: the
//! asset id of a leaf, the tree configuration account, the collection CPI
//! signer, the transition program's tree-owner authority and the per-asset
//! stake vault.
//!
//! Derivation is `Pubkey::try_find_program_address` from the ledger SDK and
//! never touches the network, so the asset id of `(tree, leaf_index)` is
//! reproducible anywhere.

use solana_sdk::pubkey::Pubkey;
use thiserror::Error;

use crate::programs;

/// Seed prefix of the per-asset stake vault owned by the transition program.
pub const STAKE_VAULT_SEED: &[u8] = b"stake_vault";

/// Errors deriving a program address.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PdaError {
    /// No bump produced an off-curve address, or a seed was out of bounds.
    #[error("no program address for {what} under {program_id}")]
    NoViableBump {
        /// Which account was being derived.
        what: &'static str,
        /// Program the address was derived under.
        program_id: Pubkey,
    },
}

fn derive(what: &'static str, seeds: &[&[u8]], program_id: &Pubkey) -> Result<(Pubkey, u8), PdaError> {
    Pubkey::try_find_program_address(seeds, program_id).ok_or(PdaError::NoViableBump {
        what,
        program_id: *program_id,
    })
}

/// Asset id of the leaf at `leaf_index` in `tree`.
pub fn leaf_asset_id(tree: &Pubkey, leaf_index: u64) -> Result<Pubkey, PdaError> {
    let index = leaf_index.to_le_bytes();
    derive("asset", &[b"asset", tree.as_ref(), &index], &programs::BUBBLEGUM).map(|(a, _)| a)
}

/// Tree configuration account (also the tree's on-ledger authority).
pub fn tree_config(tree: &Pubkey) -> Result<Pubkey, PdaError> {
    derive("tree_config", &[tree.as_ref()], &programs::BUBBLEGUM).map(|(a, _)| a)
}

/// Signer PDA Bubblegum uses when verifying collection membership.
pub fn bubblegum_signer() -> Result<Pubkey, PdaError> {
    derive("collection_cpi", &[b"collection_cpi"], &programs::BUBBLEGUM).map(|(a, _)| a)
}

/// The transition program's per-tree owner authority.
pub fn tree_owner(tree: &Pubkey, program_id: &Pubkey) -> Result<Pubkey, PdaError> {
    derive("tree_owner", &[b"tree_owner", tree.as_ref()], program_id).map(|(a, _)| a)
}

/// Token vault holding funds locked against `asset_id`.
pub fn stake_vault(asset_id: &Pubkey, program_id: &Pubkey) -> Result<Pubkey, PdaError> {
    derive("stake_vault", &[STAKE_VAULT_SEED, asset_id.as_ref()], program_id).map(|(a, _)| a)
}
