//! # Transaction Builder
//!
//! Assembles mint, transfer and burn requests for the transition program. No
//! network I/O happens here: every input was resolved, fetched or validated
//! upstream.
//!
//! ## Instruction Data
//!
//! ```text
//! transfer = disc("transfer_cnft") ‖ leaf
//! burn     = disc("burn_cnft") ‖ leaf
//! leaf     = root[32] ‖ data_hash[32] ‖ creator_hash[32] ‖ nonce u64 LE ‖ index u32 LE
//! mint     = disc("mint_cnft") ‖ str(name) ‖ str(symbol) ‖ str(uri) ‖ fee_bps u16 LE
//! str(s)   = len u32 LE ‖ utf-8 bytes
//! disc(n)  = SHA256("global:" ‖ n)[..8]
//! ```
//!
//! A transfer's or burn's proof path follows the named accounts as remaining
//! accounts, leaf-adjacent first, truncated to the levels the tree's canopy
//! does not already hold.

use cnft_core::pda;
use cnft_core::{to_account_refs, AccountMeta, Hash32, Instruction, ProgramIds, Pubkey, TreeState};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use crate::error::{Stage, TransitionError};
use crate::validator::ValidatedProof;

/// Highest seller fee, in basis points (100%).
pub const MAX_SELLER_FEE_BASIS_POINTS: u16 = 10_000;
/// Longest accepted asset name, in bytes.
pub const MAX_NAME_LEN: usize = 32;
/// Longest accepted symbol, in bytes.
pub const MAX_SYMBOL_LEN: usize = 10;
/// Longest accepted metadata URI, in bytes.
pub const MAX_URI_LEN: usize = 200;

/// The 8-byte instruction discriminator for `name`.
pub fn discriminator(name: &str) -> [u8; 8] {
    let digest = Sha256::digest(format!("global:{name}").as_bytes());
    let mut out = [0u8; 8];
    out.copy_from_slice(&digest[..8]);
    out
}

/// Which operation a request performs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TransitionKind {
    Mint,
    Transfer,
    Burn,
}

impl std::fmt::Display for TransitionKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            Self::Mint => "mint",
            Self::Transfer => "transfer",
            Self::Burn => "burn",
        })
    }
}

/// Metadata for a new asset.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MintArgs {
    pub name: String,
    pub symbol: String,
    pub uri: String,
    pub seller_fee_basis_points: u16,
}

/// Collection accounts a minted asset is verified into.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CollectionRefs {
    /// Collection mint.
    pub mint: Pubkey,
    /// Collection metadata account.
    pub metadata: Pubkey,
    /// Collection master edition account.
    pub edition: Pubkey,
}

/// Leaf arguments of a transfer or burn, all derived from one resolved leaf.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LeafParams {
    pub root: Hash32,
    pub data_hash: Hash32,
    pub creator_hash: Hash32,
    /// Leaf index as `u64`.
    pub nonce: u64,
    /// Leaf index as `u32`.
    pub index: u32,
}

/// Operation-specific arguments of a request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TransitionParams {
    Mint(MintArgs),
    Transfer(LeafParams),
    Burn(LeafParams),
}

/// A fully assembled, immutable mint, transfer or burn request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransitionRequest {
    kind: TransitionKind,
    program_id: Pubkey,
    accounts: Vec<AccountMeta>,
    remaining_accounts: Vec<AccountMeta>,
    params: TransitionParams,
    data: Vec<u8>,
    signer: Pubkey,
}

impl TransitionRequest {
    pub fn kind(&self) -> TransitionKind {
        self.kind
    }

    pub fn program_id(&self) -> Pubkey {
        self.program_id
    }

    /// Named accounts, in instruction order.
    pub fn accounts(&self) -> &[AccountMeta] {
        &self.accounts
    }

    /// Proof nodes passed after the named accounts (transfer and burn).
    pub fn remaining_accounts(&self) -> &[AccountMeta] {
        &self.remaining_accounts
    }

    pub fn params(&self) -> &TransitionParams {
        &self.params
    }

    /// Serialized instruction data.
    pub fn data(&self) -> &[u8] {
        &self.data
    }

    /// The account that signs and pays.
    pub fn signer(&self) -> Pubkey {
        self.signer
    }

    /// The instruction, named accounts followed by remaining accounts.
    pub fn instruction(&self) -> Instruction {
        let mut accounts = self.accounts.clone();
        accounts.extend_from_slice(&self.remaining_accounts);
        Instruction::new_with_bytes(self.program_id, &self.data, accounts)
    }
}

fn derive(name: &'static str, result: Result<Pubkey, pda::PdaError>) -> Result<Pubkey, TransitionError> {
    result.map_err(|e| TransitionError::invalid(Stage::Build, name, e.to_string()))
}

/// Proof accounts and leaf arguments of a validated asset.
///
/// # Errors
///
/// [`TransitionError::InvalidParameter`] when the proof length differs from
/// the tree depth or the leaf index does not fit the on-ledger `u32` index.
fn leaf_parts(validated: &ValidatedProof) -> Result<(Vec<AccountMeta>, LeafParams), TransitionError> {
    let asset = validated.asset();
    let proof = validated.proof();
    let tree = validated.tree();

    let mut remaining_accounts =
        to_account_refs(&proof.proof).map_err(|e| TransitionError::from_codec(Stage::Build, e))?;
    if proof.proof.len() != tree.max_depth as usize {
        return Err(TransitionError::invalid(
            Stage::Build,
            "proof",
            format!(
                "proof has {} nodes, tree depth is {}",
                proof.proof.len(),
                tree.max_depth
            ),
        ));
    }
    remaining_accounts.truncate(tree.required_proof_len());

    let index = u32::try_from(asset.leaf_index).map_err(|_| {
        TransitionError::invalid(
            Stage::Build,
            "leaf_index",
            format!("{} does not fit in u32", asset.leaf_index),
        )
    })?;
    let params = LeafParams {
        root: proof.root,
        data_hash: asset.data_hash,
        creator_hash: asset.creator_hash,
        nonce: asset.leaf_index,
        index,
    };
    Ok((remaining_accounts, params))
}

fn leaf_data(instruction: &str, params: &LeafParams) -> Vec<u8> {
    let mut data = Vec::with_capacity(8 + 32 * 3 + 8 + 4);
    data.extend_from_slice(&discriminator(instruction));
    data.extend_from_slice(params.root.as_bytes());
    data.extend_from_slice(params.data_hash.as_bytes());
    data.extend_from_slice(params.creator_hash.as_bytes());
    data.extend_from_slice(&params.nonce.to_le_bytes());
    data.extend_from_slice(&params.index.to_le_bytes());
    data
}

/// Build a transfer of a validated asset to `new_owner`.
///
/// # Errors
///
/// [`TransitionError::InvalidParameter`] when the proof length differs from
/// the tree depth or the leaf index does not fit the on-ledger `u32` index.
pub fn build_transfer(
    validated: &ValidatedProof,
    new_owner: Pubkey,
    programs: &ProgramIds,
) -> Result<TransitionRequest, TransitionError> {
    let (remaining_accounts, params) = leaf_parts(validated)?;
    let data = leaf_data("transfer_cnft", &params);

    let tree = validated.tree();
    let tree_authority = derive("tree", pda::tree_config(&tree.address))?;
    let signer = validated.signer();
    let accounts = vec![
        AccountMeta::new_readonly(tree_authority, false),
        AccountMeta::new(signer, true),
        AccountMeta::new_readonly(new_owner, false),
        AccountMeta::new(tree.address, false),
        AccountMeta::new_readonly(programs.log_wrapper, false),
        AccountMeta::new_readonly(programs.compression, false),
        AccountMeta::new_readonly(programs.bubblegum, false),
        AccountMeta::new_readonly(programs.system, false),
    ];

    Ok(TransitionRequest {
        kind: TransitionKind::Transfer,
        program_id: programs.transition_program,
        accounts,
        remaining_accounts,
        params: TransitionParams::Transfer(params),
        data,
        signer,
    })
}

/// Build a burn of a validated asset.
///
/// The transition program releases whatever is locked in the asset's stake
/// vault to `token_account` before burning the leaf, so the signer must be
/// the owner and `token_account` must belong to them.
///
/// # Errors
///
/// As [`build_transfer`].
pub fn build_burn(
    validated: &ValidatedProof,
    token_account: Pubkey,
    programs: &ProgramIds,
) -> Result<TransitionRequest, TransitionError> {
    let (remaining_accounts, params) = leaf_parts(validated)?;
    let data = leaf_data("burn_cnft", &params);

    let tree = validated.tree();
    let asset_id = validated.asset().id;
    let tree_config = derive("tree", pda::tree_config(&tree.address))?;
    let stake_vault = derive(
        "leaf_index",
        pda::stake_vault(&asset_id, &programs.transition_program),
    )?;
    let signer = validated.signer();
    let accounts = vec![
        AccountMeta::new(signer, true),
        AccountMeta::new(stake_vault, false),
        AccountMeta::new(token_account, false),
        AccountMeta::new_readonly(asset_id, false),
        AccountMeta::new(tree.address, false),
        AccountMeta::new_readonly(tree_config, false),
        AccountMeta::new_readonly(programs.log_wrapper, false),
        AccountMeta::new_readonly(programs.compression, false),
        AccountMeta::new_readonly(programs.bubblegum, false),
        AccountMeta::new_readonly(programs.system, false),
        AccountMeta::new_readonly(programs.token, false),
    ];

    Ok(TransitionRequest {
        kind: TransitionKind::Burn,
        program_id: programs.transition_program,
        accounts,
        remaining_accounts,
        params: TransitionParams::Burn(params),
        data,
        signer,
    })
}

fn write_str(out: &mut Vec<u8>, s: &str) {
    out.extend_from_slice(&(s.len() as u32).to_le_bytes());
    out.extend_from_slice(s.as_bytes());
}

fn check_len(name: &'static str, value: &str, max: usize) -> Result<(), TransitionError> {
    if value.len() > max {
        return Err(TransitionError::invalid(
            Stage::Build,
            name,
            format!("{} bytes exceeds {max}", value.len()),
        ));
    }
    Ok(())
}

/// Build a mint of a new asset into `tree`, verified into `collection`.
///
/// `payer` pays, signs and acts as tree delegate; `leaf_owner` receives the
/// asset.
pub fn build_mint(
    args: &MintArgs,
    tree: &TreeState,
    collection: &CollectionRefs,
    payer: Pubkey,
    leaf_owner: Pubkey,
    programs: &ProgramIds,
) -> Result<TransitionRequest, TransitionError> {
    if args.seller_fee_basis_points > MAX_SELLER_FEE_BASIS_POINTS {
        return Err(TransitionError::invalid(
            Stage::Build,
            "seller_fee_basis_points",
            format!(
                "{} exceeds {MAX_SELLER_FEE_BASIS_POINTS}",
                args.seller_fee_basis_points
            ),
        ));
    }
    check_len("name", &args.name, MAX_NAME_LEN)?;
    check_len("symbol", &args.symbol, MAX_SYMBOL_LEN)?;
    check_len("uri", &args.uri, MAX_URI_LEN)?;

    let mut data = Vec::with_capacity(8 + 12 + args.name.len() + args.symbol.len() + args.uri.len() + 2);
    data.extend_from_slice(&discriminator("mint_cnft"));
    write_str(&mut data, &args.name);
    write_str(&mut data, &args.symbol);
    write_str(&mut data, &args.uri);
    data.extend_from_slice(&args.seller_fee_basis_points.to_le_bytes());

    let tree_config = derive("tree", pda::tree_config(&tree.address))?;
    let central_authority = derive(
        "tree",
        pda::tree_owner(&tree.address, &programs.transition_program),
    )?;
    let bubblegum_signer = derive("collection", pda::bubblegum_signer())?;

    let accounts = vec![
        AccountMeta::new(payer, true),
        AccountMeta::new(tree_config, false),
        AccountMeta::new_readonly(leaf_owner, false),
        AccountMeta::new(tree.address, false),
        AccountMeta::new_readonly(payer, true),
        AccountMeta::new_readonly(central_authority, false),
        AccountMeta::new_readonly(collection.mint, false),
        AccountMeta::new(collection.metadata, false),
        AccountMeta::new_readonly(collection.edition, false),
        AccountMeta::new_readonly(bubblegum_signer, false),
        AccountMeta::new_readonly(programs.log_wrapper, false),
        AccountMeta::new_readonly(programs.compression, false),
        AccountMeta::new_readonly(programs.token_metadata, false),
        AccountMeta::new_readonly(programs.bubblegum, false),
        AccountMeta::new_readonly(programs.system, false),
    ];

    Ok(TransitionRequest {
        kind: TransitionKind::Mint,
        program_id: programs.transition_program,
        accounts,
        remaining_accounts: Vec::new(),
        params: TransitionParams::Mint(args.clone()),
        data,
        signer: payer,
    })
}
