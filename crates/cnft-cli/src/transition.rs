//! # Transfer, Mint and Burn Subcommands
//!
//! - `cnft transfer <TREE> <LEAF_INDEX> <NEW_OWNER> -k <KEYPAIR>`
//! - `cnft burn <TREE> <LEAF_INDEX> --token-account <ACCOUNT> -k <KEYPAIR>`
//! - `cnft mint <TREE> --name … --symbol … --uri … --collection-mint …
//!   --collection-metadata … --collection-edition … -k <KEYPAIR>`
//!
//! Each prints the confirmed signature, the asset id and the attempt history.

use std::sync::Arc;

use anyhow::Result;
use clap::Args;
use cnft_core::{Pubkey, TransactionSigner};
use cnft_transition::{CollectionRefs, MintArgs, TransitionOutcome};
use serde_json::{json, Value};

use crate::context::{Context, SignerArgs};
use crate::inspect::print_json;

/// Arguments for `cnft transfer`.
#[derive(Args, Debug)]
pub struct TransferArgs {
    /// Merkle tree account.
    pub tree: Pubkey,
    /// Leaf index of the asset.
    pub leaf_index: u64,
    /// Recipient wallet.
    pub new_owner: Pubkey,
    #[command(flatten)]
    pub signer: SignerArgs,
}

/// Arguments for `cnft mint`.
#[derive(Args, Debug)]
pub struct MintCommandArgs {
    /// Merkle tree account to append to.
    pub tree: Pubkey,
    /// Asset name (at most 32 bytes).
    #[arg(long)]
    pub name: String,
    /// Asset symbol (at most 10 bytes).
    #[arg(long)]
    pub symbol: String,
    /// Off-chain metadata URI (at most 200 bytes).
    #[arg(long)]
    pub uri: String,
    /// Seller fee in basis points (0 to 10000).
    #[arg(long, default_value_t = 0)]
    pub seller_fee_basis_points: u16,
    /// Receiving wallet. Defaults to the signer.
    #[arg(long)]
    pub owner: Option<Pubkey>,
    /// Collection mint.
    #[arg(long)]
    pub collection_mint: Pubkey,
    /// Collection metadata account.
    #[arg(long)]
    pub collection_metadata: Pubkey,
    /// Collection master edition account.
    #[arg(long)]
    pub collection_edition: Pubkey,
    #[command(flatten)]
    pub signer: SignerArgs,
}

/// Arguments for `cnft burn`.
#[derive(Args, Debug)]
pub struct BurnArgs {
    /// Merkle tree account.
    pub tree: Pubkey,
    /// Leaf index of the asset.
    pub leaf_index: u64,
    /// Token account receiving the asset's stake vault balance.
    #[arg(long)]
    pub token_account: Pubkey,
    #[command(flatten)]
    pub signer: SignerArgs,
}

/// Summary of a confirmed operation.
pub fn outcome_report(outcome: &TransitionOutcome) -> Result<Value> {
    Ok(json!({
        "operation_id": outcome.operation_id,
        "kind": outcome.kind,
        "asset_id": outcome.asset_id.to_string(),
        "signature": outcome.signature.to_string(),
        "attempts": serde_json::to_value(outcome.submission.attempts())?,
    }))
}

pub async fn transfer(
    args: &TransferArgs,
    ctx: &Context,
    signer: Arc<dyn TransactionSigner>,
) -> Result<Value> {
    let outcome = ctx
        .pipeline(signer)
        .transfer(&args.tree, args.leaf_index, args.new_owner)
        .await?;
    outcome_report(&outcome)
}

pub async fn burn(
    args: &BurnArgs,
    ctx: &Context,
    signer: Arc<dyn TransactionSigner>,
) -> Result<Value> {
    let outcome = ctx
        .pipeline(signer)
        .burn(&args.tree, args.leaf_index, args.token_account)
        .await?;
    outcome_report(&outcome)
}

pub async fn mint(
    args: &MintCommandArgs,
    ctx: &Context,
    signer: Arc<dyn TransactionSigner>,
) -> Result<Value> {
    let leaf_owner = args.owner.unwrap_or_else(|| signer.address());
    let collection = CollectionRefs {
        mint: args.collection_mint,
        metadata: args.collection_metadata,
        edition: args.collection_edition,
    };
    let mint_args = MintArgs {
        name: args.name.clone(),
        symbol: args.symbol.clone(),
        uri: args.uri.clone(),
        seller_fee_basis_points: args.seller_fee_basis_points,
    };
    let outcome = ctx
        .pipeline(signer)
        .mint(&args.tree, leaf_owner, &collection, &mint_args)
        .await?;
    outcome_report(&outcome)
}

pub async fn run_transfer(args: &TransferArgs, ctx: &Context) -> Result<u8> {
    let signer = Arc::new(args.signer.load()?);
    tracing::info!(signer = %signer.address(), "loaded signer");
    print_json(&transfer(args, ctx, signer).await?)
}

pub async fn run_mint(args: &MintCommandArgs, ctx: &Context) -> Result<u8> {
    let signer = Arc::new(args.signer.load()?);
    tracing::info!(signer = %signer.address(), "loaded signer");
    print_json(&mint(args, ctx, signer).await?)
}

pub async fn run_burn(args: &BurnArgs, ctx: &Context) -> Result<u8> {
    let signer = Arc::new(args.signer.load()?);
    tracing::info!(signer = %signer.address(), "loaded signer");
    print_json(&burn(args, ctx, signer).await?)
}
