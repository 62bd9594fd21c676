//! # Read-Only Subcommands
//!
//! - `cnft asset <TREE> <LEAF_INDEX>`: the index record of one leaf.
//! - `cnft proof <ASSET_ID>`: a fresh inclusion proof.
//! - `cnft tree <TREE>`: the live tree header and root from the ledger.
//!
//! Output is pretty-printed JSON on stdout.

use anyhow::Result;
use clap::Args;
use cnft_core::{LedgerReader, Pubkey};
use serde_json::{json, Value};

use crate::context::Context;

/// Arguments for `cnft asset`.
#[derive(Args, Debug)]
pub struct AssetArgs {
    /// Merkle tree account.
    pub tree: Pubkey,
    /// Leaf index within the tree.
    pub leaf_index: u64,
}

/// Arguments for `cnft proof`.
#[derive(Args, Debug)]
pub struct ProofArgs {
    /// Asset id.
    pub asset_id: Pubkey,
}

/// Arguments for `cnft tree`.
#[derive(Args, Debug)]
pub struct TreeArgs {
    /// Merkle tree account.
    pub tree: Pubkey,
}

pub async fn asset_report(args: &AssetArgs, ctx: &Context) -> Result<Value> {
    let asset = ctx.index.assets().resolve(&args.tree, args.leaf_index).await?;
    Ok(serde_json::to_value(asset)?)
}

pub async fn proof_report(args: &ProofArgs, ctx: &Context) -> Result<Value> {
    let proof = ctx.index.proofs().fetch_proof(&args.asset_id).await?;
    Ok(serde_json::to_value(proof)?)
}

pub async fn tree_report(args: &TreeArgs, ctx: &Context) -> Result<Value> {
    let tree = ctx.ledger.tree_state(&args.tree).await?;
    Ok(json!({
        "tree": tree,
        "capacity": tree.capacity(),
        "full": tree.is_full(),
        "required_proof_len": tree.required_proof_len(),
    }))
}

pub async fn run_asset(args: &AssetArgs, ctx: &Context) -> Result<u8> {
    print_json(&asset_report(args, ctx).await?)
}

pub async fn run_proof(args: &ProofArgs, ctx: &Context) -> Result<u8> {
    print_json(&proof_report(args, ctx).await?)
}

pub async fn run_tree(args: &TreeArgs, ctx: &Context) -> Result<u8> {
    print_json(&tree_report(args, ctx).await?)
}

pub(crate) fn print_json(value: &Value) -> Result<u8> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(0)
}
