//! # cnft CLI entry point
//!
//! Parses command-line arguments, installs logging and dispatches to
//! subcommand handlers.

use std::process::ExitCode;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use cnft_cli::context::{ConnectionArgs, Context};
use cnft_cli::inspect::{run_asset, run_proof, run_tree, AssetArgs, ProofArgs, TreeArgs};
use cnft_cli::keygen::{run_keygen, KeygenArgs};
use cnft_cli::transition::{
    run_burn, run_mint, run_transfer, BurnArgs, MintCommandArgs, TransferArgs,
};

/// Compressed asset client: inspect, transfer, mint and burn.
///
/// Endpoints are read from `CNFT_*` environment variables and may be
/// overridden with the global flags below.
#[derive(Parser, Debug)]
#[command(name = "cnft", version, about, long_about = None)]
struct Cli {
    /// Enable verbose output. Repeat for more verbosity (-v, -vv, -vvv).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Emit logs as JSON lines.
    #[arg(long, global = true)]
    log_json: bool,

    #[command(flatten)]
    connection: ConnectionArgs,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Show the index record of a leaf.
    Asset(AssetArgs),

    /// Fetch a fresh inclusion proof for an asset.
    Proof(ProofArgs),

    /// Show the live state of a merkle tree.
    Tree(TreeArgs),

    /// Transfer an asset to a new owner.
    Transfer(TransferArgs),

    /// Mint a new asset into a collection.
    Mint(MintCommandArgs),

    /// Burn an asset and release its stake vault to a token account.
    Burn(BurnArgs),

    /// Generate a signer key file.
    Keygen(KeygenArgs),
}

fn init_tracing(verbose: u8, json: bool) {
    let filter = match verbose {
        0 => EnvFilter::new("warn"),
        1 => EnvFilter::new("info"),
        2 => EnvFilter::new("debug"),
        _ => EnvFilter::new("trace"),
    };
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr);
    if json {
        builder.json().init();
    } else {
        builder.init();
    }
}

async fn run(cli: Cli) -> anyhow::Result<u8> {
    if let Commands::Keygen(args) = &cli.command {
        return run_keygen(args);
    }
    let ctx = Context::from_args(&cli.connection)?;
    match cli.command {
        Commands::Asset(args) => run_asset(&args, &ctx).await,
        Commands::Proof(args) => run_proof(&args, &ctx).await,
        Commands::Tree(args) => run_tree(&args, &ctx).await,
        Commands::Transfer(args) => run_transfer(&args, &ctx).await,
        Commands::Mint(args) => run_mint(&args, &ctx).await,
        Commands::Burn(args) => run_burn(&args, &ctx).await,
        Commands::Keygen(args) => run_keygen(&args),
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.verbose, cli.log_json);
    tracing::debug!("cnft CLI starting");

    match run(cli).await {
        Ok(code) => ExitCode::from(code),
        Err(e) => {
            tracing::error!("{e:#}");
            eprintln!("error: {e:#}");
            ExitCode::from(1)
        }
    }
}
