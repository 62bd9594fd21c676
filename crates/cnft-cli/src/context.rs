//! Connection flags and the clients built from them.
//!
//! Settings come from `CNFT_*` environment variables first; flags given on
//! the command line override them. The index API key is only read from the
//! environment so it never appears in a process listing.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context as _, Result};
use clap::Args;
use cnft_core::{Pubkey, TransactionSigner};
use cnft_index_client::{IndexClient, IndexConfig};
use cnft_ledger_client::{Commitment, Keypair, LedgerClient, LedgerConfig};
use cnft_transition::{CnftConfig, TokioScheduler, TransitionPipeline};

/// Endpoint overrides shared by every networked subcommand.
#[derive(Args, Debug, Clone, Default)]
pub struct ConnectionArgs {
    /// Asset index endpoint [env: CNFT_INDEX_URL].
    #[arg(long, global = true)]
    pub index_url: Option<String>,

    /// Ledger JSON-RPC endpoint [env: CNFT_LEDGER_RPC_URL].
    #[arg(long, global = true)]
    pub rpc_url: Option<String>,

    /// Transition program id [env: CNFT_PROGRAM_ID].
    #[arg(long, global = true)]
    pub program_id: Option<Pubkey>,

    /// Commitment for reads and confirmation [env: CNFT_COMMITMENT].
    #[arg(long, global = true)]
    pub commitment: Option<Commitment>,

    /// Submission retries after the first attempt [env: CNFT_MAX_RETRIES].
    #[arg(long, global = true)]
    pub max_retries: Option<u32>,
}

impl ConnectionArgs {
    /// Apply these overrides on top of `base`.
    pub fn apply(&self, mut base: CnftConfig) -> Result<CnftConfig> {
        if let Some(url) = &self.index_url {
            base.index_url = url.parse().with_context(|| format!("invalid --index-url {url:?}"))?;
        }
        if let Some(url) = &self.rpc_url {
            base.ledger_rpc_url = url.parse().with_context(|| format!("invalid --rpc-url {url:?}"))?;
        }
        if let Some(program_id) = self.program_id {
            base.program_id = program_id;
        }
        if let Some(commitment) = self.commitment {
            base.commitment = commitment;
        }
        if let Some(max_retries) = self.max_retries {
            base.retry.max_retries = max_retries;
        }
        Ok(base)
    }
}

/// Signer key file selection.
#[derive(Args, Debug, Clone)]
pub struct SignerArgs {
    /// JSON keypair file of the signing wallet.
    #[arg(long, short = 'k', env = "CNFT_KEYPAIR")]
    pub keypair: PathBuf,
}

impl SignerArgs {
    pub fn load(&self) -> Result<Keypair> {
        load_keypair(&self.keypair)
    }
}

/// Read a JSON keypair file.
pub fn load_keypair(path: &Path) -> Result<Keypair> {
    Keypair::read_from_file(path).with_context(|| format!("loading keypair {}", path.display()))
}

/// Configured index and ledger clients.
#[derive(Debug, Clone)]
pub struct Context {
    pub config: CnftConfig,
    pub index: Arc<IndexClient>,
    pub ledger: Arc<LedgerClient>,
}

impl Context {
    /// Build clients from the environment plus flag overrides.
    pub fn from_args(args: &ConnectionArgs) -> Result<Self> {
        let base = CnftConfig::from_env().context("reading CNFT_* environment")?;
        Self::new(args.apply(base)?)
    }

    pub fn new(config: CnftConfig) -> Result<Self> {
        tracing::debug!(?config, "building clients");

        let index = IndexClient::new(IndexConfig {
            url: config.index_url.clone(),
            api_key: config.index_api_key.clone(),
            timeout_secs: config.timeout_secs,
        })?;
        let ledger = LedgerClient::new(LedgerConfig {
            commitment: config.commitment,
            timeout_secs: config.timeout_secs,
            confirm_timeout_secs: config.confirm_timeout_secs,
            ..LedgerConfig::new(config.ledger_rpc_url.clone())
        })?;

        Ok(Self {
            config,
            index: Arc::new(index),
            ledger: Arc::new(ledger),
        })
    }

    /// A pipeline signing with `signer`, sleeping on the tokio timer.
    pub fn pipeline(&self, signer: Arc<dyn TransactionSigner>) -> TransitionPipeline {
        TransitionPipeline::new(
            self.index.clone(),
            self.ledger.clone(),
            self.ledger.clone(),
            signer,
            Arc::new(TokioScheduler),
            self.config.programs(),
            self.config.retry,
        )
    }
}
