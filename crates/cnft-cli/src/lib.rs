//! # cnft-cli: Command Line for Compressed Assets
//!
//! Provides the `cnft` binary.
//!
//! ## Subcommands
//!
//! - `cnft asset` / `cnft proof` / `cnft tree`: read-only inspection of the
//!   index and the ledger.
//! - `cnft transfer`: validated transfer of an existing asset.
//! - `cnft mint`: mint a new asset into a collection.
//! - `cnft burn`: validated burn of an owned asset.
//! - `cnft keygen`: write a new signer key file.
//!
//! ```bash
//! export CNFT_INDEX_API_KEY=...
//! cnft asset 4rZS...tree 12
//! cnft transfer 4rZS...tree 12 9xQe...owner -k ~/.config/solana/id.json
//! ```

pub mod context;
pub mod inspect;
pub mod keygen;
pub mod transition;
