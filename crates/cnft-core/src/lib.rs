//! # cnft-core: Foundational Types for Compressed Asset Transitions
//!
//! Defines the primitives shared by every other crate in the workspace: the
//! merkle node hash newtype, the base-58 proof codec, program-derived address
//! derivation, signed transaction framing, the commitment level, and the port
//! traits through which the transition pipeline reaches the off-chain index
//! and the ledger.
//!
//! Account keys, signatures, blockhashes, instructions and messages are the
//! ledger SDK's own types (`solana_sdk`); this crate adds only what the SDK
//! does not model.
//!
//! ## Key Design Principles
//!
//! 1. **Node hashes are not keys.** `Hash32` and `Pubkey` are distinct types.
//!    A tree root cannot be passed where an owner is expected.
//!
//! 2. **Comparisons happen on bytes.** Text only exists at the boundary. Every
//!    base-58 string from the index is decoded through [`codec`] before it is
//!    compared or placed in a request.
//!
//! 3. **Ports, not singletons.** [`ports`] declares `AssetIndex`,
//!    `LedgerReader`, `LedgerSubmitter` and `TransactionSigner`. Concrete
//!    clients live in `cnft-index-client` and `cnft-ledger-client`.
//!
//! ## Crate Policy
//!
//! - No dependencies on other `cnft-*` crates (this is the leaf of the DAG).
//! - No `unsafe` code.
//! - No `panic!()` or `.unwrap()` outside tests.

pub mod asset;
pub mod codec;
pub mod commitment;
pub mod error;
pub mod hash;
pub mod pda;
pub mod ports;
pub mod programs;
pub mod rpc;
pub mod wire;

pub use asset::{CompressedAsset, InclusionProof, TreeState};
pub use codec::{
    decode_address, decode_blockhash, decode_hash, decode_proof, decode_signature, encode_hash,
    to_account_refs,
};
pub use commitment::{Commitment, ParseCommitmentError};
pub use error::{CodecError, IndexError, LedgerError, SigningError};
pub use hash::Hash32;
pub use pda::{leaf_asset_id, PdaError};
pub use ports::{AssetIndex, LedgerReader, LedgerSubmitter, TransactionSigner};
pub use programs::ProgramIds;
pub use wire::{SignedTransaction, WireError};

pub use solana_sdk::hash::Hash;
pub use solana_sdk::instruction::{AccountMeta, Instruction};
pub use solana_sdk::message::Message;
pub use solana_sdk::pubkey::Pubkey;
pub use solana_sdk::signature::Signature;
pub use solana_sdk::transaction::Transaction;
