//! # Transition Errors
//!
//! One taxonomy for every way a mint or transfer can fail, tagged with the
//! pipeline [`Stage`] it failed in. Only [`SubmitError`]s are ever retried,
//! and only by the submission engine; everything else aborts the operation.

use std::fmt;

use cnft_core::{CodecError, Hash32, IndexError, LedgerError, Pubkey, SigningError, WireError};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Pipeline stage an operation was in when it failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Stage {
    /// Resolving the asset record from the index.
    Resolve,
    /// Fetching the inclusion proof from the index.
    FetchProof,
    /// Reading the live tree and checking root and owner.
    Validate,
    /// Assembling the instruction.
    Build,
    /// Fetching a blockhash, compiling and signing.
    Prepare,
    /// Sending and confirming.
    Submit,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Resolve => "resolve",
            Self::FetchProof => "fetch_proof",
            Self::Validate => "validate",
            Self::Build => "build",
            Self::Prepare => "prepare",
            Self::Submit => "submit",
        };
        f.write_str(s)
    }
}

/// A failed send or confirmation. The engine retries these.
#[derive(Error, Debug)]
pub enum SubmitError {
    /// The ledger rejected or never received the transaction.
    #[error("send failed: {0}")]
    Send(#[source] LedgerError),
    /// The transaction was sent but did not reach the required commitment.
    #[error("confirmation failed: {0}")]
    Confirm(#[source] LedgerError),
}

/// Errors from a mint or transfer operation.
#[derive(Error, Debug)]
pub enum TransitionError {
    /// A hash or address from the index was malformed.
    #[error("[{stage}] malformed encoding for {input:?}: {reason}")]
    Encoding {
        stage: Stage,
        input: String,
        reason: String,
    },

    /// A proof with no nodes reached `stage`.
    #[error("[{stage}] inclusion proof is empty")]
    EmptyProof { stage: Stage },

    /// The index holds no record or proof for the asset.
    #[error("[{stage}] asset {asset_id} not found")]
    AssetNotFound { stage: Stage, asset_id: Pubkey },

    /// The index could not answer. Callers may retry the whole operation.
    #[error("[{stage}] index unavailable: {source}")]
    IndexUnavailable {
        stage: Stage,
        #[source]
        source: IndexError,
    },

    /// The proof was computed against a root the ledger has moved past.
    #[error("[validate] stale proof for {asset_id}: proof root {proof_root}, ledger root {ledger_root}")]
    StaleProof {
        asset_id: Pubkey,
        proof_root: Hash32,
        ledger_root: Hash32,
    },

    /// The signer does not own the asset.
    #[error("[validate] {signer} does not own {asset_id} (owner is {owner})")]
    Ownership {
        asset_id: Pubkey,
        owner: Pubkey,
        signer: Pubkey,
    },

    /// A request parameter is out of range or inconsistent.
    #[error("[{stage}] invalid parameter {name}: {reason}")]
    InvalidParameter {
        stage: Stage,
        name: &'static str,
        reason: String,
    },

    /// Every send attempt failed. `last` is the final underlying error.
    #[error("[submit] submission exhausted after {attempts} attempts: {last}")]
    SubmissionExhausted {
        attempts: u32,
        #[source]
        last: SubmitError,
    },

    /// A ledger read needed before submission failed.
    #[error("[{stage}] ledger unavailable: {source}")]
    LedgerUnavailable {
        stage: Stage,
        #[source]
        source: LedgerError,
    },

    /// The signer could not sign the message.
    #[error("[prepare] signing failed: {0}")]
    Signing(#[from] SigningError),
}

impl TransitionError {
    /// Stage the operation failed in.
    pub fn stage(&self) -> Stage {
        match self {
            Self::Encoding { stage, .. }
            | Self::AssetNotFound { stage, .. }
            | Self::IndexUnavailable { stage, .. }
            | Self::EmptyProof { stage }
            | Self::InvalidParameter { stage, .. }
            | Self::LedgerUnavailable { stage, .. } => *stage,
            Self::StaleProof { .. } | Self::Ownership { .. } => Stage::Validate,
            Self::SubmissionExhausted { .. } => Stage::Submit,
            Self::Signing(_) => Stage::Prepare,
        }
    }

    pub(crate) fn invalid(stage: Stage, name: &'static str, reason: impl Into<String>) -> Self {
        Self::InvalidParameter {
            stage,
            name,
            reason: reason.into(),
        }
    }

    pub(crate) fn from_codec(stage: Stage, err: CodecError) -> Self {
        match err {
            CodecError::EmptyProof => Self::EmptyProof { stage },
            CodecError::Encoding { input, reason } => Self::Encoding {
                stage,
                input,
                reason,
            },
        }
    }

    /// Classify an index failure raised during `stage`.
    pub(crate) fn from_index(stage: Stage, err: IndexError) -> Self {
        match err {
            IndexError::AssetNotFound { asset_id } => Self::AssetNotFound { stage, asset_id },
            IndexError::Codec(codec) => Self::from_codec(stage, codec),
            IndexError::Derivation(e) => Self::invalid(stage, "leaf_index", e.to_string()),
            other => Self::IndexUnavailable {
                stage,
                source: other,
            },
        }
    }

    /// Classify a ledger read failure raised during `stage`.
    ///
    /// A missing or undecodable tree account is a bad `tree` parameter, not
    /// an outage.
    pub(crate) fn from_ledger(stage: Stage, err: LedgerError) -> Self {
        match err {
            LedgerError::AccountNotFound { address } => {
                Self::invalid(stage, "tree", format!("no account at {address}"))
            }
            LedgerError::InvalidTreeAccount { reason, .. } => Self::invalid(stage, "tree", reason),
            other => Self::LedgerUnavailable {
                stage,
                source: other,
            },
        }
    }

    pub(crate) fn from_wire(err: WireError) -> Self {
        Self::invalid(Stage::Prepare, "transaction", err.to_string())
    }
}
