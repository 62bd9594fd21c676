//! Commitment level shared by configuration, the ledger client and the CLI.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Commitment level a read or confirmation waits for.
///
/// Levels are ordered: a signature that reached `Finalized` has also reached
/// `Confirmed` and `Processed`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Commitment {
    Processed,
    Confirmed,
    Finalized,
}

/// An unrecognised commitment name.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("invalid commitment level {0:?} (expected processed, confirmed or finalized)")]
pub struct ParseCommitmentError(pub String);

impl Commitment {
    /// Wire name of the level.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Processed => "processed",
            Self::Confirmed => "confirmed",
            Self::Finalized => "finalized",
        }
    }
}

impl Default for Commitment {
    fn default() -> Self {
        Self::Confirmed
    }
}

impl fmt::Display for Commitment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Commitment {
    type Err = ParseCommitmentError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "processed" => Ok(Self::Processed),
            "confirmed" => Ok(Self::Confirmed),
            "finalized" => Ok(Self::Finalized),
            _ => Err(ParseCommitmentError(s.to_string())),
        }
    }
}
