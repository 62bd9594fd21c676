//! # File Keypair Signer
//!
//! An ed25519 keypair loaded from the ledger's conventional JSON key file: a
//! JSON array of 64 integers, the 32-byte secret seed followed by the 32-byte
//! public key. The public half is checked against the secret on load.
//!
//! Key handling is the SDK's `solana_sdk::signature::Keypair`. The raw file
//! contents and byte encodings pass through `Zeroizing` buffers.

use std::path::Path;

use cnft_core::{Pubkey, Signature, SigningError, TransactionSigner};
use solana_sdk::signature::{Keypair as SdkKeypair, Signer};
use solana_sdk::signer::keypair::keypair_from_seed;
use thiserror::Error;
use zeroize::Zeroizing;

/// Length of the key file's byte array.
pub const KEYPAIR_LENGTH: usize = 64;

/// Errors loading a keypair.
#[derive(Error, Debug)]
pub enum KeypairError {
    /// The key file could not be read.
    #[error("failed to read keypair file {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
    /// The contents are not a JSON array of bytes.
    #[error("keypair is not a JSON byte array: {0}")]
    Format(String),
    /// The bytes are not a consistent ed25519 keypair.
    #[error("invalid keypair: {0}")]
    InvalidKey(String),
}

/// An ed25519 signing keypair.
pub struct Keypair {
    inner: SdkKeypair,
}

impl std::fmt::Debug for Keypair {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Keypair")
            .field("address", &self.address())
            .finish_non_exhaustive()
    }
}

impl Keypair {
    /// Generate a fresh random keypair.
    pub fn generate() -> Self {
        Self {
            inner: SdkKeypair::new(),
        }
    }

    /// Keypair from 64 bytes, secret seed then public key.
    pub fn from_keypair_bytes(bytes: &[u8]) -> Result<Self, KeypairError> {
        if bytes.len() != KEYPAIR_LENGTH {
            return Err(KeypairError::InvalidKey(format!(
                "expected {KEYPAIR_LENGTH} bytes, got {}",
                bytes.len()
            )));
        }
        let (secret, public) = bytes.split_at(32);
        let inner = keypair_from_seed(secret).map_err(|e| KeypairError::InvalidKey(e.to_string()))?;
        if inner.pubkey().as_ref() != public {
            return Err(KeypairError::InvalidKey(
                "public key does not match secret".into(),
            ));
        }
        Ok(Self { inner })
    }

    /// Keypair from the JSON text of a key file.
    pub fn from_json(text: &str) -> Result<Self, KeypairError> {
        let bytes: Zeroizing<Vec<u8>> = Zeroizing::new(
            serde_json::from_str(text).map_err(|e| KeypairError::Format(e.to_string()))?,
        );
        Self::from_keypair_bytes(&bytes)
    }

    /// Read a JSON key file.
    pub fn read_from_file(path: impl AsRef<Path>) -> Result<Self, KeypairError> {
        let path = path.as_ref();
        let text = Zeroizing::new(std::fs::read_to_string(path).map_err(|source| {
            KeypairError::Io {
                path: path.display().to_string(),
                source,
            }
        })?);
        Self::from_json(&text)
    }

    /// The 64-byte keypair encoding, for writing key files.
    pub fn to_keypair_bytes(&self) -> Zeroizing<[u8; KEYPAIR_LENGTH]> {
        Zeroizing::new(self.inner.to_bytes())
    }

    /// JSON key file contents.
    pub fn to_json(&self) -> Result<Zeroizing<String>, KeypairError> {
        serde_json::to_string(&self.to_keypair_bytes().to_vec())
            .map(Zeroizing::new)
            .map_err(|e| KeypairError::Format(e.to_string()))
    }
}

impl TransactionSigner for Keypair {
    fn address(&self) -> Pubkey {
        self.inner.pubkey()
    }

    fn sign(&self, message: &[u8]) -> Result<Signature, SigningError> {
        self.inner
            .try_sign_message(message)
            .map_err(|e| SigningError::Key(e.to_string()))
    }
}
