//! # Merkle Node Hashes
//!
//! `Hash32` wraps the raw 32 bytes of a tree root, leaf, data hash, creator
//! hash or proof node. It renders as base-58 text for display and serde, but
//! equality, ordering and hashing operate on the bytes only.
//!
//! Account addresses and signatures use the ledger SDK's own `Pubkey` and
//! `Signature`. A node hash is deliberately a separate type so a tree root
//! cannot be passed where an owner is expected.
//!
//! ## Security Invariant
//!
//! Two textual encodings of the same value are not guaranteed to be equal
//! unless both came from the same canonical encoder. Parsing always goes
//! through [`crate::codec`], so any comparison made with this type is a byte
//! comparison.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use solana_sdk::pubkey::Pubkey;

use crate::codec;
use crate::error::CodecError;

/// A 32-byte hash value (tree root, data hash, creator hash, proof node).
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub struct Hash32(pub [u8; 32]);

impl Hash32 {
    /// Construct from raw bytes.
    pub const fn new(bytes: [u8; 32]) -> Self {
        Self(bytes)
    }

    /// Access the raw bytes.
    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }

    /// Reinterpret the hash as an account key.
    ///
    /// Proof nodes are passed to the ledger program as read-only account
    /// references whose "address" is the node hash itself.
    pub fn to_pubkey(self) -> Pubkey {
        Pubkey::new_from_array(self.0)
    }
}

impl AsRef<[u8]> for Hash32 {
    fn as_ref(&self) -> &[u8] {
        &self.0
    }
}

impl fmt::Display for Hash32 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&codec::encode_hash(self))
    }
}

impl fmt::Debug for Hash32 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Hash32({self})")
    }
}

impl FromStr for Hash32 {
    type Err = CodecError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        codec::decode_hash(s)
    }
}

impl Serialize for Hash32 {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for Hash32 {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_is_base58() {
        assert_eq!(Hash32::default().to_string(), "11111111111111111111111111111111");
    }

    #[test]
    fn equality_is_bytewise() {
        let a = Hash32([7u8; 32]);
        let b: Hash32 = a.to_string().parse().unwrap();
        assert_eq!(a, b);
        assert_ne!(a, Hash32([8u8; 32]));
    }

    #[test]
    fn serde_uses_text_form() {
        let h = Hash32([1u8; 32]);
        let json = serde_json::to_string(&h).unwrap();
        assert_eq!(json, format!("\"{h}\""));
        let back: Hash32 = serde_json::from_str(&json).unwrap();
        assert_eq!(back, h);
    }

    #[test]
    fn serde_rejects_wrong_length() {
        let result: Result<Hash32, _> = serde_json::from_str("\"3yZe7d\"");
        assert!(result.is_err());
    }

    #[test]
    fn hash_reinterprets_as_pubkey() {
        let h = Hash32([9u8; 32]);
        assert_eq!(h.to_pubkey().to_bytes(), *h.as_bytes());
    }
}
