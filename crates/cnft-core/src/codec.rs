//! # Proof Codec
//!
//! Converts hashes, addresses and proof paths between their textual base-58
//! form (as returned by the index) and raw fixed-width bytes, and turns an
//! ordered proof path into the read-only account metas the ledger program
//! consumes.
//!
//! ## Ordering Invariant
//!
//! [`to_account_refs`] preserves input order exactly: the leaf-adjacent
//! sibling comes first and the root-adjacent sibling last. The ledger's
//! verifier reconstructs the root by hashing the leaf with each sibling in
//! that order.

use solana_sdk::hash::Hash;
use solana_sdk::instruction::AccountMeta;
use solana_sdk::pubkey::Pubkey;
use solana_sdk::signature::Signature;

use crate::error::CodecError;
use crate::hash::Hash32;

/// Decode base-58 text into exactly `N` bytes.
///
/// The input is taken verbatim. Surrounding whitespace is outside the
/// alphabet and fails like any other foreign character.
pub(crate) fn decode_fixed<const N: usize>(text: &str) -> Result<[u8; N], CodecError> {
    let raw = bs58::decode(text)
        .into_vec()
        .map_err(|e| CodecError::Encoding {
            input: text.to_string(),
            reason: e.to_string(),
        })?;
    raw.as_slice().try_into().map_err(|_| CodecError::Encoding {
        input: text.to_string(),
        reason: format!("expected {N} bytes after decode, got {}", raw.len()),
    })
}

/// Decode a base-58 hash into its 32-byte value.
///
/// # Errors
///
/// [`CodecError::Encoding`] if the text contains characters outside the
/// base-58 alphabet or does not decode to exactly 32 bytes.
pub fn decode_hash(text: &str) -> Result<Hash32, CodecError> {
    decode_fixed::<32>(text).map(Hash32)
}

/// Decode a base-58 account address into its 32-byte key.
pub fn decode_address(text: &str) -> Result<Pubkey, CodecError> {
    decode_fixed::<32>(text).map(Pubkey::new_from_array)
}

/// Decode a base-58 blockhash.
pub fn decode_blockhash(text: &str) -> Result<Hash, CodecError> {
    decode_fixed::<32>(text).map(Hash::new_from_array)
}

/// Decode a base-58 transaction signature into its 64 bytes.
pub fn decode_signature(text: &str) -> Result<Signature, CodecError> {
    decode_fixed::<64>(text).map(Signature::from)
}

/// Encode a 32-byte hash as canonical base-58 text.
pub fn encode_hash(hash: &Hash32) -> String {
    bs58::encode(hash.as_bytes()).into_string()
}

/// Decode an ordered textual proof path.
///
/// The empty check runs before any element is decoded, so an empty path is
/// always reported as [`CodecError::EmptyProof`].
pub fn decode_proof<S: AsRef<str>>(nodes: &[S]) -> Result<Vec<Hash32>, CodecError> {
    if nodes.is_empty() {
        return Err(CodecError::EmptyProof);
    }
    nodes.iter().map(|n| decode_hash(n.as_ref())).collect()
}

/// Map an ordered proof path to read-only, non-signer account metas.
///
/// # Errors
///
/// [`CodecError::EmptyProof`] if `proof` is empty. An empty proof can never
/// validate against a non-trivial tree.
pub fn to_account_refs(proof: &[Hash32]) -> Result<Vec<AccountMeta>, CodecError> {
    if proof.is_empty() {
        return Err(CodecError::EmptyProof);
    }
    Ok(proof
        .iter()
        .map(|node| AccountMeta::new_readonly(node.to_pubkey(), false))
        .collect())
}

/// Serde adapter rendering SDK keys and signatures as base-58 strings.
///
/// `Pubkey` and `Signature` serialize as byte arrays by default; reports and
/// records use `#[serde(with = "cnft_core::codec::base58")]` instead.
pub mod base58 {
    use std::fmt::Display;
    use std::str::FromStr;

    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<T: Display, S: Serializer>(value: &T, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(value)
    }

    pub fn deserialize<'de, T, D>(deserializer: D) -> Result<T, D::Error>
    where
        T: FromStr,
        T::Err: Display,
        D: Deserializer<'de>,
    {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(serde::de::Error::custom)
    }

    /// The same adapter for optional values.
    pub mod option {
        use super::*;

        pub fn serialize<T: Display, S: Serializer>(
            value: &Option<T>,
            serializer: S,
        ) -> Result<S::Ok, S::Error> {
            match value {
                Some(v) => serializer.collect_str(v),
                None => serializer.serialize_none(),
            }
        }

        pub fn deserialize<'de, T, D>(deserializer: D) -> Result<Option<T>, D::Error>
        where
            T: FromStr,
            T::Err: Display,
            D: Deserializer<'de>,
        {
            Option::<String>::deserialize(deserializer)?
                .map(|raw| raw.parse().map_err(serde::de::Error::custom))
                .transpose()
        }
    }
}
