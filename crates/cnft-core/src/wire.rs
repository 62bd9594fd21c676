//! # Signed Transaction Framing
//!
//! Wraps a signed SDK [`Transaction`] together with its serialized wire bytes.
//! The bytes are produced once, with `bincode` as the ledger expects, and
//! every resend submits exactly those bytes.

use base64::Engine;
use solana_sdk::message::Message;
use solana_sdk::packet::PACKET_DATA_SIZE;
use solana_sdk::signature::Signature;
use solana_sdk::transaction::Transaction;
use thiserror::Error;

/// Errors framing a signed transaction.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum WireError {
    /// Signature count does not match the message header.
    #[error("message requires {required} signatures, got {provided}")]
    SignatureCount {
        /// Signatures named by the header.
        required: usize,
        /// Signatures supplied.
        provided: usize,
    },

    /// At least one required signature is still the zero placeholder.
    #[error("transaction is not fully signed")]
    Unsigned,

    /// `bincode` could not serialize the transaction.
    #[error("failed to serialize transaction: {0}")]
    Serialize(String),

    /// Serialized transaction exceeds the packet limit.
    #[error("serialized transaction is {size} bytes, limit is {PACKET_DATA_SIZE}")]
    TooLarge {
        /// Serialized size in bytes.
        size: usize,
    },
}

/// A fully signed transaction, framed once and re-sent verbatim.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignedTransaction {
    transaction: Transaction,
    wire: Vec<u8>,
}

impl SignedTransaction {
    /// Frame a signed transaction.
    pub fn new(transaction: Transaction) -> Result<Self, WireError> {
        let required = usize::from(transaction.message.header.num_required_signatures);
        if transaction.signatures.len() != required {
            return Err(WireError::SignatureCount {
                required,
                provided: transaction.signatures.len(),
            });
        }
        if transaction.signatures.iter().any(|s| *s == Signature::default()) {
            return Err(WireError::Unsigned);
        }
        let wire = bincode::serialize(&transaction).map_err(|e| WireError::Serialize(e.to_string()))?;
        if wire.len() > PACKET_DATA_SIZE {
            return Err(WireError::TooLarge { size: wire.len() });
        }
        Ok(Self { transaction, wire })
    }

    /// The fee payer's signature, which identifies the transaction on the ledger.
    pub fn signature(&self) -> Signature {
        self.transaction.signatures.first().copied().unwrap_or_default()
    }

    pub fn transaction(&self) -> &Transaction {
        &self.transaction
    }

    /// The compiled message.
    pub fn message(&self) -> &Message {
        &self.transaction.message
    }

    /// Serialized wire bytes.
    pub fn wire_bytes(&self) -> &[u8] {
        &self.wire
    }

    /// Base64 of the wire bytes, as accepted by `sendTransaction`.
    pub fn to_base64(&self) -> String {
        base64::engine::general_purpose::STANDARD.encode(&self.wire)
    }
}
