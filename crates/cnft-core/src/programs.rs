//! Well-known program ids and the per-deployment program set.

use solana_sdk::pubkey;
use solana_sdk::pubkey::Pubkey;

/// Bubblegum compressed-NFT program.
pub const BUBBLEGUM: Pubkey = pubkey!("BGUMAp9Gq7iTEuizy4pqaxsTyUCBK68MDfK752saRPUY");

/// SPL account compression program.
pub const ACCOUNT_COMPRESSION: Pubkey = pubkey!("cmtDvXumGCrqC1Age74AVPhSRVXJMd8PJS91L8KbNCK");

/// SPL noop log wrapper.
pub const NOOP: Pubkey = pubkey!("noopb9bkMVfRPU8AsbpTUg8AQkHtKwMYZiFUjNRtMmV");

/// Token metadata program.
pub const TOKEN_METADATA: Pubkey = pubkey!("metaqbxxUerdq28cj1RbAWkYQm3ybzjb6a8bt518x1s");

/// SPL token program.
pub const TOKEN: Pubkey = pubkey!("TokenkegQfeZyiNwAJbNbGKPFXCWuBvf9Ss623VQ5DA");

/// System program.
pub const SYSTEM: Pubkey = solana_sdk::system_program::ID;

/// Default deployment of the transition program.
pub const DEFAULT_TRANSITION_PROGRAM: Pubkey = pubkey!("3FngfXDHHK2hKhswQKbbtVhi6EHUn1NSgGi2uxEud66E");

/// The set of programs a transition request references.
///
/// Only `transition_program` normally varies between deployments; the rest
/// are overridable for local validators that load programs at other ids.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProgramIds {
    /// Program that receives the mint/transfer/burn instruction.
    pub transition_program: Pubkey,
    /// Compressed-NFT program invoked by the transition program.
    pub bubblegum: Pubkey,
    /// Account compression program owning the tree account.
    pub compression: Pubkey,
    /// Noop log wrapper.
    pub log_wrapper: Pubkey,
    /// Token metadata program (mint only).
    pub token_metadata: Pubkey,
    /// Token program (burn only, for the stake vault refund).
    pub token: Pubkey,
    /// System program.
    pub system: Pubkey,
}

impl Default for ProgramIds {
    fn default() -> Self {
        Self {
            transition_program: DEFAULT_TRANSITION_PROGRAM,
            bubblegum: BUBBLEGUM,
            compression: ACCOUNT_COMPRESSION,
            log_wrapper: NOOP,
            token_metadata: TOKEN_METADATA,
            token: TOKEN,
            system: SYSTEM,
        }
    }
}

impl ProgramIds {
    /// Default program set with a custom transition program id.
    pub fn with_transition_program(transition_program: Pubkey) -> Self {
        Self {
            transition_program,
            ..Self::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn system_program_is_all_zero() {
        assert_eq!(SYSTEM, Pubkey::default());
        assert_eq!(SYSTEM.to_string(), "11111111111111111111111111111111");
    }

    #[test]
    fn custom_transition_program_keeps_the_rest() {
        let custom = Pubkey::new_from_array([5; 32]);
        let ids = ProgramIds::with_transition_program(custom);
        assert_eq!(ids.transition_program, custom);
        assert_eq!(ids.bubblegum, BUBBLEGUM);
        assert_eq!(ids.token, TOKEN);
    }
}
