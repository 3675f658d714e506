//! Instruction builders for the System, SPL Token and Associated Token
//! Account programs.
//!
//! Builders are pure: they never touch the network and never check that
//! the referenced accounts exist.

pub mod associated_token;
pub mod system;
pub mod token;

use crate::pubkey::PublicKey;

/// A single account reference in an instruction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AccountMeta {
    pub public_key: PublicKey,
    pub is_signer: bool,
    pub is_writable: bool,
}

impl AccountMeta {
    pub fn writable(public_key: PublicKey, is_signer: bool) -> Self {
        Self {
            public_key,
            is_signer,
            is_writable: true,
        }
    }

    pub fn readonly(public_key: PublicKey, is_signer: bool) -> Self {
        Self {
            public_key,
            is_signer,
            is_writable: false,
        }
    }
}

/// An instruction before it is compiled into a transaction message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Instruction {
    pub program_id: PublicKey,
    pub accounts: Vec<AccountMeta>,
    pub data: Vec<u8>,
}
