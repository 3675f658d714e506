//! Associated Token Account Program instructions.

use super::{AccountMeta, Instruction};
use crate::pubkey::PublicKey;

/// Build the instruction that creates `associated_account` (the ATA of
/// `owner` for `mint`), paid for by `payer`.
///
/// The data payload is empty. Creating an account that already exists fails
/// on-chain, so callers resolve the destination first.
pub fn create_associated_token_account(
    mint: &PublicKey,
    associated_account: &PublicKey,
    owner: &PublicKey,
    payer: &PublicKey,
) -> Instruction {
    Instruction {
        program_id: PublicKey::ASSOCIATED_TOKEN_PROGRAM_ID,
        accounts: vec![
            AccountMeta::writable(*payer, true),
            AccountMeta::writable(*associated_account, false),
            AccountMeta::readonly(*owner, false),
            AccountMeta::readonly(*mint, false),
            AccountMeta::readonly(PublicKey::SYSTEM_PROGRAM_ID, false),
            AccountMeta::readonly(PublicKey::TOKEN_PROGRAM_ID, false),
            AccountMeta::readonly(PublicKey::SYSVAR_RENT, false),
        ],
        data: Vec::new(),
    }
}
