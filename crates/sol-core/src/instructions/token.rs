//! SPL Token Program instructions.
//!
//! SPL Token instruction data is a one-byte discriminator followed by
//! little-endian fields.

use super::{AccountMeta, Instruction};
use crate::pubkey::PublicKey;

pub const INITIALIZE_ACCOUNT_IX: u8 = 1;
pub const TRANSFER_IX: u8 = 3;
pub const CLOSE_ACCOUNT_IX: u8 = 9;
pub const TRANSFER_CHECKED_IX: u8 = 12;

/// Build an SPL Token `Transfer` of `amount` base units.
///
/// Data: `[3][u64 LE amount]` = 9 bytes.
pub fn transfer(
    source: &PublicKey,
    destination: &PublicKey,
    owner: &PublicKey,
    multi_signers: &[PublicKey],
    amount: u64,
) -> Instruction {
    let mut data = Vec::with_capacity(9);
    data.push(TRANSFER_IX);
    data.extend_from_slice(&amount.to_le_bytes());

    let mut accounts = vec![
        AccountMeta::writable(*source, false),
        AccountMeta::writable(*destination, false),
    ];
    push_authority(&mut accounts, owner, multi_signers);

    Instruction {
        program_id: PublicKey::TOKEN_PROGRAM_ID,
        accounts,
        data,
    }
}

/// Build an SPL Token `TransferChecked`, which additionally asserts the
/// mint and its decimals on-chain.
///
/// Data: `[12][u64 LE amount][u8 decimals]` = 10 bytes.
pub fn transfer_checked(
    source: &PublicKey,
    mint: &PublicKey,
    destination: &PublicKey,
    owner: &PublicKey,
    multi_signers: &[PublicKey],
    amount: u64,
    decimals: u8,
) -> Instruction {
    let mut data = Vec::with_capacity(10);
    data.push(TRANSFER_CHECKED_IX);
    data.extend_from_slice(&amount.to_le_bytes());
    data.push(decimals);

    let mut accounts = vec![
        AccountMeta::writable(*source, false),
        AccountMeta::readonly(*mint, false),
        AccountMeta::writable(*destination, false),
    ];
    push_authority(&mut accounts, owner, multi_signers);

    Instruction {
        program_id: PublicKey::TOKEN_PROGRAM_ID,
        accounts,
        data,
    }
}

/// Build an SPL Token `InitializeAccount` for a freshly allocated account.
pub fn initialize_account(
    account: &PublicKey,
    mint: &PublicKey,
    owner: &PublicKey,
) -> Instruction {
    Instruction {
        program_id: PublicKey::TOKEN_PROGRAM_ID,
        accounts: vec![
            AccountMeta::writable(*account, false),
            AccountMeta::readonly(*mint, false),
            AccountMeta::readonly(*owner, false),
            AccountMeta::readonly(PublicKey::SYSVAR_RENT, false),
        ],
        data: vec![INITIALIZE_ACCOUNT_IX],
    }
}

/// Build an SPL Token `CloseAccount`, sending the rent lamports of
/// `account` to `destination`.
pub fn close_account(
    account: &PublicKey,
    destination: &PublicKey,
    owner: &PublicKey,
    multi_signers: &[PublicKey],
) -> Instruction {
    let mut accounts = vec![
        AccountMeta::writable(*account, false),
        AccountMeta::writable(*destination, false),
    ];
    push_authority(&mut accounts, owner, multi_signers);

    Instruction {
        program_id: PublicKey::TOKEN_PROGRAM_ID,
        accounts,
        data: vec![CLOSE_ACCOUNT_IX],
    }
}

/// Single owner signs directly; a multisig owner is a plain account and its
/// co-signers follow in call order.
fn push_authority(accounts: &mut Vec<AccountMeta>, owner: &PublicKey, multi_signers: &[PublicKey]) {
    if multi_signers.is_empty() {
        accounts.push(AccountMeta::readonly(*owner, true));
    } else {
        accounts.push(AccountMeta::readonly(*owner, false));
        accounts.extend(
            multi_signers
                .iter()
                .map(|signer| AccountMeta::readonly(*signer, true)),
        );
    }
}
