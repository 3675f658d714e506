//! System Program instructions.
//!
//! System instructions are bincode-encoded enums: a little-endian `u32`
//! variant index followed by the variant's fields.

use super::{AccountMeta, Instruction};
use crate::pubkey::PublicKey;

/// `CreateAccount` variant index.
pub const CREATE_ACCOUNT_IX_INDEX: u32 = 0;
/// `Transfer` variant index.
pub const TRANSFER_IX_INDEX: u32 = 2;

/// Build a System Program `Transfer` of `lamports` from `from` to `to`.
///
/// Data: `[u32 LE 2][u64 LE lamports]` = 12 bytes.
pub fn transfer(from: &PublicKey, to: &PublicKey, lamports: u64) -> Instruction {
    let mut data = Vec::with_capacity(12);
    data.extend_from_slice(&TRANSFER_IX_INDEX.to_le_bytes());
    data.extend_from_slice(&lamports.to_le_bytes());

    Instruction {
        program_id: PublicKey::SYSTEM_PROGRAM_ID,
        accounts: vec![
            AccountMeta::writable(*from, true),
            AccountMeta::writable(*to, false),
        ],
        data,
    }
}

/// Build a System Program `CreateAccount`: fund `new_account` with
/// `lamports`, allocate `space` bytes and assign it to `owner`.
///
/// Data: `[u32 LE 0][u64 lamports][u64 space][32-byte owner]` = 52 bytes.
/// Both accounts must sign.
pub fn create_account(
    from: &PublicKey,
    new_account: &PublicKey,
    lamports: u64,
    space: u64,
    owner: &PublicKey,
) -> Instruction {
    let mut data = Vec::with_capacity(52);
    data.extend_from_slice(&CREATE_ACCOUNT_IX_INDEX.to_le_bytes());
    data.extend_from_slice(&lamports.to_le_bytes());
    data.extend_from_slice(&space.to_le_bytes());
    data.extend_from_slice(owner.as_bytes());

    Instruction {
        program_id: PublicKey::SYSTEM_PROGRAM_ID,
        accounts: vec![
            AccountMeta::writable(*from, true),
            AccountMeta::writable(*new_account, true),
        ],
        data,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn transfer_data_is_12_bytes() {
        let from = PublicKey::new([1u8; 32]);
        let to = PublicKey::new([2u8; 32]);
        let ix = transfer(&from, &to, 1_000_000);
        assert_eq!(ix.data.len(), 12);
        assert_eq!(&ix.data[..4], &[2, 0, 0, 0]);
        assert_eq!(&ix.data[4..], &1_000_000u64.to_le_bytes());
    }

    #[test]
    fn transfer_has_correct_accounts() {
        let from = PublicKey::new([0xAAu8; 32]);
        let to = PublicKey::new([0xBBu8; 32]);
        let ix = transfer(&from, &to, 500);

        assert_eq!(ix.program_id, PublicKey::SYSTEM_PROGRAM_ID);
        assert_eq!(
            ix.accounts,
            vec![AccountMeta::writable(from, true), AccountMeta::writable(to, false)]
        );
    }

    #[test]
    fn create_account_layout() {
        let from = PublicKey::new([1u8; 32]);
        let new_account = PublicKey::new([2u8; 32]);
        let ix = create_account(&from, &new_account, 2_039_280, 165, &PublicKey::TOKEN_PROGRAM_ID);

        assert_eq!(ix.data.len(), 52);
        assert_eq!(&ix.data[..4], &[0, 0, 0, 0]);
        assert_eq!(&ix.data[4..12], &2_039_280u64.to_le_bytes());
        assert_eq!(&ix.data[12..20], &165u64.to_le_bytes());
        assert_eq!(&ix.data[20..], PublicKey::TOKEN_PROGRAM_ID.as_bytes());
        assert!(ix.accounts.iter().all(|m| m.is_signer && m.is_writable));
    }
}
