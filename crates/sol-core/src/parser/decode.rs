//! Decoder registry for compiled instructions, keyed by program id.

use crate::instructions::{system, token};
use crate::pubkey::PublicKey;

/// Context for decoding one instruction: its program and resolved accounts.
pub struct InstructionContext<'a> {
    pub program_id: &'a PublicKey,
    pub accounts: &'a [PublicKey],
    pub data: &'a [u8],
}

/// An instruction decoded into the operations the classifier reasons about.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DecodedInstruction {
    SystemTransfer {
        from: PublicKey,
        to: PublicKey,
        lamports: u64,
    },
    SystemCreateAccount {
        from: PublicKey,
        new_account: PublicKey,
        lamports: u64,
        space: u64,
        owner: PublicKey,
    },
    TokenInitializeAccount {
        account: PublicKey,
        mint: PublicKey,
        owner: PublicKey,
    },
    TokenTransfer {
        source: PublicKey,
        destination: PublicKey,
        authority: PublicKey,
        amount: u64,
    },
    TokenTransferChecked {
        source: PublicKey,
        mint: PublicKey,
        destination: PublicKey,
        authority: PublicKey,
        amount: u64,
        decimals: u8,
    },
    TokenCloseAccount {
        account: PublicKey,
        destination: PublicKey,
        owner: PublicKey,
    },
    CreateAssociatedTokenAccount {
        payer: PublicKey,
        associated_account: PublicKey,
        owner: PublicKey,
        mint: PublicKey,
    },
    /// Unsupported program or malformed data. `program_id` is `None` when the
    /// compiled instruction pointed outside the account list.
    Unknown {
        program_id: Option<PublicKey>,
        accounts: Vec<PublicKey>,
        data: Vec<u8>,
    },
}

impl DecodedInstruction {
    pub fn is_transfer(&self) -> bool {
        matches!(
            self,
            Self::SystemTransfer { .. } | Self::TokenTransfer { .. } | Self::TokenTransferChecked { .. }
        )
    }

    /// Accounts debited and credited by a transfer.
    pub fn transfer_endpoints(&self) -> Option<(PublicKey, PublicKey)> {
        match *self {
            Self::SystemTransfer { from, to, .. } => Some((from, to)),
            Self::TokenTransfer {
                source,
                destination,
                ..
            }
            | Self::TokenTransferChecked {
                source,
                destination,
                ..
            } => Some((source, destination)),
            _ => None,
        }
    }

    /// An instruction of a program outside the system, token and
    /// associated-token programs (compute budget, memo, DEX...).
    pub fn is_other_program(&self) -> bool {
        match self {
            Self::Unknown {
                program_id: Some(program_id),
                ..
            } => !matches!(
                *program_id,
                PublicKey::SYSTEM_PROGRAM_ID
                    | PublicKey::TOKEN_PROGRAM_ID
                    | PublicKey::ASSOCIATED_TOKEN_PROGRAM_ID
            ),
            _ => false,
        }
    }

    /// Instructions that allocate or initialize an account.
    pub fn is_account_creation(&self) -> bool {
        matches!(
            self,
            Self::SystemCreateAccount { .. }
                | Self::TokenInitializeAccount { .. }
                | Self::CreateAssociatedTokenAccount { .. }
        )
    }
}

pub fn decode_instruction(ctx: InstructionContext) -> DecodedInstruction {
    match *ctx.program_id {
        PublicKey::SYSTEM_PROGRAM_ID => decode_system_instruction(ctx),
        PublicKey::TOKEN_PROGRAM_ID => decode_token_instruction(ctx),
        PublicKey::ASSOCIATED_TOKEN_PROGRAM_ID => decode_ata_instruction(ctx),
        _ => make_unknown(ctx),
    }
}

fn decode_system_instruction(ctx: InstructionContext) -> DecodedInstruction {
    let Some(tag) = read_u32(ctx.data, 0) else {
        return make_unknown(ctx);
    };

    match (tag, ctx.accounts) {
        (system::TRANSFER_IX_INDEX, [from, to, ..]) if ctx.data.len() == 12 => {
            match read_u64(ctx.data, 4) {
                Some(lamports) => DecodedInstruction::SystemTransfer {
                    from: *from,
                    to: *to,
                    lamports,
                },
                None => make_unknown(ctx),
            }
        }
        (system::CREATE_ACCOUNT_IX_INDEX, [from, new_account, ..]) if ctx.data.len() == 52 => {
            match (
                read_u64(ctx.data, 4),
                read_u64(ctx.data, 12),
                PublicKey::from_slice(&ctx.data[20..52]).ok(),
            ) {
                (Some(lamports), Some(space), Some(owner)) => {
                    DecodedInstruction::SystemCreateAccount {
                        from: *from,
                        new_account: *new_account,
                        lamports,
                        space,
                        owner,
                    }
                }
                _ => make_unknown(ctx),
            }
        }
        _ => make_unknown(ctx),
    }
}

fn decode_token_instruction(ctx: InstructionContext) -> DecodedInstruction {
    let Some(&tag) = ctx.data.first() else {
        return make_unknown(ctx);
    };

    match (tag, ctx.accounts) {
        (token::INITIALIZE_ACCOUNT_IX, [account, mint, owner, ..]) => {
            DecodedInstruction::TokenInitializeAccount {
                account: *account,
                mint: *mint,
                owner: *owner,
            }
        }
        (token::TRANSFER_IX, [source, destination, authority, ..]) => {
            match read_u64(ctx.data, 1) {
                Some(amount) => DecodedInstruction::TokenTransfer {
                    source: *source,
                    destination: *destination,
                    authority: *authority,
                    amount,
                },
                None => make_unknown(ctx),
            }
        }
        (token::TRANSFER_CHECKED_IX, [source, mint, destination, authority, ..]) => {
            match (read_u64(ctx.data, 1), ctx.data.get(9)) {
                (Some(amount), Some(&decimals)) => DecodedInstruction::TokenTransferChecked {
                    source: *source,
                    mint: *mint,
                    destination: *destination,
                    authority: *authority,
                    amount,
                    decimals,
                },
                _ => make_unknown(ctx),
            }
        }
        (token::CLOSE_ACCOUNT_IX, [account, destination, owner, ..]) => {
            DecodedInstruction::TokenCloseAccount {
                account: *account,
                destination: *destination,
                owner: *owner,
            }
        }
        _ => make_unknown(ctx),
    }
}

fn decode_ata_instruction(ctx: InstructionContext) -> DecodedInstruction {
    // `Create` is encoded either as empty data or as a single 0 byte.
    let is_create = matches!(ctx.data, [] | [0]);
    match ctx.accounts {
        [payer, associated_account, owner, mint, ..] if is_create => {
            DecodedInstruction::CreateAssociatedTokenAccount {
                payer: *payer,
                associated_account: *associated_account,
                owner: *owner,
                mint: *mint,
            }
        }
        _ => make_unknown(ctx),
    }
}

fn make_unknown(ctx: InstructionContext) -> DecodedInstruction {
    DecodedInstruction::Unknown {
        program_id: Some(*ctx.program_id),
        accounts: ctx.accounts.to_vec(),
        data: ctx.data.to_vec(),
    }
}

fn read_u32(data: &[u8], offset: usize) -> Option<u32> {
    let bytes = data.get(offset..offset + 4)?;
    Some(u32::from_le_bytes(bytes.try_into().ok()?))
}

fn read_u64(data: &[u8], offset: usize) -> Option<u64> {
    let bytes = data.get(offset..offset + 8)?;
    Some(u64::from_le_bytes(bytes.try_into().ok()?))
}
