//! Solana client core.
//!
//! Synchronous, I/O-free building blocks: public keys and program-derived
//! addresses, keypair accounts, instruction builders, the transaction wire
//! format, account-data layouts and the classifier for confirmed
//! transactions.
//!
//! The wire format is implemented by hand on top of `ed25519-dalek` and
//! `bs58` rather than through `solana-sdk`.

pub mod account;
pub mod error;
pub mod instructions;
pub mod layout;
pub mod parser;
pub mod pda;
pub mod pubkey;
pub mod token;
pub mod transaction;

// Re-export key public types for ergonomic imports.
pub use account::{Account, DerivationPath, Signature};
pub use error::SolError;
pub use instructions::{AccountMeta, Instruction};
pub use layout::{AccountLayout, Mint, TokenAccount};
pub use parser::{ParsedTransaction, TransactionInfo, TransactionParser};
pub use pda::{create_program_address, derive_associated_token_address, find_program_address};
pub use pubkey::PublicKey;
pub use token::{Token, TokenRegistry};
pub use transaction::{
    decode_compact_u16, encode_compact_u16, CompiledInstruction, Message, MessageHeader,
    Transaction,
};
