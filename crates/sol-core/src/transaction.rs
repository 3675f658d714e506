//! Solana transaction wire format, account compaction and signing.
//!
//! We build Solana transactions entirely by hand, no `solana-sdk`
//! dependency. The wire format is a compact binary layout:
//!
//! ```text
//! Transaction:
//!   num_signatures          compact-u16
//!   signatures              64 bytes * num_signatures
//!   message:
//!     num_required_sigs     u8
//!     num_readonly_signed   u8
//!     num_readonly_unsigned u8
//!     num_accounts          compact-u16
//!     account_keys          32 bytes * num_accounts
//!     recent_blockhash      32 bytes
//!     num_instructions      compact-u16
//!     instructions[]        (see below)
//!
//! Instruction:
//!   program_id_index        u8
//!   num_accounts            compact-u16
//!   account_indices         u8 * num_accounts
//!   data_len                compact-u16
//!   data                    u8 * data_len
//! ```

use std::collections::BTreeMap;

use base64::Engine;
use ed25519_dalek::{Verifier, VerifyingKey};

use crate::account::{Account, Signature};
use crate::error::SolError;
use crate::instructions::Instruction;
use crate::pubkey::PublicKey;

/// Account keys are addressed by `u8` indices.
const MAX_ACCOUNTS: usize = 256;

// ---------------------------------------------------------------------------
// Compact-u16 encoding
// ---------------------------------------------------------------------------

/// Encode a `u16` value in Solana's compact-u16 format.
///
/// - Values 0..0x7f       -> 1 byte
/// - Values 0x80..0x3fff  -> 2 bytes
/// - Values 0x4000..      -> 3 bytes
pub fn encode_compact_u16(value: u16) -> Vec<u8> {
    let mut val = value as u32;
    let mut out = Vec::with_capacity(3);

    loop {
        let mut byte = (val & 0x7f) as u8;
        val >>= 7;
        if val > 0 {
            byte |= 0x80;
        }
        out.push(byte);
        if val == 0 {
            break;
        }
    }

    out
}

/// Decode a compact-u16 value from a byte slice.
///
/// Returns `(value, bytes_consumed)`, or an error if the data is truncated
/// or the value is not in its shortest encoding.
pub fn decode_compact_u16(data: &[u8]) -> Result<(u16, usize), SolError> {
    let mut value: u32 = 0;
    let mut consumed = 0usize;

    loop {
        let byte = *data.get(consumed).ok_or_else(|| {
            SolError::SerializationError(
                "unexpected end of data while decoding compact-u16".into(),
            )
        })?;
        // A zero continuation byte means a shorter encoding existed.
        if consumed > 0 && byte == 0 {
            return Err(SolError::SerializationError(
                "non-canonical compact-u16".into(),
            ));
        }
        if consumed == 2 && byte & 0x80 != 0 {
            return Err(SolError::SerializationError(
                "compact-u16 longer than 3 bytes".into(),
            ));
        }
        value |= ((byte & 0x7f) as u32) << (7 * consumed);
        consumed += 1;

        if byte & 0x80 == 0 {
            break;
        }
    }

    if value > u16::MAX as u32 {
        return Err(SolError::SerializationError(
            "compact-u16 value overflow".into(),
        ));
    }

    Ok((value as u16, consumed))
}

fn push_compact_len(buf: &mut Vec<u8>, len: usize) -> Result<(), SolError> {
    let len = u16::try_from(len).map_err(|_| {
        SolError::SerializationError(format!("length {len} does not fit in compact-u16"))
    })?;
    buf.extend_from_slice(&encode_compact_u16(len));
    Ok(())
}

// ---------------------------------------------------------------------------
// Message
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MessageHeader {
    /// Number of required signatures (first N accounts are signers).
    pub num_required_signatures: u8,
    /// How many of the signing accounts are read-only.
    pub num_readonly_signed_accounts: u8,
    /// How many of the non-signing accounts are read-only.
    pub num_readonly_unsigned_accounts: u8,
}

/// A compiled instruction where account references are replaced by u8 indices
/// into the message's `account_keys` array.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompiledInstruction {
    pub program_id_index: u8,
    pub account_indices: Vec<u8>,
    pub data: Vec<u8>,
}

/// The signable part of a transaction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Message {
    pub header: MessageHeader,
    /// All account keys referenced by this message, in canonical order:
    ///   1. fee payer
    ///   2. writable signers
    ///   3. read-only signers
    ///   4. writable non-signers
    ///   5. read-only non-signers (program ids included)
    pub account_keys: Vec<PublicKey>,
    pub recent_blockhash: [u8; 32],
    pub instructions: Vec<CompiledInstruction>,
}

impl Message {
    /// Compact the account universe of `instructions` and compile them
    /// against it.
    pub fn compile(
        fee_payer: &PublicKey,
        instructions: &[Instruction],
        recent_blockhash: &str,
    ) -> Result<Self, SolError> {
        if instructions.is_empty() {
            return Err(SolError::InvalidRequest("no instructions provided".into()));
        }
        let recent_blockhash = decode_blockhash(recent_blockhash)?;

        struct AccountEntry {
            pubkey: PublicKey,
            is_signer: bool,
            is_writable: bool,
        }

        // Instruction account lists are tiny, a linear scan beats hashing.
        let mut entries: Vec<AccountEntry> = Vec::new();
        let mut upsert = |pubkey: PublicKey, signer: bool, writable: bool| {
            if let Some(entry) = entries.iter_mut().find(|e| e.pubkey == pubkey) {
                entry.is_signer |= signer;
                entry.is_writable |= writable;
            } else {
                entries.push(AccountEntry {
                    pubkey,
                    is_signer: signer,
                    is_writable: writable,
                });
            }
        };

        // Fee payer is always signer + writable, and inserted first.
        upsert(*fee_payer, true, true);
        for ix in instructions {
            for meta in &ix.accounts {
                upsert(meta.public_key, meta.is_signer, meta.is_writable);
            }
        }
        for ix in instructions {
            upsert(ix.program_id, false, false);
        }

        // Stable sort keeps first-seen order inside each category.
        entries.sort_by_key(|e| match (e.is_signer, e.is_writable) {
            (true, true) => 0u8,
            (true, false) => 1,
            (false, true) => 2,
            (false, false) => 3,
        });

        if entries.len() > MAX_ACCOUNTS {
            return Err(SolError::InvalidRequest(format!(
                "transaction references {} accounts, at most {MAX_ACCOUNTS} allowed",
                entries.len()
            )));
        }

        let count = |what: &str, f: fn(&AccountEntry) -> bool| -> Result<u8, SolError> {
            let n = entries.iter().filter(|e| f(e)).count();
            u8::try_from(n).map_err(|_| {
                SolError::InvalidRequest(format!("{n} {what}, at most {} allowed", u8::MAX))
            })
        };
        let header = MessageHeader {
            num_required_signatures: count("signers", |e| e.is_signer)?,
            num_readonly_signed_accounts: count("read-only signers", |e| {
                e.is_signer && !e.is_writable
            })?,
            num_readonly_unsigned_accounts: count("read-only accounts", |e| {
                !e.is_signer && !e.is_writable
            })?,
        };

        let account_keys: Vec<PublicKey> = entries.iter().map(|e| e.pubkey).collect();
        let index_of = |key: &PublicKey| -> Result<u8, SolError> {
            account_keys
                .iter()
                .position(|k| k == key)
                .map(|i| i as u8)
                .ok_or_else(|| SolError::InvalidRequest(format!("{key} not in account keys")))
        };

        let compiled = instructions
            .iter()
            .map(|ix| {
                Ok(CompiledInstruction {
                    program_id_index: index_of(&ix.program_id)?,
                    account_indices: ix
                        .accounts
                        .iter()
                        .map(|meta| index_of(&meta.public_key))
                        .collect::<Result<_, SolError>>()?,
                    data: ix.data.clone(),
                })
            })
            .collect::<Result<Vec<_>, SolError>>()?;

        Ok(Self {
            header,
            account_keys,
            recent_blockhash,
            instructions: compiled,
        })
    }

    /// Serialize the message (the bytes that get signed).
    pub fn serialize(&self) -> Result<Vec<u8>, SolError> {
        let mut buf = Vec::with_capacity(256);

        buf.push(self.header.num_required_signatures);
        buf.push(self.header.num_readonly_signed_accounts);
        buf.push(self.header.num_readonly_unsigned_accounts);

        push_compact_len(&mut buf, self.account_keys.len())?;
        for key in &self.account_keys {
            buf.extend_from_slice(key.as_bytes());
        }

        buf.extend_from_slice(&self.recent_blockhash);

        push_compact_len(&mut buf, self.instructions.len())?;
        for ix in &self.instructions {
            buf.push(ix.program_id_index);
            push_compact_len(&mut buf, ix.account_indices.len())?;
            buf.extend_from_slice(&ix.account_indices);
            push_compact_len(&mut buf, ix.data.len())?;
            buf.extend_from_slice(&ix.data);
        }

        Ok(buf)
    }

    /// Parse serialized message bytes back into a [`Message`].
    pub fn deserialize(bytes: &[u8]) -> Result<Self, SolError> {
        let mut reader = Reader::new(bytes);

        let header = MessageHeader {
            num_required_signatures: reader.u8()?,
            num_readonly_signed_accounts: reader.u8()?,
            num_readonly_unsigned_accounts: reader.u8()?,
        };

        let num_accounts = reader.compact_u16()?;
        let mut account_keys = Vec::with_capacity(num_accounts as usize);
        for _ in 0..num_accounts {
            account_keys.push(PublicKey::from_slice(reader.take(32)?)?);
        }

        let mut recent_blockhash = [0u8; 32];
        recent_blockhash.copy_from_slice(reader.take(32)?);

        let num_instructions = reader.compact_u16()?;
        let mut instructions = Vec::with_capacity(num_instructions as usize);
        for _ in 0..num_instructions {
            let program_id_index = reader.u8()?;
            let n = reader.compact_u16()? as usize;
            let account_indices = reader.take(n)?.to_vec();
            let n = reader.compact_u16()? as usize;
            let data = reader.take(n)?.to_vec();
            instructions.push(CompiledInstruction {
                program_id_index,
                account_indices,
                data,
            });
        }

        if !reader.is_empty() {
            return Err(SolError::SerializationError(
                "trailing bytes after message".into(),
            ));
        }

        let message = Self {
            header,
            account_keys,
            recent_blockhash,
            instructions,
        };
        message.sanitize()?;
        Ok(message)
    }

    /// Check that the header and every instruction index fit the account
    /// list, the way a node does before accepting a message.
    pub fn sanitize(&self) -> Result<(), SolError> {
        let invalid = |reason: String| Err(SolError::SerializationError(reason));
        let h = &self.header;
        let keys = self.account_keys.len();
        let signers = h.num_required_signatures as usize;

        if signers == 0 {
            return invalid("message requires no signatures".into());
        }
        if h.num_readonly_signed_accounts >= h.num_required_signatures {
            return invalid(format!(
                "{} read-only signers out of {signers} signers leaves no fee payer",
                h.num_readonly_signed_accounts
            ));
        }
        if signers + h.num_readonly_unsigned_accounts as usize > keys {
            return invalid(format!(
                "header counts {signers} signers and {} read-only accounts but only {keys} keys",
                h.num_readonly_unsigned_accounts
            ));
        }
        for (i, ix) in self.instructions.iter().enumerate() {
            let out_of_range = std::iter::once(&ix.program_id_index)
                .chain(&ix.account_indices)
                .find(|&&index| index as usize >= keys);
            if let Some(index) = out_of_range {
                return invalid(format!(
                    "instruction {i} references account {index} of {keys}"
                ));
            }
        }
        Ok(())
    }

    /// Keys whose signatures the message requires, in signature order.
    pub fn signer_keys(&self) -> &[PublicKey] {
        let n = (self.header.num_required_signatures as usize).min(self.account_keys.len());
        &self.account_keys[..n]
    }

    pub fn is_signer(&self, index: usize) -> bool {
        index < self.header.num_required_signatures as usize
    }

    pub fn is_writable(&self, index: usize) -> bool {
        let h = &self.header;
        let signers = h.num_required_signatures as usize;
        if index < signers {
            index < signers.saturating_sub(h.num_readonly_signed_accounts as usize)
        } else {
            index
                < self
                    .account_keys
                    .len()
                    .saturating_sub(h.num_readonly_unsigned_accounts as usize)
        }
    }
}

fn decode_blockhash(blockhash: &str) -> Result<[u8; 32], SolError> {
    let bytes = bs58::decode(blockhash)
        .into_vec()
        .map_err(|e| SolError::InvalidRequest(format!("invalid recent blockhash: {e}")))?;
    bytes.try_into().map_err(|v: Vec<u8>| {
        SolError::InvalidRequest(format!(
            "invalid recent blockhash: expected 32 bytes, got {}",
            v.len()
        ))
    })
}

struct Reader<'a> {
    data: &'a [u8],
    pos: usize,
}

impl<'a> Reader<'a> {
    fn new(data: &'a [u8]) -> Self {
        Self { data, pos: 0 }
    }

    fn take(&mut self, n: usize) -> Result<&'a [u8], SolError> {
        let end = self.pos.checked_add(n).filter(|end| *end <= self.data.len());
        let end = end.ok_or_else(|| {
            SolError::SerializationError("message truncated".into())
        })?;
        let slice = &self.data[self.pos..end];
        self.pos = end;
        Ok(slice)
    }

    fn u8(&mut self) -> Result<u8, SolError> {
        Ok(self.take(1)?[0])
    }

    fn compact_u16(&mut self) -> Result<u16, SolError> {
        let (value, consumed) = decode_compact_u16(&self.data[self.pos..])?;
        self.pos += consumed;
        Ok(value)
    }

    fn is_empty(&self) -> bool {
        self.pos == self.data.len()
    }
}

// ---------------------------------------------------------------------------
// Transaction
// ---------------------------------------------------------------------------

/// A transaction under construction: instructions plus the signatures
/// collected so far.
///
/// Signatures are bound to the exact serialized message, so any mutation of
/// the instructions, fee payer or blockhash drops them.
#[derive(Debug, Clone)]
pub struct Transaction {
    fee_payer: PublicKey,
    recent_blockhash: String,
    instructions: Vec<Instruction>,
    signatures: BTreeMap<PublicKey, Signature>,
}

impl Transaction {
    pub fn new(
        fee_payer: PublicKey,
        instructions: Vec<Instruction>,
        recent_blockhash: impl Into<String>,
    ) -> Self {
        Self {
            fee_payer,
            recent_blockhash: recent_blockhash.into(),
            instructions,
            signatures: BTreeMap::new(),
        }
    }

    pub fn fee_payer(&self) -> &PublicKey {
        &self.fee_payer
    }

    pub fn recent_blockhash(&self) -> &str {
        &self.recent_blockhash
    }

    pub fn instructions(&self) -> &[Instruction] {
        &self.instructions
    }

    pub fn add_instruction(&mut self, instruction: Instruction) {
        self.instructions.push(instruction);
        self.signatures.clear();
    }

    pub fn set_recent_blockhash(&mut self, recent_blockhash: impl Into<String>) {
        self.recent_blockhash = recent_blockhash.into();
        self.signatures.clear();
    }

    pub fn set_fee_payer(&mut self, fee_payer: PublicKey) {
        self.fee_payer = fee_payer;
        self.signatures.clear();
    }

    pub fn compile_message(&self) -> Result<Message, SolError> {
        Message::compile(&self.fee_payer, &self.instructions, &self.recent_blockhash)
    }

    pub fn serialize_message(&self) -> Result<Vec<u8>, SolError> {
        self.compile_message()?.serialize()
    }

    /// Replace all signatures with fresh ones from `signers`.
    pub fn sign(&mut self, signers: &[&Account]) -> Result<(), SolError> {
        self.signatures.clear();
        self.partial_sign(signers)
    }

    /// Add signatures from `signers`, keeping the ones already collected.
    ///
    /// The message is serialized once and every signer signs those bytes.
    pub fn partial_sign(&mut self, signers: &[&Account]) -> Result<(), SolError> {
        let message = self.compile_message()?;
        let message_bytes = message.serialize()?;

        let mut signed = Vec::with_capacity(signers.len());
        for signer in signers {
            let public_key = signer.public_key();
            if !message.signer_keys().contains(&public_key) {
                return Err(SolError::InvalidRequest(format!(
                    "{public_key} is not a required signer of this transaction"
                )));
            }
            signed.push((public_key, signer.sign(&message_bytes)));
        }

        self.signatures.extend(signed);
        Ok(())
    }

    /// Attach a signature produced elsewhere (e.g. by a fee payer service),
    /// after verifying it against the current message.
    pub fn add_signature(
        &mut self,
        public_key: PublicKey,
        signature: Signature,
    ) -> Result<(), SolError> {
        let message = self.compile_message()?;
        if !message.signer_keys().contains(&public_key) {
            return Err(SolError::InvalidRequest(format!(
                "{public_key} is not a required signer of this transaction"
            )));
        }

        let verifying_key = VerifyingKey::from_bytes(public_key.as_bytes())
            .map_err(|e| SolError::InvalidAddress(e.to_string()))?;
        verifying_key
            .verify(
                &message.serialize()?,
                &ed25519_dalek::Signature::from_bytes(&signature),
            )
            .map_err(|_| SolError::InvalidRequest("signature does not match message".into()))?;

        self.signatures.insert(public_key, signature);
        Ok(())
    }

    pub fn find_signature(&self, public_key: &PublicKey) -> Result<&Signature, SolError> {
        self.signatures
            .get(public_key)
            .ok_or(SolError::SignatureNotFound)
    }

    /// Serialize the signed transaction into its wire format.
    pub fn serialize(&self) -> Result<Vec<u8>, SolError> {
        let message = self.compile_message()?;
        let message_bytes = message.serialize()?;
        let signer_keys = message.signer_keys();

        let mut wire = Vec::with_capacity(3 + 64 * signer_keys.len() + message_bytes.len());
        push_compact_len(&mut wire, signer_keys.len())?;
        for key in signer_keys {
            let signature = self
                .signatures
                .get(key)
                .ok_or(SolError::IncompleteSignatures)?;
            wire.extend_from_slice(signature);
        }
        wire.extend_from_slice(&message_bytes);

        Ok(wire)
    }

    pub fn serialize_base64(&self) -> Result<String, SolError> {
        Ok(base64::engine::general_purpose::STANDARD.encode(self.serialize()?))
    }

    pub fn serialize_base58(&self) -> Result<String, SolError> {
        Ok(bs58::encode(self.serialize()?).into_string())
    }
}
