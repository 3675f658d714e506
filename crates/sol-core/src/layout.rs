//! Binary layouts of on-chain account data.
//!
//! Account buffers are decoded through [`AccountLayout::decode`], which picks
//! the variant from the owning program and the buffer length. Each variant
//! owns its exact byte layout and its decode/encode pair.

use crate::error::SolError;
use crate::pubkey::PublicKey;

/// SPL token account state.
///
/// ```text
/// mint              32
/// owner             32
/// amount            u64
/// delegate          COption<Pubkey>   4 + 32
/// state             u8
/// is_native         COption<u64>      4 + 8
/// delegated_amount  u64
/// close_authority   COption<Pubkey>   4 + 32
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TokenAccount {
    pub mint: PublicKey,
    pub owner: PublicKey,
    pub amount: u64,
    pub delegate: Option<PublicKey>,
    pub state: TokenAccountState,
    /// Rent-exempt reserve of a wrapped-SOL account.
    pub is_native: Option<u64>,
    pub delegated_amount: u64,
    pub close_authority: Option<PublicKey>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenAccountState {
    Uninitialized = 0,
    Initialized = 1,
    Frozen = 2,
}

impl TokenAccount {
    pub const LEN: usize = 165;

    pub fn decode(data: &[u8]) -> Result<Self, SolError> {
        if data.len() != Self::LEN {
            return Err(length_mismatch("token account", Self::LEN, data.len()));
        }
        let mut cursor = Cursor::new(data);

        let mint = cursor.pubkey()?;
        let owner = cursor.pubkey()?;
        let amount = cursor.u64()?;
        let delegate = cursor.option_pubkey()?;
        let state = match cursor.u8()? {
            0 => TokenAccountState::Uninitialized,
            1 => TokenAccountState::Initialized,
            2 => TokenAccountState::Frozen,
            other => {
                return Err(SolError::SerializationError(format!(
                    "invalid token account state {other}"
                )))
            }
        };
        let is_native = cursor.option_u64()?;
        let delegated_amount = cursor.u64()?;
        let close_authority = cursor.option_pubkey()?;

        Ok(Self {
            mint,
            owner,
            amount,
            delegate,
            state,
            is_native,
            delegated_amount,
            close_authority,
        })
    }

    pub fn encode(&self) -> Vec<u8> {
        let mut buf = Vec::with_capacity(Self::LEN);
        buf.extend_from_slice(self.mint.as_bytes());
        buf.extend_from_slice(self.owner.as_bytes());
        buf.extend_from_slice(&self.amount.to_le_bytes());
        put_option_pubkey(&mut buf, self.delegate.as_ref());
        buf.push(self.state as u8);
        match self.is_native {
            Some(reserve) => {
                buf.extend_from_slice(&1u32.to_le_bytes());
                buf.extend_from_slice(&reserve.to_le_bytes());
            }
            None => buf.extend_from_slice(&[0u8; 12]),
        }
        buf.extend_from_slice(&self.delegated_amount.to_le_bytes());
        put_option_pubkey(&mut buf, self.close_authority.as_ref());
        buf
    }
}

/// SPL mint state.
///
/// ```text
/// mint_authority    COption<Pubkey>   4 + 32
/// supply            u64
/// decimals          u8
/// is_initialized    bool
/// freeze_authority  COption<Pubkey>   4 + 32
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Mint {
    pub mint_authority: Option<PublicKey>,
    pub supply: u64,
    pub decimals: u8,
    pub is_initialized: bool,
    pub freeze_authority: Option<PublicKey>,
}

impl Mint {
    pub const LEN: usize = 82;

    pub fn decode(data: &[u8]) -> Result<Self, SolError> {
        if data.len() != Self::LEN {
            return Err(length_mismatch("mint", Self::LEN, data.len()));
        }
        let mut cursor = Cursor::new(data);

        let mint_authority = cursor.option_pubkey()?;
        let supply = cursor.u64()?;
        let decimals = cursor.u8()?;
        let is_initialized = match cursor.u8()? {
            0 => false,
            1 => true,
            other => {
                return Err(SolError::SerializationError(format!(
                    "invalid bool byte {other}"
                )))
            }
        };
        let freeze_authority = cursor.option_pubkey()?;

        Ok(Self {
            mint_authority,
            supply,
            decimals,
            is_initialized,
            freeze_authority,
        })
    }

    pub fn encode(&self) -> Vec<u8> {
        let mut buf = Vec::with_capacity(Self::LEN);
        put_option_pubkey(&mut buf, self.mint_authority.as_ref());
        buf.extend_from_slice(&self.supply.to_le_bytes());
        buf.push(self.decimals);
        buf.push(self.is_initialized as u8);
        put_option_pubkey(&mut buf, self.freeze_authority.as_ref());
        buf
    }
}

/// Decoded account data.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AccountLayout {
    TokenAccount(TokenAccount),
    Mint(Mint),
    Empty,
    /// Data of a program this crate has no layout for.
    Raw(Vec<u8>),
}

impl AccountLayout {
    /// Decode `data` according to the program that owns the account.
    pub fn decode(owner: &PublicKey, data: &[u8]) -> Result<Self, SolError> {
        if data.is_empty() {
            return Ok(Self::Empty);
        }
        if *owner == PublicKey::TOKEN_PROGRAM_ID {
            return match data.len() {
                TokenAccount::LEN => TokenAccount::decode(data).map(Self::TokenAccount),
                Mint::LEN => Mint::decode(data).map(Self::Mint),
                _ => Ok(Self::Raw(data.to_vec())),
            };
        }
        Ok(Self::Raw(data.to_vec()))
    }

    pub fn encode(&self) -> Vec<u8> {
        match self {
            Self::TokenAccount(account) => account.encode(),
            Self::Mint(mint) => mint.encode(),
            Self::Empty => Vec::new(),
            Self::Raw(data) => data.clone(),
        }
    }

    pub fn as_token_account(&self) -> Option<&TokenAccount> {
        match self {
            Self::TokenAccount(account) => Some(account),
            _ => None,
        }
    }
}

fn length_mismatch(what: &str, expected: usize, got: usize) -> SolError {
    SolError::SerializationError(format!("{what} data must be {expected} bytes, got {got}"))
}

fn put_option_pubkey(buf: &mut Vec<u8>, value: Option<&PublicKey>) {
    match value {
        Some(key) => {
            buf.extend_from_slice(&1u32.to_le_bytes());
            buf.extend_from_slice(key.as_bytes());
        }
        None => buf.extend_from_slice(&[0u8; 36]),
    }
}

struct Cursor<'a> {
    data: &'a [u8],
    pos: usize,
}

impl<'a> Cursor<'a> {
    fn new(data: &'a [u8]) -> Self {
        Self { data, pos: 0 }
    }

    fn take<const N: usize>(&mut self) -> Result<[u8; N], SolError> {
        let bytes = self
            .data
            .get(self.pos..self.pos + N)
            .ok_or_else(|| SolError::SerializationError("account data truncated".into()))?;
        self.pos += N;
        let mut out = [0u8; N];
        out.copy_from_slice(bytes);
        Ok(out)
    }

    fn u8(&mut self) -> Result<u8, SolError> {
        Ok(self.take::<1>()?[0])
    }

    fn u64(&mut self) -> Result<u64, SolError> {
        Ok(u64::from_le_bytes(self.take()?))
    }

    fn pubkey(&mut self) -> Result<PublicKey, SolError> {
        Ok(PublicKey::new(self.take()?))
    }

    fn tag(&mut self) -> Result<bool, SolError> {
        match u32::from_le_bytes(self.take()?) {
            0 => Ok(false),
            1 => Ok(true),
            other => Err(SolError::SerializationError(format!(
                "invalid COption tag {other}"
            ))),
        }
    }

    fn option_pubkey(&mut self) -> Result<Option<PublicKey>, SolError> {
        let present = self.tag()?;
        let key = self.pubkey()?;
        Ok(present.then_some(key))
    }

    fn option_u64(&mut self) -> Result<Option<u64>, SolError> {
        let present = self.tag()?;
        let value = self.u64()?;
        Ok(present.then_some(value))
    }
}
