use thiserror::Error;

/// Errors surfaced by the Solana client core and the SDK layered on top of it.
#[derive(Debug, Error)]
pub enum SolError {
    #[error("unauthorized: no active account")]
    Unauthorized,

    #[error("invalid request: {0}")]
    InvalidRequest(String),

    #[error("invalid response ({code}): {message}")]
    InvalidResponse { code: i64, message: String },

    #[error("account info not found")]
    AccountInfoNotFound,

    #[error("could not find a valid program address")]
    NoValidAddress,

    #[error("signature not found")]
    SignatureNotFound,

    #[error("transaction is missing required signatures")]
    IncompleteSignatures,

    #[error("invalid destination: wallet address is not valid")]
    InvalidDestination,

    #[error("invalid address: {0}")]
    InvalidAddress(String),

    #[error("invalid private key: {0}")]
    InvalidPrivateKey(String),

    #[error("serialization error: {0}")]
    SerializationError(String),

    #[error("unknown error")]
    Unknown,
}

impl SolError {
    /// Whether this error means the looked-up account simply does not exist yet.
    pub fn is_account_not_found(&self) -> bool {
        matches!(self, SolError::AccountInfoNotFound)
    }
}
