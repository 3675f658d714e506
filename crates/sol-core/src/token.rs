//! Token metadata: symbol, name and decimals keyed by mint.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::error::SolError;
use crate::pubkey::PublicKey;

/// Native SOL has 9 decimals (1 SOL = 10^9 lamports).
pub const SOL_DECIMALS: u8 = 9;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Token {
    pub symbol: String,
    #[serde(default)]
    pub name: String,
    pub mint: PublicKey,
    pub decimals: u8,
}

impl Token {
    /// Native SOL, identified by the wrapped-SOL mint.
    pub fn native_sol() -> Self {
        Self {
            symbol: "SOL".into(),
            name: "Solana".into(),
            mint: PublicKey::WRAPPED_SOL_MINT,
            decimals: SOL_DECIMALS,
        }
    }

    /// Placeholder for a mint with no metadata: the base58 mint doubles as
    /// the symbol.
    pub fn unlisted(mint: PublicKey, decimals: u8) -> Self {
        Self {
            symbol: mint.to_base58(),
            name: String::new(),
            mint,
            decimals,
        }
    }

    pub fn is_native(&self) -> bool {
        self.mint == PublicKey::WRAPPED_SOL_MINT
    }
}

/// Preloaded token-metadata table. Always knows native SOL.
#[derive(Debug, Clone)]
pub struct TokenRegistry {
    tokens: Vec<Token>,
    by_mint: HashMap<PublicKey, usize>,
}

impl TokenRegistry {
    pub fn new(tokens: impl IntoIterator<Item = Token>) -> Self {
        let mut registry = Self {
            tokens: Vec::new(),
            by_mint: HashMap::new(),
        };
        registry.insert(Token::native_sol());
        for token in tokens {
            registry.insert(token);
        }
        registry
    }

    /// Load a table from a JSON array of `{symbol, name, mint, decimals}`.
    pub fn from_json(json: &str) -> Result<Self, SolError> {
        let tokens: Vec<Token> = serde_json::from_str(json)
            .map_err(|e| SolError::SerializationError(format!("token list: {e}")))?;
        Ok(Self::new(tokens))
    }

    /// Later entries replace earlier ones with the same mint.
    pub fn insert(&mut self, token: Token) {
        match self.by_mint.get(&token.mint) {
            Some(&index) => self.tokens[index] = token,
            None => {
                self.by_mint.insert(token.mint, self.tokens.len());
                self.tokens.push(token);
            }
        }
    }

    pub fn get(&self, mint: &PublicKey) -> Option<&Token> {
        self.by_mint.get(mint).map(|&index| &self.tokens[index])
    }

    /// First token carrying `symbol`, in insertion order.
    pub fn by_symbol(&self, symbol: &str) -> Option<&Token> {
        self.tokens.iter().find(|token| token.symbol == symbol)
    }

    /// Metadata for `mint`, or an unlisted placeholder using `decimals`.
    pub fn resolve(&self, mint: &PublicKey, decimals: Option<u8>) -> Token {
        match self.get(mint) {
            Some(token) => token.clone(),
            None => Token::unlisted(*mint, decimals.unwrap_or(0)),
        }
    }

    pub fn tokens(&self) -> &[Token] {
        &self.tokens
    }
}

impl Default for TokenRegistry {
    fn default() -> Self {
        Self::new([])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const TOKENS: &str = r#"[
        {"symbol": "USDC", "name": "USD Coin", "mint": "EPjFWdd5AufqSSqeM2qN1xzybapC8G4wEGGkZwyTDt1v", "decimals": 6},
        {"symbol": "SRM", "name": "Serum", "mint": "SRMuApVNdxXokk5GT7XD5cUUgXMBCoAz2LHeuAoKWRt", "decimals": 6}
    ]"#;

    #[test]
    fn native_sol_always_present() {
        let registry = TokenRegistry::default();
        let sol = registry.get(&PublicKey::WRAPPED_SOL_MINT).unwrap();
        assert_eq!(sol.symbol, "SOL");
        assert_eq!(sol.decimals, 9);
        assert!(sol.is_native());
    }

    #[test]
    fn loads_from_json() {
        let registry = TokenRegistry::from_json(TOKENS).unwrap();
        assert_eq!(registry.tokens().len(), 3);

        let usdc: PublicKey = "EPjFWdd5AufqSSqeM2qN1xzybapC8G4wEGGkZwyTDt1v".parse().unwrap();
        assert_eq!(registry.get(&usdc).unwrap().symbol, "USDC");
        assert_eq!(registry.by_symbol("SRM").unwrap().decimals, 6);
        assert!(registry.by_symbol("ETH").is_none());
    }

    #[test]
    fn bad_json_is_an_error() {
        assert!(matches!(
            TokenRegistry::from_json("[{\"symbol\": 1}]"),
            Err(SolError::SerializationError(_))
        ));
    }

    #[test]
    fn unlisted_mint_falls_back_to_base58_symbol() {
        let registry = TokenRegistry::default();
        let mint = PublicKey::new([7u8; 32]);
        let token = registry.resolve(&mint, Some(4));
        assert_eq!(token.symbol, mint.to_base58());
        assert_eq!(token.decimals, 4);
    }

    #[test]
    fn insert_replaces_same_mint() {
        let mut registry = TokenRegistry::default();
        let mut sol = Token::native_sol();
        sol.name = "Wrapped SOL".into();
        registry.insert(sol);
        assert_eq!(registry.tokens().len(), 1);
        assert_eq!(registry.get(&PublicKey::WRAPPED_SOL_MINT).unwrap().name, "Wrapped SOL");
    }
}
