//! Ed25519 keypair accounts.
//!
//! An [`Account`] owns its secret key exclusively; the 32-byte seed is
//! zeroized when the account is dropped.

use bip39::{Language, Mnemonic};
use ed25519_dalek::{Signer, SigningKey};
use hmac::{Hmac, Mac};
use rand::RngCore;
use sha2::Sha512;
use zeroize::Zeroize;

use crate::error::SolError;
use crate::pubkey::PublicKey;

type HmacSha512 = Hmac<Sha512>;

/// A 64-byte Ed25519 signature.
pub type Signature = [u8; 64];

/// Derivation path used to turn a seed phrase into a Solana keypair.
///
/// Ed25519 only supports hardened derivation (SLIP-0010), so every level
/// below is hardened.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DerivationPath {
    /// `m/44'/501'/{account}'/0'`, used by current wallets.
    Bip44Change { account: u32 },
    /// `m/44'/501'/{account}'`
    Bip44 { account: u32 },
}

impl DerivationPath {
    pub fn components(&self) -> Vec<u32> {
        match *self {
            DerivationPath::Bip44Change { account } => vec![44, 501, account, 0],
            DerivationPath::Bip44 { account } => vec![44, 501, account],
        }
    }

    pub fn to_path_string(&self) -> String {
        let levels: Vec<String> = self
            .components()
            .iter()
            .map(|c| format!("{c}'"))
            .collect();
        format!("m/{}", levels.join("/"))
    }
}

impl Default for DerivationPath {
    fn default() -> Self {
        DerivationPath::Bip44Change { account: 0 }
    }
}

/// A signing account: keypair plus the seed-phrase words it came from.
pub struct Account {
    phrase: Vec<String>,
    public_key: PublicKey,
    signing_key: SigningKey,
}

impl Account {
    /// Generate a fresh random keypair (no seed phrase).
    pub fn generate() -> Self {
        let mut seed = [0u8; 32];
        rand::rngs::OsRng.fill_bytes(&mut seed);
        let account = Self::from_seed(&seed, Vec::new());
        seed.zeroize();
        account
    }

    /// Import a secret key: either a 64-byte `seed || public key` keypair or
    /// a bare 32-byte seed.
    pub fn from_secret_key(secret_key: &[u8]) -> Result<Self, SolError> {
        match secret_key.len() {
            32 => {
                let mut seed = [0u8; 32];
                seed.copy_from_slice(secret_key);
                let account = Self::from_seed(&seed, Vec::new());
                seed.zeroize();
                Ok(account)
            }
            64 => {
                let mut keypair = [0u8; 64];
                keypair.copy_from_slice(secret_key);
                let signing_key = SigningKey::from_keypair_bytes(&keypair)
                    .map_err(|e| SolError::InvalidPrivateKey(e.to_string()));
                keypair.zeroize();
                let signing_key = signing_key?;
                Ok(Self {
                    phrase: Vec::new(),
                    public_key: PublicKey::new(signing_key.verifying_key().to_bytes()),
                    signing_key,
                })
            }
            n => Err(SolError::InvalidPrivateKey(format!(
                "expected 32 or 64 bytes, got {n}"
            ))),
        }
    }

    /// Restore an account from BIP-39 words at an explicit derivation path.
    pub fn from_phrase(
        phrase: &[String],
        path: DerivationPath,
    ) -> Result<Self, SolError> {
        let words: Vec<&str> = phrase
            .iter()
            .map(|w| w.trim())
            .filter(|w| !w.is_empty())
            .collect();
        let mnemonic = Mnemonic::parse_in_normalized(Language::English, &words.join(" "))
            .map_err(|e| SolError::InvalidRequest(format!("invalid seed phrase: {e}")))?;

        let mut seed = mnemonic.to_seed("");
        let derived = derive_ed25519_seed(&seed, &path.components());
        seed.zeroize();
        let mut key = derived?;

        let account = Self::from_seed(&key, words.iter().map(|w| w.to_string()).collect());
        key.zeroize();
        Ok(account)
    }

    fn from_seed(seed: &[u8; 32], phrase: Vec<String>) -> Self {
        let signing_key = SigningKey::from_bytes(seed);
        Self {
            phrase,
            public_key: PublicKey::new(signing_key.verifying_key().to_bytes()),
            signing_key,
        }
    }

    pub fn public_key(&self) -> PublicKey {
        self.public_key
    }

    /// The 64-byte `seed || public key` secret key.
    pub fn secret_key(&self) -> [u8; 64] {
        self.signing_key.to_keypair_bytes()
    }

    pub fn phrase(&self) -> &[String] {
        &self.phrase
    }

    pub fn sign(&self, message: &[u8]) -> Signature {
        self.signing_key.sign(message).to_bytes()
    }
}

impl Clone for Account {
    fn clone(&self) -> Self {
        Self {
            phrase: self.phrase.clone(),
            public_key: self.public_key,
            signing_key: self.signing_key.clone(),
        }
    }
}

impl std::fmt::Debug for Account {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Account")
            .field("public_key", &self.public_key)
            .finish_non_exhaustive()
    }
}

impl Drop for Account {
    fn drop(&mut self) {
        self.phrase.zeroize();
    }
}

/// SLIP-0010 Ed25519 derivation: every component is hardened.
fn derive_ed25519_seed(seed: &[u8], components: &[u32]) -> Result<[u8; 32], SolError> {
    let mut mac = HmacSha512::new_from_slice(b"ed25519 seed")
        .map_err(|e| SolError::InvalidPrivateKey(e.to_string()))?;
    mac.update(seed);
    let result = mac.finalize().into_bytes();

    let mut key = [0u8; 32];
    let mut chain_code = [0u8; 32];
    key.copy_from_slice(&result[..32]);
    chain_code.copy_from_slice(&result[32..]);

    for child_index in components {
        let mut mac = HmacSha512::new_from_slice(&chain_code)
            .map_err(|e| SolError::InvalidPrivateKey(e.to_string()))?;
        // Hardened child: 0x00 || key || index (with hardened bit set)
        mac.update(&[0x00]);
        mac.update(&key);
        mac.update(&(child_index | 0x8000_0000).to_be_bytes());
        let result = mac.finalize().into_bytes();

        key.copy_from_slice(&result[..32]);
        chain_code.copy_from_slice(&result[32..]);
    }

    chain_code.zeroize();
    Ok(key)
}

#[cfg(test)]
mod tests {
    use super::*;

    const TEST_MNEMONIC: &str = "abandon abandon abandon abandon abandon abandon abandon abandon abandon abandon abandon about";

    fn words(phrase: &str) -> Vec<String> {
        phrase.split_whitespace().map(String::from).collect()
    }

    #[test]
    fn derivation_path_strings() {
        assert_eq!(DerivationPath::default().to_path_string(), "m/44'/501'/0'/0'");
        assert_eq!(
            DerivationPath::Bip44 { account: 2 }.to_path_string(),
            "m/44'/501'/2'"
        );
    }

    #[test]
    fn phrase_derivation_is_deterministic() {
        let a = Account::from_phrase(&words(TEST_MNEMONIC), DerivationPath::default()).unwrap();
        let b = Account::from_phrase(&words(TEST_MNEMONIC), DerivationPath::default()).unwrap();
        assert_eq!(a.public_key(), b.public_key());
        assert_eq!(a.phrase().len(), 12);
    }

    #[test]
    fn phrase_derivation_matches_reference_wallet() {
        // Address shown by Phantom / Solflare for the BIP-39 test mnemonic.
        let account =
            Account::from_phrase(&words(TEST_MNEMONIC), DerivationPath::default()).unwrap();
        assert_eq!(
            account.public_key().to_string(),
            "HAgk14JpMQLgt6rVgv7cBQFJWFto5Dqxi472uT3DKpqk"
        );
    }

    #[test]
    fn different_paths_give_different_keys() {
        let a = Account::from_phrase(&words(TEST_MNEMONIC), DerivationPath::default()).unwrap();
        let b = Account::from_phrase(
            &words(TEST_MNEMONIC),
            DerivationPath::Bip44Change { account: 1 },
        )
        .unwrap();
        assert_ne!(a.public_key(), b.public_key());
    }

    #[test]
    fn invalid_phrase_is_rejected() {
        let result = Account::from_phrase(&words("invalid mnemonic phrase here"), DerivationPath::default());
        assert!(matches!(result, Err(SolError::InvalidRequest(_))));
    }

    #[test]
    fn secret_key_roundtrip() {
        let account = Account::generate();
        let restored = Account::from_secret_key(&account.secret_key()).unwrap();
        assert_eq!(account.public_key(), restored.public_key());
    }

    #[test]
    fn seed_import_matches_keypair_import() {
        let seed = [0x42u8; 32];
        let from_seed = Account::from_secret_key(&seed).unwrap();
        let from_keypair = Account::from_secret_key(&from_seed.secret_key()).unwrap();
        assert_eq!(from_seed.public_key(), from_keypair.public_key());
    }

    #[test]
    fn wrong_secret_key_length_fails() {
        let result = Account::from_secret_key(&[1u8; 10]);
        assert!(matches!(result, Err(SolError::InvalidPrivateKey(_))));
    }

    #[test]
    fn signatures_verify() {
        use ed25519_dalek::{Verifier, VerifyingKey};

        let account = Account::generate();
        let signature = account.sign(b"hello");
        let verifying_key = VerifyingKey::from_bytes(account.public_key().as_bytes()).unwrap();
        assert!(verifying_key
            .verify(b"hello", &ed25519_dalek::Signature::from_bytes(&signature))
            .is_ok());
    }
}
