//! Program Derived Address (PDA) and associated token account derivation.
//!
//! A PDA is `SHA-256(seed_0 || ... || seed_n || bump || program_id ||
//! "ProgramDerivedAddress")`, accepted only if the result is NOT a valid
//! Ed25519 point, so no private key can ever sign for it.

use sha2::{Digest, Sha256};

use crate::error::SolError;
use crate::pubkey::PublicKey;

/// The string appended to PDA derivation: "ProgramDerivedAddress".
const PDA_MARKER: &[u8] = b"ProgramDerivedAddress";

pub const MAX_SEEDS: usize = 16;
pub const MAX_SEED_LEN: usize = 32;

/// Find a valid PDA for the given seeds and program.
///
/// Iterates bump seeds from 255 down to 0 and returns the first address
/// that falls off the curve, together with the bump that produced it.
pub fn find_program_address(
    seeds: &[&[u8]],
    program_id: &PublicKey,
) -> Result<(PublicKey, u8), SolError> {
    check_seeds(seeds, 1)?;

    for bump in (0u8..=255).rev() {
        if let Some(address) = try_create_program_address(seeds, &[bump], program_id) {
            return Ok((address, bump));
        }
    }

    Err(SolError::NoValidAddress)
}

/// Create a PDA from seeds that already include the bump.
///
/// Fails with [`SolError::NoValidAddress`] if the hash lands on the curve.
pub fn create_program_address(
    seeds: &[&[u8]],
    program_id: &PublicKey,
) -> Result<PublicKey, SolError> {
    check_seeds(seeds, 0)?;
    try_create_program_address(seeds, &[], program_id).ok_or(SolError::NoValidAddress)
}

/// Derive the associated token account address for a wallet + mint pair.
///
/// Seeds: `[wallet, token_program_id, mint]` under the Associated Token
/// Account program. Anyone can recompute this and must get the same bytes.
pub fn derive_associated_token_address(
    wallet: &PublicKey,
    mint: &PublicKey,
) -> Result<PublicKey, SolError> {
    find_program_address(
        &[
            wallet.as_ref(),
            PublicKey::TOKEN_PROGRAM_ID.as_ref(),
            mint.as_ref(),
        ],
        &PublicKey::ASSOCIATED_TOKEN_PROGRAM_ID,
    )
    .map(|(address, _bump)| address)
}

fn check_seeds(seeds: &[&[u8]], reserved: usize) -> Result<(), SolError> {
    if seeds.len() + reserved > MAX_SEEDS {
        return Err(SolError::InvalidRequest(format!(
            "at most {MAX_SEEDS} seeds are allowed"
        )));
    }
    if let Some(seed) = seeds.iter().find(|s| s.len() > MAX_SEED_LEN) {
        return Err(SolError::InvalidRequest(format!(
            "seed of {} bytes exceeds {MAX_SEED_LEN}",
            seed.len()
        )));
    }
    Ok(())
}

/// Returns `Some(address)` if the derived point is OFF the Ed25519 curve,
/// `None` if it falls on the curve.
fn try_create_program_address(
    seeds: &[&[u8]],
    bump_seed: &[u8],
    program_id: &PublicKey,
) -> Option<PublicKey> {
    let mut hasher = Sha256::new();

    for seed in seeds {
        hasher.update(seed);
    }
    hasher.update(bump_seed);
    hasher.update(program_id);
    hasher.update(PDA_MARKER);

    let hash: [u8; 32] = hasher.finalize().into();
    let address = PublicKey::new(hash);

    if address.is_on_curve() {
        return None;
    }

    Some(address)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn key(s: &str) -> PublicKey {
        s.parse().unwrap()
    }

    #[test]
    fn ata_matches_reference_value() {
        // Reference pair published in the Solana developer docs.
        let wallet = key("9WzDXwBbmkg8ZTbNMqUxvQRAyrZzDsGYdLVL9zYtAWWM");
        let usdc = key("EPjFWdd5AufqSSqeM2qN1xzybapC8G4wEGGkZwyTDt1v");

        let ata = derive_associated_token_address(&wallet, &usdc).unwrap();
        assert_eq!(ata.to_string(), "FGETo8T8wMcN2wCjav8VK6eh3dLk63evNDPxzLSJra8B");
    }

    #[test]
    fn ata_with_first_bump() {
        let wallet = key("6QuXb6mB6WmRASP2y8AavXh6aabBXEH5ZzrSH5xRrgSm");
        let usdc = key("EPjFWdd5AufqSSqeM2qN1xzybapC8G4wEGGkZwyTDt1v");

        let ata = derive_associated_token_address(&wallet, &usdc).unwrap();
        assert_eq!(ata.to_string(), "9GQV3bQP9tv7m6XgGMaixxEeEdxtFhwgABw2cxCFZoch");
    }

    #[test]
    fn ata_derivation_is_deterministic() {
        let wallet = PublicKey::new([0x11u8; 32]);
        let mint = PublicKey::new([0x22u8; 32]);

        let a = derive_associated_token_address(&wallet, &mint).unwrap();
        let b = derive_associated_token_address(&wallet, &mint).unwrap();
        assert_eq!(a, b);
        assert!(!a.is_on_curve(), "PDA must NOT be on the Ed25519 curve");
    }

    #[test]
    fn different_wallets_give_different_atas() {
        let mint = PublicKey::new([0xFFu8; 32]);
        let a = derive_associated_token_address(&PublicKey::new([0x01; 32]), &mint).unwrap();
        let b = derive_associated_token_address(&PublicKey::new([0x02; 32]), &mint).unwrap();
        assert_ne!(a, b);
    }

    #[test]
    fn find_program_address_skips_on_curve_bumps() {
        let (address, bump) =
            find_program_address(&[&b"vault"[..], &[2u8]], &PublicKey::TOKEN_PROGRAM_ID).unwrap();
        assert_eq!(bump, 253);
        assert_eq!(address.to_string(), "3Njy4P9arS6c86amNTwnMihwtc2e2N5tjiu9rCA7DJHd");
    }

    #[test]
    fn create_program_address_with_found_bump_agrees() {
        let (address, bump) =
            find_program_address(&[&b"metadata"[..]], &PublicKey::TOKEN_PROGRAM_ID).unwrap();
        let recreated =
            create_program_address(&[&b"metadata"[..], &[bump]], &PublicKey::TOKEN_PROGRAM_ID).unwrap();
        assert_eq!(address, recreated);
        assert_eq!(address.to_string(), "3ijiZDfPJaxmakuhGZj8MYAVxxxmtprvF7mR85XJMmd6");
    }

    #[test]
    fn on_curve_bump_is_rejected() {
        // Bump 255 and 254 for these seeds land on the curve.
        let result = create_program_address(&[&b"vault"[..], &[2u8], &[255u8]], &PublicKey::TOKEN_PROGRAM_ID);
        assert!(matches!(result, Err(SolError::NoValidAddress)));
    }

    #[test]
    fn oversized_seed_is_rejected() {
        let long = [0u8; 33];
        let result = find_program_address(&[&long[..]], &PublicKey::TOKEN_PROGRAM_ID);
        assert!(matches!(result, Err(SolError::InvalidRequest(_))));
    }

    #[test]
    fn too_many_seeds_is_rejected() {
        let seeds: Vec<&[u8]> = vec![&b"a"[..]; MAX_SEEDS];
        let result = find_program_address(&seeds, &PublicKey::TOKEN_PROGRAM_ID);
        assert!(matches!(result, Err(SolError::InvalidRequest(_))));
    }
}
