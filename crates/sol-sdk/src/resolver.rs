//! Where SPL tokens sent to a nominal address actually land.

use sol_core::{derive_associated_token_address, PublicKey, SolError};
use tracing::debug;

use crate::rpc::SolanaRpc;

/// The token account a transfer must credit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SplTokenDestinationAddress {
    pub destination: PublicKey,
    /// The associated token account still has to be created by the sender.
    pub is_unregistered_associated_token: bool,
}

/// Resolve `destination`, which may be a token account for `mint` or a
/// wallet whose associated token account should receive the tokens.
///
/// Only [`SolError::AccountInfoNotFound`] is read as "fresh address"; every
/// other lookup failure propagates.
pub async fn find_spl_token_destination_address<R: SolanaRpc + ?Sized>(
    rpc: &R,
    mint: &PublicKey,
    destination: &PublicKey,
) -> Result<SplTokenDestinationAddress, SolError> {
    let info = match rpc.get_account_info(destination).await {
        Ok(info) => info,
        Err(SolError::AccountInfoNotFound) => {
            debug!(%destination, "destination not found, using fresh associated account");
            return Ok(SplTokenDestinationAddress {
                destination: derive_associated_token_address(destination, mint)?,
                is_unregistered_associated_token: true,
            });
        }
        Err(e) => return Err(e),
    };

    if info
        .data
        .as_token_account()
        .is_some_and(|account| account.mint == *mint)
    {
        return Ok(SplTokenDestinationAddress {
            destination: *destination,
            is_unregistered_associated_token: false,
        });
    }

    if info.owner != PublicKey::SYSTEM_PROGRAM_ID {
        return Err(SolError::InvalidDestination);
    }

    let associated = derive_associated_token_address(destination, mint)?;
    let registered = match rpc.get_account_info(&associated).await {
        Ok(info) => info.owner == PublicKey::TOKEN_PROGRAM_ID,
        Err(SolError::AccountInfoNotFound) => false,
        Err(e) => return Err(e),
    };
    debug!(%destination, %associated, registered, "resolved wallet destination");

    Ok(SplTokenDestinationAddress {
        destination: associated,
        is_unregistered_associated_token: !registered,
    })
}
