use serde::Serialize;

use super::decode::DecodedInstruction;
use crate::pubkey::PublicKey;
use crate::token::Token;

/// A token-holding account as seen by the classifier.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Wallet {
    pub pubkey: PublicKey,
    /// Wallet that controls the account. For native SOL this is `pubkey`.
    pub owner: Option<PublicKey>,
    pub token: Token,
}

impl Wallet {
    fn belongs_to(&self, account: &PublicKey) -> bool {
        self.pubkey == *account || self.owner.as_ref() == Some(account)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum ParsedTransaction {
    Transfer(TransferTransaction),
    CreateAccount(CreateAccountTransaction),
    CloseAccount(CloseAccountTransaction),
    Swap(SwapTransaction),
    Unknown(UnknownTransaction),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum TransferDirection {
    Send,
    Receive,
    Unrelated,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TransferTransaction {
    pub source: Wallet,
    pub destination: Wallet,
    pub amount: f64,
}

impl TransferTransaction {
    /// Direction relative to `my_account`, which may be either the token
    /// account itself or the wallet that owns it.
    pub fn direction(&self, my_account: &PublicKey) -> TransferDirection {
        if self.source.belongs_to(my_account) {
            TransferDirection::Send
        } else if self.destination.belongs_to(my_account) {
            TransferDirection::Receive
        } else {
            TransferDirection::Unrelated
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateAccountTransaction {
    /// Lamports spent by the fee payer, in SOL.
    pub fee: f64,
    pub new_wallet: Wallet,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CloseAccountTransaction {
    /// SOL released to the close destination.
    pub reimbursed_amount: f64,
    pub closed_wallet: Wallet,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SwapTransaction {
    pub source: Wallet,
    pub source_amount: f64,
    pub destination: Wallet,
    pub destination_amount: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct UnknownTransaction {
    #[serde(skip)]
    pub instructions: Vec<DecodedInstruction>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn wallet(pubkey: u8, owner: Option<u8>) -> Wallet {
        Wallet {
            pubkey: PublicKey::new([pubkey; 32]),
            owner: owner.map(|o| PublicKey::new([o; 32])),
            token: Token::native_sol(),
        }
    }

    #[test]
    fn direction_matches_account_or_owner() {
        let tx = TransferTransaction {
            source: wallet(1, Some(2)),
            destination: wallet(3, Some(4)),
            amount: 1.0,
        };
        assert_eq!(tx.direction(&PublicKey::new([1; 32])), TransferDirection::Send);
        assert_eq!(tx.direction(&PublicKey::new([2; 32])), TransferDirection::Send);
        assert_eq!(tx.direction(&PublicKey::new([4; 32])), TransferDirection::Receive);
        assert_eq!(tx.direction(&PublicKey::new([9; 32])), TransferDirection::Unrelated);
    }

    #[test]
    fn serializes_with_type_tag() {
        let parsed = ParsedTransaction::CloseAccount(CloseAccountTransaction {
            reimbursed_amount: 0.5,
            closed_wallet: wallet(1, None),
        });
        let json = serde_json::to_value(&parsed).unwrap();
        assert_eq!(json["type"], "closeAccount");
        assert_eq!(json["reimbursedAmount"], 0.5);
    }
}
