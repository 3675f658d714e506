//! Confirmed-transaction snapshot as returned by `getTransaction` with the
//! default `json` encoding.

use serde::{Deserialize, Serialize};

use crate::pubkey::PublicKey;
use crate::transaction::Message;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransactionInfo {
    #[serde(default)]
    pub slot: Option<u64>,
    #[serde(default)]
    pub block_time: Option<i64>,
    pub transaction: ConfirmedTransaction,
    #[serde(default)]
    pub meta: Option<TransactionMeta>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConfirmedTransaction {
    pub signatures: Vec<String>,
    pub message: ConfirmedMessage,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConfirmedMessage {
    pub header: ConfirmedMessageHeader,
    pub account_keys: Vec<PublicKey>,
    pub recent_blockhash: String,
    pub instructions: Vec<ConfirmedInstruction>,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConfirmedMessageHeader {
    pub num_required_signatures: u8,
    pub num_readonly_signed_accounts: u8,
    pub num_readonly_unsigned_accounts: u8,
}

/// Compiled instruction; `data` is base58.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConfirmedInstruction {
    pub program_id_index: u8,
    pub accounts: Vec<u8>,
    pub data: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransactionMeta {
    #[serde(default)]
    pub err: Option<serde_json::Value>,
    pub fee: u64,
    pub pre_balances: Vec<u64>,
    pub post_balances: Vec<u64>,
    #[serde(default)]
    pub pre_token_balances: Vec<TokenBalance>,
    #[serde(default)]
    pub post_token_balances: Vec<TokenBalance>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TokenBalance {
    pub account_index: usize,
    pub mint: PublicKey,
    #[serde(default)]
    pub owner: Option<PublicKey>,
    pub ui_token_amount: UiTokenAmount,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UiTokenAmount {
    /// Raw integer amount as a decimal string.
    pub amount: String,
    pub decimals: u8,
}

impl UiTokenAmount {
    pub fn raw(&self) -> Option<u64> {
        self.amount.parse().ok()
    }
}

impl From<&Message> for ConfirmedMessage {
    /// View a locally compiled message the way a node reports it.
    fn from(message: &Message) -> Self {
        Self {
            header: ConfirmedMessageHeader {
                num_required_signatures: message.header.num_required_signatures,
                num_readonly_signed_accounts: message.header.num_readonly_signed_accounts,
                num_readonly_unsigned_accounts: message.header.num_readonly_unsigned_accounts,
            },
            account_keys: message.account_keys.clone(),
            recent_blockhash: bs58::encode(message.recent_blockhash).into_string(),
            instructions: message
                .instructions
                .iter()
                .map(|ix| ConfirmedInstruction {
                    program_id_index: ix.program_id_index,
                    accounts: ix.account_indices.clone(),
                    data: bs58::encode(&ix.data).into_string(),
                })
                .collect(),
        }
    }
}

impl TransactionInfo {
    pub fn account_keys(&self) -> &[PublicKey] {
        &self.transaction.message.account_keys
    }

    pub fn is_signer(&self, index: usize) -> bool {
        index < self.transaction.message.header.num_required_signatures as usize
    }

    pub fn index_of(&self, key: &PublicKey) -> Option<usize> {
        self.account_keys().iter().position(|k| k == key)
    }

    /// Lamports the account at `index` lost over the transaction (negative
    /// when it gained).
    pub fn lamports_spent(&self, index: usize) -> Option<i128> {
        let meta = self.meta.as_ref()?;
        let pre = *meta.pre_balances.get(index)?;
        let post = *meta.post_balances.get(index)?;
        Some(pre as i128 - post as i128)
    }

    pub fn pre_token_balance(&self, index: usize) -> Option<&TokenBalance> {
        self.meta
            .as_ref()?
            .pre_token_balances
            .iter()
            .find(|b| b.account_index == index)
    }

    pub fn post_token_balance(&self, index: usize) -> Option<&TokenBalance> {
        self.meta
            .as_ref()?
            .post_token_balances
            .iter()
            .find(|b| b.account_index == index)
    }

    /// Pre balance first, since closed accounts vanish from post balances.
    pub fn token_balance(&self, index: usize) -> Option<&TokenBalance> {
        self.pre_token_balance(index)
            .or_else(|| self.post_token_balance(index))
    }
}
