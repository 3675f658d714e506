#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;
use sol_sdk::rpc::{ProgramAccount, ProgramAccountsConfig};
use sol_sdk::sol_core::layout::TokenAccountState;
use sol_sdk::sol_core::{AccountLayout, PublicKey, TokenAccount};
use sol_sdk::{AccountInfo, HttpClient, HttpResponse, SolError, SolanaRpc};

pub fn key(byte: u8) -> PublicKey {
    PublicKey::new([byte; 32])
}

pub fn blockhash() -> String {
    bs58::encode([9u8; 32]).into_string()
}

pub fn system_account(lamports: u64) -> AccountInfo {
    AccountInfo {
        lamports,
        owner: PublicKey::SYSTEM_PROGRAM_ID,
        data: AccountLayout::Empty,
        executable: false,
        rent_epoch: 0,
    }
}

pub fn token_account(mint: PublicKey, owner: PublicKey, amount: u64) -> AccountInfo {
    AccountInfo {
        lamports: 2_039_280,
        owner: PublicKey::TOKEN_PROGRAM_ID,
        data: AccountLayout::TokenAccount(TokenAccount {
            mint,
            owner,
            amount,
            delegate: None,
            state: TokenAccountState::Initialized,
            is_native: None,
            delegated_amount: 0,
            close_authority: None,
        }),
        executable: false,
        rent_epoch: 0,
    }
}

/// Node double serving a fixed set of accounts.
#[derive(Default)]
pub struct MockRpc {
    pub accounts: HashMap<PublicKey, AccountInfo>,
    /// Lookups of these keys fail with a transport error.
    pub failing: Vec<PublicKey>,
    pub program_accounts: Vec<ProgramAccount>,
    pub lookups: Mutex<Vec<PublicKey>>,
    pub program_account_queries: Mutex<Vec<ProgramAccountsConfig>>,
}

impl MockRpc {
    pub fn with_account(mut self, key: PublicKey, info: AccountInfo) -> Self {
        self.accounts.insert(key, info);
        self
    }

    pub fn lookups(&self) -> Vec<PublicKey> {
        self.lookups.lock().unwrap().clone()
    }
}

#[async_trait]
impl SolanaRpc for MockRpc {
    async fn get_account_info(&self, account: &PublicKey) -> Result<AccountInfo, SolError> {
        self.lookups.lock().unwrap().push(*account);
        if self.failing.contains(account) {
            return Err(SolError::InvalidResponse {
                code: 503,
                message: "node unavailable".into(),
            });
        }
        self.accounts
            .get(account)
            .cloned()
            .ok_or(SolError::AccountInfoNotFound)
    }

    async fn get_recent_blockhash(&self) -> Result<String, SolError> {
        Ok(blockhash())
    }

    async fn get_minimum_balance_for_rent_exemption(&self, span: u64) -> Result<u64, SolError> {
        // (128 bytes of account overhead + data) * 3480 lamports/byte-year * 2 years
        Ok((128 + span) * 3_480 * 2)
    }

    async fn get_program_accounts(
        &self,
        _program_id: &PublicKey,
        config: ProgramAccountsConfig,
    ) -> Result<Vec<ProgramAccount>, SolError> {
        self.program_account_queries.lock().unwrap().push(config);
        Ok(self.program_accounts.clone())
    }
}

/// HTTP double answering by URL and recording every request.
#[derive(Default)]
pub struct MockHttp {
    pub responses: HashMap<String, HttpResponse>,
    pub requests: Mutex<Vec<(String, Option<String>)>>,
}

impl MockHttp {
    pub fn respond(mut self, url: &str, status: u16, body: &str) -> Self {
        self.responses.insert(
            url.to_owned(),
            HttpResponse {
                status,
                body: body.to_owned(),
            },
        );
        self
    }

    pub fn posted_json(&self, url: &str) -> Option<serde_json::Value> {
        self.requests
            .lock()
            .unwrap()
            .iter()
            .find(|(u, body)| u == url && body.is_some())
            .and_then(|(_, body)| serde_json::from_str(body.as_deref()?).ok())
    }

    fn answer(&self, url: &str) -> Result<HttpResponse, SolError> {
        self.responses.get(url).cloned().ok_or(SolError::InvalidResponse {
            code: 404,
            message: format!("no route for {url}"),
        })
    }
}

#[async_trait]
impl HttpClient for MockHttp {
    async fn get(&self, url: &str) -> Result<HttpResponse, SolError> {
        self.requests.lock().unwrap().push((url.to_owned(), None));
        self.answer(url)
    }

    async fn post_json(&self, url: &str, body: &str) -> Result<HttpResponse, SolError> {
        self.requests
            .lock()
            .unwrap()
            .push((url.to_owned(), Some(body.to_owned())));
        self.answer(url)
    }
}
