//! JSON-RPC access to a Solana node.
//!
//! [`SolanaRpc`] is the capability the rest of the SDK depends on.
//! [`RpcClient`] implements it over an injected [`HttpClient`] using the
//! standard `{jsonrpc, id, method, params}` envelope.

use std::sync::atomic::{AtomicU64, Ordering};

use async_trait::async_trait;
use base64::Engine;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use sol_core::{AccountLayout, PublicKey, SolError};
use tracing::{debug, warn};

use crate::config::ApiEndpoint;
use crate::http::HttpClient;

/// Suffix some RPC providers append to every error message.
const PROVIDER_CONTACT_SUFFIX: &str = ", contact your app developer or support@rpcpool.com.";

static NEXT_REQUEST_ID: AtomicU64 = AtomicU64::new(1);

// ---------------------------------------------------------------------------
// Envelope
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize)]
pub struct RpcRequest {
    pub jsonrpc: &'static str,
    pub id: u64,
    pub method: String,
    pub params: Vec<Value>,
}

impl RpcRequest {
    pub fn new(method: impl Into<String>, params: Vec<Value>) -> Self {
        Self {
            jsonrpc: "2.0",
            id: NEXT_REQUEST_ID.fetch_add(1, Ordering::Relaxed),
            method: method.into(),
            params,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct RpcErrorBody {
    pub code: i64,
    #[serde(default)]
    pub message: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RpcResponse<T> {
    pub result: Option<T>,
    #[serde(default)]
    pub error: Option<RpcErrorBody>,
}

impl<T> RpcResponse<T> {
    /// The result on a 2xx status, otherwise an `InvalidResponse` carrying
    /// the node's error code and a cleaned-up message.
    pub fn into_result(self, status: u16) -> Result<T, SolError> {
        if (200..300).contains(&status) {
            if let Some(result) = self.result {
                return Ok(result);
            }
        }

        match self.error {
            Some(error) => Err(SolError::InvalidResponse {
                code: error.code,
                message: error
                    .message
                    .unwrap_or_default()
                    .replace(PROVIDER_CONTACT_SUFFIX, ""),
            }),
            None => Err(SolError::InvalidResponse {
                code: status as i64,
                message: "response carried neither result nor error".into(),
            }),
        }
    }
}

/// Results wrapped in `{context, value}`.
#[derive(Debug, Clone, Deserialize)]
pub struct RpcContextual<T> {
    pub context: RpcContext,
    pub value: T,
}

#[derive(Debug, Clone, Copy, Deserialize)]
pub struct RpcContext {
    pub slot: u64,
}

// ---------------------------------------------------------------------------
// Accounts
// ---------------------------------------------------------------------------

/// Account as returned with `encoding: base64`; `data` is `[payload, "base64"]`.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RpcAccount {
    pub lamports: u64,
    pub owner: PublicKey,
    pub data: (String, String),
    #[serde(default)]
    pub executable: bool,
    #[serde(default)]
    pub rent_epoch: u64,
}

/// An on-chain account with its data decoded by owner and length.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AccountInfo {
    pub lamports: u64,
    pub owner: PublicKey,
    pub data: AccountLayout,
    pub executable: bool,
    pub rent_epoch: u64,
}

impl TryFrom<RpcAccount> for AccountInfo {
    type Error = SolError;

    fn try_from(account: RpcAccount) -> Result<Self, Self::Error> {
        let (payload, encoding) = &account.data;
        if encoding != "base64" {
            return Err(SolError::SerializationError(format!(
                "unsupported account data encoding {encoding}"
            )));
        }
        let bytes = base64::engine::general_purpose::STANDARD
            .decode(payload)
            .map_err(|e| SolError::SerializationError(format!("account data: {e}")))?;

        Ok(Self {
            lamports: account.lamports,
            owner: account.owner,
            data: AccountLayout::decode(&account.owner, &bytes)?,
            executable: account.executable,
            rent_epoch: account.rent_epoch,
        })
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct RpcProgramAccount {
    pub pubkey: PublicKey,
    pub account: RpcAccount,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProgramAccount {
    pub pubkey: PublicKey,
    pub account: AccountInfo,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum RpcFilter {
    DataSize(u64),
    Memcmp(Memcmp),
}

/// Match `bytes` (base58) at `offset` of the account data.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Memcmp {
    pub offset: usize,
    pub bytes: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ProgramAccountsConfig {
    pub filters: Vec<RpcFilter>,
}

#[derive(Debug, Clone, Deserialize)]
struct RpcBlockhash {
    blockhash: String,
}

// ---------------------------------------------------------------------------
// Capability
// ---------------------------------------------------------------------------

#[async_trait]
pub trait SolanaRpc: Send + Sync {
    /// Fails with [`SolError::AccountInfoNotFound`] when the account does not
    /// exist.
    async fn get_account_info(&self, account: &PublicKey) -> Result<AccountInfo, SolError>;

    async fn get_recent_blockhash(&self) -> Result<String, SolError>;

    async fn get_minimum_balance_for_rent_exemption(&self, span: u64) -> Result<u64, SolError>;

    async fn get_program_accounts(
        &self,
        program_id: &PublicKey,
        config: ProgramAccountsConfig,
    ) -> Result<Vec<ProgramAccount>, SolError>;
}

pub struct RpcClient<H> {
    endpoint: ApiEndpoint,
    http: H,
}

impl<H: HttpClient> RpcClient<H> {
    pub fn new(endpoint: ApiEndpoint, http: H) -> Self {
        Self { endpoint, http }
    }

    pub fn endpoint(&self) -> &ApiEndpoint {
        &self.endpoint
    }

    pub fn http(&self) -> &H {
        &self.http
    }

    /// Send one JSON-RPC call and decode its `result`.
    pub async fn request<T: DeserializeOwned>(
        &self,
        method: &str,
        params: Vec<Value>,
    ) -> Result<T, SolError> {
        let url = self.endpoint.request_url("")?;
        let request = RpcRequest::new(method, params);
        let body = serde_json::to_string(&request)
            .map_err(|e| SolError::SerializationError(e.to_string()))?;

        debug!(method, id = request.id, "rpc request");
        let response = self.http.post_json(&url, &body).await?;

        let decoded: RpcResponse<T> = serde_json::from_str(&response.body).map_err(|e| {
            warn!(method, status = response.status, "undecodable rpc response");
            SolError::InvalidResponse {
                code: response.status as i64,
                message: e.to_string(),
            }
        })?;
        decoded.into_result(response.status)
    }
}

#[async_trait]
impl<H: HttpClient> SolanaRpc for RpcClient<H> {
    async fn get_account_info(&self, account: &PublicKey) -> Result<AccountInfo, SolError> {
        let result: RpcContextual<Option<RpcAccount>> = self
            .request(
                "getAccountInfo",
                vec![json!(account), json!({ "encoding": "base64" })],
            )
            .await?;
        result
            .value
            .ok_or(SolError::AccountInfoNotFound)?
            .try_into()
    }

    async fn get_recent_blockhash(&self) -> Result<String, SolError> {
        let result: RpcContextual<RpcBlockhash> =
            self.request("getRecentBlockhash", Vec::new()).await?;
        Ok(result.value.blockhash)
    }

    async fn get_minimum_balance_for_rent_exemption(&self, span: u64) -> Result<u64, SolError> {
        self.request("getMinimumBalanceForRentExemption", vec![json!(span)])
            .await
    }

    async fn get_program_accounts(
        &self,
        program_id: &PublicKey,
        config: ProgramAccountsConfig,
    ) -> Result<Vec<ProgramAccount>, SolError> {
        let accounts: Vec<RpcProgramAccount> = self
            .request(
                "getProgramAccounts",
                vec![
                    json!(program_id),
                    json!({ "encoding": "base64", "filters": config.filters }),
                ],
            )
            .await?;

        accounts
            .into_iter()
            .map(|entry| -> Result<ProgramAccount, SolError> {
                Ok(ProgramAccount {
                    pubkey: entry.pubkey,
                    account: entry.account.try_into()?,
                })
            })
            .collect()
    }
}
