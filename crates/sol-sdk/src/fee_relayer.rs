//! Client for the fee relayer, a service that pays transaction fees on the
//! user's behalf.
//!
//! The user signs the transfer with the relayer's key as fee payer and hands
//! over only its own signature; the relayer rebuilds the same transaction,
//! adds its signature and submits it.

use async_trait::async_trait;
use serde::Serialize;
use sol_core::instructions::{associated_token, system, token};
use sol_core::{Account, Instruction, PublicKey, SolError, Transaction};
use tracing::{debug, warn};

use crate::config::FeeRelayerConfig;
use crate::http::{HttpClient, HttpResponse};
use crate::resolver::SplTokenDestinationAddress;
use crate::rpc::SolanaRpc;
use crate::send::SolanaClient;
use crate::storage::AccountStorage;

const FEE_PAYER_PATH: &str = "/fee_payer/pubkey";
const TRANSFER_SOL_PATH: &str = "/transfer_sol";
const TRANSFER_SPL_TOKEN_PATH: &str = "/transfer_spl_token";

/// What the relayer flows need from the Solana side.
#[async_trait]
pub trait FeeRelayerClient: Send + Sync {
    async fn current_account(&self) -> Result<Account, SolError>;

    async fn recent_blockhash(&self) -> Result<String, SolError>;

    async fn find_spl_token_destination_address(
        &self,
        mint: &PublicKey,
        destination: &PublicKey,
    ) -> Result<SplTokenDestinationAddress, SolError>;
}

#[async_trait]
impl<R: SolanaRpc, S: AccountStorage> FeeRelayerClient for SolanaClient<R, S> {
    async fn current_account(&self) -> Result<Account, SolError> {
        SolanaClient::current_account(self).await
    }

    async fn recent_blockhash(&self) -> Result<String, SolError> {
        SolanaClient::recent_blockhash(self).await
    }

    async fn find_spl_token_destination_address(
        &self,
        mint: &PublicKey,
        destination: &PublicKey,
    ) -> Result<SplTokenDestinationAddress, SolError> {
        SolanaClient::find_spl_token_destination_address(self, mint, destination).await
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TransferSolParams {
    pub sender: PublicKey,
    pub recipient: PublicKey,
    pub amount: u64,
    /// Base58 signature of the sender.
    pub signature: String,
    pub blockhash: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TransferSplTokenParams {
    pub sender: PublicKey,
    pub recipient: PublicKey,
    pub token_mint: PublicKey,
    pub authority: PublicKey,
    pub amount: u64,
    pub decimals: u8,
    pub signature: String,
    pub blockhash: String,
}

pub struct FeeRelayer<C, H> {
    client: C,
    http: H,
    config: FeeRelayerConfig,
}

impl<C: FeeRelayerClient, H: HttpClient> FeeRelayer<C, H> {
    pub fn new(client: C, http: H, config: FeeRelayerConfig) -> Self {
        Self {
            client,
            http,
            config,
        }
    }

    pub fn config(&self) -> &FeeRelayerConfig {
        &self.config
    }

    pub fn http(&self) -> &H {
        &self.http
    }

    /// The account the relayer pays fees from.
    pub async fn get_fee_payer_pubkey(&self) -> Result<PublicKey, SolError> {
        let url = self.config.request_url(FEE_PAYER_PATH)?;
        let response = self.http.get(&url).await?;
        let body = into_body(FEE_PAYER_PATH, response)?;
        let fee_payer: PublicKey = body.trim().parse()?;
        debug!(%fee_payer, "fee payer");
        Ok(fee_payer)
    }

    /// Send `lamports` to `destination` without paying the fee; returns the
    /// relayer's answer, the transaction signature.
    pub async fn transfer_sol(
        &self,
        destination: &PublicKey,
        lamports: u64,
    ) -> Result<String, SolError> {
        let (account, fee_payer, blockhash) = futures::try_join!(
            self.client.current_account(),
            self.get_fee_payer_pubkey(),
            self.client.recent_blockhash()
        )?;
        let sender = account.public_key();

        let instruction = system::transfer(&sender, destination, lamports);
        let signature = sign_for_relayer(&account, fee_payer, vec![instruction], &blockhash)?;

        let params = TransferSolParams {
            sender,
            recipient: *destination,
            amount: lamports,
            signature,
            blockhash,
        };
        self.submit(TRANSFER_SOL_PATH, &params).await
    }

    /// Send SPL tokens from the token account `source` without paying the
    /// fee. The relayer also pays for the recipient's associated token
    /// account when it has to be created.
    pub async fn transfer_spl_token(
        &self,
        mint: &PublicKey,
        source: &PublicKey,
        destination: &PublicKey,
        amount: u64,
        decimals: u8,
    ) -> Result<String, SolError> {
        let (account, fee_payer, blockhash, resolved) = futures::try_join!(
            self.client.current_account(),
            self.get_fee_payer_pubkey(),
            self.client.recent_blockhash(),
            self.client.find_spl_token_destination_address(mint, destination)
        )?;
        let authority = account.public_key();

        let mut instructions = Vec::with_capacity(2);
        if resolved.is_unregistered_associated_token {
            instructions.push(associated_token::create_associated_token_account(
                mint,
                &resolved.destination,
                destination,
                &fee_payer,
            ));
        }
        instructions.push(token::transfer_checked(
            source,
            mint,
            &resolved.destination,
            &authority,
            &[],
            amount,
            decimals,
        ));
        let signature = sign_for_relayer(&account, fee_payer, instructions, &blockhash)?;

        // An account that does not exist yet is addressed through its wallet.
        let recipient = if resolved.is_unregistered_associated_token {
            *destination
        } else {
            resolved.destination
        };

        let params = TransferSplTokenParams {
            sender: *source,
            recipient,
            token_mint: *mint,
            authority,
            amount,
            decimals,
            signature,
            blockhash,
        };
        self.submit(TRANSFER_SPL_TOKEN_PATH, &params).await
    }

    async fn submit<P: Serialize + Sync>(&self, path: &str, params: &P) -> Result<String, SolError> {
        let url = self.config.request_url(path)?;
        let body =
            serde_json::to_string(params).map_err(|e| SolError::SerializationError(e.to_string()))?;
        let response = self.http.post_json(&url, &body).await?;
        let signature = into_body(path, response)?;
        debug!(path, %signature, "relayed transaction");
        Ok(signature)
    }
}

/// Sign with `fee_payer` as the fee payer and return the signer's own
/// signature in base58.
fn sign_for_relayer(
    signer: &Account,
    fee_payer: PublicKey,
    instructions: Vec<Instruction>,
    blockhash: &str,
) -> Result<String, SolError> {
    let mut transaction = Transaction::new(fee_payer, instructions, blockhash);
    transaction.partial_sign(&[signer])?;
    let signature = transaction.find_signature(&signer.public_key())?;
    Ok(bs58::encode(signature).into_string())
}

fn into_body(path: &str, response: HttpResponse) -> Result<String, SolError> {
    if response.is_success() {
        return Ok(response.body);
    }
    let message = readable_error(&response.body).to_owned();
    warn!(path, status = response.status, %message, "fee relayer rejected request");
    Err(SolError::InvalidResponse {
        code: response.status as i64,
        message,
    })
}

/// Text between the first `(` and the `)` after it, else the whole body.
fn readable_error(body: &str) -> &str {
    body.split_once('(')
        .and_then(|(_, rest)| rest.split_once(')'))
        .map_or(body, |(inside, _)| inside)
}
