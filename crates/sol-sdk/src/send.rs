//! Building and signing outgoing transactions for the current account.

use sol_core::instructions::{associated_token, system, token};
use sol_core::{Account, Instruction, PublicKey, SolError, TokenAccount, Transaction};
use tracing::{debug, info, warn};

use crate::resolver::{self, SplTokenDestinationAddress};
use crate::rpc::{Memcmp, ProgramAccountsConfig, RpcFilter, SolanaRpc};
use crate::storage::AccountStorage;

/// Byte offset of the owner field in a token account.
const TOKEN_ACCOUNT_OWNER_OFFSET: usize = 32;

/// Parameters of an SPL token transfer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SplTransferRequest {
    pub mint: PublicKey,
    pub decimals: u8,
    /// Token account the tokens leave from.
    pub source: PublicKey,
    /// Token account or wallet of the recipient.
    pub destination: PublicKey,
    pub amount: u64,
    /// Defaults to the current account.
    pub fee_payer: Option<PublicKey>,
    pub transfer_checked: bool,
}

#[derive(Debug, Clone)]
pub struct SplTransfer {
    pub transaction: Transaction,
    /// The token account that is credited.
    pub real_destination: PublicKey,
}

#[derive(Debug, Clone)]
pub struct TokenAccountCreation {
    pub transaction: Transaction,
    pub new_account: PublicKey,
}

/// Solana client bound to a node and to the account store of the host.
pub struct SolanaClient<R, S> {
    rpc: R,
    storage: S,
}

impl<R: SolanaRpc, S: AccountStorage> SolanaClient<R, S> {
    pub fn new(rpc: R, storage: S) -> Self {
        Self { rpc, storage }
    }

    pub fn rpc(&self) -> &R {
        &self.rpc
    }

    /// The signing account, or [`SolError::Unauthorized`] when none is stored.
    pub async fn current_account(&self) -> Result<Account, SolError> {
        self.storage
            .current_account()
            .await?
            .ok_or(SolError::Unauthorized)
    }

    pub async fn recent_blockhash(&self) -> Result<String, SolError> {
        self.rpc.get_recent_blockhash().await
    }

    pub async fn find_spl_token_destination_address(
        &self,
        mint: &PublicKey,
        destination: &PublicKey,
    ) -> Result<SplTokenDestinationAddress, SolError> {
        resolver::find_spl_token_destination_address(&self.rpc, mint, destination).await
    }

    /// Fetch a blockhash, then build and sign with `signers`.
    pub async fn create_transaction_and_sign(
        &self,
        instructions: Vec<Instruction>,
        signers: &[&Account],
        fee_payer: PublicKey,
    ) -> Result<Transaction, SolError> {
        let blockhash = self.rpc.get_recent_blockhash().await?;
        sign_transaction(instructions, signers, fee_payer, blockhash)
    }

    /// Transfer `lamports` from the current account to the wallet `to`.
    pub async fn create_send_native_sol_transaction(
        &self,
        to: &PublicKey,
        lamports: u64,
        fee_payer: Option<PublicKey>,
    ) -> Result<Transaction, SolError> {
        let account = self.current_account().await?;
        let from = account.public_key();
        if from == *to {
            return Err(send_to_self());
        }

        let ((), blockhash) = futures::try_join!(
            self.check_native_destination(to),
            self.rpc.get_recent_blockhash()
        )?;

        debug!(%from, %to, lamports, "signing SOL transfer");
        sign_transaction(
            vec![system::transfer(&from, to, lamports)],
            &[&account],
            fee_payer.unwrap_or(from),
            blockhash,
        )
    }

    /// Transfer SPL tokens, creating the recipient's associated token
    /// account first when it does not exist yet.
    pub async fn create_send_spl_tokens_transaction(
        &self,
        request: SplTransferRequest,
    ) -> Result<SplTransfer, SolError> {
        let account = self.current_account().await?;
        let owner = account.public_key();
        let fee_payer = request.fee_payer.unwrap_or(owner);

        let (resolved, blockhash) = futures::try_join!(
            self.find_spl_token_destination_address(&request.mint, &request.destination),
            self.rpc.get_recent_blockhash()
        )?;
        if resolved.destination == request.source {
            return Err(send_to_self());
        }

        let mut instructions = Vec::with_capacity(2);
        if resolved.is_unregistered_associated_token {
            instructions.push(associated_token::create_associated_token_account(
                &request.mint,
                &resolved.destination,
                &request.destination,
                &fee_payer,
            ));
        }
        instructions.push(if request.transfer_checked {
            token::transfer_checked(
                &request.source,
                &request.mint,
                &resolved.destination,
                &owner,
                &[],
                request.amount,
                request.decimals,
            )
        } else {
            token::transfer(
                &request.source,
                &resolved.destination,
                &owner,
                &[],
                request.amount,
            )
        });

        debug!(
            mint = %request.mint,
            destination = %resolved.destination,
            create_associated = resolved.is_unregistered_associated_token,
            "signing token transfer"
        );
        let transaction = sign_transaction(instructions, &[&account], fee_payer, blockhash)?;
        Ok(SplTransfer {
            transaction,
            real_destination: resolved.destination,
        })
    }

    /// Allocate a rent-exempt token account for `mint` owned by the current
    /// account, at a freshly generated address.
    pub async fn create_token_account_transaction(
        &self,
        mint: &PublicKey,
    ) -> Result<TokenAccountCreation, SolError> {
        let account = self.current_account().await?;
        let owner = account.public_key();

        let (rent, blockhash) = futures::try_join!(
            self.rpc
                .get_minimum_balance_for_rent_exemption(TokenAccount::LEN as u64),
            self.rpc.get_recent_blockhash()
        )?;

        let new_account = Account::generate();
        let new_key = new_account.public_key();
        let instructions = vec![
            system::create_account(
                &owner,
                &new_key,
                rent,
                TokenAccount::LEN as u64,
                &PublicKey::TOKEN_PROGRAM_ID,
            ),
            token::initialize_account(&new_key, mint, &owner),
        ];

        info!(%mint, account = %new_key, rent, "creating token account");
        let transaction = sign_transaction(instructions, &[&account, &new_account], owner, blockhash)?;
        Ok(TokenAccountCreation {
            transaction,
            new_account: new_key,
        })
    }

    /// Every token account owned by `owner`.
    pub async fn get_token_accounts(
        &self,
        owner: &PublicKey,
    ) -> Result<Vec<(PublicKey, TokenAccount)>, SolError> {
        let config = ProgramAccountsConfig {
            filters: vec![
                RpcFilter::DataSize(TokenAccount::LEN as u64),
                RpcFilter::Memcmp(Memcmp {
                    offset: TOKEN_ACCOUNT_OWNER_OFFSET,
                    bytes: owner.to_base58(),
                }),
            ],
        };
        let accounts = self
            .rpc
            .get_program_accounts(&PublicKey::TOKEN_PROGRAM_ID, config)
            .await?;

        Ok(accounts
            .into_iter()
            .filter_map(|entry| match entry.account.data.as_token_account() {
                Some(account) => Some((entry.pubkey, account.clone())),
                None => {
                    warn!(pubkey = %entry.pubkey, "skipping non token account");
                    None
                }
            })
            .collect())
    }

    /// A missing destination is a fresh wallet; an existing one must be a
    /// plain system account.
    async fn check_native_destination(&self, to: &PublicKey) -> Result<(), SolError> {
        match self.rpc.get_account_info(to).await {
            Ok(info) if info.owner != PublicKey::SYSTEM_PROGRAM_ID => {
                Err(SolError::InvalidRequest("Invalid account info".into()))
            }
            Ok(_) | Err(SolError::AccountInfoNotFound) => Ok(()),
            Err(e) => Err(e),
        }
    }
}

fn sign_transaction(
    instructions: Vec<Instruction>,
    signers: &[&Account],
    fee_payer: PublicKey,
    blockhash: String,
) -> Result<Transaction, SolError> {
    let mut transaction = Transaction::new(fee_payer, instructions, blockhash);
    transaction.sign(signers)?;
    Ok(transaction)
}

fn send_to_self() -> SolError {
    SolError::InvalidRequest("You can not send tokens to yourself".into())
}
