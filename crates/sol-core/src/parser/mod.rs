//! Classification of confirmed transactions.
//!
//! [`TransactionParser::parse`] reconstructs what a settled transaction did
//! from its instructions and its balance snapshots. It never fails: anything
//! it cannot explain comes back as [`ParsedTransaction::Unknown`].
//!
//! Rules, first match wins:
//!
//! 1. token account creation with no transfer        -> `CreateAccount`
//! 2. token account close                            -> `CloseAccount`
//! 3. one transfer, alongside creations or other programs -> `Transfer`
//! 4. opposite token balance deltas on two mints,
//!    not all explained by transfers                 -> `Swap`
//! 5. anything else                                  -> `Unknown`

pub mod decode;
pub mod info;
pub mod types;

use std::cmp::Reverse;

use tracing::debug;

use crate::pubkey::PublicKey;
use crate::token::{Token, TokenRegistry, SOL_DECIMALS};

pub use decode::{decode_instruction, DecodedInstruction, InstructionContext};
pub use info::{
    ConfirmedInstruction, ConfirmedMessage, ConfirmedMessageHeader, ConfirmedTransaction,
    TokenBalance, TransactionInfo, TransactionMeta, UiTokenAmount,
};
pub use types::{
    CloseAccountTransaction, CreateAccountTransaction, ParsedTransaction, SwapTransaction,
    TransferDirection, TransferTransaction, UnknownTransaction, Wallet,
};

/// Convert a raw integer amount into display units.
pub fn to_ui_amount(raw: u128, decimals: u8) -> f64 {
    raw as f64 / 10f64.powi(decimals as i32)
}

/// Resolve and decode every compiled instruction of `info`.
pub fn decode_instructions(info: &TransactionInfo) -> Vec<DecodedInstruction> {
    let keys = info.account_keys();
    info.transaction
        .message
        .instructions
        .iter()
        .map(|ix| {
            let program_id = keys.get(ix.program_id_index as usize);
            let accounts: Option<Vec<PublicKey>> = ix
                .accounts
                .iter()
                .map(|&index| keys.get(index as usize).copied())
                .collect();
            let data = bs58::decode(&ix.data).into_vec();

            match (program_id, accounts, data) {
                (Some(program_id), Some(accounts), Ok(data)) => {
                    decode_instruction(InstructionContext {
                        program_id,
                        accounts: &accounts,
                        data: &data,
                    })
                }
                (program_id, accounts, data) => DecodedInstruction::Unknown {
                    program_id: program_id.copied(),
                    accounts: accounts.unwrap_or_default(),
                    data: data.unwrap_or_default(),
                },
            }
        })
        .collect()
}

/// Net token movement of one account over the transaction.
#[derive(Debug)]
struct TokenDelta {
    index: usize,
    mint: PublicKey,
    owner: Option<PublicKey>,
    decimals: u8,
    /// post - pre, in base units.
    change: i128,
    score: u8,
}

pub struct TransactionParser {
    registry: TokenRegistry,
}

impl TransactionParser {
    pub fn new(registry: TokenRegistry) -> Self {
        Self { registry }
    }

    pub fn registry(&self) -> &TokenRegistry {
        &self.registry
    }

    /// Classify `info`.
    ///
    /// `my_account` is the account whose point of view is taken (a wallet or
    /// one of its token accounts); `my_account_symbol` is the symbol of the
    /// token the caller was looking at, used as a tie-breaker and as a mint
    /// hint when the snapshot carries no token balances.
    pub fn parse(
        &self,
        info: &TransactionInfo,
        my_account: Option<&PublicKey>,
        my_account_symbol: Option<&str>,
    ) -> ParsedTransaction {
        let instructions = decode_instructions(info);

        if let Some(created) = self.parse_create_account(info, &instructions) {
            return ParsedTransaction::CreateAccount(created);
        }
        if let Some(closed) = self.parse_close_account(info, &instructions, my_account_symbol) {
            return ParsedTransaction::CloseAccount(closed);
        }
        if let Some(transfer) = self.parse_transfer(info, &instructions, my_account_symbol) {
            return ParsedTransaction::Transfer(transfer);
        }
        if let Some(swap) = self.parse_swap(info, &instructions, my_account, my_account_symbol) {
            return ParsedTransaction::Swap(swap);
        }

        debug!(
            signature = info.transaction.signatures.first().map(String::as_str),
            instructions = instructions.len(),
            "transaction not recognized"
        );
        ParsedTransaction::Unknown(UnknownTransaction { instructions })
    }

    fn parse_create_account(
        &self,
        info: &TransactionInfo,
        instructions: &[DecodedInstruction],
    ) -> Option<CreateAccountTransaction> {
        let has_other_effects = instructions.iter().any(|ix| {
            ix.is_transfer() || matches!(ix, DecodedInstruction::TokenCloseAccount { .. })
        });
        if has_other_effects {
            return None;
        }

        let (account, owner, mint) = instructions.iter().find_map(|ix| match ix {
            DecodedInstruction::CreateAssociatedTokenAccount {
                associated_account,
                owner,
                mint,
                ..
            } => Some((*associated_account, *owner, *mint)),
            DecodedInstruction::TokenInitializeAccount {
                account,
                mint,
                owner,
            } if allocated_for_token_program(instructions, account) => {
                Some((*account, *owner, *mint))
            }
            _ => None,
        })?;

        // Nothing in this transaction is a transfer, so the whole fee payer
        // spend is the creation cost.
        let spent = info.lamports_spent(0)?.max(0) as u128;
        let decimals = info
            .index_of(&account)
            .and_then(|index| info.token_balance(index))
            .map(|balance| balance.ui_token_amount.decimals);

        Some(CreateAccountTransaction {
            fee: to_ui_amount(spent, SOL_DECIMALS),
            new_wallet: Wallet {
                pubkey: account,
                owner: Some(owner),
                token: self.registry.resolve(&mint, decimals),
            },
        })
    }

    fn parse_close_account(
        &self,
        info: &TransactionInfo,
        instructions: &[DecodedInstruction],
        my_account_symbol: Option<&str>,
    ) -> Option<CloseAccountTransaction> {
        let (account, owner) = instructions.iter().find_map(|ix| match ix {
            DecodedInstruction::TokenCloseAccount { account, owner, .. } => {
                Some((*account, *owner))
            }
            _ => None,
        })?;

        let index = info.index_of(&account)?;
        let token = match info.pre_token_balance(index) {
            Some(balance) => self
                .registry
                .resolve(&balance.mint, Some(balance.ui_token_amount.decimals)),
            None => {
                debug!(%account, "closed account has no pre token balance, using symbol hint");
                self.token_by_symbol(my_account_symbol)?
            }
        };
        let released = info.lamports_spent(index)?.max(0) as u128;

        Some(CloseAccountTransaction {
            reimbursed_amount: to_ui_amount(released, SOL_DECIMALS),
            closed_wallet: Wallet {
                pubkey: account,
                owner: Some(owner),
                token,
            },
        })
    }

    fn parse_transfer(
        &self,
        info: &TransactionInfo,
        instructions: &[DecodedInstruction],
        my_account_symbol: Option<&str>,
    ) -> Option<TransferTransaction> {
        let mut transfers = instructions.iter().filter(|ix| ix.is_transfer());
        let transfer = transfers.next()?;
        if transfers.next().is_some() {
            return None;
        }
        // Account creations and other programs' instructions (compute
        // budget, memo) may ride along; any other system or token operation
        // makes this more than a transfer.
        let incidental = |ix: &DecodedInstruction| {
            ix.is_transfer() || ix.is_account_creation() || ix.is_other_program()
        };
        if !instructions.iter().all(incidental) {
            return None;
        }
        if instructions.iter().any(DecodedInstruction::is_other_program) {
            let (from, to) = transfer.transfer_endpoints()?;
            let keys = info.account_keys();
            let moved_elsewhere = token_deltas(info, None)
                .iter()
                .any(|delta| keys[delta.index] != from && keys[delta.index] != to);
            if moved_elsewhere {
                debug!(%from, "token balances moved outside the transfer");
                return None;
            }
        }

        match *transfer {
            DecodedInstruction::SystemTransfer { from, to, lamports } => {
                let sol = Token::native_sol();
                Some(TransferTransaction {
                    amount: to_ui_amount(lamports as u128, sol.decimals),
                    source: Wallet {
                        pubkey: from,
                        owner: Some(from),
                        token: sol.clone(),
                    },
                    destination: Wallet {
                        pubkey: to,
                        owner: Some(to),
                        token: sol,
                    },
                })
            }
            DecodedInstruction::TokenTransfer {
                source,
                destination,
                authority,
                amount,
            } => {
                let token = self.transfer_token(info, &source, &destination, None, my_account_symbol)?;
                Some(self.token_transfer(info, instructions, source, destination, authority, amount, token))
            }
            DecodedInstruction::TokenTransferChecked {
                source,
                mint,
                destination,
                authority,
                amount,
                decimals,
            } => {
                let token = self.transfer_token(
                    info,
                    &source,
                    &destination,
                    Some((mint, decimals)),
                    my_account_symbol,
                )?;
                Some(self.token_transfer(info, instructions, source, destination, authority, amount, token))
            }
            _ => None,
        }
    }

    /// Token moved by a token transfer. The mint comes from the instruction
    /// when it names one, then from the token balances of either side, then
    /// from the symbol hint.
    fn transfer_token(
        &self,
        info: &TransactionInfo,
        source: &PublicKey,
        destination: &PublicKey,
        checked: Option<(PublicKey, u8)>,
        my_account_symbol: Option<&str>,
    ) -> Option<Token> {
        if let Some((mint, decimals)) = checked {
            let mut token = self.registry.resolve(&mint, Some(decimals));
            token.decimals = decimals;
            return Some(token);
        }

        let balance = [source, destination]
            .into_iter()
            .filter_map(|key| info.index_of(key))
            .find_map(|index| info.token_balance(index));
        if let Some(balance) = balance {
            let decimals = balance.ui_token_amount.decimals;
            let mut token = self.registry.resolve(&balance.mint, Some(decimals));
            token.decimals = decimals;
            return Some(token);
        }

        debug!(%source, "no token balances for transfer, using symbol hint");
        self.token_by_symbol(my_account_symbol)
    }

    #[allow(clippy::too_many_arguments)]
    fn token_transfer(
        &self,
        info: &TransactionInfo,
        instructions: &[DecodedInstruction],
        source: PublicKey,
        destination: PublicKey,
        authority: PublicKey,
        amount: u64,
        token: Token,
    ) -> TransferTransaction {
        let destination_owner = info
            .index_of(&destination)
            .and_then(|index| info.token_balance(index))
            .and_then(|balance| balance.owner)
            .or_else(|| {
                instructions.iter().find_map(|ix| match ix {
                    DecodedInstruction::CreateAssociatedTokenAccount {
                        associated_account,
                        owner,
                        ..
                    }
                    | DecodedInstruction::TokenInitializeAccount {
                        account: associated_account,
                        owner,
                        ..
                    } if *associated_account == destination => Some(*owner),
                    _ => None,
                })
            });

        TransferTransaction {
            amount: to_ui_amount(amount as u128, token.decimals),
            source: Wallet {
                pubkey: source,
                owner: Some(authority),
                token: token.clone(),
            },
            destination: Wallet {
                pubkey: destination,
                owner: destination_owner,
                token,
            },
        }
    }

    fn parse_swap(
        &self,
        info: &TransactionInfo,
        instructions: &[DecodedInstruction],
        my_account: Option<&PublicKey>,
        my_account_symbol: Option<&str>,
    ) -> Option<SwapTransaction> {
        let deltas = token_deltas(info, my_account);
        let keys = info.account_keys();

        // Balances fully accounted for by plain transfers (a batch send) are
        // not an exchange.
        let explained: Vec<PublicKey> = instructions
            .iter()
            .filter_map(DecodedInstruction::transfer_endpoints)
            .flat_map(|(from, to)| [from, to])
            .collect();
        if deltas.iter().all(|delta| explained.contains(&keys[delta.index])) {
            debug!(deltas = deltas.len(), "token balance changes explained by transfers");
            return None;
        }

        let hinted = |delta: &TokenDelta| {
            let token = self.registry.resolve(&delta.mint, Some(delta.decimals));
            my_account_symbol.is_some_and(|symbol| token.symbol == symbol)
        };
        // Both legs come from the caller's side when it can be told apart:
        // the explicit account, signer-owned accounts or the hinted token.
        let mine: Vec<&TokenDelta> = deltas
            .iter()
            .filter(|delta| delta.score > 0 || hinted(*delta))
            .collect();
        let candidates = if mine.is_empty() {
            deltas.iter().collect()
        } else {
            mine
        };

        // Most likely "mine" first: explicit account, then signer-owned,
        // then the caller's symbol, then the lowest account index.
        let rank = |delta: &&TokenDelta| (delta.score, hinted(*delta), Reverse(delta.index));
        let source = candidates
            .iter()
            .copied()
            .filter(|d| d.change < 0)
            .max_by_key(&rank)?;
        let destination = candidates
            .iter()
            .copied()
            .filter(|d| d.change > 0 && d.mint != source.mint)
            .max_by_key(&rank)?;

        Some(SwapTransaction {
            source_amount: to_ui_amount(source.change.unsigned_abs(), source.decimals),
            source: self.delta_wallet(info, source),
            destination_amount: to_ui_amount(destination.change.unsigned_abs(), destination.decimals),
            destination: self.delta_wallet(info, destination),
        })
    }

    fn delta_wallet(&self, info: &TransactionInfo, delta: &TokenDelta) -> Wallet {
        let mut token = self.registry.resolve(&delta.mint, Some(delta.decimals));
        token.decimals = delta.decimals;
        Wallet {
            pubkey: info.account_keys()[delta.index],
            owner: delta.owner,
            token,
        }
    }

    fn token_by_symbol(&self, symbol: Option<&str>) -> Option<Token> {
        symbol.and_then(|symbol| self.registry.by_symbol(symbol)).cloned()
    }
}

/// Whether a system `CreateAccount` in `instructions` allocated `account` for
/// the token program.
fn allocated_for_token_program(instructions: &[DecodedInstruction], account: &PublicKey) -> bool {
    instructions.iter().any(|ix| {
        matches!(
            ix,
            DecodedInstruction::SystemCreateAccount { new_account, owner, .. }
                if new_account == account && *owner == PublicKey::TOKEN_PROGRAM_ID
        )
    })
}

/// Non-zero token balance changes, in account index order.
fn token_deltas(info: &TransactionInfo, my_account: Option<&PublicKey>) -> Vec<TokenDelta> {
    let Some(meta) = info.meta.as_ref() else {
        return Vec::new();
    };
    let keys = info.account_keys();

    let mut indices: Vec<usize> = meta
        .pre_token_balances
        .iter()
        .chain(&meta.post_token_balances)
        .map(|balance| balance.account_index)
        .filter(|&index| index < keys.len())
        .collect();
    indices.sort_unstable();
    indices.dedup();

    indices
        .into_iter()
        .filter_map(|index| {
            let pre = info.pre_token_balance(index);
            let post = info.post_token_balance(index);
            let reference = post.or(pre)?;
            let raw = |balance: Option<&TokenBalance>| -> Option<i128> {
                match balance {
                    Some(balance) => balance.ui_token_amount.raw().map(i128::from),
                    None => Some(0),
                }
            };
            let change = raw(post)? - raw(pre)?;
            if change == 0 {
                return None;
            }

            let owner = reference.owner;
            let mut score = 0;
            if my_account == Some(&keys[index]) {
                score += 4;
            }
            if owner
                .and_then(|owner| info.index_of(&owner))
                .is_some_and(|owner_index| info.is_signer(owner_index))
            {
                score += 2;
            }

            Some(TokenDelta {
                index,
                mint: reference.mint,
                owner,
                decimals: reference.ui_token_amount.decimals,
                change,
                score,
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::instructions::{associated_token, system, token, AccountMeta, Instruction};
    use crate::transaction::Message;

    const BLOCKHASH: &str = "EnTJCS15dqbDTU2XywYSMaScoPv4Py4GzExrtY9DQxoD";

    fn key(b: u8) -> PublicKey {
        PublicKey::new([b; 32])
    }

    fn info_for(fee_payer: &PublicKey, instructions: &[Instruction], meta: Option<TransactionMeta>) -> TransactionInfo {
        let message = Message::compile(fee_payer, instructions, BLOCKHASH).unwrap();
        TransactionInfo {
            slot: Some(1),
            block_time: None,
            transaction: ConfirmedTransaction {
                signatures: vec!["sig".into()],
                message: ConfirmedMessage::from(&message),
            },
            meta,
        }
    }

    fn parser() -> TransactionParser {
        TransactionParser::new(TokenRegistry::default())
    }

    #[test]
    fn sol_transfer_without_meta() {
        let info = info_for(&key(1), &[system::transfer(&key(1), &key(2), 1_500_000_000)], None);
        let ParsedTransaction::Transfer(transfer) = parser().parse(&info, None, None) else {
            panic!("expected transfer");
        };
        assert_eq!(transfer.amount, 1.5);
        assert_eq!(transfer.source.pubkey, key(1));
        assert_eq!(transfer.destination.pubkey, key(2));
        assert_eq!(transfer.source.token.symbol, "SOL");
        assert_eq!(transfer.direction(&key(2)), TransferDirection::Receive);
    }

    #[test]
    fn token_transfer_falls_back_to_symbol_hint() {
        let usdc = Token {
            symbol: "USDC".into(),
            name: "USD Coin".into(),
            mint: key(9),
            decimals: 6,
        };
        let parser = TransactionParser::new(TokenRegistry::new([usdc]));
        let info = info_for(
            &key(1),
            &[token::transfer(&key(2), &key(3), &key(1), &[], 2_500_000)],
            None,
        );

        let ParsedTransaction::Transfer(transfer) = parser.parse(&info, None, Some("USDC")) else {
            panic!("expected transfer");
        };
        assert_eq!(transfer.amount, 2.5);
        assert_eq!(transfer.source.token.symbol, "USDC");
        assert_eq!(transfer.source.owner, Some(key(1)));

        // Without a mint from anywhere the transfer cannot be priced.
        assert!(matches!(
            parser.parse(&info, None, None),
            ParsedTransaction::Unknown(_)
        ));
    }

    #[test]
    fn unlisted_mint_uses_base58_symbol() {
        let mint = key(8);
        let info = info_for(
            &key(1),
            &[token::transfer_checked(&key(2), &mint, &key(3), &key(1), &[], 42, 0)],
            None,
        );
        let ParsedTransaction::Transfer(transfer) = parser().parse(&info, None, None) else {
            panic!("expected transfer");
        };
        assert_eq!(transfer.source.token.symbol, mint.to_base58());
        assert_eq!(transfer.amount, 42.0);
    }

    #[test]
    fn two_transfers_are_not_a_transfer() {
        let info = info_for(
            &key(1),
            &[
                system::transfer(&key(1), &key(2), 1),
                system::transfer(&key(1), &key(3), 1),
            ],
            None,
        );
        let ParsedTransaction::Unknown(unknown) = parser().parse(&info, None, None) else {
            panic!("expected unknown");
        };
        assert_eq!(unknown.instructions.len(), 2);
    }

    #[test]
    fn system_allocated_token_account_is_account_creation() {
        let payer = key(1);
        let new_account = key(2);
        let mint = key(3);
        let meta = TransactionMeta {
            fee: 5000,
            pre_balances: vec![10_000_000, 0, 0, 1, 1, 1],
            post_balances: vec![7_955_720, 2_039_280, 0, 1, 1, 1],
            ..TransactionMeta::default()
        };
        let info = info_for(
            &payer,
            &[
                system::create_account(&payer, &new_account, 2_039_280, 165, &PublicKey::TOKEN_PROGRAM_ID),
                token::initialize_account(&new_account, &mint, &payer),
            ],
            Some(meta),
        );

        let ParsedTransaction::CreateAccount(created) = parser().parse(&info, None, None) else {
            panic!("expected account creation");
        };
        assert_eq!(created.new_wallet.pubkey, new_account);
        assert_eq!(created.new_wallet.owner, Some(payer));
        assert_eq!(created.fee, 0.00204428);
    }

    #[test]
    fn creation_followed_by_transfer_is_a_transfer() {
        let payer = key(1);
        let ata = key(2);
        let info = info_for(
            &payer,
            &[
                associated_token::create_associated_token_account(&key(5), &ata, &key(4), &payer),
                token::transfer_checked(&key(3), &key(5), &ata, &payer, &[], 7, 0),
            ],
            None,
        );
        let ParsedTransaction::Transfer(transfer) = parser().parse(&info, None, None) else {
            panic!("expected transfer");
        };
        assert_eq!(transfer.destination.owner, Some(key(4)));
    }

    #[test]
    fn unresolvable_program_index_is_unknown() {
        let mut info = info_for(&key(1), &[system::transfer(&key(1), &key(2), 1)], None);
        info.transaction.message.instructions[0].program_id_index = 200;
        let decoded = decode_instructions(&info);
        assert!(matches!(
            decoded[0],
            DecodedInstruction::Unknown { program_id: None, .. }
        ));
    }

    fn balance(index: usize, mint: PublicKey, owner: Option<PublicKey>, amount: u64) -> TokenBalance {
        TokenBalance {
            account_index: index,
            mint,
            owner,
            ui_token_amount: UiTokenAmount {
                amount: amount.to_string(),
                decimals: 0,
            },
        }
    }

    #[test]
    fn compute_budget_before_transfer_is_a_transfer() {
        let compute_budget: PublicKey = "ComputeBudget111111111111111111111111111111".parse().unwrap();
        let info = info_for(
            &key(1),
            &[
                Instruction {
                    program_id: compute_budget,
                    accounts: vec![],
                    data: vec![2, 0x40, 0x0d, 0x03, 0x00],
                },
                system::transfer(&key(1), &key(2), 10_000_000),
            ],
            None,
        );
        let ParsedTransaction::Transfer(transfer) = parser().parse(&info, None, None) else {
            panic!("expected transfer");
        };
        assert_eq!(transfer.amount, 0.01);
        assert_eq!(transfer.destination.pubkey, key(2));
    }

    #[test]
    fn memo_after_transfer_is_a_transfer() {
        let memo: PublicKey = "MemoSq4gqABAXKb96qnH8TysNcWxMyWCqXgDLGmfcHr".parse().unwrap();
        let info = info_for(
            &key(1),
            &[
                system::transfer(&key(1), &key(2), 1_000_000_000),
                Instruction {
                    program_id: memo,
                    accounts: vec![AccountMeta::readonly(key(1), true)],
                    data: b"rent".to_vec(),
                },
            ],
            None,
        );
        let ParsedTransaction::Transfer(transfer) = parser().parse(&info, None, None) else {
            panic!("expected transfer");
        };
        assert_eq!(transfer.amount, 1.0);
        assert_eq!(transfer.source.pubkey, key(1));
    }

    #[test]
    fn transfer_next_to_a_close_is_not_a_transfer() {
        let info = info_for(
            &key(1),
            &[
                system::transfer(&key(1), &key(2), 1),
                token::close_account(&key(5), &key(1), &key(1), &[]),
            ],
            None,
        );
        assert!(matches!(
            parser().parse(&info, None, None),
            ParsedTransaction::Unknown(_)
        ));
    }

    #[test]
    fn transfer_inside_an_exchange_is_a_swap() {
        let wallet = key(1);
        let info = info_for(
            &wallet,
            &[
                system::transfer(&wallet, &key(2), 1_000),
                Instruction {
                    program_id: key(30),
                    accounts: vec![
                        AccountMeta::writable(key(10), false),
                        AccountMeta::writable(key(11), false),
                    ],
                    data: vec![9],
                },
            ],
            None,
        );
        let (sold, bought) = (info.index_of(&key(10)).unwrap(), info.index_of(&key(11)).unwrap());
        let info = TransactionInfo {
            meta: Some(TransactionMeta {
                pre_token_balances: vec![balance(sold, key(40), Some(wallet), 100)],
                post_token_balances: vec![
                    balance(sold, key(40), Some(wallet), 60),
                    balance(bought, key(41), Some(wallet), 25),
                ],
                ..TransactionMeta::default()
            }),
            ..info
        };

        let ParsedTransaction::Swap(swap) = parser().parse(&info, None, None) else {
            panic!("expected swap");
        };
        assert_eq!(swap.source.pubkey, key(10));
        assert_eq!(swap.source_amount, 40.0);
        assert_eq!(swap.destination.pubkey, key(11));
        assert_eq!(swap.destination_amount, 25.0);
    }

    #[test]
    fn batch_send_of_two_mints_is_not_a_swap() {
        let (wallet, recipient) = (key(1), key(2));
        let info = info_for(
            &wallet,
            &[
                token::transfer(&key(10), &key(11), &wallet, &[], 5),
                token::transfer(&key(20), &key(21), &wallet, &[], 7),
            ],
            None,
        );
        let index = |b: u8| info.index_of(&key(b)).unwrap();
        let with_owners = |sender: Option<PublicKey>, receiver: Option<PublicKey>| TransactionMeta {
            pre_token_balances: vec![
                balance(index(10), key(40), sender, 5),
                balance(index(20), key(41), sender, 7),
            ],
            post_token_balances: vec![
                balance(index(10), key(40), sender, 0),
                balance(index(11), key(40), receiver, 5),
                balance(index(20), key(41), sender, 0),
                balance(index(21), key(41), receiver, 7),
            ],
            ..TransactionMeta::default()
        };

        for meta in [
            with_owners(Some(wallet), Some(recipient)),
            // No owners: nothing marks either side as the caller's.
            with_owners(None, None),
        ] {
            let info = TransactionInfo {
                meta: Some(meta),
                ..info.clone()
            };
            assert!(matches!(
                parser().parse(&info, None, None),
                ParsedTransaction::Unknown(_)
            ));
        }
    }

    #[test]
    fn ui_amount_division() {
        assert_eq!(to_ui_amount(2_039_280, 9), 0.00203928);
        assert_eq!(to_ui_amount(1_000, 6), 0.001);
        assert_eq!(to_ui_amount(5, 0), 5.0);
    }
}
