//! Asynchronous Solana SDK.
//!
//! Orchestrates the building blocks of [`sol_core`] over capabilities the
//! host injects: an [`HttpClient`] for the node and the fee relayer, and an
//! [`AccountStorage`] holding the signing account.

pub mod config;
pub mod fee_relayer;
pub mod http;
pub mod resolver;
pub mod rpc;
pub mod send;
pub mod storage;

pub use sol_core;
pub use sol_core::SolError;

pub use config::{ApiEndpoint, FeeRelayerConfig, Network};
pub use fee_relayer::{FeeRelayer, FeeRelayerClient, TransferSolParams, TransferSplTokenParams};
pub use http::{HttpClient, HttpResponse};
pub use resolver::{find_spl_token_destination_address, SplTokenDestinationAddress};
pub use rpc::{AccountInfo, RpcClient, SolanaRpc};
pub use send::{SolanaClient, SplTransfer, SplTransferRequest, TokenAccountCreation};
pub use storage::{
    AccountStorage, InMemoryAccountStorage, InMemoryKeyValueStore, KeyValueStore,
    ProcessingOrderStore,
};
