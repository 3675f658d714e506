//! Externally owned state the SDK reads through injected capabilities.

use std::collections::HashMap;
use std::sync::{Mutex, RwLock};

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use sol_core::{Account, PublicKey, SolError};
use tracing::warn;

/// Source of the account that signs on the user's behalf.
///
/// The SDK only reads it; callers serialize any concurrent mutation.
#[async_trait]
pub trait AccountStorage: Send + Sync {
    async fn current_account(&self) -> Result<Option<Account>, SolError>;
}

#[derive(Debug, Default)]
pub struct InMemoryAccountStorage {
    account: RwLock<Option<Account>>,
}

impl InMemoryAccountStorage {
    pub fn new(account: Option<Account>) -> Self {
        Self {
            account: RwLock::new(account),
        }
    }

    pub fn save(&self, account: Account) -> Result<(), SolError> {
        *self.account.write().map_err(|_| SolError::Unknown)? = Some(account);
        Ok(())
    }

    pub fn clear(&self) -> Result<(), SolError> {
        *self.account.write().map_err(|_| SolError::Unknown)? = None;
        Ok(())
    }
}

#[async_trait]
impl AccountStorage for InMemoryAccountStorage {
    async fn current_account(&self) -> Result<Option<Account>, SolError> {
        Ok(self.account.read().map_err(|_| SolError::Unknown)?.clone())
    }
}

/// Byte-valued persistent settings store.
pub trait KeyValueStore: Send + Sync {
    fn get(&self, key: &str) -> Option<Vec<u8>>;
    fn set(&self, key: &str, value: Vec<u8>);
}

#[derive(Debug, Default)]
pub struct InMemoryKeyValueStore {
    values: Mutex<HashMap<String, Vec<u8>>>,
}

impl KeyValueStore for InMemoryKeyValueStore {
    fn get(&self, key: &str) -> Option<Vec<u8>> {
        self.values.lock().ok()?.get(key).cloned()
    }

    fn set(&self, key: &str, value: Vec<u8>) {
        if let Ok(mut values) = self.values.lock() {
            values.insert(key.to_owned(), value);
        }
    }
}

const PROCESSING_ORDERS_KEY: &str = "SerumSwapProcessingOrder";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ProcessingOpenOrder {
    market: PublicKey,
    open_order: PublicKey,
}

/// Open orders of swap markets that are still being settled, kept so the
/// same order is not submitted twice.
pub struct ProcessingOrderStore<S> {
    store: S,
}

impl<S: KeyValueStore> ProcessingOrderStore<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    pub fn processing_orders(&self, market: &PublicKey) -> Vec<PublicKey> {
        self.load()
            .into_iter()
            .filter(|order| order.market == *market)
            .map(|order| order.open_order)
            .collect()
    }

    /// Record `order` for `market`; already recorded orders are ignored.
    pub fn save_processing_order(&self, order: PublicKey, market: PublicKey) -> Result<(), SolError> {
        let mut orders = self.load();
        if orders
            .iter()
            .any(|o| o.market == market && o.open_order == order)
        {
            return Ok(());
        }

        orders.push(ProcessingOpenOrder {
            market,
            open_order: order,
        });
        let encoded = serde_json::to_vec(&orders)
            .map_err(|e| SolError::SerializationError(e.to_string()))?;
        self.store.set(PROCESSING_ORDERS_KEY, encoded);
        Ok(())
    }

    /// Unreadable data counts as no orders.
    fn load(&self) -> Vec<ProcessingOpenOrder> {
        let Some(data) = self.store.get(PROCESSING_ORDERS_KEY) else {
            return Vec::new();
        };
        serde_json::from_slice(&data).unwrap_or_else(|e| {
            warn!(error = %e, "discarding unreadable processing orders");
            Vec::new()
        })
    }
}
