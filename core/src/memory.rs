//! In-memory ledger store.
//!
//! Backs the engine's test suite and `--sandbox` runs with the same
//! conflict semantics as the SQL store: settlements compare-and-swap the
//! cash balance, so a stale writer is rejected instead of silently losing
//! an update.

use std::collections::HashMap;

use rust_decimal::Decimal;
use tokio::sync::RwLock;

use async_trait::async_trait;

use crate::error::{StoreError, StoreResult};
use crate::store::LedgerStore;
use crate::types::{Symbol, Transaction, UserId};

#[derive(Debug, Default)]
struct Accounts {
    /// Cash balance per user
    cash: HashMap<UserId, Decimal>,

    /// Append-only transaction log, all users interleaved in commit order
    log: Vec<Transaction>,
}

/// A [`LedgerStore`] held entirely in process memory.
#[derive(Debug, Default)]
pub struct MemoryStore {
    accounts: RwLock<Accounts>,
}

impl MemoryStore {
    /// Creates an empty store with no accounts.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates an account with the given starting cash balance.
    pub async fn open_account(&self, user: UserId, starting_cash: Decimal) {
        let mut accounts = self.accounts.write().await;
        accounts.cash.insert(user, starting_cash);
    }

    /// Total number of transactions across all accounts.
    pub async fn transaction_count(&self) -> usize {
        self.accounts.read().await.log.len()
    }
}

#[async_trait]
impl LedgerStore for MemoryStore {
    async fn get_cash(&self, user: UserId) -> StoreResult<Decimal> {
        let accounts = self.accounts.read().await;
        accounts
            .cash
            .get(&user)
            .copied()
            .ok_or_else(|| StoreError::NotFound(format!("user {user}")))
    }

    async fn sum_quantity_by_symbol(&self, user: UserId) -> StoreResult<HashMap<Symbol, i64>> {
        let accounts = self.accounts.read().await;
        let mut sums: HashMap<Symbol, i64> = HashMap::new();
        for entry in accounts.log.iter().filter(|t| t.user_id == user) {
            *sums.entry(entry.symbol.clone()).or_insert(0) += entry.shares;
        }
        Ok(sums)
    }

    async fn list_transactions(&self, user: UserId) -> StoreResult<Vec<Transaction>> {
        let accounts = self.accounts.read().await;
        Ok(accounts
            .log
            .iter()
            .filter(|t| t.user_id == user)
            .cloned()
            .collect())
    }

    async fn settle(
        &self,
        user: UserId,
        expected_cash: Decimal,
        new_cash: Decimal,
        entry: Transaction,
    ) -> StoreResult<()> {
        let mut accounts = self.accounts.write().await;
        let balance = accounts
            .cash
            .get_mut(&user)
            .ok_or_else(|| StoreError::NotFound(format!("user {user}")))?;
        if *balance != expected_cash {
            return Err(StoreError::Conflict);
        }
        *balance = new_cash;
        accounts.log.push(entry);
        Ok(())
    }
}
