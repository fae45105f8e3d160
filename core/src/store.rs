//! Persistent store contract for the ledger engine.
//!
//! The engine never talks to a database directly; it goes through
//! [`LedgerStore`], which exposes exactly the reads the validation paths
//! need plus a single atomic write: [`LedgerStore::settle`]. Keeping cash
//! writes behind a compare-and-swap settlement is what makes concurrent
//! buys/sells against the same account serializable.

use std::collections::HashMap;

use async_trait::async_trait;
use rust_decimal::Decimal;

use crate::error::StoreResult;
use crate::types::{Symbol, Transaction, UserId};

/// Durable storage for user cash balances and the append-only transaction
/// log. Implementations must be safe to share across concurrent requests.
#[async_trait]
pub trait LedgerStore: Send + Sync {
    /// Current cash balance for the user.
    async fn get_cash(&self, user: UserId) -> StoreResult<Decimal>;

    /// Signed share sum per symbol across the user's whole transaction log.
    ///
    /// Returns every symbol the user ever traded, including those whose sum
    /// is zero or negative; callers decide which sums constitute an owned
    /// holding.
    async fn sum_quantity_by_symbol(&self, user: UserId) -> StoreResult<HashMap<Symbol, i64>>;

    /// All transactions for the user, in execution order.
    async fn list_transactions(&self, user: UserId) -> StoreResult<Vec<Transaction>>;

    /// Atomically appends `entry` and moves the user's cash from
    /// `expected_cash` to `new_cash`, as one unit of work.
    ///
    /// Fails with [`crate::error::StoreError::Conflict`] when the stored
    /// balance no longer equals `expected_cash` (a concurrent settlement
    /// won), in which case nothing is written. Every settlement changes the
    /// balance, so this guard also serializes concurrent sells of the same
    /// holding.
    async fn settle(
        &self,
        user: UserId,
        expected_cash: Decimal,
        new_cash: Decimal,
        entry: Transaction,
    ) -> StoreResult<()>;
}
