//! # PostgreSQL Persistent Store
//!
//! PostgreSQL implementation of the ledger store using SQLx with connection
//! pooling. Settlement commits the transaction append and the cash update as
//! one database transaction, guarded by a compare-and-swap on the stored
//! balance so concurrent settlements for the same user cannot lose updates.

use std::collections::HashMap;

use async_trait::async_trait;
use rust_decimal::Decimal;
use sqlx::{postgres::PgPoolOptions, PgPool};
use tracing::{debug, info, warn};
use uuid::Uuid;

use folio_core::{LedgerStore, StoreResult, Symbol, Transaction, UserId};

use crate::config::DatabaseConfig;
use crate::error::{DatabaseError, DatabaseResult};
use crate::migrations::run_migrations;
use crate::types::{HoldingSumRow, TransactionRow, UserRecord};

/// Cash balance granted to every newly registered account.
pub fn starting_cash() -> Decimal {
    Decimal::new(10_000_00, 2)
}

/// PostgreSQL-backed store for users, cash, and the transaction log
pub struct PostgresStore {
    pool: PgPool,
}

impl PostgresStore {
    /// Connects a new store with the given configuration and applies any
    /// pending schema migrations.
    pub async fn connect(config: &DatabaseConfig) -> DatabaseResult<Self> {
        config.validate()?;
        info!("Initializing database connection pool");

        let pool = PgPoolOptions::new()
            .max_connections(config.max_connections)
            .min_connections(config.min_connections)
            .acquire_timeout(config.acquire_timeout)
            .idle_timeout(config.idle_timeout)
            .max_lifetime(config.max_lifetime)
            .connect(&config.database_url)
            .await
            .map_err(|e| DatabaseError::Connection(e.to_string()))?;

        let version: String = sqlx::query_scalar("SELECT version()")
            .fetch_one(&pool)
            .await?;
        info!("Connected to PostgreSQL: {}", version);

        run_migrations(&pool).await?;

        Ok(Self { pool })
    }

    /// Wraps an existing pool without connecting or migrating.
    pub fn from_pool(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Get a reference to the connection pool
    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    /// Creates a user account seeded with the standard starting cash.
    ///
    /// A duplicate username fails with [`DatabaseError::UsernameTaken`].
    pub async fn create_user(
        &self,
        username: &str,
        password_hash: &str,
    ) -> DatabaseResult<UserRecord> {
        let record = sqlx::query_as::<_, UserRecord>(
            "INSERT INTO users (id, username, password_hash, cash)
             VALUES ($1, $2, $3, $4)
             RETURNING id, username, password_hash, cash, created_at",
        )
        .bind(Uuid::new_v4())
        .bind(username)
        .bind(password_hash)
        .bind(starting_cash())
        .fetch_one(&self.pool)
        .await
        .map_err(|e| match &e {
            sqlx::Error::Database(db) if db.is_unique_violation() => {
                DatabaseError::UsernameTaken(username.to_string())
            }
            _ => DatabaseError::from(e),
        })?;

        info!(user = %record.id, username, "created user account");
        Ok(record)
    }

    /// Looks up a user account by username.
    pub async fn user_by_username(&self, username: &str) -> DatabaseResult<Option<UserRecord>> {
        let record = sqlx::query_as::<_, UserRecord>(
            "SELECT id, username, password_hash, cash, created_at
             FROM users WHERE username = $1",
        )
        .bind(username)
        .fetch_optional(&self.pool)
        .await?;
        Ok(record)
    }

    /// Looks up a user account by id.
    pub async fn user_by_id(&self, id: UserId) -> DatabaseResult<Option<UserRecord>> {
        let record = sqlx::query_as::<_, UserRecord>(
            "SELECT id, username, password_hash, cash, created_at
             FROM users WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(record)
    }

    async fn settle_inner(
        &self,
        user: UserId,
        expected_cash: Decimal,
        new_cash: Decimal,
        entry: &Transaction,
    ) -> DatabaseResult<()> {
        let mut tx = self.pool.begin().await?;

        // Guarded update: zero rows means the balance moved under us (or the
        // user does not exist); either way nothing may commit.
        let updated = sqlx::query("UPDATE users SET cash = $1 WHERE id = $2 AND cash = $3")
            .bind(new_cash)
            .bind(user)
            .bind(expected_cash)
            .execute(&mut *tx)
            .await?;

        if updated.rows_affected() == 0 {
            tx.rollback().await?;

            let exists: Option<i32> = sqlx::query_scalar("SELECT 1 FROM users WHERE id = $1")
                .bind(user)
                .fetch_optional(&self.pool)
                .await?;
            return match exists {
                Some(_) => {
                    warn!(%user, "settlement lost cash compare-and-swap");
                    Err(DatabaseError::Conflict(format!(
                        "cash balance for user {user} changed concurrently"
                    )))
                }
                None => Err(DatabaseError::NotFound(format!("user {user}"))),
            };
        }

        sqlx::query(
            "INSERT INTO transactions (id, user_id, symbol, name, shares, price, executed_at)
             VALUES ($1, $2, $3, $4, $5, $6, $7)",
        )
        .bind(entry.id)
        .bind(entry.user_id)
        .bind(&entry.symbol)
        .bind(&entry.name)
        .bind(entry.shares)
        .bind(entry.price)
        .bind(entry.executed_at)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;
        debug!(%user, symbol = %entry.symbol, shares = entry.shares, "settlement committed");
        Ok(())
    }
}

#[async_trait]
impl LedgerStore for PostgresStore {
    async fn get_cash(&self, user: UserId) -> StoreResult<Decimal> {
        let cash: Option<Decimal> = sqlx::query_scalar("SELECT cash FROM users WHERE id = $1")
            .bind(user)
            .fetch_optional(&self.pool)
            .await
            .map_err(DatabaseError::from)?;
        cash.ok_or_else(|| DatabaseError::NotFound(format!("user {user}")).into())
    }

    async fn sum_quantity_by_symbol(&self, user: UserId) -> StoreResult<HashMap<Symbol, i64>> {
        let rows = sqlx::query_as::<_, HoldingSumRow>(
            "SELECT symbol, SUM(shares)::BIGINT AS shares
             FROM transactions WHERE user_id = $1
             GROUP BY symbol",
        )
        .bind(user)
        .fetch_all(&self.pool)
        .await
        .map_err(DatabaseError::from)?;

        Ok(rows
            .into_iter()
            .map(|row| (row.symbol, row.shares))
            .collect())
    }

    async fn list_transactions(&self, user: UserId) -> StoreResult<Vec<Transaction>> {
        let rows = sqlx::query_as::<_, TransactionRow>(
            "SELECT id, user_id, symbol, name, shares, price, executed_at
             FROM transactions WHERE user_id = $1
             ORDER BY executed_at, id",
        )
        .bind(user)
        .fetch_all(&self.pool)
        .await
        .map_err(DatabaseError::from)?;

        Ok(rows.into_iter().map(Transaction::from).collect())
    }

    async fn settle(
        &self,
        user: UserId,
        expected_cash: Decimal,
        new_cash: Decimal,
        entry: Transaction,
    ) -> StoreResult<()> {
        self.settle_inner(user, expected_cash, new_cash, &entry)
            .await
            .map_err(Into::into)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use folio_core::{Quote, StoreError};
    use rust_decimal_macros::dec;

    fn quote(symbol: &str, price: Decimal) -> Quote {
        Quote {
            symbol: symbol.to_string(),
            name: format!("{symbol} Inc."),
            price,
        }
    }

    async fn connect() -> PostgresStore {
        let config = DatabaseConfig::default();
        PostgresStore::connect(&config)
            .await
            .expect("needs a running PostgreSQL at DATABASE_URL")
    }

    fn unique_username() -> String {
        format!("trader_{}", Uuid::new_v4().simple())
    }

    #[test]
    fn test_starting_cash_is_ten_thousand() {
        assert_eq!(starting_cash(), dec!(10000.00));
    }

    #[tokio::test]
    #[ignore]
    async fn test_create_user_seeds_starting_cash() {
        let store = connect().await;
        let user = store.create_user(&unique_username(), "hash").await.unwrap();
        assert_eq!(store.get_cash(user.id).await.unwrap(), starting_cash());
    }

    #[tokio::test]
    #[ignore]
    async fn test_duplicate_username_is_rejected() {
        let store = connect().await;
        let username = unique_username();
        store.create_user(&username, "hash").await.unwrap();

        let err = store.create_user(&username, "hash").await.unwrap_err();
        assert!(matches!(err, DatabaseError::UsernameTaken(_)));
    }

    #[tokio::test]
    #[ignore]
    async fn test_settle_roundtrip_and_conflict() {
        let store = connect().await;
        let user = store.create_user(&unique_username(), "hash").await.unwrap();

        let q = quote("AAPL", dec!(150.00));
        store
            .settle(
                user.id,
                starting_cash(),
                dec!(8500.00),
                Transaction::buy(user.id, &q, 10),
            )
            .await
            .unwrap();
        assert_eq!(store.get_cash(user.id).await.unwrap(), dec!(8500.00));

        // stale expected balance must not commit
        let err = store
            .settle(
                user.id,
                starting_cash(),
                dec!(7000.00),
                Transaction::buy(user.id, &q, 10),
            )
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::Conflict));
        assert_eq!(store.get_cash(user.id).await.unwrap(), dec!(8500.00));

        let sums = store.sum_quantity_by_symbol(user.id).await.unwrap();
        assert_eq!(sums.get("AAPL"), Some(&10));
        assert_eq!(store.list_transactions(user.id).await.unwrap().len(), 1);
    }
}
