//! Database type definitions
//!
//! This module provides the row types read from and written to PostgreSQL.

use chrono::{DateTime, Utc};
use folio_core::Transaction;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// User account record stored in the database
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct UserRecord {
    pub id: Uuid,
    pub username: String,
    pub password_hash: String,
    pub cash: Decimal,
    pub created_at: DateTime<Utc>,
}

/// Transaction record stored in the database
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct TransactionRow {
    pub id: Uuid,
    pub user_id: Uuid,
    pub symbol: String,
    pub name: String,
    pub shares: i64,
    pub price: Decimal,
    pub executed_at: DateTime<Utc>,
}

impl From<TransactionRow> for Transaction {
    fn from(row: TransactionRow) -> Self {
        Transaction {
            id: row.id,
            user_id: row.user_id,
            symbol: row.symbol,
            name: row.name,
            shares: row.shares,
            price: row.price,
            executed_at: row.executed_at,
        }
    }
}

/// Per-symbol signed share sum for one user
#[derive(Debug, Clone, FromRow)]
pub struct HoldingSumRow {
    pub symbol: String,
    pub shares: i64,
}
