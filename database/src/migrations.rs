//! # Database Migration System
//!
//! Embedded, ordered schema migrations for PostgreSQL. Each migration runs
//! inside its own transaction and is recorded in `schema_migrations`, so
//! startup is idempotent across restarts and concurrent replicas.

use sqlx::PgPool;
use tracing::{debug, info};

use crate::error::{DatabaseError, DatabaseResult};

/// A single schema migration compiled into the binary
#[derive(Debug, Clone, Copy)]
pub struct Migration {
    /// Monotonically increasing version number
    pub version: i64,
    /// Short human-readable name
    pub name: &'static str,
    /// SQL to execute (may contain multiple statements)
    pub sql: &'static str,
}

/// All migrations, in the order they must apply.
pub const MIGRATIONS: &[Migration] = &[
    Migration {
        version: 1,
        name: "create_users",
        sql: r#"
            CREATE TABLE IF NOT EXISTS users (
                id UUID PRIMARY KEY,
                username TEXT NOT NULL UNIQUE,
                password_hash TEXT NOT NULL,
                cash NUMERIC(20, 4) NOT NULL,
                created_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
            );
        "#,
    },
    Migration {
        version: 2,
        name: "create_transactions",
        sql: r#"
            CREATE TABLE IF NOT EXISTS transactions (
                id UUID PRIMARY KEY,
                user_id UUID NOT NULL REFERENCES users (id),
                symbol TEXT NOT NULL,
                name TEXT NOT NULL,
                shares BIGINT NOT NULL CHECK (shares <> 0),
                price NUMERIC(20, 4) NOT NULL,
                executed_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
            );
            CREATE INDEX IF NOT EXISTS idx_transactions_user
                ON transactions (user_id, executed_at);
            CREATE INDEX IF NOT EXISTS idx_transactions_user_symbol
                ON transactions (user_id, symbol);
        "#,
    },
];

/// Applies every pending migration, oldest first.
pub async fn run_migrations(pool: &PgPool) -> DatabaseResult<()> {
    sqlx::query(
        "CREATE TABLE IF NOT EXISTS schema_migrations (
            version BIGINT PRIMARY KEY,
            name TEXT NOT NULL,
            applied_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
        )",
    )
    .execute(pool)
    .await?;

    let applied: Vec<i64> = sqlx::query_scalar("SELECT version FROM schema_migrations")
        .fetch_all(pool)
        .await?;

    let mut ran = 0usize;
    for migration in MIGRATIONS {
        if applied.contains(&migration.version) {
            debug!(version = migration.version, "migration already applied");
            continue;
        }

        let mut tx = pool.begin().await?;
        sqlx::raw_sql(migration.sql)
            .execute(&mut *tx)
            .await
            .map_err(|e| {
                DatabaseError::Migration(format!(
                    "migration {} ({}) failed: {e}",
                    migration.version, migration.name
                ))
            })?;
        sqlx::query("INSERT INTO schema_migrations (version, name) VALUES ($1, $2)")
            .bind(migration.version)
            .bind(migration.name)
            .execute(&mut *tx)
            .await?;
        tx.commit().await?;

        info!(version = migration.version, name = migration.name, "applied migration");
        ran += 1;
    }

    if ran > 0 {
        info!("applied {ran} pending migrations");
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_migrations_are_strictly_ordered() {
        let mut last = 0;
        for migration in MIGRATIONS {
            assert!(
                migration.version > last,
                "migration versions must strictly increase"
            );
            assert!(!migration.name.is_empty());
            assert!(!migration.sql.trim().is_empty());
            last = migration.version;
        }
    }
}
