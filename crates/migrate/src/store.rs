//! Migration ledger store
//!
//! The ledger is one row per applied version in a `schema_migrations` table;
//! the current schema version is simply the highest version present. The
//! store also owns the transactional script-execution primitive, so a fake
//! store can stand in for the whole database in unit tests.

use async_trait::async_trait;
use chrono::Utc;
use sqlx::SqlitePool;

use crate::error::MigrateResult;
use crate::sql::split_statements;

/// Name of the ledger table.
pub const LEDGER_TABLE: &str = "schema_migrations";

/// Ledger repository plus the script-execution primitive.
#[async_trait]
pub trait MigrationStore: Send + Sync {
    /// Create the ledger table if it does not exist. Safe to call repeatedly.
    async fn ensure_ledger(&self) -> MigrateResult<()>;

    /// Highest applied version, or 0 when the ledger is empty.
    async fn current_version(&self) -> MigrateResult<i64>;

    /// Every applied version, ascending.
    async fn applied_versions(&self) -> MigrateResult<Vec<i64>>;

    /// Record a version as applied.
    async fn record_applied(&self, version: i64) -> MigrateResult<()>;

    /// Remove a version's ledger row.
    async fn record_reverted(&self, version: i64) -> MigrateResult<()>;

    /// Execute a migration script as one all-or-nothing unit: each non-blank
    /// statement runs sequentially inside a single transaction, and any
    /// failure rolls the whole script back.
    async fn run_script(&self, sql: &str) -> MigrateResult<()>;
}

/// SQLite-backed migration store.
pub struct SqliteStore {
    pool: SqlitePool,
}

impl SqliteStore {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }
}

#[async_trait]
impl MigrationStore for SqliteStore {
    async fn ensure_ledger(&self) -> MigrateResult<()> {
        sqlx::query(
            "CREATE TABLE IF NOT EXISTS schema_migrations (\n    \
                 version INTEGER PRIMARY KEY,\n    \
                 applied_at DATETIME NOT NULL\n\
             )",
        )
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn current_version(&self) -> MigrateResult<i64> {
        let version: Option<i64> =
            sqlx::query_scalar("SELECT MAX(version) FROM schema_migrations")
                .fetch_one(&self.pool)
                .await?;
        Ok(version.unwrap_or(0))
    }

    async fn applied_versions(&self) -> MigrateResult<Vec<i64>> {
        let versions =
            sqlx::query_scalar("SELECT version FROM schema_migrations ORDER BY version")
                .fetch_all(&self.pool)
                .await?;
        Ok(versions)
    }

    async fn record_applied(&self, version: i64) -> MigrateResult<()> {
        sqlx::query("INSERT INTO schema_migrations (version, applied_at) VALUES (?1, ?2)")
            .bind(version)
            .bind(Utc::now())
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    async fn record_reverted(&self, version: i64) -> MigrateResult<()> {
        sqlx::query("DELETE FROM schema_migrations WHERE version = ?1")
            .bind(version)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    async fn run_script(&self, sql: &str) -> MigrateResult<()> {
        // Dropping the transaction on an early return rolls it back.
        let mut tx = self.pool.begin().await?;
        for statement in split_statements(sql) {
            sqlx::query(statement).execute(&mut *tx).await?;
        }
        tx.commit().await?;
        Ok(())
    }
}
