//! Database - pool construction and schema initialization

use fourmiz_core::StoreError;
use sqlx::sqlite::{SqlitePool, SqlitePoolOptions};
use std::path::Path;

/// Handle to the SQLite database backing all stores.
#[derive(Clone)]
pub struct Database {
    pool: SqlitePool,
}

impl Database {
    /// Open (creating if needed) the database file at `path`.
    pub async fn open(path: impl AsRef<Path>) -> Result<Self, StoreError> {
        let url = format!("sqlite:{}?mode=rwc", path.as_ref().display());
        let pool = SqlitePool::connect(&url)
            .await
            .map_err(StoreError::backend)?;
        let db = Self { pool };
        db.init_schema().await?;
        Ok(db)
    }

    /// An in-memory database (for testing).
    ///
    /// Pinned to a single connection: every pooled connection would
    /// otherwise get its own empty `:memory:` instance.
    pub async fn in_memory() -> Result<Self, StoreError> {
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect("sqlite::memory:")
            .await
            .map_err(StoreError::backend)?;
        let db = Self { pool };
        db.init_schema().await?;
        Ok(db)
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    async fn init_schema(&self) -> Result<(), StoreError> {
        let statements = [
            r#"
            CREATE TABLE IF NOT EXISTS accounts (
                account_id TEXT PRIMARY KEY,
                roles TEXT NOT NULL DEFAULT '',
                profile_json TEXT NOT NULL,
                profile_complete INTEGER NOT NULL DEFAULT 0,
                version INTEGER NOT NULL DEFAULT 0,
                updated_at TEXT NOT NULL
            )
            "#,
            r#"
            CREATE TABLE IF NOT EXISTS transactions (
                id TEXT PRIMARY KEY,
                account_id TEXT NOT NULL,
                amount TEXT NOT NULL,
                kind TEXT NOT NULL,
                status TEXT NOT NULL,
                source_ref TEXT,
                created_at TEXT NOT NULL
            )
            "#,
            r#"
            CREATE UNIQUE INDEX IF NOT EXISTS idx_transactions_source_ref
            ON transactions(source_ref) WHERE source_ref IS NOT NULL
            "#,
            r#"
            CREATE INDEX IF NOT EXISTS idx_transactions_account
            ON transactions(account_id)
            "#,
            r#"
            CREATE TABLE IF NOT EXISTS payout_requests (
                id TEXT PRIMARY KEY,
                account_id TEXT NOT NULL,
                amount TEXT NOT NULL,
                method TEXT NOT NULL,
                destination TEXT NOT NULL,
                status TEXT NOT NULL,
                requested_at TEXT NOT NULL
            )
            "#,
            r#"
            CREATE INDEX IF NOT EXISTS idx_payout_requests_account_status
            ON payout_requests(account_id, status)
            "#,
            r#"
            CREATE TABLE IF NOT EXISTS orders (
                id TEXT PRIMARY KEY,
                client_id TEXT NOT NULL,
                fourmiz_id TEXT,
                status TEXT NOT NULL,
                proposed_amount TEXT NOT NULL,
                urgency_surcharge TEXT NOT NULL,
                fourmiz_amount TEXT NOT NULL,
                paid_with_wallet INTEGER NOT NULL DEFAULT 0,
                client_validated_at TEXT,
                fourmiz_validated_at TEXT,
                accepted_at TEXT,
                cancelled_at TEXT,
                cancelled_by TEXT,
                created_at TEXT NOT NULL
            )
            "#,
            r#"
            CREATE INDEX IF NOT EXISTS idx_orders_client
            ON orders(client_id)
            "#,
        ];

        for statement in statements {
            sqlx::query(statement)
                .execute(&self.pool)
                .await
                .map_err(StoreError::backend)?;
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_schema_init_is_idempotent() {
        let db = Database::in_memory().await.unwrap();
        db.init_schema().await.unwrap();
    }

    #[tokio::test]
    async fn test_open_creates_file() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("fourmiz.db");
        let _db = Database::open(&path).await.unwrap();
        assert!(path.exists());
    }
}
