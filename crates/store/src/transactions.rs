//! SQLite transaction store - append-only with exactly-once source refs

use crate::convert::{is_unique_violation, parse_decimal, parse_enum, parse_timestamp};
use async_trait::async_trait;
use fourmiz_core::StoreError;
use fourmiz_notify::{ChangeEvent, ChangeNotifier, ChangeTable};
use fourmiz_wallet::{Transaction, TransactionStatus, TransactionStore};
use sqlx::sqlite::SqliteRow;
use sqlx::{Row, SqlitePool};

/// Transaction persistence over SQLite.
#[derive(Clone)]
pub struct SqliteTransactionStore {
    pool: SqlitePool,
    notifier: Option<ChangeNotifier>,
}

impl SqliteTransactionStore {
    pub fn new(pool: SqlitePool) -> Self {
        Self {
            pool,
            notifier: None,
        }
    }

    pub fn with_notifier(pool: SqlitePool, notifier: ChangeNotifier) -> Self {
        Self {
            pool,
            notifier: Some(notifier),
        }
    }

    fn notify(&self, event: ChangeEvent) {
        if let Some(notifier) = &self.notifier {
            notifier.publish(event);
        }
    }
}

pub(crate) fn transaction_from_row(row: &SqliteRow) -> Result<Transaction, StoreError> {
    let amount: String = row.get("amount");
    let kind: String = row.get("kind");
    let status: String = row.get("status");
    let created_at: String = row.get("created_at");

    Ok(Transaction {
        id: row.get("id"),
        account_id: row.get("account_id"),
        amount: parse_decimal(&amount)?,
        kind: parse_enum(&kind)?,
        status: parse_enum(&status)?,
        source_ref: row.get("source_ref"),
        created_at: parse_timestamp(&created_at)?,
    })
}

#[async_trait]
impl TransactionStore for SqliteTransactionStore {
    async fn append(&self, tx: Transaction) -> Result<Transaction, StoreError> {
        let result = sqlx::query(
            "INSERT INTO transactions
             (id, account_id, amount, kind, status, source_ref, created_at)
             VALUES (?, ?, ?, ?, ?, ?, ?)",
        )
        .bind(&tx.id)
        .bind(&tx.account_id)
        .bind(tx.amount.to_string())
        .bind(tx.kind.to_string())
        .bind(tx.status.to_string())
        .bind(&tx.source_ref)
        .bind(tx.created_at.to_rfc3339())
        .execute(&self.pool)
        .await;

        match result {
            Ok(_) => {
                self.notify(ChangeEvent::inserted(
                    ChangeTable::Transactions,
                    tx.account_id.clone(),
                ));
                Ok(tx)
            }
            Err(err) if is_unique_violation(&err) => {
                let reference = tx.source_ref.unwrap_or(tx.id);
                Err(StoreError::DuplicateSourceRef(reference))
            }
            Err(err) => Err(StoreError::backend(err)),
        }
    }

    async fn list_by_account(&self, account_id: &str) -> Result<Vec<Transaction>, StoreError> {
        // One SELECT is one SQLite snapshot - no partial view under
        // concurrent inserts.
        let rows = sqlx::query(
            "SELECT id, account_id, amount, kind, status, source_ref, created_at
             FROM transactions WHERE account_id = ?
             ORDER BY created_at ASC, id ASC",
        )
        .bind(account_id)
        .fetch_all(&self.pool)
        .await
        .map_err(StoreError::backend)?;

        rows.iter().map(transaction_from_row).collect()
    }

    async fn get(&self, id: &str) -> Result<Transaction, StoreError> {
        let row = sqlx::query(
            "SELECT id, account_id, amount, kind, status, source_ref, created_at
             FROM transactions WHERE id = ?",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(StoreError::backend)?;

        match row {
            Some(row) => transaction_from_row(&row),
            None => Err(StoreError::NotFound(id.to_string())),
        }
    }

    async fn settle(
        &self,
        id: &str,
        status: TransactionStatus,
    ) -> Result<Transaction, StoreError> {
        if !status.is_terminal() {
            return Err(StoreError::conflict(id, "settle requires a terminal status"));
        }

        let result = sqlx::query(
            "UPDATE transactions SET status = ? WHERE id = ? AND status = 'pending'",
        )
        .bind(status.to_string())
        .bind(id)
        .execute(&self.pool)
        .await
        .map_err(StoreError::backend)?;

        if result.rows_affected() == 0 {
            // Either the row is gone or it already left pending.
            let existing = self.get(id).await?;
            return Err(StoreError::conflict(
                existing.id,
                "transaction is no longer pending",
            ));
        }

        let settled = self.get(id).await?;
        self.notify(ChangeEvent::updated(
            ChangeTable::Transactions,
            settled.account_id.clone(),
        ));
        Ok(settled)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::Database;
    use fourmiz_wallet::TransactionKind;
    use rust_decimal_macros::dec;

    async fn store() -> SqliteTransactionStore {
        let db = Database::in_memory().await.unwrap();
        SqliteTransactionStore::new(db.pool().clone())
    }

    #[tokio::test]
    async fn test_append_and_list_roundtrip() {
        let store = store().await;
        store
            .append(Transaction::credit(
                "acc-1",
                dec!(42.50),
                TransactionKind::ServiceCommission,
                Some("order:ORD-1:credit".to_string()),
            ))
            .await
            .unwrap();
        store
            .append(Transaction::debit(
                "acc-1",
                dec!(20),
                TransactionKind::Withdrawal,
                None,
            ))
            .await
            .unwrap();

        let listed = store.list_by_account("acc-1").await.unwrap();
        assert_eq!(listed.len(), 2);
        assert_eq!(listed[0].amount, dec!(42.50));
        assert_eq!(listed[1].amount, dec!(-20));
    }

    #[tokio::test]
    async fn test_duplicate_source_ref_rejected() {
        let store = store().await;
        let reference = "order:ORD-1:credit".to_string();

        store
            .append(Transaction::credit(
                "acc-1",
                dec!(42.50),
                TransactionKind::ServiceCommission,
                Some(reference.clone()),
            ))
            .await
            .unwrap();

        let err = store
            .append(Transaction::credit(
                "acc-1",
                dec!(42.50),
                TransactionKind::ServiceCommission,
                Some(reference),
            ))
            .await
            .unwrap_err();
        assert!(err.is_duplicate());

        // Exactly one row survived.
        assert_eq!(store.list_by_account("acc-1").await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_null_source_refs_do_not_collide() {
        let store = store().await;
        for _ in 0..3 {
            store
                .append(Transaction::credit(
                    "acc-1",
                    dec!(5),
                    TransactionKind::Reward,
                    None,
                ))
                .await
                .unwrap();
        }
        assert_eq!(store.list_by_account("acc-1").await.unwrap().len(), 3);
    }

    #[tokio::test]
    async fn test_settle_pending_once() {
        let store = store().await;
        let tx = store
            .append(Transaction::new(
                "acc-1",
                dec!(10),
                TransactionKind::ReferralBonus,
                TransactionStatus::Pending,
                None,
            ))
            .await
            .unwrap();

        let settled = store
            .settle(&tx.id, TransactionStatus::Completed)
            .await
            .unwrap();
        assert_eq!(settled.status, TransactionStatus::Completed);

        // The transition happens at most once.
        let err = store
            .settle(&tx.id, TransactionStatus::Failed)
            .await
            .unwrap_err();
        assert!(err.is_conflict());
    }

    #[tokio::test]
    async fn test_settle_to_pending_rejected() {
        let store = store().await;
        let tx = store
            .append(Transaction::new(
                "acc-1",
                dec!(10),
                TransactionKind::ReferralBonus,
                TransactionStatus::Pending,
                None,
            ))
            .await
            .unwrap();

        let err = store
            .settle(&tx.id, TransactionStatus::Pending)
            .await
            .unwrap_err();
        assert!(err.is_conflict());
    }
}
