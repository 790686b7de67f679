//! SQLite payout request store

use crate::convert::{parse_decimal, parse_enum, parse_timestamp};
use async_trait::async_trait;
use fourmiz_core::StoreError;
use fourmiz_notify::{ChangeEvent, ChangeNotifier, ChangeTable};
use fourmiz_payouts::{PayoutRequest, PayoutRequestStore, PayoutStatus};
use sqlx::sqlite::SqliteRow;
use sqlx::{Row, SqlitePool};

/// Payout request persistence over SQLite.
#[derive(Clone)]
pub struct SqlitePayoutRequestStore {
    pool: SqlitePool,
    notifier: Option<ChangeNotifier>,
}

impl SqlitePayoutRequestStore {
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

    async fn fetch(&self, id: &str) -> Result<PayoutRequest, StoreError> {
        let row = sqlx::query(
            "SELECT id, account_id, amount, method, destination, status, requested_at
             FROM payout_requests WHERE id = ?",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(StoreError::backend)?;

        match row {
            Some(row) => request_from_row(&row),
            None => Err(StoreError::NotFound(id.to_string())),
        }
    }
}

fn request_from_row(row: &SqliteRow) -> Result<PayoutRequest, StoreError> {
    let amount: String = row.get("amount");
    let method: String = row.get("method");
    let status: String = row.get("status");
    let requested_at: String = row.get("requested_at");

    Ok(PayoutRequest {
        id: row.get("id"),
        account_id: row.get("account_id"),
        amount: parse_decimal(&amount)?,
        method: parse_enum(&method)?,
        destination: row.get("destination"),
        status: parse_enum(&status)?,
        requested_at: parse_timestamp(&requested_at)?,
    })
}

#[async_trait]
impl PayoutRequestStore for SqlitePayoutRequestStore {
    async fn insert(&self, request: &PayoutRequest) -> Result<PayoutRequest, StoreError> {
        sqlx::query(
            "INSERT INTO payout_requests
             (id, account_id, amount, method, destination, status, requested_at)
             VALUES (?, ?, ?, ?, ?, ?, ?)",
        )
        .bind(&request.id)
        .bind(&request.account_id)
        .bind(request.amount.to_string())
        .bind(request.method.to_string())
        .bind(&request.destination)
        .bind(request.status.to_string())
        .bind(request.requested_at.to_rfc3339())
        .execute(&self.pool)
        .await
        .map_err(StoreError::backend)?;

        self.notify(ChangeEvent::inserted(
            ChangeTable::PayoutRequests,
            request.account_id.clone(),
        ));
        Ok(request.clone())
    }

    async fn get(&self, id: &str) -> Result<PayoutRequest, StoreError> {
        self.fetch(id).await
    }

    async fn list_by_account(
        &self,
        account_id: &str,
    ) -> Result<Vec<PayoutRequest>, StoreError> {
        let rows = sqlx::query(
            "SELECT id, account_id, amount, method, destination, status, requested_at
             FROM payout_requests WHERE account_id = ?
             ORDER BY requested_at DESC",
        )
        .bind(account_id)
        .fetch_all(&self.pool)
        .await
        .map_err(StoreError::backend)?;

        rows.iter().map(request_from_row).collect()
    }

    async fn list_pending_by_account(
        &self,
        account_id: &str,
    ) -> Result<Vec<PayoutRequest>, StoreError> {
        let rows = sqlx::query(
            "SELECT id, account_id, amount, method, destination, status, requested_at
             FROM payout_requests WHERE account_id = ? AND status = 'pending'
             ORDER BY requested_at ASC",
        )
        .bind(account_id)
        .fetch_all(&self.pool)
        .await
        .map_err(StoreError::backend)?;

        rows.iter().map(request_from_row).collect()
    }

    async fn mark(&self, id: &str, status: PayoutStatus) -> Result<PayoutRequest, StoreError> {
        let result = sqlx::query(
            "UPDATE payout_requests SET status = ? WHERE id = ? AND status = 'pending'",
        )
        .bind(status.to_string())
        .bind(id)
        .execute(&self.pool)
        .await
        .map_err(StoreError::backend)?;

        if result.rows_affected() == 0 {
            let existing = self.fetch(id).await?;
            return Err(StoreError::conflict(
                existing.id,
                "request is no longer pending",
            ));
        }

        let marked = self.fetch(id).await?;
        self.notify(ChangeEvent::updated(
            ChangeTable::PayoutRequests,
            marked.account_id.clone(),
        ));
        Ok(marked)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::Database;
    use fourmiz_core::Amount;
    use fourmiz_payouts::PayoutMethod;

    async fn store() -> SqlitePayoutRequestStore {
        let db = Database::in_memory().await.unwrap();
        SqlitePayoutRequestStore::new(db.pool().clone())
    }

    fn request(account_id: &str, amount: i64) -> PayoutRequest {
        PayoutRequest::new(
            account_id,
            Amount::from_major(amount),
            PayoutMethod::Paypal,
            "ada@example.com",
        )
    }

    #[tokio::test]
    async fn test_insert_get_roundtrip() {
        let store = store().await;
        let saved = store.insert(&request("acc-1", 25)).await.unwrap();

        let loaded = store.get(&saved.id).await.unwrap();
        assert_eq!(loaded, saved);
    }

    #[tokio::test]
    async fn test_list_pending_filters_resolved() {
        let store = store().await;
        let first = store.insert(&request("acc-1", 10)).await.unwrap();
        store.insert(&request("acc-1", 20)).await.unwrap();
        store.insert(&request("acc-2", 30)).await.unwrap();

        store.mark(&first.id, PayoutStatus::Rejected).await.unwrap();

        let pending = store.list_pending_by_account("acc-1").await.unwrap();
        assert_eq!(pending.len(), 1);
        assert_eq!(pending[0].amount, Amount::from_major(20).value());
    }

    #[tokio::test]
    async fn test_mark_pending_only() {
        let store = store().await;
        let saved = store.insert(&request("acc-1", 25)).await.unwrap();

        store.mark(&saved.id, PayoutStatus::Completed).await.unwrap();

        let err = store
            .mark(&saved.id, PayoutStatus::Rejected)
            .await
            .unwrap_err();
        assert!(err.is_conflict());

        let loaded = store.get(&saved.id).await.unwrap();
        assert_eq!(loaded.status, PayoutStatus::Completed);
    }

    #[tokio::test]
    async fn test_mark_missing_is_not_found() {
        let store = store().await;
        let err = store
            .mark("PAY-NOPE", PayoutStatus::Completed)
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::NotFound(_)));
    }
}
