//! SQLite order store - guarded lifecycle transitions
//!
//! Every mutating statement carries its precondition in the WHERE clause,
//! so a transition that lost a race affects zero rows and is reported as a
//! conflict instead of silently overwriting.

use crate::convert::{
    is_unique_violation, parse_decimal, parse_enum, parse_opt_timestamp, parse_timestamp,
};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use fourmiz_core::StoreError;
use fourmiz_notify::{ChangeEvent, ChangeNotifier, ChangeTable};
use fourmiz_orders::{CancelActor, Order, OrderParty, OrderStore};
use fourmiz_wallet::Transaction;
use sqlx::sqlite::SqliteRow;
use sqlx::{Row, SqlitePool};

/// Order persistence over SQLite.
#[derive(Clone)]
pub struct SqliteOrderStore {
    pool: SqlitePool,
    notifier: Option<ChangeNotifier>,
}

impl SqliteOrderStore {
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

    async fn fetch(&self, order_id: &str) -> Result<Order, StoreError> {
        let row = sqlx::query(
            "SELECT id, client_id, fourmiz_id, status, proposed_amount, urgency_surcharge,
                    fourmiz_amount, paid_with_wallet, client_validated_at,
                    fourmiz_validated_at, accepted_at, cancelled_at, cancelled_by, created_at
             FROM orders WHERE id = ?",
        )
        .bind(order_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(StoreError::backend)?;

        match row {
            Some(row) => order_from_row(&row),
            None => Err(StoreError::NotFound(order_id.to_string())),
        }
    }

    /// Re-read after a zero-row guarded update to tell "gone" from "guard
    /// failed".
    async fn guard_failed(&self, order_id: &str, reason: &'static str) -> StoreError {
        match self.fetch(order_id).await {
            Ok(_) => StoreError::conflict(order_id, reason),
            Err(err) => err,
        }
    }
}

fn order_from_row(row: &SqliteRow) -> Result<Order, StoreError> {
    let status: String = row.get("status");
    let proposed_amount: String = row.get("proposed_amount");
    let urgency_surcharge: String = row.get("urgency_surcharge");
    let fourmiz_amount: String = row.get("fourmiz_amount");
    let cancelled_by: Option<String> = row.get("cancelled_by");
    let created_at: String = row.get("created_at");

    Ok(Order {
        id: row.get("id"),
        client_id: row.get("client_id"),
        fourmiz_id: row.get("fourmiz_id"),
        status: parse_enum(&status)?,
        proposed_amount: parse_decimal(&proposed_amount)?,
        urgency_surcharge: parse_decimal(&urgency_surcharge)?,
        fourmiz_amount: parse_decimal(&fourmiz_amount)?,
        paid_with_wallet: row.get("paid_with_wallet"),
        client_validated_at: parse_opt_timestamp(row.get("client_validated_at"))?,
        fourmiz_validated_at: parse_opt_timestamp(row.get("fourmiz_validated_at"))?,
        accepted_at: parse_opt_timestamp(row.get("accepted_at"))?,
        cancelled_at: parse_opt_timestamp(row.get("cancelled_at"))?,
        cancelled_by: cancelled_by.as_deref().map(parse_enum).transpose()?,
        created_at: parse_timestamp(&created_at)?,
    })
}

const INSERT_ORDER: &str = "INSERT INTO orders
     (id, client_id, fourmiz_id, status, proposed_amount, urgency_surcharge,
      fourmiz_amount, paid_with_wallet, created_at)
     VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)";

#[async_trait]
impl OrderStore for SqliteOrderStore {
    async fn insert(&self, order: &Order) -> Result<Order, StoreError> {
        sqlx::query(INSERT_ORDER)
            .bind(&order.id)
            .bind(&order.client_id)
            .bind(&order.fourmiz_id)
            .bind(order.status.to_string())
            .bind(order.proposed_amount.to_string())
            .bind(order.urgency_surcharge.to_string())
            .bind(order.fourmiz_amount.to_string())
            .bind(order.paid_with_wallet)
            .bind(order.created_at.to_rfc3339())
            .execute(&self.pool)
            .await
            .map_err(StoreError::backend)?;

        self.notify(ChangeEvent::inserted(
            ChangeTable::Orders,
            order.client_id.clone(),
        ));
        Ok(order.clone())
    }

    async fn insert_paid(
        &self,
        order: &Order,
        debit: &Transaction,
    ) -> Result<Order, StoreError> {
        let mut db_tx = self.pool.begin().await.map_err(StoreError::backend)?;

        sqlx::query(INSERT_ORDER)
            .bind(&order.id)
            .bind(&order.client_id)
            .bind(&order.fourmiz_id)
            .bind(order.status.to_string())
            .bind(order.proposed_amount.to_string())
            .bind(order.urgency_surcharge.to_string())
            .bind(order.fourmiz_amount.to_string())
            .bind(order.paid_with_wallet)
            .bind(order.created_at.to_rfc3339())
            .execute(&mut *db_tx)
            .await
            .map_err(StoreError::backend)?;

        let debit_result = sqlx::query(
            "INSERT INTO transactions
             (id, account_id, amount, kind, status, source_ref, created_at)
             VALUES (?, ?, ?, ?, ?, ?, ?)",
        )
        .bind(&debit.id)
        .bind(&debit.account_id)
        .bind(debit.amount.to_string())
        .bind(debit.kind.to_string())
        .bind(debit.status.to_string())
        .bind(&debit.source_ref)
        .bind(debit.created_at.to_rfc3339())
        .execute(&mut *db_tx)
        .await;

        match debit_result {
            Ok(_) => {}
            // Dropping db_tx rolls back: the order insert is undone too.
            Err(err) if is_unique_violation(&err) => {
                let reference = debit.source_ref.clone().unwrap_or_else(|| debit.id.clone());
                return Err(StoreError::DuplicateSourceRef(reference));
            }
            Err(err) => return Err(StoreError::backend(err)),
        }

        db_tx.commit().await.map_err(StoreError::backend)?;
        tracing::debug!(order_id = %order.id, debit_id = %debit.id, "order and debit committed");

        self.notify(ChangeEvent::inserted(
            ChangeTable::Orders,
            order.client_id.clone(),
        ));
        self.notify(ChangeEvent::inserted(
            ChangeTable::Transactions,
            debit.account_id.clone(),
        ));
        Ok(order.clone())
    }

    async fn get(&self, order_id: &str) -> Result<Order, StoreError> {
        self.fetch(order_id).await
    }

    async fn claim(
        &self,
        order_id: &str,
        fourmiz_id: &str,
        at: DateTime<Utc>,
    ) -> Result<Order, StoreError> {
        let result = sqlx::query(
            "UPDATE orders SET status = 'accepted', fourmiz_id = ?, accepted_at = ?
             WHERE id = ? AND status = 'pending' AND fourmiz_id IS NULL",
        )
        .bind(fourmiz_id)
        .bind(at.to_rfc3339())
        .bind(order_id)
        .execute(&self.pool)
        .await
        .map_err(StoreError::backend)?;

        if result.rows_affected() == 0 {
            return Err(self.guard_failed(order_id, "order already claimed").await);
        }

        let claimed = self.fetch(order_id).await?;
        self.notify(ChangeEvent::updated(
            ChangeTable::Orders,
            claimed.client_id.clone(),
        ));
        Ok(claimed)
    }

    async fn start(&self, order_id: &str) -> Result<Order, StoreError> {
        let result = sqlx::query(
            "UPDATE orders SET status = 'in_progress'
             WHERE id = ? AND status = 'accepted'",
        )
        .bind(order_id)
        .execute(&self.pool)
        .await
        .map_err(StoreError::backend)?;

        if result.rows_affected() == 0 {
            return Err(self.guard_failed(order_id, "order is not accepted").await);
        }

        self.fetch(order_id).await
    }

    async fn set_validation(
        &self,
        order_id: &str,
        party: OrderParty,
        at: DateTime<Utc>,
    ) -> Result<Order, StoreError> {
        // COALESCE keeps the first timestamp: repeating a validation is a
        // no-op, not an overwrite.
        let statement = match party {
            OrderParty::Client => {
                "UPDATE orders SET client_validated_at = COALESCE(client_validated_at, ?)
                 WHERE id = ?"
            }
            OrderParty::Fourmiz => {
                "UPDATE orders SET fourmiz_validated_at = COALESCE(fourmiz_validated_at, ?)
                 WHERE id = ?"
            }
        };

        let result = sqlx::query(statement)
            .bind(at.to_rfc3339())
            .bind(order_id)
            .execute(&self.pool)
            .await
            .map_err(StoreError::backend)?;

        if result.rows_affected() == 0 {
            return Err(StoreError::NotFound(order_id.to_string()));
        }

        self.fetch(order_id).await
    }

    async fn complete(&self, order_id: &str) -> Result<Order, StoreError> {
        let result = sqlx::query(
            "UPDATE orders SET status = 'completed'
             WHERE id = ? AND status = 'in_progress'",
        )
        .bind(order_id)
        .execute(&self.pool)
        .await
        .map_err(StoreError::backend)?;

        if result.rows_affected() == 0 {
            return Err(self.guard_failed(order_id, "order is not in progress").await);
        }

        let completed = self.fetch(order_id).await?;
        self.notify(ChangeEvent::updated(
            ChangeTable::Orders,
            completed.client_id.clone(),
        ));
        Ok(completed)
    }

    async fn cancel(
        &self,
        order_id: &str,
        by: CancelActor,
        at: DateTime<Utc>,
    ) -> Result<Order, StoreError> {
        let result = sqlx::query(
            "UPDATE orders SET status = 'cancelled', cancelled_at = ?, cancelled_by = ?
             WHERE id = ? AND status IN ('pending', 'accepted')",
        )
        .bind(at.to_rfc3339())
        .bind(by.to_string())
        .bind(order_id)
        .execute(&self.pool)
        .await
        .map_err(StoreError::backend)?;

        if result.rows_affected() == 0 {
            return Err(self
                .guard_failed(order_id, "order can no longer be cancelled")
                .await);
        }

        let cancelled = self.fetch(order_id).await?;
        self.notify(ChangeEvent::updated(
            ChangeTable::Orders,
            cancelled.client_id.clone(),
        ));
        Ok(cancelled)
    }
}
