//! Change events pushed by the persistence layer

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use strum_macros::{Display, EnumString};

/// Which table changed
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, EnumString, Display,
)]
#[strum(serialize_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum ChangeTable {
    Accounts,
    Transactions,
    PayoutRequests,
    Orders,
}

/// What happened to the row
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, EnumString, Display,
)]
#[strum(serialize_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum ChangeOp {
    Insert,
    Update,
}

/// A change notification for one account's data.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChangeEvent {
    pub table: ChangeTable,
    pub op: ChangeOp,
    pub account_id: String,
    pub at: DateTime<Utc>,
}

impl ChangeEvent {
    pub fn new(table: ChangeTable, op: ChangeOp, account_id: impl Into<String>) -> Self {
        Self {
            table,
            op,
            account_id: account_id.into(),
            at: Utc::now(),
        }
    }

    /// An inserted row
    pub fn inserted(table: ChangeTable, account_id: impl Into<String>) -> Self {
        Self::new(table, ChangeOp::Insert, account_id)
    }

    /// An updated row
    pub fn updated(table: ChangeTable, account_id: impl Into<String>) -> Self {
        Self::new(table, ChangeOp::Update, account_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_constructors() {
        let event = ChangeEvent::inserted(ChangeTable::Transactions, "acc-1");
        assert_eq!(event.table, ChangeTable::Transactions);
        assert_eq!(event.op, ChangeOp::Insert);
        assert_eq!(event.account_id, "acc-1");
    }

    #[test]
    fn test_table_roundtrip() {
        let table: ChangeTable = "payout_requests".parse().unwrap();
        assert_eq!(table, ChangeTable::PayoutRequests);
        assert_eq!(ChangeTable::Orders.to_string(), "orders");
    }
}
