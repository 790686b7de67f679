//! Transaction - immutable signed monetary event
//!
//! A transaction is never mutated after creation, with one exception: the
//! status may move pending -> completed or pending -> failed, at most once.
//! Withdrawals are stored with a negative amount; earnings are positive.

use chrono::{DateTime, Utc};
use fourmiz_core::id;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use strum_macros::{Display, EnumString};

/// What kind of monetary event a transaction records
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Serialize,
    Deserialize,
    EnumString,
    Display,
)]
#[strum(serialize_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum TransactionKind {
    ReferralBonus,
    ReferralCommission,
    ServiceCommission,
    Reward,
    OrderPayment,
    Withdrawal,
    Manual,
}

impl TransactionKind {
    /// Kinds credited by out-of-band earning events (always positive amounts)
    pub fn is_earning(&self) -> bool {
        matches!(
            self,
            TransactionKind::ReferralBonus
                | TransactionKind::ReferralCommission
                | TransactionKind::ServiceCommission
                | TransactionKind::Reward
        )
    }
}

/// Lifecycle status of a transaction
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    EnumString,
    Display,
)]
#[strum(serialize_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum TransactionStatus {
    Pending,
    Completed,
    Failed,
}

impl TransactionStatus {
    /// Only pending transactions may still change status
    pub fn is_terminal(&self) -> bool {
        !matches!(self, TransactionStatus::Pending)
    }
}

/// An immutable signed monetary event contributing to an account's balance.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Transaction {
    pub id: String,
    pub account_id: String,
    /// Signed amount: positive for credits, negative for debits/withdrawals
    pub amount: Decimal,
    pub kind: TransactionKind,
    pub status: TransactionStatus,
    /// Link to the originating record, e.g. `order:ORD-1A2B3C4D:credit`.
    /// Unique across the table when present - the exactly-once mechanism.
    pub source_ref: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl Transaction {
    /// Create a new transaction with a fresh id and timestamp
    pub fn new(
        account_id: impl Into<String>,
        amount: Decimal,
        kind: TransactionKind,
        status: TransactionStatus,
        source_ref: Option<String>,
    ) -> Self {
        Self {
            id: id::transaction_id(),
            account_id: account_id.into(),
            amount,
            kind,
            status,
            source_ref,
            created_at: Utc::now(),
        }
    }

    /// A completed credit (positive amount)
    pub fn credit(
        account_id: impl Into<String>,
        amount: Decimal,
        kind: TransactionKind,
        source_ref: Option<String>,
    ) -> Self {
        Self::new(account_id, amount, kind, TransactionStatus::Completed, source_ref)
    }

    /// A completed debit (amount stored negative)
    pub fn debit(
        account_id: impl Into<String>,
        amount: Decimal,
        kind: TransactionKind,
        source_ref: Option<String>,
    ) -> Self {
        Self::new(account_id, -amount, kind, TransactionStatus::Completed, source_ref)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_kind_roundtrip() {
        let kind: TransactionKind = "referral_bonus".parse().unwrap();
        assert_eq!(kind, TransactionKind::ReferralBonus);
        assert_eq!(TransactionKind::ServiceCommission.to_string(), "service_commission");
    }

    #[test]
    fn test_is_earning() {
        assert!(TransactionKind::ReferralBonus.is_earning());
        assert!(TransactionKind::Reward.is_earning());
        assert!(!TransactionKind::OrderPayment.is_earning());
        assert!(!TransactionKind::Withdrawal.is_earning());
    }

    #[test]
    fn test_status_terminal() {
        assert!(!TransactionStatus::Pending.is_terminal());
        assert!(TransactionStatus::Completed.is_terminal());
        assert!(TransactionStatus::Failed.is_terminal());
    }

    #[test]
    fn test_debit_stores_negative() {
        let tx = Transaction::debit("acc-1", dec!(45), TransactionKind::OrderPayment, None);
        assert_eq!(tx.amount, dec!(-45));
        assert_eq!(tx.status, TransactionStatus::Completed);
    }

    #[test]
    fn test_credit_stores_positive() {
        let tx = Transaction::credit(
            "acc-1",
            dec!(42.50),
            TransactionKind::ServiceCommission,
            Some("order:ORD-1:credit".to_string()),
        );
        assert_eq!(tx.amount, dec!(42.50));
        assert!(tx.id.starts_with("TXN-"));
    }

    #[test]
    fn test_serde_snake_case() {
        let tx = Transaction::credit("acc-1", dec!(1), TransactionKind::ReferralBonus, None);
        let json = serde_json::to_string(&tx).unwrap();
        assert!(json.contains(r#""kind":"referral_bonus""#));
        assert!(json.contains(r#""status":"completed""#));
    }
}
