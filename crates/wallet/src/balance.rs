//! WalletBalance - pure aggregation over a transaction snapshot
//!
//! The balance view is derived, never stored canonically: recomputing from
//! the same snapshot always yields the same result, so it cannot
//! desynchronize from the ledger.

use crate::transaction::{Transaction, TransactionKind, TransactionStatus};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Derived balance view of one account.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct WalletBalance {
    /// Sum of all completed transactions - the spendable position
    pub available_balance: Decimal,
    /// Sum of all pending transactions - informational, never spendable
    pub pending_balance: Decimal,
    /// Sum of positive completed amounts
    pub total_earned: Decimal,
    /// Absolute sum of completed withdrawals (stored negative)
    pub total_withdrawn: Decimal,
    /// Completed sum per transaction kind
    pub by_kind: BTreeMap<TransactionKind, Decimal>,
}

impl WalletBalance {
    /// Aggregate a transaction snapshot into a balance view.
    ///
    /// Pure function: no I/O, no mutation of the input.
    pub fn from_transactions(transactions: &[Transaction]) -> Self {
        let mut balance = WalletBalance::default();

        for tx in transactions {
            match tx.status {
                TransactionStatus::Completed => {
                    balance.available_balance += tx.amount;
                    if tx.amount > Decimal::ZERO {
                        balance.total_earned += tx.amount;
                    }
                    if tx.kind == TransactionKind::Withdrawal {
                        balance.total_withdrawn += tx.amount.abs();
                    }
                    *balance.by_kind.entry(tx.kind).or_default() += tx.amount;
                }
                TransactionStatus::Pending => {
                    balance.pending_balance += tx.amount;
                }
                TransactionStatus::Failed => {}
            }
        }

        balance
    }

    /// Completed sum for one kind (zero when the kind never occurred)
    pub fn kind_total(&self, kind: TransactionKind) -> Decimal {
        self.by_kind.get(&kind).copied().unwrap_or(Decimal::ZERO)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn tx(amount: Decimal, kind: TransactionKind, status: TransactionStatus) -> Transaction {
        Transaction::new("acc-1", amount, kind, status, None)
    }

    #[test]
    fn test_balance_arithmetic() {
        let txs = vec![
            tx(dec!(50), TransactionKind::ReferralBonus, TransactionStatus::Completed),
            tx(dec!(30), TransactionKind::Reward, TransactionStatus::Pending),
            tx(dec!(-20), TransactionKind::Withdrawal, TransactionStatus::Completed),
        ];

        let balance = WalletBalance::from_transactions(&txs);
        assert_eq!(balance.available_balance, dec!(30));
        assert_eq!(balance.pending_balance, dec!(30));
        assert_eq!(balance.total_withdrawn, dec!(20));
        assert_eq!(balance.total_earned, dec!(50));
    }

    #[test]
    fn test_failed_transactions_ignored() {
        let txs = vec![
            tx(dec!(100), TransactionKind::Reward, TransactionStatus::Completed),
            tx(dec!(999), TransactionKind::Reward, TransactionStatus::Failed),
        ];

        let balance = WalletBalance::from_transactions(&txs);
        assert_eq!(balance.available_balance, dec!(100));
        assert_eq!(balance.pending_balance, Decimal::ZERO);
    }

    #[test]
    fn test_by_kind_breakdown() {
        let txs = vec![
            tx(dec!(10), TransactionKind::ReferralBonus, TransactionStatus::Completed),
            tx(dec!(15), TransactionKind::ReferralBonus, TransactionStatus::Completed),
            tx(dec!(42.50), TransactionKind::ServiceCommission, TransactionStatus::Completed),
            tx(dec!(-45), TransactionKind::OrderPayment, TransactionStatus::Completed),
        ];

        let balance = WalletBalance::from_transactions(&txs);
        assert_eq!(balance.kind_total(TransactionKind::ReferralBonus), dec!(25));
        assert_eq!(balance.kind_total(TransactionKind::ServiceCommission), dec!(42.50));
        assert_eq!(balance.kind_total(TransactionKind::OrderPayment), dec!(-45));
        assert_eq!(balance.kind_total(TransactionKind::Withdrawal), Decimal::ZERO);
    }

    #[test]
    fn test_idempotent_over_same_snapshot() {
        let txs = vec![
            tx(dec!(50), TransactionKind::Reward, TransactionStatus::Completed),
            tx(dec!(-10), TransactionKind::Withdrawal, TransactionStatus::Completed),
        ];

        let first = WalletBalance::from_transactions(&txs);
        let second = WalletBalance::from_transactions(&txs);
        assert_eq!(first, second);
    }

    #[test]
    fn test_empty_snapshot_is_zero() {
        let balance = WalletBalance::from_transactions(&[]);
        assert_eq!(balance.available_balance, Decimal::ZERO);
        assert_eq!(balance.total_earned, Decimal::ZERO);
        assert!(balance.by_kind.is_empty());
    }
}
