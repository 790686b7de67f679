//! Order - the jointly-owned lifecycle record
//!
//! An order belongs to its client from creation and to its fourmiz from
//! acceptance. `completed` and `cancelled` are terminal; nothing
//! transitions out of them.

use chrono::{DateTime, Utc};
use fourmiz_core::{id, Amount};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use strum_macros::{Display, EnumString};

/// Lifecycle status of an order
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, EnumString, Display,
)]
#[strum(serialize_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum OrderStatus {
    Pending,
    Accepted,
    InProgress,
    Completed,
    Cancelled,
}

impl OrderStatus {
    pub fn is_terminal(&self) -> bool {
        matches!(self, OrderStatus::Completed | OrderStatus::Cancelled)
    }

    /// The legal transitions of the state machine
    pub fn can_transition_to(&self, next: OrderStatus) -> bool {
        use OrderStatus::*;
        matches!(
            (self, next),
            (Pending, Accepted)
                | (Pending, Cancelled)
                | (Accepted, InProgress)
                | (Accepted, Cancelled)
                | (InProgress, Completed)
        )
    }
}

/// The order counterparties
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, EnumString, Display,
)]
#[strum(serialize_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum OrderParty {
    Client,
    Fourmiz,
}

/// Who triggered a cancellation
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, EnumString, Display,
)]
#[strum(serialize_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum CancelActor {
    Client,
    System,
}

/// Caller-supplied order parameters
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderSpec {
    pub proposed_amount: Amount,
    pub urgency_surcharge: Amount,
    /// What the fourmiz earns on completion (total minus service fee)
    pub fourmiz_amount: Amount,
}

impl OrderSpec {
    /// The amount debited from the client wallet
    pub fn total(&self) -> Decimal {
        self.proposed_amount.value() + self.urgency_surcharge.value()
    }
}

/// The persisted order record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Order {
    pub id: String,
    pub client_id: String,
    pub fourmiz_id: Option<String>,
    pub status: OrderStatus,
    pub proposed_amount: Decimal,
    pub urgency_surcharge: Decimal,
    pub fourmiz_amount: Decimal,
    /// True when creation debited the client wallet
    pub paid_with_wallet: bool,
    pub client_validated_at: Option<DateTime<Utc>>,
    pub fourmiz_validated_at: Option<DateTime<Utc>>,
    pub accepted_at: Option<DateTime<Utc>>,
    pub cancelled_at: Option<DateTime<Utc>>,
    pub cancelled_by: Option<CancelActor>,
    pub created_at: DateTime<Utc>,
}

impl Order {
    /// A fresh pending order for `client_id`
    pub fn new(client_id: impl Into<String>, spec: &OrderSpec, paid_with_wallet: bool) -> Self {
        Self {
            id: id::order_id(),
            client_id: client_id.into(),
            fourmiz_id: None,
            status: OrderStatus::Pending,
            proposed_amount: spec.proposed_amount.value(),
            urgency_surcharge: spec.urgency_surcharge.value(),
            fourmiz_amount: spec.fourmiz_amount.value(),
            paid_with_wallet,
            client_validated_at: None,
            fourmiz_validated_at: None,
            accepted_at: None,
            cancelled_at: None,
            cancelled_by: None,
            created_at: Utc::now(),
        }
    }

    /// The amount debited at creation
    pub fn total(&self) -> Decimal {
        self.proposed_amount + self.urgency_surcharge
    }

    /// Both counterparties confirmed completion
    pub fn both_validated(&self) -> bool {
        self.client_validated_at.is_some() && self.fourmiz_validated_at.is_some()
    }

    /// Unique ledger reference of the creation debit
    pub fn debit_ref(&self) -> String {
        format!("order:{}", self.id)
    }

    /// Unique ledger reference of the completion credit
    pub fn credit_ref(&self) -> String {
        format!("order:{}:credit", self.id)
    }

    /// Unique ledger reference of the cancellation refund
    pub fn refund_ref(&self) -> String {
        format!("order:{}:refund", self.id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn spec() -> OrderSpec {
        OrderSpec {
            proposed_amount: Amount::new(dec!(40)).unwrap(),
            urgency_surcharge: Amount::new(dec!(5)).unwrap(),
            fourmiz_amount: Amount::new(dec!(42.50)).unwrap(),
        }
    }

    #[test]
    fn test_total_includes_surcharge() {
        assert_eq!(spec().total(), dec!(45));
    }

    #[test]
    fn test_new_order_is_pending_and_unassigned() {
        let order = Order::new("client-1", &spec(), true);
        assert!(order.id.starts_with("ORD-"));
        assert_eq!(order.status, OrderStatus::Pending);
        assert!(order.fourmiz_id.is_none());
        assert!(!order.both_validated());
    }

    #[test]
    fn test_legal_transitions() {
        use OrderStatus::*;
        assert!(Pending.can_transition_to(Accepted));
        assert!(Pending.can_transition_to(Cancelled));
        assert!(Accepted.can_transition_to(InProgress));
        assert!(Accepted.can_transition_to(Cancelled));
        assert!(InProgress.can_transition_to(Completed));
    }

    #[test]
    fn test_illegal_transitions() {
        use OrderStatus::*;
        assert!(!Pending.can_transition_to(InProgress));
        assert!(!Pending.can_transition_to(Completed));
        assert!(!InProgress.can_transition_to(Cancelled));
        assert!(!Completed.can_transition_to(Cancelled));
        assert!(!Cancelled.can_transition_to(Pending));
        assert!(!Completed.can_transition_to(InProgress));
    }

    #[test]
    fn test_terminal_states() {
        assert!(OrderStatus::Completed.is_terminal());
        assert!(OrderStatus::Cancelled.is_terminal());
        assert!(!OrderStatus::InProgress.is_terminal());
    }

    #[test]
    fn test_ledger_refs_are_distinct() {
        let order = Order::new("client-1", &spec(), true);
        assert_ne!(order.debit_ref(), order.credit_ref());
        assert_ne!(order.credit_ref(), order.refund_ref());
        assert!(order.credit_ref().ends_with(":credit"));
    }

    #[test]
    fn test_status_roundtrip() {
        let status: OrderStatus = "in_progress".parse().unwrap();
        assert_eq!(status, OrderStatus::InProgress);
        assert_eq!(OrderStatus::Cancelled.to_string(), "cancelled");
    }
}
