//! PayoutRequest - a user-initiated withdrawal intent

use chrono::{DateTime, Utc};
use fourmiz_core::{id, Amount};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use strum_macros::{Display, EnumString};

/// How the payout should be delivered
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, EnumString, Display,
)]
#[strum(serialize_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum PayoutMethod {
    Paypal,
    GiftCard,
    Voucher,
}

/// Lifecycle status of a payout request
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, EnumString, Display,
)]
#[strum(serialize_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum PayoutStatus {
    /// Awaiting back-office resolution; reserves funds against new requests
    Pending,
    /// Settled - a withdrawal transaction exists for it
    Completed,
    /// Rejected - the reservation is released, no transaction exists
    Rejected,
}

/// A withdrawal intent awaiting settlement.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PayoutRequest {
    pub id: String,
    pub account_id: String,
    /// Requested amount, always positive; the eventual withdrawal
    /// transaction is stored negative
    pub amount: Decimal,
    pub method: PayoutMethod,
    pub destination: String,
    pub status: PayoutStatus,
    pub requested_at: DateTime<Utc>,
}

impl PayoutRequest {
    pub fn new(
        account_id: impl Into<String>,
        amount: Amount,
        method: PayoutMethod,
        destination: impl Into<String>,
    ) -> Self {
        Self {
            id: id::payout_id(),
            account_id: account_id.into(),
            amount: amount.value(),
            method,
            destination: destination.into(),
            status: PayoutStatus::Pending,
            requested_at: Utc::now(),
        }
    }

    /// The unique ledger reference of this request's settlement
    pub fn settlement_ref(&self) -> String {
        format!("payout:{}", self.id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_request_is_pending() {
        let request = PayoutRequest::new(
            "acc-1",
            Amount::from_major(25),
            PayoutMethod::Paypal,
            "ada@example.com",
        );
        assert!(request.id.starts_with("PAY-"));
        assert_eq!(request.status, PayoutStatus::Pending);
    }

    #[test]
    fn test_settlement_ref_embeds_id() {
        let request = PayoutRequest::new(
            "acc-1",
            Amount::from_major(25),
            PayoutMethod::Voucher,
            "VOUCHER-CODE",
        );
        assert_eq!(request.settlement_ref(), format!("payout:{}", request.id));
    }

    #[test]
    fn test_method_roundtrip() {
        let method: PayoutMethod = "gift_card".parse().unwrap();
        assert_eq!(method, PayoutMethod::GiftCard);
        assert_eq!(PayoutMethod::Paypal.to_string(), "paypal");
    }
}
