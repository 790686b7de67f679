//! Prefixed record identifiers
//!
//! Transaction, payout and order rows carry short prefixed ids so a raw id
//! in a log line is self-describing.

use uuid::Uuid;

/// New transaction id, e.g. `TXN-9F2C41AB`
pub fn transaction_id() -> String {
    prefixed("TXN")
}

/// New payout request id, e.g. `PAY-0B7D3E55`
pub fn payout_id() -> String {
    prefixed("PAY")
}

/// New order id, e.g. `ORD-5A11C802`
pub fn order_id() -> String {
    prefixed("ORD")
}

fn prefixed(prefix: &str) -> String {
    format!(
        "{}-{}",
        prefix,
        Uuid::new_v4().simple().to_string()[..8].to_uppercase()
    )
}
