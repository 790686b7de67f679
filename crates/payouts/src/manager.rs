//! PayoutManager - validates and records withdrawal intents
//!
//! Every precondition is checked against a fresh balance recompute, never a
//! cached value. Pending requests reserve funds: the withdrawable amount is
//! the available balance minus the sum of the account's pending requests,
//! so overlapping requests cannot oversubscribe the balance.

use crate::error::PayoutError;
use crate::request::{PayoutMethod, PayoutRequest};
use crate::store::PayoutRequestStore;
use fourmiz_core::{Amount, Role};
use fourmiz_roles::CapabilityResolver;
use fourmiz_wallet::WalletLedger;
use rust_decimal::Decimal;
use std::sync::Arc;

/// Payout policy knobs
#[derive(Debug, Clone)]
pub struct PayoutConfig {
    /// Canonical minimum payout amount
    pub min_payout: Decimal,
}

impl Default for PayoutConfig {
    fn default() -> Self {
        Self {
            min_payout: Decimal::new(10, 0),
        }
    }
}

/// Validates and records payout requests.
#[derive(Clone)]
pub struct PayoutManager {
    resolver: CapabilityResolver,
    ledger: WalletLedger,
    requests: Arc<dyn PayoutRequestStore>,
    config: PayoutConfig,
}

impl PayoutManager {
    pub fn new(
        resolver: CapabilityResolver,
        ledger: WalletLedger,
        requests: Arc<dyn PayoutRequestStore>,
        config: PayoutConfig,
    ) -> Self {
        Self {
            resolver,
            ledger,
            requests,
            config,
        }
    }

    pub fn config(&self) -> &PayoutConfig {
        &self.config
    }

    /// Record a withdrawal intent.
    ///
    /// Preconditions, all checked at call time:
    /// 1. the account holds the fourmiz role with a complete profile
    /// 2. the amount meets the minimum payout
    /// 3. the amount fits the available balance minus pending reservations
    /// 4. the destination is valid for the method
    ///
    /// Any violation returns a specific error and persists nothing.
    pub async fn request(
        &self,
        account_id: &str,
        amount: Amount,
        method: PayoutMethod,
        destination: &str,
    ) -> Result<PayoutRequest, PayoutError> {
        let capabilities = self.resolver.resolve(account_id).await?;
        if !capabilities.has_role(Role::Fourmiz) {
            return Err(PayoutError::NotFourmiz(account_id.to_string()));
        }
        if !capabilities.profile_complete {
            return Err(PayoutError::ProfileIncomplete(account_id.to_string()));
        }

        if amount.value() < self.config.min_payout {
            return Err(PayoutError::BelowMinimum {
                amount: amount.value(),
                minimum: self.config.min_payout,
            });
        }

        let balance = self.ledger.compute_balance(account_id).await?;
        let reserved: Decimal = self
            .requests
            .list_pending_by_account(account_id)
            .await?
            .iter()
            .map(|r| r.amount)
            .sum();
        let withdrawable = balance.available_balance - reserved;

        if amount.value() > withdrawable {
            return Err(PayoutError::InsufficientFunds {
                requested: amount.value(),
                withdrawable,
            });
        }

        validate_destination(method, destination)?;

        let request = PayoutRequest::new(account_id, amount, method, destination);
        let saved = self.requests.insert(&request).await?;
        tracing::info!(
            account_id,
            request_id = %saved.id,
            amount = %saved.amount,
            method = %saved.method,
            "payout request recorded"
        );
        Ok(saved)
    }
}

/// Method-specific destination validation.
///
/// Paypal destinations must be email-shaped; gift cards and vouchers only
/// need a non-empty destination.
pub fn validate_destination(
    method: PayoutMethod,
    destination: &str,
) -> Result<(), PayoutError> {
    let destination = destination.trim();
    match method {
        PayoutMethod::Paypal => {
            let Some((local, domain)) = destination.split_once('@') else {
                return Err(PayoutError::InvalidDestination {
                    method,
                    reason: "expected an email address",
                });
            };
            if local.is_empty() || domain.is_empty() || !domain.contains('.') {
                return Err(PayoutError::InvalidDestination {
                    method,
                    reason: "expected an email address",
                });
            }
            Ok(())
        }
        PayoutMethod::GiftCard | PayoutMethod::Voucher => {
            if destination.is_empty() {
                return Err(PayoutError::InvalidDestination {
                    method,
                    reason: "destination cannot be empty",
                });
            }
            Ok(())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_paypal_destination_must_be_email_shaped() {
        assert!(validate_destination(PayoutMethod::Paypal, "ada@example.com").is_ok());
        assert!(validate_destination(PayoutMethod::Paypal, "ada@example").is_err());
        assert!(validate_destination(PayoutMethod::Paypal, "not-an-email").is_err());
        assert!(validate_destination(PayoutMethod::Paypal, "@example.com").is_err());
    }

    #[test]
    fn test_gift_card_destination_non_empty() {
        assert!(validate_destination(PayoutMethod::GiftCard, "CARD-123").is_ok());
        assert!(validate_destination(PayoutMethod::GiftCard, "   ").is_err());
        assert!(validate_destination(PayoutMethod::Voucher, "").is_err());
    }

    #[test]
    fn test_default_minimum() {
        assert_eq!(PayoutConfig::default().min_payout, Decimal::new(10, 0));
    }
}
