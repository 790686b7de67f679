//! OrderWalletBridge - couples order lifecycle transitions to the ledger
//!
//! Three ledger touchpoints, each with its own guarantee:
//! - creation: order insert + client debit are both-or-neither
//! - completion: the fourmiz credit happens exactly once per order, even
//!   when the validation event is delivered twice
//! - cancellation: a wallet-funded order refunds the client exactly once

use crate::error::OrderError;
use crate::order::{CancelActor, Order, OrderParty, OrderSpec, OrderStatus};
use crate::store::OrderStore;
use chrono::Utc;
use fourmiz_core::Role;
use fourmiz_roles::CapabilityResolver;
use fourmiz_wallet::{Transaction, TransactionKind, TransactionStore, WalletLedger};
use std::sync::Arc;

/// Outcome of a completion-credit attempt
#[derive(Debug, Clone, PartialEq)]
pub enum CreditOutcome {
    /// The service commission was credited to the fourmiz
    Credited(Transaction),
    /// The order was already credited - duplicate event, no-op
    AlreadyCredited,
}

/// Couples the order lifecycle to wallet debits and credits.
#[derive(Clone)]
pub struct OrderWalletBridge {
    resolver: CapabilityResolver,
    ledger: WalletLedger,
    transactions: Arc<dyn TransactionStore>,
    orders: Arc<dyn OrderStore>,
}

impl OrderWalletBridge {
    pub fn new(
        resolver: CapabilityResolver,
        ledger: WalletLedger,
        transactions: Arc<dyn TransactionStore>,
        orders: Arc<dyn OrderStore>,
    ) -> Self {
        Self {
            resolver,
            ledger,
            transactions,
            orders,
        }
    }

    /// Create an order funded from the client wallet.
    ///
    /// The order row and the debit transaction are inserted atomically; a
    /// failure of either write commits neither, so no paid order can exist
    /// without its matching debit.
    pub async fn create_wallet_order(
        &self,
        client_id: &str,
        spec: &OrderSpec,
    ) -> Result<Order, OrderError> {
        let capabilities = self.resolver.resolve(client_id).await?;
        if !capabilities.has_role(Role::Client) {
            return Err(OrderError::NotClient(client_id.to_string()));
        }

        let total = spec.total();
        if spec.fourmiz_amount.value() > total {
            return Err(OrderError::FourmizAmountExceedsTotal {
                fourmiz_amount: spec.fourmiz_amount.value(),
                total,
            });
        }

        // Fresh recompute - a cached balance is never authoritative.
        let balance = self.ledger.compute_balance(client_id).await?;
        if balance.available_balance < total {
            return Err(OrderError::InsufficientFunds {
                required: total,
                available: balance.available_balance,
            });
        }

        let order = Order::new(client_id, spec, true);
        let debit = Transaction::debit(
            client_id,
            total,
            TransactionKind::OrderPayment,
            Some(order.debit_ref()),
        );

        let saved = self.orders.insert_paid(&order, &debit).await?;
        tracing::info!(client_id, order_id = %saved.id, %total, "wallet order created");
        Ok(saved)
    }

    /// Read-only observation, open to any account.
    pub async fn get_order(&self, order_id: &str) -> Result<Order, OrderError> {
        Ok(self.orders.get(order_id).await?)
    }

    /// A fourmiz claims a pending order.
    ///
    /// Any account holding the fourmiz role except the order's own client
    /// may claim; of concurrent claimants exactly one wins.
    pub async fn accept_order(
        &self,
        order_id: &str,
        fourmiz_id: &str,
    ) -> Result<Order, OrderError> {
        let capabilities = self.resolver.resolve(fourmiz_id).await?;
        if !capabilities.has_role(Role::Fourmiz) {
            return Err(OrderError::NotFourmiz(fourmiz_id.to_string()));
        }

        let order = self.orders.get(order_id).await?;
        if order.client_id == fourmiz_id {
            return Err(OrderError::OwnOrder {
                order_id: order_id.to_string(),
                account_id: fourmiz_id.to_string(),
            });
        }
        match order.status {
            OrderStatus::Pending if order.fourmiz_id.is_none() => {}
            OrderStatus::Pending | OrderStatus::Accepted => {
                return Err(OrderError::AlreadyClaimed {
                    order_id: order_id.to_string(),
                })
            }
            from => {
                return Err(OrderError::InvalidTransition {
                    order_id: order_id.to_string(),
                    from,
                    to: OrderStatus::Accepted,
                })
            }
        }

        match self.orders.claim(order_id, fourmiz_id, Utc::now()).await {
            Ok(claimed) => {
                tracing::info!(order_id, fourmiz_id, "order claimed");
                Ok(claimed)
            }
            Err(err) if err.is_conflict() => Err(OrderError::AlreadyClaimed {
                order_id: order_id.to_string(),
            }),
            Err(err) => Err(err.into()),
        }
    }

    /// The assigned fourmiz starts the work: accepted -> in_progress.
    pub async fn start_order(
        &self,
        order_id: &str,
        fourmiz_id: &str,
    ) -> Result<Order, OrderError> {
        let order = self.orders.get(order_id).await?;
        if order.fourmiz_id.as_deref() != Some(fourmiz_id) {
            return Err(OrderError::NotParticipant {
                order_id: order_id.to_string(),
                account_id: fourmiz_id.to_string(),
            });
        }
        if order.status != OrderStatus::Accepted {
            return Err(OrderError::InvalidTransition {
                order_id: order_id.to_string(),
                from: order.status,
                to: OrderStatus::InProgress,
            });
        }

        match self.orders.start(order_id).await {
            Ok(started) => Ok(started),
            Err(err) if err.is_conflict() => Err(OrderError::Conflict {
                order_id: order_id.to_string(),
            }),
            Err(err) => Err(err.into()),
        }
    }

    /// Record one party's completion validation.
    ///
    /// When both timestamps are present the order completes and the fourmiz
    /// credit runs. The call is safe under duplicate delivery: a repeated
    /// validation of a completed order converges on the (deduplicated)
    /// credit and succeeds without moving any money twice.
    pub async fn validate_completion(
        &self,
        order_id: &str,
        by: OrderParty,
        actor_id: &str,
    ) -> Result<Order, OrderError> {
        let order = self.orders.get(order_id).await?;

        let is_party = match by {
            OrderParty::Client => order.client_id == actor_id,
            OrderParty::Fourmiz => order.fourmiz_id.as_deref() == Some(actor_id),
        };
        if !is_party {
            return Err(OrderError::NotParticipant {
                order_id: order_id.to_string(),
                account_id: actor_id.to_string(),
            });
        }

        match order.status {
            OrderStatus::InProgress => {}
            // Duplicate event after completion: make sure the credit
            // converged, then report success.
            OrderStatus::Completed => {
                self.credit_fourmiz_after_validation(order_id).await?;
                return Ok(order);
            }
            from => {
                return Err(OrderError::InvalidTransition {
                    order_id: order_id.to_string(),
                    from,
                    to: OrderStatus::Completed,
                })
            }
        }

        let updated = self.orders.set_validation(order_id, by, Utc::now()).await?;
        if !updated.both_validated() {
            return Ok(updated);
        }

        match self.orders.complete(order_id).await {
            Ok(completed) => {
                self.credit_fourmiz_after_validation(order_id).await?;
                tracing::info!(order_id, "order completed, both parties validated");
                Ok(completed)
            }
            // Another caller completed it between our write and this one;
            // converge on the credit.
            Err(err) if err.is_conflict() => {
                self.credit_fourmiz_after_validation(order_id).await?;
                Ok(self.orders.get(order_id).await?)
            }
            Err(err) => Err(err.into()),
        }
    }

    /// Credit the fourmiz for a dually-validated order, exactly once.
    pub async fn credit_fourmiz_after_validation(
        &self,
        order_id: &str,
    ) -> Result<CreditOutcome, OrderError> {
        let order = self.orders.get(order_id).await?;
        if !order.both_validated() {
            return Err(OrderError::NotYetValidated {
                order_id: order_id.to_string(),
            });
        }
        let Some(fourmiz_id) = order.fourmiz_id.clone() else {
            return Err(OrderError::NotYetValidated {
                order_id: order_id.to_string(),
            });
        };

        let credit = Transaction::credit(
            fourmiz_id.clone(),
            order.fourmiz_amount,
            TransactionKind::ServiceCommission,
            Some(order.credit_ref()),
        );

        match self.transactions.append(credit).await {
            Ok(tx) => {
                tracing::info!(order_id, %fourmiz_id, amount = %order.fourmiz_amount, "fourmiz credited");
                Ok(CreditOutcome::Credited(tx))
            }
            Err(err) if err.is_duplicate() => {
                tracing::debug!(order_id, "order already credited, duplicate event ignored");
                Ok(CreditOutcome::AlreadyCredited)
            }
            Err(err) => Err(err.into()),
        }
    }

    /// Cancel a not-yet-started order.
    ///
    /// Client cancellations must come from the order's client; system
    /// cancellations carry no actor. A wallet-funded order refunds the
    /// client, exactly once per order.
    pub async fn cancel_order(
        &self,
        order_id: &str,
        by: CancelActor,
        actor_id: Option<&str>,
    ) -> Result<Order, OrderError> {
        let order = self.orders.get(order_id).await?;

        if by == CancelActor::Client && actor_id != Some(order.client_id.as_str()) {
            return Err(OrderError::NotParticipant {
                order_id: order_id.to_string(),
                account_id: actor_id.unwrap_or("unknown").to_string(),
            });
        }

        match order.status {
            OrderStatus::Pending | OrderStatus::Accepted => {}
            from => {
                return Err(OrderError::InvalidTransition {
                    order_id: order_id.to_string(),
                    from,
                    to: OrderStatus::Cancelled,
                })
            }
        }

        let cancelled = match self.orders.cancel(order_id, by, Utc::now()).await {
            Ok(cancelled) => cancelled,
            Err(err) if err.is_conflict() => {
                return Err(OrderError::Conflict {
                    order_id: order_id.to_string(),
                })
            }
            Err(err) => return Err(err.into()),
        };

        if cancelled.paid_with_wallet {
            let refund = Transaction::credit(
                cancelled.client_id.clone(),
                cancelled.total(),
                TransactionKind::OrderPayment,
                Some(cancelled.refund_ref()),
            );
            match self.transactions.append(refund).await {
                Ok(_) => {
                    tracing::info!(order_id, amount = %cancelled.total(), "client refunded");
                }
                Err(err) if err.is_duplicate() => {}
                Err(err) => {
                    // The cancel is committed but the refund is not; this
                    // needs manual reconciliation, never silent dropping.
                    tracing::error!(order_id, error = %err, "refund failed after cancel");
                    return Err(err.into());
                }
            }
        }

        Ok(cancelled)
    }
}
