//! PayoutSettlement - back-office resolution of payout requests
//!
//! Settling appends the withdrawal transaction (stored negative) and marks
//! the request completed. The transaction's source_ref is the request id,
//! so a crashed or retried settlement can never withdraw twice: the second
//! append hits the uniqueness constraint and the flow converges on marking
//! the request completed.

use crate::error::PayoutError;
use crate::request::{PayoutRequest, PayoutStatus};
use crate::store::PayoutRequestStore;
use fourmiz_wallet::{Transaction, TransactionKind, TransactionStore};
use std::sync::Arc;

/// Outcome of a settlement attempt
#[derive(Debug, Clone, PartialEq)]
pub enum SettleOutcome {
    /// The withdrawal transaction was created and the request completed
    Settled(PayoutRequest),
    /// The request was already resolved - harmless retry, no-op
    AlreadySettled(PayoutRequest),
}

/// Back-office resolution of payout requests.
#[derive(Clone)]
pub struct PayoutSettlement {
    requests: Arc<dyn PayoutRequestStore>,
    transactions: Arc<dyn TransactionStore>,
}

impl PayoutSettlement {
    pub fn new(
        requests: Arc<dyn PayoutRequestStore>,
        transactions: Arc<dyn TransactionStore>,
    ) -> Self {
        Self {
            requests,
            transactions,
        }
    }

    /// Settle a pending request: append the withdrawal, mark completed.
    ///
    /// Exactly-once: a duplicate settle of a completed request is a no-op;
    /// a retry after a crash between the two writes completes the marking
    /// without a second withdrawal.
    pub async fn settle(&self, request_id: &str) -> Result<SettleOutcome, PayoutError> {
        let request = self.requests.get(request_id).await?;

        match request.status {
            PayoutStatus::Completed => return Ok(SettleOutcome::AlreadySettled(request)),
            PayoutStatus::Rejected => {
                return Err(PayoutError::AlreadyResolved {
                    id: request.id,
                    status: PayoutStatus::Rejected,
                })
            }
            PayoutStatus::Pending => {}
        }

        let withdrawal = Transaction::debit(
            request.account_id.clone(),
            request.amount,
            TransactionKind::Withdrawal,
            Some(request.settlement_ref()),
        );

        match self.transactions.append(withdrawal).await {
            Ok(_) => {}
            Err(err) if err.is_duplicate() => {
                tracing::warn!(
                    request_id,
                    "withdrawal already recorded for pending request, completing the marking"
                );
            }
            Err(err) => return Err(err.into()),
        }

        let completed = self.requests.mark(request_id, PayoutStatus::Completed).await?;
        tracing::info!(request_id, amount = %completed.amount, "payout settled");
        Ok(SettleOutcome::Settled(completed))
    }

    /// Reject a pending request, releasing its reservation.
    /// No transaction is created. Rejecting twice is a no-op.
    pub async fn reject(&self, request_id: &str) -> Result<PayoutRequest, PayoutError> {
        let request = self.requests.get(request_id).await?;

        match request.status {
            PayoutStatus::Rejected => Ok(request),
            PayoutStatus::Completed => Err(PayoutError::AlreadyResolved {
                id: request.id,
                status: PayoutStatus::Completed,
            }),
            PayoutStatus::Pending => {
                let rejected = self.requests.mark(request_id, PayoutStatus::Rejected).await?;
                tracing::info!(request_id, "payout rejected");
                Ok(rejected)
            }
        }
    }
}
