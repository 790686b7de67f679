//! Application context - wires everything together
//!
//! One SQLite database, one change notifier, and the managers on top. The
//! context owns the subscription manager's lifecycle: it starts with the
//! session and must be stopped through `shutdown()` - there is no global
//! listener state anywhere.

use fourmiz_notify::{ChangeNotifier, RefreshConfig, SubscriptionManager};
use fourmiz_orders::{OrderStore, OrderWalletBridge};
use fourmiz_payouts::{
    PayoutConfig, PayoutManager, PayoutRequestStore, PayoutSettlement,
};
use fourmiz_roles::{AccountStore, CapabilityResolver, RoleMutator};
use fourmiz_store::{
    Database, SqliteAccountStore, SqliteOrderStore, SqlitePayoutRequestStore,
    SqliteTransactionStore,
};
use fourmiz_wallet::{BalanceTracker, Earnings, TransactionStore, WalletLedger};
use std::path::Path;
use std::sync::Arc;

/// Wires stores, notifier and managers over one data directory.
pub struct AppContext {
    pub resolver: CapabilityResolver,
    pub mutator: RoleMutator,
    pub ledger: WalletLedger,
    pub earnings: Earnings,
    pub tracker: Arc<BalanceTracker>,
    pub payouts: PayoutManager,
    pub settlement: PayoutSettlement,
    pub bridge: OrderWalletBridge,
    pub subscriptions: SubscriptionManager,
    pub transactions: Arc<dyn TransactionStore>,
    pub payout_requests: Arc<dyn PayoutRequestStore>,
}

impl AppContext {
    /// Create a new application context over `data_path`.
    pub async fn new(data_path: impl AsRef<Path>) -> Result<Self, anyhow::Error> {
        let data_path = data_path.as_ref();
        std::fs::create_dir_all(data_path)?;

        let db = Database::open(data_path.join("fourmiz.db")).await?;
        let notifier = ChangeNotifier::new();

        let accounts: Arc<dyn AccountStore> = Arc::new(SqliteAccountStore::with_notifier(
            db.pool().clone(),
            notifier.clone(),
        ));
        let transactions: Arc<dyn TransactionStore> =
            Arc::new(SqliteTransactionStore::with_notifier(
                db.pool().clone(),
                notifier.clone(),
            ));
        let payout_requests: Arc<dyn PayoutRequestStore> =
            Arc::new(SqlitePayoutRequestStore::with_notifier(
                db.pool().clone(),
                notifier.clone(),
            ));
        let orders: Arc<dyn OrderStore> = Arc::new(SqliteOrderStore::with_notifier(
            db.pool().clone(),
            notifier.clone(),
        ));

        let resolver = CapabilityResolver::new(Arc::clone(&accounts));
        let mutator = RoleMutator::new(Arc::clone(&accounts));
        let ledger = WalletLedger::new(Arc::clone(&transactions));
        let earnings = Earnings::new(Arc::clone(&transactions));
        let tracker = Arc::new(BalanceTracker::new(ledger.clone()));

        let payouts = PayoutManager::new(
            resolver.clone(),
            ledger.clone(),
            Arc::clone(&payout_requests),
            PayoutConfig::default(),
        );
        let settlement =
            PayoutSettlement::new(Arc::clone(&payout_requests), Arc::clone(&transactions));
        let bridge = OrderWalletBridge::new(
            resolver.clone(),
            ledger.clone(),
            Arc::clone(&transactions),
            Arc::clone(&orders),
        );

        let mut subscriptions = SubscriptionManager::new(
            notifier,
            Arc::clone(&tracker),
            RefreshConfig::default(),
        );
        subscriptions.start();

        Ok(Self {
            resolver,
            mutator,
            ledger,
            earnings,
            tracker,
            payouts,
            settlement,
            bridge,
            subscriptions,
            transactions,
            payout_requests,
        })
    }

    /// Stop the change subscription. Call once at session end.
    pub async fn shutdown(&mut self) {
        self.subscriptions.stop().await;
    }
}
