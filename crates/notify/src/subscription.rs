//! SubscriptionManager - dirty-flag coalescing of balance recomputes
//!
//! A transaction change marks its account dirty; a single drain (on the
//! fixed interval, or forced by a read path) clears the flags and
//! recomputes each dirty account once. Bursts within one window collapse
//! into one recompute. This is purely a performance optimization: a missed
//! event costs a delayed refresh, never a wrong balance, because balances
//! are recomputed from the transaction table itself.
//!
//! The manager owns its listener lifecycle explicitly - `start()` on
//! session begin, `stop()` on session end. There is no ambient global
//! subscription state.

use crate::event::ChangeTable;
use crate::notifier::ChangeNotifier;
use fourmiz_wallet::BalanceTracker;
use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{broadcast, watch, Mutex};
use tokio::task::JoinHandle;

/// Refresh policy knobs
#[derive(Debug, Clone)]
pub struct RefreshConfig {
    /// Length of one coalescing window
    pub interval: Duration,
}

impl Default for RefreshConfig {
    fn default() -> Self {
        Self {
            interval: Duration::from_millis(200),
        }
    }
}

struct Inner {
    tracker: Arc<BalanceTracker>,
    dirty: Mutex<HashSet<String>>,
}

impl Inner {
    async fn mark(&self, account_id: String) {
        self.dirty.lock().await.insert(account_id);
    }

    /// Recompute every dirty account once; returns how many were refreshed.
    async fn drain_once(&self) -> usize {
        let batch: Vec<String> = {
            let mut dirty = self.dirty.lock().await;
            dirty.drain().collect()
        };

        for account_id in &batch {
            // A failed recompute keeps the last-good value (flagged stale
            // by the tracker); the account stays clean until it changes
            // again or a caller forces another refresh.
            if let Err(err) = self.tracker.refresh(account_id).await {
                tracing::debug!(%account_id, error = %err, "coalesced refresh failed");
            }
        }

        batch.len()
    }
}

struct Worker {
    shutdown: watch::Sender<bool>,
    listener: JoinHandle<()>,
    drainer: JoinHandle<()>,
}

/// Owns the change subscription and the coalescing drain loop.
pub struct SubscriptionManager {
    notifier: ChangeNotifier,
    inner: Arc<Inner>,
    config: RefreshConfig,
    worker: Option<Worker>,
}

impl SubscriptionManager {
    pub fn new(
        notifier: ChangeNotifier,
        tracker: Arc<BalanceTracker>,
        config: RefreshConfig,
    ) -> Self {
        Self {
            notifier,
            inner: Arc::new(Inner {
                tracker,
                dirty: Mutex::new(HashSet::new()),
            }),
            config,
            worker: None,
        }
    }

    pub fn is_running(&self) -> bool {
        self.worker.is_some()
    }

    /// Subscribe to the change stream and start the drain loop.
    /// Calling `start` while running is a no-op.
    pub fn start(&mut self) {
        if self.worker.is_some() {
            return;
        }

        let (shutdown, shutdown_rx) = watch::channel(false);
        let mut events = self.notifier.subscribe();

        let listener_inner = Arc::clone(&self.inner);
        let mut listener_shutdown = shutdown_rx.clone();
        let listener = tokio::spawn(async move {
            loop {
                tokio::select! {
                    _ = listener_shutdown.changed() => break,
                    received = events.recv() => match received {
                        Ok(event) => {
                            // Only transaction changes can move a balance.
                            if event.table == ChangeTable::Transactions {
                                listener_inner.mark(event.account_id).await;
                            }
                        }
                        Err(broadcast::error::RecvError::Lagged(skipped)) => {
                            tracing::warn!(skipped, "change stream lagged, events skipped");
                        }
                        Err(broadcast::error::RecvError::Closed) => break,
                    },
                }
            }
        });

        let drainer_inner = Arc::clone(&self.inner);
        let mut drainer_shutdown = shutdown_rx;
        let interval = self.config.interval;
        let drainer = tokio::spawn(async move {
            let mut ticker = tokio::time::interval(interval);
            loop {
                tokio::select! {
                    _ = drainer_shutdown.changed() => break,
                    _ = ticker.tick() => {
                        let refreshed = drainer_inner.drain_once().await;
                        if refreshed > 0 {
                            tracing::debug!(refreshed, "drained dirty accounts");
                        }
                    }
                }
            }
        });

        self.worker = Some(Worker {
            shutdown,
            listener,
            drainer,
        });
        tracing::debug!("subscription manager started");
    }

    /// Stop the listener and drain loop. Calling `stop` while stopped is a
    /// no-op.
    pub async fn stop(&mut self) {
        if let Some(worker) = self.worker.take() {
            let _ = worker.shutdown.send(true);
            let _ = worker.listener.await;
            let _ = worker.drainer.await;
            tracing::debug!("subscription manager stopped");
        }
    }

    /// Force one drain outside the interval, e.g. from a read path that
    /// wants the freshest cache before serving.
    pub async fn drain_now(&self) -> usize {
        self.inner.drain_once().await
    }

    /// Number of accounts currently marked dirty
    pub async fn dirty_count(&self) -> usize {
        self.inner.dirty.lock().await.len()
    }
}
