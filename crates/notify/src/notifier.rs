//! ChangeNotifier - in-process change distribution
//!
//! A broadcast channel standing in for the hosted backend's realtime
//! stream, with the same consumption contract: subscribers get a live feed
//! from the moment they subscribe, delivery is at-least-once while they
//! keep up, and a lagging subscriber loses the oldest events.

use crate::event::ChangeEvent;
use tokio::sync::broadcast;

const DEFAULT_CAPACITY: usize = 256;

/// Publisher handle for change events. Cheap to clone.
#[derive(Clone)]
pub struct ChangeNotifier {
    sender: broadcast::Sender<ChangeEvent>,
}

impl ChangeNotifier {
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_CAPACITY)
    }

    pub fn with_capacity(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity);
        Self { sender }
    }

    /// Open a subscription to the change stream.
    pub fn subscribe(&self) -> broadcast::Receiver<ChangeEvent> {
        self.sender.subscribe()
    }

    /// Publish one change event.
    ///
    /// A publish with no live subscribers is fine - events only exist to
    /// trigger recomputes, they carry no state of their own.
    pub fn publish(&self, event: ChangeEvent) {
        if self.sender.send(event).is_err() {
            tracing::trace!("change event dropped, no subscribers");
        }
    }

    /// Number of live subscribers
    pub fn subscriber_count(&self) -> usize {
        self.sender.receiver_count()
    }
}

impl Default for ChangeNotifier {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::event::{ChangeOp, ChangeTable};

    #[tokio::test]
    async fn test_publish_reaches_subscriber() {
        let notifier = ChangeNotifier::new();
        let mut rx = notifier.subscribe();

        notifier.publish(ChangeEvent::inserted(ChangeTable::Transactions, "acc-1"));

        let event = rx.recv().await.unwrap();
        assert_eq!(event.account_id, "acc-1");
        assert_eq!(event.op, ChangeOp::Insert);
    }

    #[tokio::test]
    async fn test_publish_without_subscribers_is_harmless() {
        let notifier = ChangeNotifier::new();
        notifier.publish(ChangeEvent::updated(ChangeTable::Accounts, "acc-1"));
        assert_eq!(notifier.subscriber_count(), 0);
    }
}
