//! Resource invalidation signals
//!
//! Mutating orchestrators publish the resource kinds they changed; list views
//! subscribe and refetch when a kind they display is invalidated.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;

/// Server-side resources the client displays
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[serde(rename_all = "camelCase")]
pub enum ResourceKind {
    Transfers,
    ReceivedTransfers,
    Inventory,
    Products,
    AdjustmentBatches,
    BatchStagings,
}

const DEFAULT_CAPACITY: usize = 256;

/// Fan-out bus of invalidated resource kinds
#[derive(Clone)]
pub struct InvalidationBus {
    sender: broadcast::Sender<ResourceKind>,
}

impl Default for InvalidationBus {
    fn default() -> Self {
        Self::new(DEFAULT_CAPACITY)
    }
}

impl InvalidationBus {
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity);
        Self { sender }
    }

    /// Publish invalidations; dropped silently when nobody listens
    pub fn publish(&self, kinds: &[ResourceKind]) {
        for kind in kinds {
            tracing::debug!(?kind, "Invalidated");
            let _ = self.sender.send(*kind);
        }
    }

    /// Subscribe to the given kinds only
    pub fn subscribe(&self, kinds: &[ResourceKind]) -> Subscription {
        Subscription {
            receiver: self.sender.subscribe(),
            kinds: kinds.iter().copied().collect(),
        }
    }

    pub fn subscriber_count(&self) -> usize {
        self.sender.receiver_count()
    }
}

/// A filtered view of the bus
pub struct Subscription {
    receiver: broadcast::Receiver<ResourceKind>,
    kinds: BTreeSet<ResourceKind>,
}

impl Subscription {
    /// Wait for the next matching invalidation; `None` once the bus is gone.
    ///
    /// A lagged receiver reports the first kind it watches, since something
    /// it displays may have changed in the skipped messages.
    pub async fn next(&mut self) -> Option<ResourceKind> {
        loop {
            match self.receiver.recv().await {
                Ok(kind) if self.kinds.contains(&kind) => return Some(kind),
                Ok(_) => continue,
                Err(broadcast::error::RecvError::Lagged(skipped)) => {
                    tracing::warn!(skipped, "Invalidation subscriber lagged");
                    return self.kinds.iter().next().copied();
                }
                Err(broadcast::error::RecvError::Closed) => return None,
            }
        }
    }

    /// Drain pending invalidations without waiting; true if any matched
    pub fn take_pending(&mut self) -> bool {
        let mut matched = false;
        loop {
            match self.receiver.try_recv() {
                Ok(kind) => matched |= self.kinds.contains(&kind),
                Err(broadcast::error::TryRecvError::Lagged(_)) => matched = true,
                Err(_) => return matched,
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_subscription_filters_kinds() {
        let bus = InvalidationBus::default();
        let mut sub = bus.subscribe(&[ResourceKind::Transfers]);
        bus.publish(&[ResourceKind::Inventory, ResourceKind::Transfers]);
        assert_eq!(sub.next().await, Some(ResourceKind::Transfers));
    }

    #[tokio::test]
    async fn test_take_pending() {
        let bus = InvalidationBus::default();
        let mut sub = bus.subscribe(&[ResourceKind::BatchStagings]);
        assert!(!sub.take_pending());
        bus.publish(&[ResourceKind::Inventory]);
        assert!(!sub.take_pending());
        bus.publish(&[ResourceKind::BatchStagings]);
        assert!(sub.take_pending());
    }

    #[tokio::test]
    async fn test_closed_bus_ends_subscription() {
        let bus = InvalidationBus::default();
        let mut sub = bus.subscribe(&[ResourceKind::Transfers]);
        drop(bus);
        assert_eq!(sub.next().await, None);
    }

    #[test]
    fn test_publish_without_subscribers_is_silent() {
        let bus = InvalidationBus::new(4);
        bus.publish(&[ResourceKind::Products]);
        assert_eq!(bus.subscriber_count(), 0);
    }
}
