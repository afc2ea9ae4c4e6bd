//! Process-wide map from user to delivery queue.

use std::sync::Arc;

use dashmap::DashMap;
use serde::Serialize;
use tracing::debug;

use moaplay_core::types::UserId;
use moaplay_entity::notification::NotificationPayload;

use super::delivery_queue::DeliveryQueue;

/// Snapshot of registry size.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct RegistryStats {
    /// Users with a queue.
    pub queues: usize,
    /// Payloads waiting across all queues.
    pub pending: usize,
    /// Payloads dropped on overflow since startup.
    pub dropped: u64,
}

/// Lazily created per-user delivery queues.
///
/// Entries are created on first push or first stream open and live for the
/// rest of the process.
#[derive(Debug)]
pub struct DeliveryQueueRegistry {
    queues: DashMap<UserId, Arc<DeliveryQueue>>,
    capacity: usize,
}

impl DeliveryQueueRegistry {
    /// Create an empty registry whose queues hold at most `capacity` payloads.
    pub fn new(capacity: usize) -> Self {
        Self {
            queues: DashMap::new(),
            capacity,
        }
    }

    /// The user's queue, created if absent. Concurrent callers for the same
    /// user always receive the same queue.
    pub fn get_or_create(&self, user_id: UserId) -> Arc<DeliveryQueue> {
        let entry = self
            .queues
            .entry(user_id)
            .or_insert_with(|| Arc::new(DeliveryQueue::new(user_id, self.capacity)));
        Arc::clone(entry.value())
    }

    /// Enqueue `payload` for `user_id`.
    pub fn push(&self, user_id: UserId, payload: Arc<NotificationPayload>) {
        let notification_id = payload.id;
        let queue = self.get_or_create(user_id);
        queue.push(payload);
        debug!(
            user_id = %user_id,
            notification_id = %notification_id,
            pending = queue.len(),
            "Queued notification for live delivery"
        );
    }

    /// Current size of the registry.
    pub fn stats(&self) -> RegistryStats {
        self.queues
            .iter()
            .fold(RegistryStats::default(), |mut stats, entry| {
                stats.queues += 1;
                stats.pending += entry.value().len();
                stats.dropped += entry.value().dropped();
                stats
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_get_or_create_is_stable() {
        let registry = DeliveryQueueRegistry::new(8);
        let user = UserId::new();
        let a = registry.get_or_create(user);
        let b = registry.get_or_create(user);
        assert!(Arc::ptr_eq(&a, &b));
        assert_eq!(registry.stats().queues, 1);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_get_or_create_shares_one_queue() {
        let registry = Arc::new(DeliveryQueueRegistry::new(8));
        let user = UserId::new();

        let handles: Vec<_> = (0..16)
            .map(|_| {
                let registry = Arc::clone(&registry);
                tokio::spawn(async move { registry.get_or_create(user) })
            })
            .collect();

        let mut queues = Vec::new();
        for handle in handles {
            queues.push(handle.await.unwrap());
        }
        assert!(queues.windows(2).all(|w| Arc::ptr_eq(&w[0], &w[1])));
        assert_eq!(registry.stats().queues, 1);
    }
}
