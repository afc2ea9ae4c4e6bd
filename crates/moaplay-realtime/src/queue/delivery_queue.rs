//! A single user's FIFO of pending live payloads.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

use tokio::sync::Notify;
use tokio::time::{self, Instant};
use tracing::warn;

use moaplay_core::types::UserId;
use moaplay_entity::notification::NotificationPayload;

/// Pending payloads for one user.
///
/// Pushes never block and never fail. When the queue already holds
/// `capacity` payloads the oldest one is dropped; the durable recipient
/// row is unaffected, so the user still sees it in their listing.
///
/// With several consumers (more than one open stream for the same user)
/// each payload is taken by exactly one of them.
#[derive(Debug)]
pub struct DeliveryQueue {
    user_id: UserId,
    capacity: usize,
    pending: Mutex<VecDeque<Arc<NotificationPayload>>>,
    notify: Notify,
    dropped: AtomicU64,
}

impl DeliveryQueue {
    /// Create an empty queue holding at most `capacity` payloads.
    pub fn new(user_id: UserId, capacity: usize) -> Self {
        Self {
            user_id,
            capacity: capacity.max(1),
            pending: Mutex::new(VecDeque::new()),
            notify: Notify::new(),
            dropped: AtomicU64::new(0),
        }
    }

    fn lock(&self) -> MutexGuard<'_, VecDeque<Arc<NotificationPayload>>> {
        self.pending.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Append a payload and wake one waiting consumer.
    pub fn push(&self, payload: Arc<NotificationPayload>) {
        {
            let mut pending = self.lock();
            if pending.len() >= self.capacity {
                if let Some(oldest) = pending.pop_front() {
                    self.dropped.fetch_add(1, Ordering::Relaxed);
                    warn!(
                        user_id = %self.user_id,
                        notification_id = %oldest.id,
                        capacity = self.capacity,
                        "Delivery queue full, dropped oldest pending notification"
                    );
                }
            }
            pending.push_back(payload);
        }
        self.notify.notify_one();
    }

    /// Take the oldest payload without waiting.
    pub fn try_pop(&self) -> Option<Arc<NotificationPayload>> {
        self.lock().pop_front()
    }

    /// Take the oldest payload, waiting up to `timeout` for one to arrive.
    /// Returns `None` on timeout; an empty queue is not an error.
    pub async fn pop_timeout(&self, timeout: Duration) -> Option<Arc<NotificationPayload>> {
        let deadline = Instant::now() + timeout;
        loop {
            // Registered before the check so a push in between is not missed.
            let notified = self.notify.notified();
            if let Some(payload) = self.try_pop() {
                return Some(payload);
            }
            if time::timeout_at(deadline, notified).await.is_err() {
                return self.try_pop();
            }
        }
    }

    /// Number of pending payloads.
    pub fn len(&self) -> usize {
        self.lock().len()
    }

    /// Whether nothing is pending.
    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    /// Payloads dropped because the queue was full.
    pub fn dropped(&self) -> u64 {
        self.dropped.load(Ordering::Relaxed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use moaplay_core::types::{EventId, NotificationId};
    use moaplay_entity::notification::NotificationType;
    use moaplay_entity::user::Sender;

    fn payload(title: &str) -> Arc<NotificationPayload> {
        Arc::new(NotificationPayload {
            id: NotificationId::new(),
            event_id: EventId::new(),
            title: title.to_string(),
            message: "body".to_string(),
            notification_type: NotificationType::Info,
            sender: Sender {
                id: UserId::new(),
                nickname: "host".to_string(),
            },
            created_at: chrono::Utc::now(),
        })
    }

    #[test]
    fn test_fifo_order() {
        let queue = DeliveryQueue::new(UserId::new(), 10);
        for title in ["a", "b", "c"] {
            queue.push(payload(title));
        }
        let titles: Vec<String> = std::iter::from_fn(|| queue.try_pop())
            .map(|p| p.title.clone())
            .collect();
        assert_eq!(titles, ["a", "b", "c"]);
        assert!(queue.is_empty());
    }

    #[test]
    fn test_overflow_drops_oldest() {
        let queue = DeliveryQueue::new(UserId::new(), 2);
        for title in ["a", "b", "c"] {
            queue.push(payload(title));
        }
        assert_eq!(queue.len(), 2);
        assert_eq!(queue.dropped(), 1);
        assert_eq!(queue.try_pop().unwrap().title, "b");
        assert_eq!(queue.try_pop().unwrap().title, "c");
    }

    #[tokio::test(start_paused = true)]
    async fn test_pop_timeout_returns_none_when_idle() {
        let queue = DeliveryQueue::new(UserId::new(), 10);
        let started = Instant::now();
        assert!(queue.pop_timeout(Duration::from_secs(1)).await.is_none());
        assert!(started.elapsed() >= Duration::from_secs(1));
    }

    #[tokio::test(start_paused = true)]
    async fn test_pop_timeout_wakes_on_push() {
        let queue = Arc::new(DeliveryQueue::new(UserId::new(), 10));
        let producer = Arc::clone(&queue);
        tokio::spawn(async move {
            time::sleep(Duration::from_millis(200)).await;
            producer.push(payload("late"));
        });

        let started = Instant::now();
        let got = queue.pop_timeout(Duration::from_secs(1)).await.unwrap();
        assert_eq!(got.title, "late");
        assert!(started.elapsed() < Duration::from_secs(1));
    }
}
