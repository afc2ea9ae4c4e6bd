//! The per-connection delivery loop.
//!
//! Each iteration waits a bounded time for the user's next payload and
//! emits it immediately. Between payloads, a heartbeat frame is emitted once
//! more than the heartbeat interval has passed since the previous one, so
//! proxies keep the connection open. The loop ends only when its
//! cancellation token fires.

use std::sync::Arc;
use std::time::Duration;

use futures::Stream;
use futures::stream;
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;

use moaplay_core::config::NotificationRealtimeConfig;
use moaplay_entity::notification::NotificationPayload;

use crate::queue::DeliveryQueue;

/// Timing of the delivery loop.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DeliveryConfig {
    /// Bounded wait for the next payload.
    pub poll_timeout: Duration,
    /// Minimum gap between heartbeat frames.
    pub heartbeat_interval: Duration,
}

impl Default for DeliveryConfig {
    fn default() -> Self {
        Self {
            poll_timeout: Duration::from_secs(1),
            heartbeat_interval: Duration::from_secs(30),
        }
    }
}

impl From<&NotificationRealtimeConfig> for DeliveryConfig {
    fn from(config: &NotificationRealtimeConfig) -> Self {
        Self {
            poll_timeout: config.poll_timeout(),
            heartbeat_interval: config.heartbeat_interval(),
        }
    }
}

/// One unit written to the client.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StreamFrame {
    /// A notification payload (`data:` frame).
    Notification(Arc<NotificationPayload>),
    /// A keep-alive comment frame.
    Heartbeat,
}

struct LoopState {
    queue: Arc<DeliveryQueue>,
    config: DeliveryConfig,
    cancel: CancellationToken,
    last_heartbeat: Instant,
}

/// Drain `queue` as a stream of frames until `cancel` fires.
///
/// Payloads already waiting when the stream opens are emitted first, in
/// FIFO order.
pub fn delivery_stream(
    queue: Arc<DeliveryQueue>,
    config: DeliveryConfig,
    cancel: CancellationToken,
) -> impl Stream<Item = StreamFrame> + Send + 'static {
    let state = LoopState {
        queue,
        config,
        cancel,
        last_heartbeat: Instant::now(),
    };
    stream::unfold(state, next_frame)
}

async fn next_frame(mut state: LoopState) -> Option<(StreamFrame, LoopState)> {
    loop {
        if state.cancel.is_cancelled() {
            return None;
        }

        let polled = tokio::select! {
            biased;
            _ = state.cancel.cancelled() => return None,
            polled = state.queue.pop_timeout(state.config.poll_timeout) => polled,
        };

        if let Some(payload) = polled {
            return Some((StreamFrame::Notification(payload), state));
        }

        if state.last_heartbeat.elapsed() > state.config.heartbeat_interval {
            state.last_heartbeat = Instant::now();
            return Some((StreamFrame::Heartbeat, state));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use futures::StreamExt;
    use moaplay_core::types::{EventId, NotificationId, UserId};
    use moaplay_entity::notification::NotificationType;
    use moaplay_entity::user::Sender;

    fn payload(title: &str) -> Arc<NotificationPayload> {
        Arc::new(NotificationPayload {
            id: NotificationId::new(),
            event_id: EventId::new(),
            title: title.to_string(),
            message: "body".to_string(),
            notification_type: NotificationType::Urgent,
            sender: Sender {
                id: UserId::new(),
                nickname: "admin".to_string(),
            },
            created_at: chrono::Utc::now(),
        })
    }

    fn title(frame: StreamFrame) -> String {
        match frame {
            StreamFrame::Notification(p) => p.title.clone(),
            StreamFrame::Heartbeat => "<heartbeat>".to_string(),
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_pending_payloads_are_emitted_first_in_order() {
        let queue = Arc::new(DeliveryQueue::new(UserId::new(), 16));
        queue.push(payload("p1"));
        queue.push(payload("p2"));

        let cancel = CancellationToken::new();
        let stream = delivery_stream(Arc::clone(&queue), DeliveryConfig::default(), cancel);
        futures::pin_mut!(stream);

        assert_eq!(title(stream.next().await.unwrap()), "p1");
        assert_eq!(title(stream.next().await.unwrap()), "p2");
        queue.push(payload("p3"));
        assert_eq!(title(stream.next().await.unwrap()), "p3");
    }

    #[tokio::test(start_paused = true)]
    async fn test_idle_stream_emits_heartbeat_after_interval() {
        let queue = Arc::new(DeliveryQueue::new(UserId::new(), 16));
        let cancel = CancellationToken::new();
        let started = Instant::now();
        let stream = delivery_stream(queue, DeliveryConfig::default(), cancel);
        futures::pin_mut!(stream);

        let frame = stream.next().await.unwrap();
        assert_eq!(frame, StreamFrame::Heartbeat);
        let elapsed = started.elapsed();
        assert!(elapsed > Duration::from_secs(30));
        assert!(elapsed <= Duration::from_secs(32));

        let frame = stream.next().await.unwrap();
        assert_eq!(frame, StreamFrame::Heartbeat);
        assert!(started.elapsed() > Duration::from_secs(60));
    }

    #[tokio::test(start_paused = true)]
    async fn test_cancel_ends_stream() {
        let queue = Arc::new(DeliveryQueue::new(UserId::new(), 16));
        let cancel = CancellationToken::new();
        let stream = delivery_stream(queue, DeliveryConfig::default(), cancel.clone());
        futures::pin_mut!(stream);

        let canceller = cancel.clone();
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(2500)).await;
            canceller.cancel();
        });

        let started = Instant::now();
        assert!(stream.next().await.is_none());
        assert!(started.elapsed() < Duration::from_secs(3));
    }
}
