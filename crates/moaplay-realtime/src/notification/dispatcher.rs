//! Notification dispatcher: persists through the service, then fans the
//! payload out to the recipients' delivery queues.

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use futures::StreamExt;
use serde::Serialize;
use tokio_util::sync::CancellationToken;
use tracing::debug;

use moaplay_core::AppResult;
use moaplay_core::types::UserId;
use moaplay_entity::notification::CreatedNotification;
use moaplay_service::{CreateNotificationRequest, NotificationService, RequestContext};

use crate::delivery::{DeliveryConfig, delivery_stream};
use crate::queue::DeliveryQueueRegistry;

use super::stream::NotificationStream;

/// Live delivery counters.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct StreamStats {
    /// Users with a delivery queue.
    pub queues: usize,
    /// Payloads waiting to be streamed.
    pub pending: usize,
    /// Payloads dropped on queue overflow.
    pub dropped: u64,
    /// Currently open streams.
    pub open_streams: usize,
}

/// Routes newly created notifications to live streams.
#[derive(Debug)]
pub struct NotificationDispatcher {
    service: Arc<NotificationService>,
    registry: Arc<DeliveryQueueRegistry>,
    config: DeliveryConfig,
    /// Parent of every stream's token; cancelled on server shutdown.
    shutdown: CancellationToken,
    open_streams: Arc<AtomicUsize>,
}

impl NotificationDispatcher {
    /// Create a new dispatcher.
    pub fn new(
        service: Arc<NotificationService>,
        registry: Arc<DeliveryQueueRegistry>,
        config: DeliveryConfig,
        shutdown: CancellationToken,
    ) -> Self {
        Self {
            service,
            registry,
            config,
            shutdown,
            open_streams: Arc::new(AtomicUsize::new(0)),
        }
    }

    /// Create a notification and, once it is committed, queue it for every
    /// recipient. Nothing is queued when creation fails.
    pub async fn send(
        &self,
        ctx: &RequestContext,
        request: CreateNotificationRequest,
    ) -> AppResult<CreatedNotification> {
        let created = self.service.create_notification(ctx, request).await?;
        self.dispatch(&created);
        Ok(created)
    }

    /// Queue a committed notification for each of its recipients.
    pub fn dispatch(&self, created: &CreatedNotification) {
        let payload = Arc::new(created.payload.clone());
        for user_id in &created.recipients {
            self.registry.push(*user_id, Arc::clone(&payload));
        }
        debug!(
            notification_id = %created.payload.id,
            recipients = created.recipients.len(),
            "Dispatched notification to delivery queues"
        );
    }

    /// Open a live stream for `user_id`. Payloads queued before this call
    /// are delivered first.
    pub fn open_stream(&self, user_id: UserId) -> NotificationStream {
        let queue = self.registry.get_or_create(user_id);
        let cancel = self.shutdown.child_token();
        let frames = delivery_stream(queue, self.config, cancel.clone()).boxed();
        NotificationStream::new(user_id, frames, cancel, Arc::clone(&self.open_streams))
    }

    /// Current live delivery counters.
    pub fn stats(&self) -> StreamStats {
        let registry = self.registry.stats();
        StreamStats {
            queues: registry.queues,
            pending: registry.pending,
            dropped: registry.dropped,
            open_streams: self.open_streams.load(Ordering::Relaxed),
        }
    }
}
