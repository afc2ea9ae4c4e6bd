//! The storage seam the notification service is written against.
//!
//! [`PgNotificationStore`] is the production implementation. With the
//! `test-support` feature, [`MemoryNotificationStore`] provides an
//! in-process implementation with failure injection.

#[cfg(any(test, feature = "test-support"))]
mod memory;
mod postgres;

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use moaplay_core::types::{EventId, NotificationId, PageRequest, RecipientId, UserId};
use moaplay_core::AppResult;
use moaplay_entity::event::Event;
use moaplay_entity::notification::{Notification, NotificationRecipient, RecipientView};
use moaplay_entity::user::User;

#[cfg(any(test, feature = "test-support"))]
pub use memory::MemoryNotificationStore;
pub use postgres::PgNotificationStore;

/// One page of a user's recipient records.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecipientPage {
    /// Records on this page, newest first.
    pub items: Vec<RecipientView>,
    /// Total records matching the filter.
    pub total: u64,
}

/// Persistence operations used by notification fan-out and read-state
/// management.
#[async_trait]
pub trait NotificationStore: Send + Sync + 'static {
    /// Find a user by id.
    async fn find_user(&self, id: UserId) -> AppResult<Option<User>>;

    /// Find an event by id.
    async fn find_event(&self, id: EventId) -> AppResult<Option<Event>>;

    /// Distinct users who added `event_id` to their schedule.
    async fn scheduled_user_ids(&self, event_id: EventId) -> AppResult<Vec<UserId>>;

    /// Atomically write a notification and one unread recipient row per user.
    /// On error nothing is persisted.
    async fn create_with_recipients(
        &self,
        notification: &Notification,
        recipients: &[UserId],
    ) -> AppResult<u64>;

    /// Find a notification by id.
    async fn find_notification(&self, id: NotificationId) -> AppResult<Option<Notification>>;

    /// Delete a notification and all of its recipient rows.
    async fn delete_notification(&self, id: NotificationId) -> AppResult<bool>;

    /// Find a recipient record by id.
    async fn find_recipient(&self, id: RecipientId) -> AppResult<Option<NotificationRecipient>>;

    /// Mark a recipient record read, keeping the first `read_at`.
    async fn mark_recipient_read(
        &self,
        id: RecipientId,
        at: DateTime<Utc>,
    ) -> AppResult<Option<NotificationRecipient>>;

    /// Page through a user's recipient records, newest first.
    async fn list_for_user(
        &self,
        user_id: UserId,
        is_read: Option<bool>,
        page: PageRequest,
    ) -> AppResult<RecipientPage>;

    /// Count a user's unread recipient records.
    async fn count_unread(&self, user_id: UserId) -> AppResult<u64>;

    /// Check that the backing store is reachable.
    async fn health_check(&self) -> AppResult<bool>;
}
