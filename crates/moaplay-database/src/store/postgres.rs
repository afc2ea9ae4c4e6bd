//! PostgreSQL-backed notification store.

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use moaplay_core::types::{EventId, NotificationId, PageRequest, RecipientId, UserId};
use moaplay_core::AppResult;
use moaplay_entity::event::Event;
use moaplay_entity::notification::{Notification, NotificationRecipient};
use moaplay_entity::user::User;

use super::{NotificationStore, RecipientPage};
use crate::connection::DatabasePool;
use crate::repositories::{
    EventRepository, NotificationRepository, ScheduleRepository, UserRepository,
};

/// [`NotificationStore`] over the concrete PostgreSQL repositories.
#[derive(Debug, Clone)]
pub struct PgNotificationStore {
    db: DatabasePool,
    users: UserRepository,
    events: EventRepository,
    schedules: ScheduleRepository,
    notifications: NotificationRepository,
}

impl PgNotificationStore {
    /// Create a store sharing `db`'s connection pool.
    pub fn new(db: DatabasePool) -> Self {
        let pool = db.pool().clone();
        Self {
            users: UserRepository::new(pool.clone()),
            events: EventRepository::new(pool.clone()),
            schedules: ScheduleRepository::new(pool.clone()),
            notifications: NotificationRepository::new(pool),
            db,
        }
    }
}

#[async_trait]
impl NotificationStore for PgNotificationStore {
    async fn find_user(&self, id: UserId) -> AppResult<Option<User>> {
        self.users.find_by_id(id).await
    }

    async fn find_event(&self, id: EventId) -> AppResult<Option<Event>> {
        self.events.find_by_id(id).await
    }

    async fn scheduled_user_ids(&self, event_id: EventId) -> AppResult<Vec<UserId>> {
        self.schedules.distinct_user_ids(event_id).await
    }

    async fn create_with_recipients(
        &self,
        notification: &Notification,
        recipients: &[UserId],
    ) -> AppResult<u64> {
        self.notifications
            .create_with_recipients(notification, recipients)
            .await
    }

    async fn find_notification(&self, id: NotificationId) -> AppResult<Option<Notification>> {
        self.notifications.find_by_id(id).await
    }

    async fn delete_notification(&self, id: NotificationId) -> AppResult<bool> {
        self.notifications.delete(id).await
    }

    async fn find_recipient(&self, id: RecipientId) -> AppResult<Option<NotificationRecipient>> {
        self.notifications.find_recipient(id).await
    }

    async fn mark_recipient_read(
        &self,
        id: RecipientId,
        at: DateTime<Utc>,
    ) -> AppResult<Option<NotificationRecipient>> {
        self.notifications.mark_recipient_read(id, at).await
    }

    async fn list_for_user(
        &self,
        user_id: UserId,
        is_read: Option<bool>,
        page: PageRequest,
    ) -> AppResult<RecipientPage> {
        let (items, total) = self
            .notifications
            .find_by_user(user_id, is_read, page)
            .await?;
        Ok(RecipientPage { items, total })
    }

    async fn count_unread(&self, user_id: UserId) -> AppResult<u64> {
        self.notifications.count_unread(user_id).await
    }

    async fn health_check(&self) -> AppResult<bool> {
        self.db.health_check().await
    }
}
