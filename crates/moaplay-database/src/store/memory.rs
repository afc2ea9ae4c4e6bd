//! In-memory notification store for tests.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tracing::debug;

use moaplay_core::error::AppError;
use moaplay_core::types::{EventId, NotificationId, PageRequest, RecipientId, UserId};
use moaplay_core::AppResult;
use moaplay_entity::event::Event;
use moaplay_entity::notification::{
    Notification, NotificationPayload, NotificationRecipient, RecipientView,
};
use moaplay_entity::user::{User, UserRole};

use super::{NotificationStore, RecipientPage};

#[derive(Debug, Default)]
struct InnerState {
    users: HashMap<UserId, User>,
    events: HashMap<EventId, Event>,
    /// `(user, event)` in insertion order; duplicates allowed like the table.
    schedules: Vec<(UserId, EventId)>,
    notifications: HashMap<NotificationId, Notification>,
    /// Insertion order.
    recipients: Vec<NotificationRecipient>,
    /// Fail the next batch when it reaches this recipient index.
    fail_recipient_at: Option<usize>,
}

/// Process-local [`NotificationStore`] with the same observable semantics
/// as the PostgreSQL store, plus seeding helpers and failure injection.
#[derive(Debug, Clone, Default)]
pub struct MemoryNotificationStore {
    state: Arc<Mutex<InnerState>>,
}

impl MemoryNotificationStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, InnerState> {
        self.state.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Insert a user and return its id.
    pub fn add_user(&self, nickname: &str, role: UserRole) -> UserId {
        let user = User {
            id: UserId::new(),
            nickname: nickname.to_string(),
            role,
        };
        let id = user.id;
        self.lock().users.insert(id, user);
        id
    }

    /// Insert an event hosted by `host_id` and return its id.
    pub fn add_event(&self, host_id: UserId, title: &str) -> EventId {
        let event = Event {
            id: EventId::new(),
            host_id,
            title: title.to_string(),
        };
        let id = event.id;
        self.lock().events.insert(id, event);
        id
    }

    /// Add `event_id` to `user_id`'s personal schedule.
    pub fn add_schedule(&self, user_id: UserId, event_id: EventId) {
        self.lock().schedules.push((user_id, event_id));
    }

    /// Make the next [`create_with_recipients`](NotificationStore::create_with_recipients)
    /// fail after writing `index` recipient rows.
    pub fn fail_recipient_insert_at(&self, index: usize) {
        self.lock().fail_recipient_at = Some(index);
    }

    /// Number of stored notifications.
    pub fn notification_count(&self) -> usize {
        self.lock().notifications.len()
    }

    /// Number of stored recipient rows across all notifications.
    pub fn recipient_count(&self) -> usize {
        self.lock().recipients.len()
    }

    /// Recipient rows of one notification, in insertion order.
    pub fn recipients_of(&self, notification_id: NotificationId) -> Vec<NotificationRecipient> {
        self.lock()
            .recipients
            .iter()
            .filter(|r| r.notification_id == notification_id)
            .cloned()
            .collect()
    }

    fn view(state: &InnerState, recipient: &NotificationRecipient) -> Option<RecipientView> {
        let notification = state.notifications.get(&recipient.notification_id)?;
        let sender = state.users.get(&notification.sent_by)?.as_sender();
        Some(RecipientView::new(
            recipient.clone(),
            NotificationPayload::new(notification, sender),
        ))
    }
}

#[async_trait]
impl NotificationStore for MemoryNotificationStore {
    async fn find_user(&self, id: UserId) -> AppResult<Option<User>> {
        Ok(self.lock().users.get(&id).cloned())
    }

    async fn find_event(&self, id: EventId) -> AppResult<Option<Event>> {
        Ok(self.lock().events.get(&id).cloned())
    }

    async fn scheduled_user_ids(&self, event_id: EventId) -> AppResult<Vec<UserId>> {
        let state = self.lock();
        let mut users = Vec::new();
        for (user_id, scheduled) in &state.schedules {
            if *scheduled == event_id && !users.contains(user_id) {
                users.push(*user_id);
            }
        }
        Ok(users)
    }

    async fn create_with_recipients(
        &self,
        notification: &Notification,
        recipients: &[UserId],
    ) -> AppResult<u64> {
        let mut state = self.lock();
        let fail_at = state.fail_recipient_at.take();

        // Rows are staged and only applied once every insert has succeeded.
        let mut staged: Vec<NotificationRecipient> = Vec::with_capacity(recipients.len());
        for (index, user_id) in recipients.iter().enumerate() {
            if fail_at == Some(index) {
                debug!(index, "Injected recipient insert failure");
                return Err(AppError::database("Failed to insert notification recipients"));
            }
            if staged.iter().any(|r| r.user_id == *user_id) {
                return Err(AppError::database(
                    "Duplicate recipient for notification violates uq_notification_recipient",
                ));
            }
            staged.push(NotificationRecipient::unread(
                notification.id,
                *user_id,
                notification.created_at,
            ));
        }

        let inserted = staged.len() as u64;
        state.notifications.insert(notification.id, notification.clone());
        state.recipients.extend(staged);
        Ok(inserted)
    }

    async fn find_notification(&self, id: NotificationId) -> AppResult<Option<Notification>> {
        Ok(self.lock().notifications.get(&id).cloned())
    }

    async fn delete_notification(&self, id: NotificationId) -> AppResult<bool> {
        let mut state = self.lock();
        if state.notifications.remove(&id).is_none() {
            return Ok(false);
        }
        state.recipients.retain(|r| r.notification_id != id);
        Ok(true)
    }

    async fn find_recipient(&self, id: RecipientId) -> AppResult<Option<NotificationRecipient>> {
        Ok(self.lock().recipients.iter().find(|r| r.id == id).cloned())
    }

    async fn mark_recipient_read(
        &self,
        id: RecipientId,
        at: DateTime<Utc>,
    ) -> AppResult<Option<NotificationRecipient>> {
        let mut state = self.lock();
        Ok(state.recipients.iter_mut().find(|r| r.id == id).map(|r| {
            r.mark_read(at);
            r.clone()
        }))
    }

    async fn list_for_user(
        &self,
        user_id: UserId,
        is_read: Option<bool>,
        page: PageRequest,
    ) -> AppResult<RecipientPage> {
        let state = self.lock();
        let mut matching: Vec<&NotificationRecipient> = state
            .recipients
            .iter()
            .rev()
            .filter(|r| r.user_id == user_id && is_read.is_none_or(|flag| r.is_read == flag))
            .collect();
        matching.sort_by(|a, b| b.created_at.cmp(&a.created_at));

        let total = matching.len() as u64;
        let items = matching
            .into_iter()
            .skip(usize::try_from(page.offset()).unwrap_or(usize::MAX))
            .take(usize::try_from(page.limit()).unwrap_or(usize::MAX))
            .filter_map(|r| Self::view(&state, r))
            .collect();

        Ok(RecipientPage { items, total })
    }

    async fn count_unread(&self, user_id: UserId) -> AppResult<u64> {
        Ok(self
            .lock()
            .recipients
            .iter()
            .filter(|r| r.user_id == user_id && !r.is_read)
            .count() as u64)
    }

    async fn health_check(&self) -> AppResult<bool> {
        Ok(true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use moaplay_core::ErrorKind;
    use moaplay_entity::notification::NotificationType;

    fn notification(event_id: EventId, sent_by: UserId) -> Notification {
        Notification {
            id: NotificationId::new(),
            event_id,
            title: "Stage change".to_string(),
            message: "Moved to stage B".to_string(),
            notification_type: NotificationType::Info,
            sent_by,
            created_at: Utc::now(),
        }
    }

    #[tokio::test]
    async fn test_scheduled_user_ids_are_distinct() {
        let store = MemoryNotificationStore::new();
        let host = store.add_user("host", UserRole::User);
        let a = store.add_user("a", UserRole::User);
        let b = store.add_user("b", UserRole::User);
        let event = store.add_event(host, "Jazz night");
        let other = store.add_event(host, "Other");
        store.add_schedule(a, event);
        store.add_schedule(b, event);
        store.add_schedule(a, event);
        store.add_schedule(b, other);

        let users = store.scheduled_user_ids(event).await.unwrap();
        assert_eq!(users, vec![a, b]);
    }

    #[tokio::test]
    async fn test_injected_failure_writes_nothing() {
        let store = MemoryNotificationStore::new();
        let host = store.add_user("host", UserRole::User);
        let event = store.add_event(host, "Jazz night");
        let users: Vec<UserId> = (0..3).map(|_| UserId::new()).collect();

        store.fail_recipient_insert_at(2);
        let err = store
            .create_with_recipients(&notification(event, host), &users)
            .await
            .unwrap_err();
        assert_eq!(err.kind, ErrorKind::Database);
        assert_eq!(store.notification_count(), 0);
        assert_eq!(store.recipient_count(), 0);

        // Injection is one-shot.
        let written = store
            .create_with_recipients(&notification(event, host), &users)
            .await
            .unwrap();
        assert_eq!(written, 3);
    }

    #[tokio::test]
    async fn test_delete_cascades() {
        let store = MemoryNotificationStore::new();
        let host = store.add_user("host", UserRole::User);
        let event = store.add_event(host, "Jazz night");
        let keep = notification(event, host);
        let removed = notification(event, host);
        let users = [UserId::new(), UserId::new()];
        store.create_with_recipients(&keep, &users).await.unwrap();
        store.create_with_recipients(&removed, &users).await.unwrap();

        assert!(store.delete_notification(removed.id).await.unwrap());
        assert!(!store.delete_notification(removed.id).await.unwrap());
        assert!(store.recipients_of(removed.id).is_empty());
        assert_eq!(store.recipients_of(keep.id).len(), 2);
    }
}
