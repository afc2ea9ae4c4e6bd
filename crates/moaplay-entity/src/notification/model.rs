//! Notification entity model.

use chrono::{DateTime, Utc};
use moaplay_core::types::{EventId, NotificationId, UserId};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use super::kind::NotificationType;

/// A message sent about one event to everyone who scheduled it.
///
/// Immutable once written; the only later change is deletion, which
/// cascades to every [`NotificationRecipient`](super::NotificationRecipient).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct Notification {
    /// Unique notification identifier.
    pub id: NotificationId,
    /// The event this notification is about.
    pub event_id: EventId,
    /// Short title (at most 255 characters).
    pub title: String,
    /// Body text.
    pub message: String,
    /// Severity.
    #[sqlx(rename = "type")]
    #[serde(rename = "type")]
    pub notification_type: NotificationType,
    /// The user who sent it.
    pub sent_by: UserId,
    /// When the notification was created.
    pub created_at: DateTime<Utc>,
}

impl Notification {
    /// Check if `user_id` sent this notification.
    pub fn is_sent_by(&self, user_id: UserId) -> bool {
        self.sent_by == user_id
    }
}
