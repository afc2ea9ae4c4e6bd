//! Per-recipient notification state.

use chrono::{DateTime, Utc};
use moaplay_core::types::{NotificationId, RecipientId, UserId};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use super::payload::NotificationPayload;

/// One user's copy of a notification, carrying that user's read state.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct NotificationRecipient {
    /// Unique recipient record identifier.
    pub id: RecipientId,
    /// The notification delivered.
    pub notification_id: NotificationId,
    /// The receiving user.
    pub user_id: UserId,
    /// Whether the user has read it.
    pub is_read: bool,
    /// When it was first read.
    pub read_at: Option<DateTime<Utc>>,
    /// When the record was created.
    pub created_at: DateTime<Utc>,
}

impl NotificationRecipient {
    /// Build an unread record for `user_id`.
    pub fn unread(notification_id: NotificationId, user_id: UserId, now: DateTime<Utc>) -> Self {
        Self {
            id: RecipientId::new(),
            notification_id,
            user_id,
            is_read: false,
            read_at: None,
            created_at: now,
        }
    }

    /// Check if `user_id` owns this record.
    pub fn is_owned_by(&self, user_id: UserId) -> bool {
        self.user_id == user_id
    }

    /// Transition to read. Returns `false` if it was already read, in which
    /// case `read_at` keeps its first value.
    pub fn mark_read(&mut self, now: DateTime<Utc>) -> bool {
        if self.is_read {
            return false;
        }
        self.is_read = true;
        self.read_at = Some(now);
        true
    }
}

/// A recipient record with its notification embedded, as listed to the
/// owning user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecipientView {
    /// Recipient record id (used to mark it read).
    pub id: RecipientId,
    /// The notification.
    pub notification: NotificationPayload,
    /// Whether it has been read.
    pub is_read: bool,
    /// When it was first read.
    pub read_at: Option<DateTime<Utc>>,
    /// When the record was created.
    pub created_at: DateTime<Utc>,
}

impl RecipientView {
    /// Combine a recipient record with its notification payload.
    pub fn new(recipient: NotificationRecipient, notification: NotificationPayload) -> Self {
        Self {
            id: recipient.id,
            notification,
            is_read: recipient.is_read,
            read_at: recipient.read_at,
            created_at: recipient.created_at,
        }
    }
}
