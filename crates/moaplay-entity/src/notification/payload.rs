//! Wire representation of a notification.

use chrono::{DateTime, Utc};
use moaplay_core::types::{EventId, NotificationId};
use serde::{Deserialize, Serialize};

use super::kind::NotificationType;
use super::model::Notification;
use crate::user::Sender;

/// The JSON object pushed onto a live stream and embedded in listings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NotificationPayload {
    /// Notification id.
    pub id: NotificationId,
    /// Event the notification is about.
    pub event_id: EventId,
    /// Title.
    pub title: String,
    /// Body text.
    pub message: String,
    /// Severity.
    #[serde(rename = "type")]
    pub notification_type: NotificationType,
    /// Who sent it.
    pub sender: Sender,
    /// When it was created.
    pub created_at: DateTime<Utc>,
}

impl NotificationPayload {
    /// Build the payload from a stored notification and its sender.
    pub fn new(notification: &Notification, sender: Sender) -> Self {
        Self {
            id: notification.id,
            event_id: notification.event_id,
            title: notification.title.clone(),
            message: notification.message.clone(),
            notification_type: notification.notification_type,
            sender,
            created_at: notification.created_at,
        }
    }
}

/// Outcome of a successful creation: the payload plus who should receive it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreatedNotification {
    /// The payload as delivered to every recipient.
    #[serde(flatten)]
    pub payload: NotificationPayload,
    /// Number of recipient rows written.
    pub recipients_count: usize,
    /// Recipient user ids, in resolver order.
    #[serde(skip)]
    pub recipients: Vec<moaplay_core::types::UserId>,
}
