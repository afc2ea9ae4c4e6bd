//! Event entity model.

use moaplay_core::types::{EventId, UserId};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// The slice of a festival event the notification subsystem reads.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct Event {
    /// Unique event identifier.
    pub id: EventId,
    /// The user hosting the event.
    pub host_id: UserId,
    /// Event title.
    pub title: String,
}

impl Event {
    /// Check if `user_id` hosts this event.
    pub fn is_hosted_by(&self, user_id: UserId) -> bool {
        self.host_id == user_id
    }
}
