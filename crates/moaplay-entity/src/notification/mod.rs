//! Notification domain entities.

pub mod kind;
pub mod model;
pub mod payload;
pub mod recipient;

pub use kind::NotificationType;
pub use model::Notification;
pub use payload::{CreatedNotification, NotificationPayload};
pub use recipient::{NotificationRecipient, RecipientView};
