//! Shared domain types.

pub mod id;
pub mod pagination;

pub use id::{EventId, NotificationId, RecipientId, ScheduleId, UserId};
pub use pagination::{PageRequest, PageResponse};
