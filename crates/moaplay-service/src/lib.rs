//! # moaplay-service
//!
//! Business logic for event notifications. Services receive a
//! [`RequestContext`] describing the caller and work against the
//! [`NotificationStore`](moaplay_database::NotificationStore) seam, so the
//! same code runs over PostgreSQL in production and the in-memory store in
//! tests.

pub mod context;
pub mod notification;

pub use context::RequestContext;
pub use notification::{
    CreateNotificationRequest, ListNotificationsQuery, NotificationList, NotificationService,
    RecipientResolver,
};
