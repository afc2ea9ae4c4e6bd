//! Event notification services.

pub mod request;
pub mod resolver;
pub mod service;

pub use request::{CreateNotificationRequest, ListNotificationsQuery, NotificationList};
pub use resolver::RecipientResolver;
pub use service::NotificationService;
