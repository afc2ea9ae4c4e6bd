//! # moaplay-database
//!
//! PostgreSQL connection management, the concrete repositories for the
//! notification tables and the [`NotificationStore`] seam the service layer
//! is written against.

pub mod connection;
pub mod migration;
pub mod repositories;
pub mod store;

pub use connection::DatabasePool;
pub use store::{NotificationStore, PgNotificationStore, RecipientPage};

#[cfg(any(test, feature = "test-support"))]
pub use store::MemoryNotificationStore;
