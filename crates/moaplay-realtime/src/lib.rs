//! # moaplay-realtime
//!
//! Live notification delivery. A process-wide [`DeliveryQueueRegistry`]
//! keeps one FIFO of pending payloads per user; the
//! [`NotificationDispatcher`] fills it after a notification commits, and
//! every open stream drains its user's queue through the
//! [delivery loop](delivery).

pub mod delivery;
pub mod notification;
pub mod queue;

pub use delivery::{DeliveryConfig, StreamFrame};
pub use notification::{NotificationDispatcher, NotificationStream, StreamStats};
pub use queue::{DeliveryQueue, DeliveryQueueRegistry, RegistryStats};
