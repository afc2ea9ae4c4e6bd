//! Notification fan-out to live streams.

pub mod dispatcher;
pub mod stream;

pub use dispatcher::{NotificationDispatcher, StreamStats};
pub use stream::NotificationStream;
