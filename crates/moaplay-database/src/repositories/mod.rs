//! Concrete PostgreSQL repositories.

pub mod event;
pub mod notification;
pub mod schedule;
pub mod user;

pub use event::EventRepository;
pub use notification::NotificationRepository;
pub use schedule::ScheduleRepository;
pub use user::UserRepository;
