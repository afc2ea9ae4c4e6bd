//! User domain entities.

pub mod model;
pub mod role;

pub use model::{Sender, User};
pub use role::UserRole;
