//! User entity model.

use moaplay_core::types::UserId;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use super::role::UserRole;

/// A registered user of the festival app.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct User {
    /// Unique user identifier.
    pub id: UserId,
    /// Public display name.
    pub nickname: String,
    /// Account role.
    pub role: UserRole,
}

impl User {
    /// Check if this user has admin privileges.
    pub fn is_admin(&self) -> bool {
        self.role.is_admin()
    }

    /// The public sender view of this user.
    pub fn as_sender(&self) -> Sender {
        Sender {
            id: self.id,
            nickname: self.nickname.clone(),
        }
    }
}

/// Public identity of a notification's sender.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Sender {
    /// Sender user id.
    pub id: UserId,
    /// Sender display name.
    pub nickname: String,
}
