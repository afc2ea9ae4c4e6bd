//! Request context carrying the authenticated caller.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use moaplay_auth::Claims;
use moaplay_core::types::UserId;
use moaplay_entity::user::UserRole;

/// Context for the current authenticated request.
///
/// Extracted from the bearer token and passed into service methods so that
/// every operation knows who is acting.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RequestContext {
    /// The authenticated user's ID.
    pub user_id: UserId,
    /// The user's role at the time the token was issued.
    pub role: UserRole,
    /// The user's display name from the token.
    pub nickname: String,
    /// When the request was received.
    pub request_time: DateTime<Utc>,
}

impl RequestContext {
    /// Creates a new request context.
    pub fn new(user_id: UserId, role: UserRole, nickname: impl Into<String>) -> Self {
        Self {
            user_id,
            role,
            nickname: nickname.into(),
            request_time: Utc::now(),
        }
    }

    /// Returns whether the current user is an admin.
    pub fn is_admin(&self) -> bool {
        self.role.is_admin()
    }
}

impl From<Claims> for RequestContext {
    fn from(claims: Claims) -> Self {
        Self::new(claims.sub, claims.role, claims.nickname)
    }
}
