//! JWT token creation.

use chrono::Utc;
use jsonwebtoken::{EncodingKey, Header, encode};

use moaplay_core::config::AuthConfig;
use moaplay_core::error::{AppError, ErrorKind};
use moaplay_core::types::UserId;
use moaplay_entity::user::UserRole;

use super::claims::Claims;

/// Creates signed access tokens.
#[derive(Clone)]
pub struct JwtEncoder {
    encoding_key: EncodingKey,
    access_ttl_minutes: i64,
}

impl std::fmt::Debug for JwtEncoder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("JwtEncoder")
            .field("access_ttl_minutes", &self.access_ttl_minutes)
            .finish()
    }
}

impl JwtEncoder {
    /// Creates a new encoder from auth configuration.
    pub fn new(config: &AuthConfig) -> Self {
        Self {
            encoding_key: EncodingKey::from_secret(config.jwt_secret.as_bytes()),
            access_ttl_minutes: config.jwt_access_ttl_minutes as i64,
        }
    }

    /// Issues an access token for the given user.
    pub fn generate_access_token(
        &self,
        user_id: UserId,
        role: UserRole,
        nickname: &str,
    ) -> Result<String, AppError> {
        let now = Utc::now();
        let claims = Claims {
            sub: user_id,
            role,
            nickname: nickname.to_string(),
            iat: now.timestamp(),
            exp: (now + chrono::Duration::minutes(self.access_ttl_minutes)).timestamp(),
        };
        self.encode_claims(&claims)
    }

    /// Signs arbitrary claims.
    pub fn encode_claims(&self, claims: &Claims) -> Result<String, AppError> {
        encode(&Header::default(), claims, &self.encoding_key).map_err(|e| {
            AppError::with_source(ErrorKind::Internal, "Failed to encode access token", e)
        })
    }
}
