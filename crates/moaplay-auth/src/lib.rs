//! # moaplay-auth
//!
//! HS256 bearer tokens identifying the caller of the notification API.
//! Login and session management live elsewhere; this crate only signs and
//! verifies the tokens.

pub mod jwt;

pub use jwt::{Claims, JwtDecoder, JwtEncoder};
