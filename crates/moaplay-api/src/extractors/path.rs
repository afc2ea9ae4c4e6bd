//! Typed path parameter helpers.

use std::str::FromStr;

use moaplay_core::error::AppError;

/// Parses a typed ID from a path segment.
pub fn parse_id<T: FromStr>(raw: &str, name: &str) -> Result<T, AppError> {
    raw.parse()
        .map_err(|_| AppError::validation(format!("Invalid {name}: '{raw}'")))
}
