//! # moaplay-core
//!
//! Core crate for the Moaplay notification backend. Contains configuration
//! schemas, typed identifiers, pagination types, and the unified error
//! system shared by every other crate in the workspace.
//!
//! This crate has **no** internal dependencies on other Moaplay crates.

pub mod config;
pub mod error;
pub mod types;

pub use error::{AppError, AppResult, ErrorKind};
