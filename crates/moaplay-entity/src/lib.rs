//! # moaplay-entity
//!
//! Domain entity models for the Moaplay notification subsystem. Every
//! struct in this crate represents a database table row or a wire-level
//! value object. Database entities derive `sqlx::FromRow`.

pub mod event;
pub mod notification;
pub mod user;
