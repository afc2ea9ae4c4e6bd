//! # moaplay-api
//!
//! HTTP API layer for Moaplay notifications built on Axum.
//!
//! Provides the notification REST endpoints, the Server-Sent-Events
//! stream, health checks, middleware (CORS, request logging), the bearer
//! token extractor, DTOs and error mapping.

pub mod app;
pub mod dto;
pub mod error;
pub mod extractors;
pub mod handlers;
pub mod middleware;
pub mod router;
pub mod state;

pub use app::build_app;
pub use error::ApiError;
pub use state::AppState;
