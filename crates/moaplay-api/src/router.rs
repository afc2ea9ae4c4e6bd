//! Route definitions for the Moaplay notification API.
//!
//! All routes are organized by domain and mounted under `/api`.

use axum::{
    Router,
    routing::{delete, get, post, put},
};

use crate::handlers;
use crate::state::AppState;

/// Build the Axum router with every route, threading `state` through all
/// handlers. Middleware is attached by [`build_app`](crate::app::build_app).
pub fn build_router(state: AppState) -> Router {
    let api_routes = Router::new()
        .merge(notification_routes())
        .merge(health_routes());

    Router::new().nest("/api", api_routes).with_state(state)
}

/// Notification endpoints
fn notification_routes() -> Router<AppState> {
    Router::new()
        .route("/notifications", post(handlers::notification::send))
        .route("/notifications/my", get(handlers::notification::list_mine))
        .route("/notifications/stream", get(handlers::notification::stream))
        .route(
            "/notifications/{id}/read",
            put(handlers::notification::mark_read),
        )
        .route(
            "/notifications/{id}",
            delete(handlers::notification::delete_notification),
        )
}

/// Health check endpoints (unauthenticated)
fn health_routes() -> Router<AppState> {
    Router::new()
        .route("/health", get(handlers::health::health))
        .route("/health/detailed", get(handlers::health::health_detailed))
}
