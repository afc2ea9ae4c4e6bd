//! Response DTOs.

use serde::{Deserialize, Serialize};

use moaplay_realtime::StreamStats;

/// Standard success response wrapper.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiResponse<T: Serialize> {
    /// Whether the request was successful.
    pub success: bool,
    /// Response data.
    pub data: T,
}

impl<T: Serialize> ApiResponse<T> {
    /// Creates a successful response.
    pub fn ok(data: T) -> Self {
        Self {
            success: true,
            data,
        }
    }
}

/// Plain confirmation message.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MessageResponse {
    pub message: String,
}

impl MessageResponse {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// Liveness response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    /// Always `"ok"` when the process answers.
    pub status: String,
    /// Crate version.
    pub version: String,
    /// Seconds since startup.
    pub uptime_seconds: u64,
}

/// Health response including dependencies and live delivery counters.
#[derive(Debug, Clone, Serialize)]
pub struct DetailedHealthResponse {
    /// `"ok"` or `"degraded"`.
    pub status: String,
    /// `"connected"` or `"unavailable"`.
    pub database: String,
    /// Seconds since startup.
    pub uptime_seconds: u64,
    /// Delivery queues and open streams.
    pub live: StreamStats,
}
