//! Live notification delivery configuration.

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Real-time delivery configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RealtimeConfig {
    /// Notification stream settings.
    #[serde(default)]
    pub notifications: NotificationRealtimeConfig,
}

/// Settings for the per-user delivery queues and the SSE delivery loop.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NotificationRealtimeConfig {
    /// How long one loop iteration waits for a payload, in milliseconds.
    #[serde(default = "default_poll_timeout")]
    pub poll_timeout_ms: u64,
    /// Minimum gap between heartbeat comments, in seconds.
    #[serde(default = "default_heartbeat_interval")]
    pub heartbeat_interval_seconds: u64,
    /// Pending payloads kept per user; the oldest is dropped beyond this.
    #[serde(default = "default_max_pending")]
    pub max_pending_per_user: usize,
}

impl NotificationRealtimeConfig {
    /// Poll timeout as a [`Duration`], never shorter than 1 ms so an idle
    /// stream does not spin.
    pub fn poll_timeout(&self) -> Duration {
        Duration::from_millis(self.poll_timeout_ms.max(1))
    }

    /// Heartbeat interval as a [`Duration`].
    pub fn heartbeat_interval(&self) -> Duration {
        Duration::from_secs(self.heartbeat_interval_seconds)
    }
}

impl Default for NotificationRealtimeConfig {
    fn default() -> Self {
        Self {
            poll_timeout_ms: default_poll_timeout(),
            heartbeat_interval_seconds: default_heartbeat_interval(),
            max_pending_per_user: default_max_pending(),
        }
    }
}

fn default_poll_timeout() -> u64 {
    1000
}

fn default_heartbeat_interval() -> u64 {
    30
}

fn default_max_pending() -> usize {
    500
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_zero_poll_timeout_is_raised_to_one_millisecond() {
        let config = NotificationRealtimeConfig {
            poll_timeout_ms: 0,
            ..Default::default()
        };
        assert_eq!(config.poll_timeout(), Duration::from_millis(1));
        assert_eq!(
            NotificationRealtimeConfig::default().poll_timeout(),
            Duration::from_secs(1)
        );
    }
}
