//! Application state shared across all handlers and middleware.

use std::sync::Arc;
use std::time::Instant;

use tokio_util::sync::CancellationToken;

use moaplay_auth::JwtDecoder;
use moaplay_core::config::AppConfig;
use moaplay_database::NotificationStore;
use moaplay_realtime::{DeliveryConfig, DeliveryQueueRegistry, NotificationDispatcher};
use moaplay_service::NotificationService;

/// Application state passed to every Axum handler via `State<AppState>`.
#[derive(Debug, Clone)]
pub struct AppState {
    /// Application configuration
    pub config: Arc<AppConfig>,
    /// Bearer token validator
    pub jwt_decoder: Arc<JwtDecoder>,
    /// Notification business logic
    pub notification_service: Arc<NotificationService>,
    /// Live delivery: queue registry and open streams
    pub dispatcher: Arc<NotificationDispatcher>,
    /// Process start, for uptime reporting
    pub started_at: Instant,
}

impl AppState {
    /// Wire services over `store`. Every stream opened through this state
    /// ends when `shutdown` is cancelled.
    pub fn new(
        config: AppConfig,
        store: Arc<dyn NotificationStore>,
        shutdown: CancellationToken,
    ) -> Self {
        let notifications = &config.realtime.notifications;
        let registry = Arc::new(DeliveryQueueRegistry::new(notifications.max_pending_per_user));
        let notification_service = Arc::new(NotificationService::new(store));
        let dispatcher = Arc::new(NotificationDispatcher::new(
            Arc::clone(&notification_service),
            registry,
            DeliveryConfig::from(notifications),
            shutdown,
        ));

        Self {
            jwt_decoder: Arc::new(JwtDecoder::new(&config.auth)),
            config: Arc::new(config),
            notification_service,
            dispatcher,
            started_at: Instant::now(),
        }
    }
}
