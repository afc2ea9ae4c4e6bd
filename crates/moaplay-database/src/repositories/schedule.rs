//! Personal schedule repository implementation.

use sqlx::PgPool;

use moaplay_core::error::{AppError, ErrorKind};
use moaplay_core::types::{EventId, UserId};
use moaplay_core::AppResult;

/// Read access to the schedules table.
#[derive(Debug, Clone)]
pub struct ScheduleRepository {
    pool: PgPool,
}

impl ScheduleRepository {
    /// Create a new schedule repository.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Distinct users who scheduled `event_id`, ordered by when they first
    /// added it.
    pub async fn distinct_user_ids(&self, event_id: EventId) -> AppResult<Vec<UserId>> {
        sqlx::query_scalar::<_, UserId>(
            "SELECT user_id FROM schedules WHERE event_id = $1 \
             GROUP BY user_id ORDER BY MIN(created_at), user_id",
        )
        .bind(event_id)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to load schedules", e))
    }
}
