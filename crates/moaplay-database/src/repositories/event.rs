//! Event repository implementation.

use sqlx::PgPool;

use moaplay_core::error::{AppError, ErrorKind};
use moaplay_core::types::EventId;
use moaplay_core::AppResult;
use moaplay_entity::event::Event;

/// Read access to the events table.
#[derive(Debug, Clone)]
pub struct EventRepository {
    pool: PgPool,
}

impl EventRepository {
    /// Create a new event repository.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Find an event by id.
    pub async fn find_by_id(&self, id: EventId) -> AppResult<Option<Event>> {
        sqlx::query_as::<_, Event>("SELECT id, host_id, title FROM events WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to find event", e))
    }
}
