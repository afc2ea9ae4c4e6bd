//! Notification and recipient repository implementation.

use chrono::{DateTime, Utc};
use sqlx::{FromRow, PgPool};
use uuid::Uuid;

use moaplay_core::error::{AppError, ErrorKind};
use moaplay_core::types::{EventId, NotificationId, PageRequest, RecipientId, UserId};
use moaplay_core::AppResult;
use moaplay_entity::notification::{
    Notification, NotificationPayload, NotificationRecipient, NotificationType, RecipientView,
};
use moaplay_entity::user::Sender;

const RECIPIENT_COLUMNS: &str = "id, notification_id, user_id, is_read, read_at, created_at";

/// A recipient row joined with its notification and the sender's nickname.
#[derive(Debug, FromRow)]
struct RecipientRow {
    id: RecipientId,
    notification_id: NotificationId,
    is_read: bool,
    read_at: Option<DateTime<Utc>>,
    created_at: DateTime<Utc>,
    event_id: EventId,
    title: String,
    message: String,
    #[sqlx(rename = "type")]
    notification_type: NotificationType,
    sent_by: UserId,
    sender_nickname: String,
    notification_created_at: DateTime<Utc>,
}

impl From<RecipientRow> for RecipientView {
    fn from(row: RecipientRow) -> Self {
        Self {
            id: row.id,
            notification: NotificationPayload {
                id: row.notification_id,
                event_id: row.event_id,
                title: row.title,
                message: row.message,
                notification_type: row.notification_type,
                sender: Sender {
                    id: row.sent_by,
                    nickname: row.sender_nickname,
                },
                created_at: row.notification_created_at,
            },
            is_read: row.is_read,
            read_at: row.read_at,
            created_at: row.created_at,
        }
    }
}

/// Repository for notifications and their per-user recipient rows.
#[derive(Debug, Clone)]
pub struct NotificationRepository {
    pool: PgPool,
}

impl NotificationRepository {
    /// Create a new notification repository.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Insert a notification and one unread recipient row per user in a
    /// single transaction. Returns the number of recipient rows written.
    ///
    /// Any failure rolls the whole batch back; the transaction is dropped
    /// without commit.
    pub async fn create_with_recipients(
        &self,
        notification: &Notification,
        recipients: &[UserId],
    ) -> AppResult<u64> {
        let mut tx = self.pool.begin().await.map_err(|e| {
            AppError::with_source(ErrorKind::Database, "Failed to begin transaction", e)
        })?;

        sqlx::query(
            "INSERT INTO notifications (id, event_id, title, message, type, sent_by, created_at) \
             VALUES ($1, $2, $3, $4, $5, $6, $7)",
        )
        .bind(notification.id)
        .bind(notification.event_id)
        .bind(&notification.title)
        .bind(&notification.message)
        .bind(notification.notification_type)
        .bind(notification.sent_by)
        .bind(notification.created_at)
        .execute(&mut *tx)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to insert notification", e))?;

        let recipient_ids: Vec<Uuid> = recipients.iter().map(|_| Uuid::new_v4()).collect();
        let user_ids: Vec<Uuid> = recipients.iter().map(|id| id.into_uuid()).collect();

        let inserted = sqlx::query(
            "INSERT INTO notification_recipients (id, notification_id, user_id, is_read, created_at) \
             SELECT r.id, $3, r.user_id, FALSE, $4 \
             FROM UNNEST($1::uuid[], $2::uuid[]) AS r(id, user_id)",
        )
        .bind(recipient_ids)
        .bind(user_ids)
        .bind(notification.id)
        .bind(notification.created_at)
        .execute(&mut *tx)
        .await
        .map_err(|e| {
            AppError::with_source(ErrorKind::Database, "Failed to insert notification recipients", e)
        })?
        .rows_affected();

        tx.commit().await.map_err(|e| {
            AppError::with_source(ErrorKind::Database, "Failed to commit notification", e)
        })?;

        Ok(inserted)
    }

    /// Find a notification by id.
    pub async fn find_by_id(&self, id: NotificationId) -> AppResult<Option<Notification>> {
        sqlx::query_as::<_, Notification>(
            "SELECT id, event_id, title, message, type, sent_by, created_at \
             FROM notifications WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to find notification", e))
    }

    /// Delete a notification; recipient rows go with it via `ON DELETE CASCADE`.
    pub async fn delete(&self, id: NotificationId) -> AppResult<bool> {
        let result = sqlx::query("DELETE FROM notifications WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(|e| {
                AppError::with_source(ErrorKind::Database, "Failed to delete notification", e)
            })?;
        Ok(result.rows_affected() > 0)
    }

    /// Find a recipient record by id.
    pub async fn find_recipient(&self, id: RecipientId) -> AppResult<Option<NotificationRecipient>> {
        sqlx::query_as::<_, NotificationRecipient>(&format!(
            "SELECT {RECIPIENT_COLUMNS} FROM notification_recipients WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to find recipient", e))
    }

    /// Mark a recipient record read. `read_at` is only set on the first call.
    pub async fn mark_recipient_read(
        &self,
        id: RecipientId,
        at: DateTime<Utc>,
    ) -> AppResult<Option<NotificationRecipient>> {
        sqlx::query_as::<_, NotificationRecipient>(&format!(
            "UPDATE notification_recipients \
             SET is_read = TRUE, read_at = COALESCE(read_at, $2) \
             WHERE id = $1 RETURNING {RECIPIENT_COLUMNS}"
        ))
        .bind(id)
        .bind(at)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to mark notification read", e))
    }

    /// Page through a user's recipient records, newest first, optionally
    /// filtered by read state. Returns the page and the filtered total.
    pub async fn find_by_user(
        &self,
        user_id: UserId,
        is_read: Option<bool>,
        page: PageRequest,
    ) -> AppResult<(Vec<RecipientView>, u64)> {
        let total: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM notification_recipients \
             WHERE user_id = $1 AND ($2::BOOLEAN IS NULL OR is_read = $2)",
        )
        .bind(user_id)
        .bind(is_read)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to count notifications", e))?;

        let rows = sqlx::query_as::<_, RecipientRow>(
            "SELECT r.id, r.notification_id, r.is_read, r.read_at, r.created_at, \
                    n.event_id, n.title, n.message, n.type, n.sent_by, \
                    n.created_at AS notification_created_at, u.nickname AS sender_nickname \
             FROM notification_recipients r \
             JOIN notifications n ON n.id = r.notification_id \
             JOIN users u ON u.id = n.sent_by \
             WHERE r.user_id = $1 AND ($2::BOOLEAN IS NULL OR r.is_read = $2) \
             ORDER BY r.created_at DESC, r.id DESC \
             LIMIT $3 OFFSET $4",
        )
        .bind(user_id)
        .bind(is_read)
        .bind(i64::try_from(page.limit()).unwrap_or(i64::MAX))
        .bind(i64::try_from(page.offset()).unwrap_or(i64::MAX))
        .fetch_all(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to list notifications", e))?;

        Ok((rows.into_iter().map(RecipientView::from).collect(), total as u64))
    }

    /// Count a user's unread recipient records.
    pub async fn count_unread(&self, user_id: UserId) -> AppResult<u64> {
        let count: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM notification_recipients WHERE user_id = $1 AND is_read = FALSE",
        )
        .bind(user_id)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to count unread", e))?;
        Ok(count as u64)
    }
}
