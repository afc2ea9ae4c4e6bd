//! Notification handlers: send, list, mark read, delete and the live stream.

use std::convert::Infallible;

use axum::Json;
use axum::extract::rejection::{JsonRejection, QueryRejection};
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::http::header::{CACHE_CONTROL, HeaderName};
use axum::response::IntoResponse;
use axum::response::sse::{Event, Sse};
use futures::StreamExt;
use futures::future;
use tracing::warn;

use moaplay_core::error::AppError;
use moaplay_core::types::{NotificationId, RecipientId};
use moaplay_entity::notification::CreatedNotification;
use moaplay_realtime::StreamFrame;
use moaplay_service::{CreateNotificationRequest, ListNotificationsQuery, NotificationList};

use crate::dto::response::MessageResponse;
use crate::error::ApiError;
use crate::extractors::{AuthUser, parse_id};
use crate::state::AppState;

const X_ACCEL_BUFFERING: HeaderName = HeaderName::from_static("x-accel-buffering");

/// POST /api/notifications
pub async fn send(
    State(state): State<AppState>,
    auth: AuthUser,
    body: Result<Json<CreateNotificationRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<CreatedNotification>), ApiError> {
    let Json(request) = body.map_err(|e| AppError::validation(e.body_text()))?;
    let created = state.dispatcher.send(&auth, request).await?;
    Ok((StatusCode::CREATED, Json(created)))
}

/// GET /api/notifications/my
pub async fn list_mine(
    State(state): State<AppState>,
    auth: AuthUser,
    query: Result<Query<ListNotificationsQuery>, QueryRejection>,
) -> Result<Json<NotificationList>, ApiError> {
    let Query(query) = query.map_err(|e| AppError::validation(e.body_text()))?;
    let list = state.notification_service.list_mine(&auth, &query).await?;
    Ok(Json(list))
}

/// PUT /api/notifications/{recipient_id}/read
pub async fn mark_read(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(recipient_id): Path<String>,
) -> Result<Json<MessageResponse>, ApiError> {
    let recipient_id: RecipientId = parse_id(&recipient_id, "recipient_id")?;
    state
        .notification_service
        .mark_read(&auth, recipient_id)
        .await?;
    Ok(Json(MessageResponse::new("Notification marked as read")))
}

/// DELETE /api/notifications/{notification_id}
pub async fn delete_notification(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(notification_id): Path<String>,
) -> Result<Json<MessageResponse>, ApiError> {
    let notification_id: NotificationId = parse_id(&notification_id, "notification_id")?;
    state
        .notification_service
        .delete_notification(&auth, notification_id)
        .await?;
    Ok(Json(MessageResponse::new("Notification deleted")))
}

/// GET /api/notifications/stream
///
/// Opens the caller's Server-Sent-Events stream. Each notification is a
/// `data:` frame holding the JSON payload; idle connections get a
/// `: heartbeat` comment. The stream closes when the client disconnects or
/// the server shuts down.
pub async fn stream(State(state): State<AppState>, auth: AuthUser) -> impl IntoResponse {
    let user_id = auth.user_id;
    let events = state
        .dispatcher
        .open_stream(user_id)
        .filter_map(move |frame| future::ready(to_event(frame).map(Ok::<_, Infallible>)));

    (
        [(CACHE_CONTROL, "no-cache"), (X_ACCEL_BUFFERING, "no")],
        Sse::new(events),
    )
}

fn to_event(frame: StreamFrame) -> Option<Event> {
    match frame {
        StreamFrame::Notification(payload) => match Event::default().json_data(&*payload) {
            Ok(event) => Some(event),
            Err(e) => {
                warn!(
                    notification_id = %payload.id,
                    error = %e,
                    "Skipping notification that failed to serialize"
                );
                None
            }
        },
        StreamFrame::Heartbeat => Some(Event::default().comment("heartbeat")),
    }
}
