//! Notification creation, listing, read state and deletion.

use std::sync::Arc;

use chrono::Utc;
use tracing::{error, info, warn};

use moaplay_core::AppResult;
use moaplay_core::error::AppError;
use moaplay_core::types::{EventId, NotificationId, PageResponse, RecipientId};
use moaplay_database::NotificationStore;
use moaplay_entity::notification::{
    CreatedNotification, Notification, NotificationPayload, NotificationRecipient,
    NotificationType,
};
use moaplay_entity::user::Sender;

use super::request::{CreateNotificationRequest, ListNotificationsQuery, NotificationList};
use super::resolver::RecipientResolver;
use crate::context::RequestContext;

/// Manages event notifications and their per-user read state.
///
/// Live delivery is not done here: the realtime dispatcher pushes the
/// returned payload after [`create_notification`](Self::create_notification)
/// has committed.
#[derive(Clone)]
pub struct NotificationService {
    store: Arc<dyn NotificationStore>,
    resolver: RecipientResolver,
}

impl std::fmt::Debug for NotificationService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NotificationService")
            .field("resolver", &self.resolver)
            .finish_non_exhaustive()
    }
}

impl NotificationService {
    /// Creates a new notification service.
    pub fn new(store: Arc<dyn NotificationStore>) -> Self {
        Self {
            resolver: RecipientResolver::new(Arc::clone(&store)),
            store,
        }
    }

    /// Creates a notification about an event and one unread recipient row
    /// for every user who scheduled it, atomically.
    ///
    /// Checks run in order: required fields, notification type, event
    /// existence, caller authorization (admin or event host), then a
    /// non-empty recipient set.
    pub async fn create_notification(
        &self,
        ctx: &RequestContext,
        request: CreateNotificationRequest,
    ) -> AppResult<CreatedNotification> {
        request.check()?;

        let (Some(event_id), Some(title), Some(message), Some(kind)) = (
            request.event_id,
            request.title,
            request.message,
            request.notification_type,
        ) else {
            return Err(AppError::validation("All fields are required"));
        };

        let notification_type: NotificationType = kind.parse()?;
        let event_id: EventId = event_id
            .parse()
            .map_err(|_| AppError::validation(format!("Invalid event_id: '{event_id}'")))?;

        let event = self
            .store
            .find_event(event_id)
            .await?
            .ok_or_else(|| AppError::not_found("Event not found"))?;

        if !ctx.is_admin() && !event.is_hosted_by(ctx.user_id) {
            warn!(
                user_id = %ctx.user_id,
                event_id = %event_id,
                "Rejected notification from non-host"
            );
            return Err(AppError::authorization(
                "Only admins and the event host can send notifications for this event",
            ));
        }

        let recipients = self.resolver.resolve(event_id).await?;
        if recipients.is_empty() {
            return Err(AppError::no_recipients(
                "No users have this event in their schedule",
            ));
        }

        let sender = match self.store.find_user(ctx.user_id).await? {
            Some(user) => user.as_sender(),
            None => Sender {
                id: ctx.user_id,
                nickname: ctx.nickname.clone(),
            },
        };

        let notification = Notification {
            id: NotificationId::new(),
            event_id,
            title,
            message,
            notification_type,
            sent_by: ctx.user_id,
            created_at: Utc::now(),
        };

        self.store
            .create_with_recipients(&notification, &recipients)
            .await
            .inspect_err(|e| {
                error!(
                    notification_id = %notification.id,
                    event_id = %event_id,
                    error = %e,
                    "Notification batch rolled back"
                );
            })?;

        info!(
            notification_id = %notification.id,
            event_id = %event_id,
            sender_id = %ctx.user_id,
            notification_type = %notification_type,
            recipients = recipients.len(),
            "Notification created"
        );

        Ok(CreatedNotification {
            payload: NotificationPayload::new(&notification, sender),
            recipients_count: recipients.len(),
            recipients,
        })
    }

    /// Lists the caller's notifications, newest first.
    pub async fn list_mine(
        &self,
        ctx: &RequestContext,
        query: &ListNotificationsQuery,
    ) -> AppResult<NotificationList> {
        let page = query.page_request();
        let listing = self
            .store
            .list_for_user(ctx.user_id, query.read_filter(), page)
            .await?;
        let unread_count = self.store.count_unread(ctx.user_id).await?;

        Ok(NotificationList {
            notifications: listing.items,
            unread_count,
            pagination: PageResponse::new(page, listing.total),
        })
    }

    /// Marks one of the caller's notifications as read. Repeated calls
    /// succeed and keep the original `read_at`.
    pub async fn mark_read(
        &self,
        ctx: &RequestContext,
        recipient_id: RecipientId,
    ) -> AppResult<NotificationRecipient> {
        let recipient = self
            .store
            .find_recipient(recipient_id)
            .await?
            .ok_or_else(|| AppError::not_found("Notification not found"))?;

        if !recipient.is_owned_by(ctx.user_id) {
            return Err(AppError::authorization(
                "You can only mark your own notifications as read",
            ));
        }

        if recipient.is_read {
            return Ok(recipient);
        }

        self.store
            .mark_recipient_read(recipient_id, Utc::now())
            .await?
            .ok_or_else(|| AppError::not_found("Notification not found"))
    }

    /// Deletes a notification the caller sent, with all recipient rows.
    pub async fn delete_notification(
        &self,
        ctx: &RequestContext,
        notification_id: NotificationId,
    ) -> AppResult<()> {
        let notification = self
            .store
            .find_notification(notification_id)
            .await?
            .ok_or_else(|| AppError::not_found("Notification not found"))?;

        if !notification.is_sent_by(ctx.user_id) {
            return Err(AppError::authorization(
                "Only the sender can delete a notification",
            ));
        }

        self.store.delete_notification(notification_id).await?;
        info!(notification_id = %notification_id, "Notification deleted");
        Ok(())
    }

    /// Checks that the backing store is reachable.
    pub async fn health_check(&self) -> AppResult<bool> {
        self.store.health_check().await
    }
}
