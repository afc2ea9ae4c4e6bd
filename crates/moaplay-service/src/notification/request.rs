//! Notification request and response shapes.

use serde::{Deserialize, Serialize};
use validator::{Validate, ValidationErrors};

use moaplay_core::AppError;
use moaplay_core::types::{PageRequest, PageResponse};
use moaplay_core::types::pagination::DEFAULT_PER_PAGE;
use moaplay_entity::notification::RecipientView;

/// Body of a send-notification request.
///
/// Every field is optional at the type level so that a missing field is
/// reported as a validation failure rather than a JSON rejection.
#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
pub struct CreateNotificationRequest {
    /// Target event.
    #[validate(required(message = "event_id is required"), length(min = 1, message = "event_id is required"))]
    pub event_id: Option<String>,
    /// Title.
    #[validate(
        required(message = "title is required"),
        length(min = 1, max = 255, message = "title must be 1 to 255 characters")
    )]
    pub title: Option<String>,
    /// Body text.
    #[validate(required(message = "message is required"), length(min = 1, message = "message is required"))]
    pub message: Option<String>,
    /// One of `info`, `warning`, `urgent`.
    #[serde(rename = "type")]
    #[validate(required(message = "type is required"), length(min = 1, message = "type is required"))]
    pub notification_type: Option<String>,
}

impl CreateNotificationRequest {
    /// Run field validation, flattening failures into one validation error.
    pub fn check(&self) -> Result<(), AppError> {
        self.validate()
            .map_err(|errors| AppError::validation(describe(&errors)))
    }
}

/// Render validation failures as one sorted, de-duplicated message.
fn describe(errors: &ValidationErrors) -> String {
    let mut messages: Vec<String> = Vec::new();
    for (field, field_errors) in errors.field_errors() {
        for error in field_errors {
            let message = match &error.message {
                Some(message) => message.to_string(),
                None => format!("{field} is invalid"),
            };
            if !messages.contains(&message) {
                messages.push(message);
            }
        }
    }
    messages.sort();
    messages.join("; ")
}

/// Query string of the "my notifications" listing.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ListNotificationsQuery {
    /// Page number (1-based).
    pub page: Option<u64>,
    /// Page size.
    pub per_page: Option<u64>,
    /// `"true"` or `"false"`; anything else means no filter.
    pub is_read: Option<String>,
}

impl ListNotificationsQuery {
    /// The clamped page request.
    pub fn page_request(&self) -> PageRequest {
        PageRequest::new(
            self.page.unwrap_or(1),
            self.per_page.unwrap_or(DEFAULT_PER_PAGE),
        )
    }

    /// The read-state filter.
    pub fn read_filter(&self) -> Option<bool> {
        match self.is_read.as_deref() {
            Some("true") => Some(true),
            Some("false") => Some(false),
            _ => None,
        }
    }
}

/// One page of the caller's notifications.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NotificationList {
    /// Recipient records, newest first.
    pub notifications: Vec<RecipientView>,
    /// Unread records across all pages, ignoring the filter.
    pub unread_count: u64,
    /// Pagination metadata.
    pub pagination: PageResponse,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn valid() -> CreateNotificationRequest {
        CreateNotificationRequest {
            event_id: Some("8b7f5c3e-3d59-4a43-9f62-0d6f4f1a2b3c".to_string()),
            title: Some("Gate change".to_string()),
            message: Some("Use the north gate".to_string()),
            notification_type: Some("info".to_string()),
        }
    }

    #[test]
    fn test_valid_request_passes() {
        assert!(valid().check().is_ok());
    }

    #[test]
    fn test_missing_fields_are_reported_in_order() {
        let request = CreateNotificationRequest {
            title: Some(String::new()),
            ..Default::default()
        };
        let err = request.check().unwrap_err();
        assert_eq!(
            err.message,
            "event_id is required; message is required; title must be 1 to 255 characters; type is required"
        );
    }

    #[test]
    fn test_title_length_limit() {
        let mut request = valid();
        request.title = Some("가".repeat(255));
        assert!(request.check().is_ok());

        request.title = Some("a".repeat(256));
        let err = request.check().unwrap_err();
        assert!(err.message.contains("255"));
    }

    #[test]
    fn test_type_field_is_renamed() {
        let request: CreateNotificationRequest =
            serde_json::from_str(r#"{"event_id":"x","title":"t","message":"m","type":"urgent"}"#)
                .unwrap();
        assert_eq!(request.notification_type.as_deref(), Some("urgent"));
    }

    #[test]
    fn test_read_filter() {
        let mut query = ListNotificationsQuery::default();
        assert_eq!(query.read_filter(), None);
        query.is_read = Some("false".to_string());
        assert_eq!(query.read_filter(), Some(false));
        query.is_read = Some("yes".to_string());
        assert_eq!(query.read_filter(), None);
    }

    #[test]
    fn test_page_request_defaults_and_clamps() {
        let query = ListNotificationsQuery::default();
        assert_eq!(query.page_request(), PageRequest::new(1, 20));

        let query = ListNotificationsQuery {
            page: Some(0),
            per_page: Some(500),
            is_read: None,
        };
        assert_eq!(query.page_request(), PageRequest::new(1, 100));
    }
}
