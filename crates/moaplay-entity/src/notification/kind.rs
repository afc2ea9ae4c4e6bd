//! Notification type enumeration.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Severity of a notification, chosen by the sender.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "notification_type", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum NotificationType {
    /// General information.
    Info,
    /// Something attendees should be aware of.
    Warning,
    /// Needs immediate attention (cancellations, safety).
    Urgent,
}

impl NotificationType {
    /// Return the type as a lowercase string.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Info => "info",
            Self::Warning => "warning",
            Self::Urgent => "urgent",
        }
    }
}

impl fmt::Display for NotificationType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for NotificationType {
    type Err = moaplay_core::AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "info" => Ok(Self::Info),
            "warning" => Ok(Self::Warning),
            "urgent" => Ok(Self::Urgent),
            _ => Err(moaplay_core::AppError::validation(format!(
                "Invalid notification type: '{s}'. Expected one of: info, warning, urgent"
            ))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_str_is_exact() {
        assert_eq!("urgent".parse::<NotificationType>().unwrap(), NotificationType::Urgent);
        assert!("URGENT".parse::<NotificationType>().is_err());
        assert!("alert".parse::<NotificationType>().is_err());
        assert!("".parse::<NotificationType>().is_err());
    }

    #[test]
    fn test_serializes_lowercase() {
        let json = serde_json::to_string(&NotificationType::Warning).unwrap();
        assert_eq!(json, "\"warning\"");
    }
}
