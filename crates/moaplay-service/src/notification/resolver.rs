//! Recipient resolution: who receives a notification about an event.

use std::sync::Arc;

use tracing::debug;

use moaplay_core::AppResult;
use moaplay_core::types::{EventId, UserId};
use moaplay_database::NotificationStore;

/// Resolves the users a notification about an event fans out to: everyone
/// who added the event to their personal schedule, each exactly once.
#[derive(Clone)]
pub struct RecipientResolver {
    store: Arc<dyn NotificationStore>,
}

impl std::fmt::Debug for RecipientResolver {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RecipientResolver").finish_non_exhaustive()
    }
}

impl RecipientResolver {
    /// Creates a new resolver.
    pub fn new(store: Arc<dyn NotificationStore>) -> Self {
        Self { store }
    }

    /// Distinct user ids who scheduled `event_id`. An empty result is not an
    /// error here; callers decide what it means.
    pub async fn resolve(&self, event_id: EventId) -> AppResult<Vec<UserId>> {
        let mut recipients = self.store.scheduled_user_ids(event_id).await?;
        let before = recipients.len();
        let mut seen = std::collections::HashSet::with_capacity(before);
        recipients.retain(|id| seen.insert(*id));

        debug!(
            event_id = %event_id,
            recipients = recipients.len(),
            duplicates = before - recipients.len(),
            "Resolved notification recipients"
        );
        Ok(recipients)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use moaplay_database::MemoryNotificationStore;
    use moaplay_entity::user::UserRole;

    #[tokio::test]
    async fn test_resolve_returns_each_scheduler_once() {
        let store = MemoryNotificationStore::new();
        let host = store.add_user("host", UserRole::User);
        let u1 = store.add_user("u1", UserRole::User);
        let u2 = store.add_user("u2", UserRole::User);
        let u3 = store.add_user("u3", UserRole::User);
        let event = store.add_event(host, "Street food fair");
        let other = store.add_event(host, "Lantern parade");
        store.add_schedule(u1, event);
        store.add_schedule(u2, event);
        store.add_schedule(u1, event);
        store.add_schedule(u3, other);

        let resolver = RecipientResolver::new(Arc::new(store));
        let recipients = resolver.resolve(event).await.unwrap();
        assert_eq!(recipients, vec![u1, u2]);
    }

    #[tokio::test]
    async fn test_resolve_empty_is_ok() {
        let store = MemoryNotificationStore::new();
        let host = store.add_user("host", UserRole::User);
        let event = store.add_event(host, "Quiet event");

        let resolver = RecipientResolver::new(Arc::new(store));
        assert!(resolver.resolve(event).await.unwrap().is_empty());
    }
}
