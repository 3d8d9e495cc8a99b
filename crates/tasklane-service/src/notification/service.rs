//! Notification listing and read-state management.

use std::sync::Arc;

use uuid::Uuid;

use tasklane_core::error::AppError;
use tasklane_core::types::pagination::{PageRequest, PageResponse};
use tasklane_entity::notification::Notification;
use tasklane_realtime::EventPublisher;

use crate::context::RequestContext;

use super::store::NotificationStore;

/// Handles notification listing and read-state changes.
#[derive(Clone)]
pub struct NotificationService {
    /// Notification persistence.
    repo: Arc<dyn NotificationStore>,
    /// Real-time event publisher.
    publisher: Arc<EventPublisher>,
}

impl std::fmt::Debug for NotificationService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NotificationService").finish()
    }
}

impl NotificationService {
    /// Creates a new notification service.
    pub fn new(repo: Arc<dyn NotificationStore>, publisher: Arc<EventPublisher>) -> Self {
        Self { repo, publisher }
    }

    /// Lists the user's notifications, newest first.
    pub async fn list(
        &self,
        ctx: &RequestContext,
        unread_only: bool,
        page: &PageRequest,
    ) -> Result<PageResponse<Notification>, AppError> {
        self.repo.find_by_user(ctx.user_id, unread_only, page).await
    }

    /// Counts the user's unread notifications.
    pub async fn unread_count(&self, ctx: &RequestContext) -> Result<i64, AppError> {
        self.repo.count_unread(ctx.user_id).await
    }

    /// Marks one notification read. Scoped to the owner.
    pub async fn mark_read(
        &self,
        ctx: &RequestContext,
        notification_id: Uuid,
    ) -> Result<(), AppError> {
        let affected = self.repo.mark_read(notification_id, ctx.user_id).await?;
        if affected == 0 {
            return Err(AppError::not_found("Notification not found"));
        }

        self.publisher
            .notifications_read(ctx.user_id, affected)
            .await;
        Ok(())
    }

    /// Marks all of the user's notifications read.
    pub async fn mark_all_read(&self, ctx: &RequestContext) -> Result<u64, AppError> {
        let affected = self.repo.mark_all_read(ctx.user_id).await?;
        if affected > 0 {
            self.publisher
                .notifications_read(ctx.user_id, affected)
                .await;
        }
        Ok(affected)
    }

    /// Deletes one notification. Scoped to the owner.
    pub async fn delete(
        &self,
        ctx: &RequestContext,
        notification_id: Uuid,
    ) -> Result<(), AppError> {
        let affected = self.repo.delete(notification_id, ctx.user_id).await?;
        if affected == 0 {
            return Err(AppError::not_found("Notification not found"));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use std::sync::Mutex;

    use async_trait::async_trait;
    use chrono::Utc;
    use tokio::sync::mpsc;

    use tasklane_core::config::{BatchingConfig, RealtimeConfig};
    use tasklane_core::result::AppResult;
    use tasklane_entity::notification::{NewNotification, NotificationKind};
    use tasklane_entity::user::UserSnapshot;
    use tasklane_realtime::events::NotificationSink;
    use tasklane_realtime::{ConnectionRegistry, EventPublisher, NotificationBatcher};

    struct NullSink;

    #[async_trait]
    impl NotificationSink for NullSink {
        async fn persist(&self, new: NewNotification) -> Result<Notification, AppError> {
            let now = Utc::now();
            Ok(Notification {
                id: Uuid::new_v4(),
                user_id: new.user_id,
                kind: new.kind.as_str().to_string(),
                title: new.title,
                message: new.message,
                payload: new.payload,
                is_read: false,
                created_at: now,
                updated_at: now,
            })
        }
    }

    /// Owner-scoped in-memory store.
    struct MemoryNotifications {
        rows: Mutex<Vec<Notification>>,
    }

    impl MemoryNotifications {
        fn new() -> Self {
            Self {
                rows: Mutex::new(Vec::new()),
            }
        }

        fn insert(&self, notification: Notification) {
            self.rows.lock().unwrap().push(notification);
        }
    }

    #[async_trait]
    impl NotificationStore for MemoryNotifications {
        async fn find_by_user(
            &self,
            user_id: Uuid,
            unread_only: bool,
            page: &PageRequest,
        ) -> AppResult<PageResponse<Notification>> {
            let items: Vec<Notification> = self
                .rows
                .lock()
                .unwrap()
                .iter()
                .filter(|n| n.user_id == user_id && (!unread_only || !n.is_read))
                .cloned()
                .collect();
            let total = items.len() as u64;
            Ok(PageResponse::new(items, page.page, page.page_size, total))
        }

        async fn count_unread(&self, user_id: Uuid) -> AppResult<i64> {
            Ok(self
                .rows
                .lock()
                .unwrap()
                .iter()
                .filter(|n| n.user_id == user_id && !n.is_read)
                .count() as i64)
        }

        async fn mark_read(&self, notification_id: Uuid, user_id: Uuid) -> AppResult<u64> {
            let mut rows = self.rows.lock().unwrap();
            match rows
                .iter_mut()
                .find(|n| n.id == notification_id && n.user_id == user_id && !n.is_read)
            {
                Some(n) => {
                    n.is_read = true;
                    Ok(1)
                }
                None => Ok(0),
            }
        }

        async fn mark_all_read(&self, user_id: Uuid) -> AppResult<u64> {
            let mut rows = self.rows.lock().unwrap();
            let mut affected = 0;
            for n in rows.iter_mut().filter(|n| n.user_id == user_id && !n.is_read) {
                n.is_read = true;
                affected += 1;
            }
            Ok(affected)
        }

        async fn delete(&self, notification_id: Uuid, user_id: Uuid) -> AppResult<u64> {
            let mut rows = self.rows.lock().unwrap();
            let before = rows.len();
            rows.retain(|n| !(n.id == notification_id && n.user_id == user_id));
            Ok((before - rows.len()) as u64)
        }
    }

    fn stored_notification(user_id: Uuid) -> Notification {
        let now = Utc::now();
        Notification {
            id: Uuid::new_v4(),
            user_id,
            kind: NotificationKind::TodoStateChanged.as_str().to_string(),
            title: "Todo status changed".to_string(),
            message: "'Write report' moved from todo to in_progress".to_string(),
            payload: None,
            is_read: false,
            created_at: now,
            updated_at: now,
        }
    }

    fn harness(
        user: &UserSnapshot,
    ) -> (
        NotificationService,
        Arc<MemoryNotifications>,
        mpsc::Receiver<String>,
    ) {
        let registry = Arc::new(ConnectionRegistry::new(RealtimeConfig::default()));
        let batcher = Arc::new(NotificationBatcher::new(
            registry.clone(),
            BatchingConfig::default(),
        ));
        let publisher = Arc::new(EventPublisher::new(
            registry.clone(),
            batcher,
            Arc::new(NullSink),
            None,
        ));
        let (_handle, rx) = registry.register(user.clone());

        let store = Arc::new(MemoryNotifications::new());
        let service = NotificationService::new(store.clone(), publisher);
        (service, store, rx)
    }

    fn snapshot() -> UserSnapshot {
        UserSnapshot {
            id: Uuid::new_v4(),
            username: "alice".to_string(),
            theme: "light".to_string(),
        }
    }

    #[tokio::test]
    async fn mark_read_is_scoped_to_the_owner() {
        let user = snapshot();
        let (service, store, mut rx) = harness(&user);

        let notification = stored_notification(user.id);
        let notification_id = notification.id;
        store.insert(notification);

        let intruder = RequestContext::new(Uuid::new_v4(), "mallory".to_string());
        let err = service
            .mark_read(&intruder, notification_id)
            .await
            .unwrap_err();
        assert!(err.to_string().contains("not found"));

        // Still unread for the owner, and no read event went out.
        let owner = RequestContext::new(user.id, user.username.clone());
        assert_eq!(service.unread_count(&owner).await.unwrap(), 1);
        assert!(rx.try_recv().is_err());
    }

    #[tokio::test]
    async fn mark_read_updates_state_and_notifies() {
        let user = snapshot();
        let (service, store, mut rx) = harness(&user);
        let ctx = RequestContext::new(user.id, user.username.clone());

        let notification = stored_notification(user.id);
        let notification_id = notification.id;
        store.insert(notification);

        service.mark_read(&ctx, notification_id).await.unwrap();
        assert_eq!(service.unread_count(&ctx).await.unwrap(), 0);

        let msg = rx.try_recv().unwrap();
        assert!(msg.contains("notifications_read"));
    }
}
