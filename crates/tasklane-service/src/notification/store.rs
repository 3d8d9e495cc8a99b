//! Persistence seam for notification read-state management.

use async_trait::async_trait;
use uuid::Uuid;

use tasklane_core::result::AppResult;
use tasklane_core::types::pagination::{PageRequest, PageResponse};
use tasklane_database::repositories::notification::NotificationRepository;
use tasklane_entity::notification::Notification;

/// Persistence operations the notification service needs.
///
/// The sqlx repository is the production implementation; tests use an
/// in-memory store. Every mutation is scoped to the owning user and
/// reports the number of rows it touched.
#[async_trait]
pub trait NotificationStore: Send + Sync {
    /// Lists a user's notifications, newest first.
    async fn find_by_user(
        &self,
        user_id: Uuid,
        unread_only: bool,
        page: &PageRequest,
    ) -> AppResult<PageResponse<Notification>>;

    /// Counts a user's unread notifications.
    async fn count_unread(&self, user_id: Uuid) -> AppResult<i64>;

    /// Marks one notification read if it belongs to the user.
    async fn mark_read(&self, notification_id: Uuid, user_id: Uuid) -> AppResult<u64>;

    /// Marks all of the user's notifications read.
    async fn mark_all_read(&self, user_id: Uuid) -> AppResult<u64>;

    /// Deletes one notification if it belongs to the user.
    async fn delete(&self, notification_id: Uuid, user_id: Uuid) -> AppResult<u64>;
}

#[async_trait]
impl NotificationStore for NotificationRepository {
    async fn find_by_user(
        &self,
        user_id: Uuid,
        unread_only: bool,
        page: &PageRequest,
    ) -> AppResult<PageResponse<Notification>> {
        NotificationRepository::find_by_user(self, user_id, unread_only, page).await
    }

    async fn count_unread(&self, user_id: Uuid) -> AppResult<i64> {
        NotificationRepository::count_unread(self, user_id).await
    }

    async fn mark_read(&self, notification_id: Uuid, user_id: Uuid) -> AppResult<u64> {
        NotificationRepository::mark_read(self, notification_id, user_id).await
    }

    async fn mark_all_read(&self, user_id: Uuid) -> AppResult<u64> {
        NotificationRepository::mark_all_read(self, user_id).await
    }

    async fn delete(&self, notification_id: Uuid, user_id: Uuid) -> AppResult<u64> {
        NotificationRepository::delete(self, notification_id, user_id).await
    }
}
