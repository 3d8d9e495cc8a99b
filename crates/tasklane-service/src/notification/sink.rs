//! Repository-backed notification sink for the real-time engine.

use std::sync::Arc;

use async_trait::async_trait;

use tasklane_core::error::AppError;
use tasklane_database::repositories::notification::NotificationRepository;
use tasklane_entity::notification::{NewNotification, Notification};
use tasklane_realtime::events::NotificationSink;

/// Persists notifications through the notification repository.
#[derive(Clone)]
pub struct PersistentSink {
    /// Notification repository.
    repo: Arc<NotificationRepository>,
}

impl std::fmt::Debug for PersistentSink {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PersistentSink").finish()
    }
}

impl PersistentSink {
    /// Creates a new repository-backed sink.
    pub fn new(repo: Arc<NotificationRepository>) -> Self {
        Self { repo }
    }
}

#[async_trait]
impl NotificationSink for PersistentSink {
    async fn persist(&self, notification: NewNotification) -> Result<Notification, AppError> {
        self.repo.create(&notification).await
    }
}
