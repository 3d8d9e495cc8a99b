//! Notification batching — buffers normal-priority notifications per user
//! and flushes them as digests.

use std::sync::Arc;

use chrono::Utc;
use dashmap::DashMap;
use tokio::sync::{Mutex, broadcast};
use tokio::time;
use tracing::{debug, info};
use uuid::Uuid;

use tasklane_core::config::BatchingConfig;
use tasklane_entity::notification::Notification;

use crate::connection::ConnectionRegistry;
use crate::message::types::ServerEvent;

/// Buffers notifications per user and flushes them as `notification_batch`
/// events, either when a buffer reaches the size threshold or on the
/// periodic timer.
///
/// Each user's buffer sits behind its own mutex, so a threshold flush and
/// a timer flush can never drain the same notifications twice.
#[derive(Debug)]
pub struct NotificationBatcher {
    /// Per-user buffered notifications, oldest first.
    buffers: DashMap<Uuid, Arc<Mutex<Vec<Notification>>>>,
    /// Connection registry for delivery.
    registry: Arc<ConnectionRegistry>,
    /// Batching settings.
    config: BatchingConfig,
}

impl NotificationBatcher {
    /// Creates a new batcher.
    pub fn new(registry: Arc<ConnectionRegistry>, config: BatchingConfig) -> Self {
        Self {
            buffers: DashMap::new(),
            registry,
            config,
        }
    }

    /// Buffers a notification for its recipient.
    ///
    /// When the buffer reaches the size threshold, exactly that many
    /// notifications are flushed immediately; later arrivals wait for the
    /// next flush.
    pub async fn enqueue(&self, notification: Notification) {
        let user_id = notification.user_id;
        let buffer = self
            .buffers
            .entry(user_id)
            .or_insert_with(|| Arc::new(Mutex::new(Vec::new())))
            .clone();

        let batch = {
            let mut buf = buffer.lock().await;
            buf.push(notification);
            if buf.len() >= self.config.max_batch_size {
                buf.drain(..self.config.max_batch_size).collect()
            } else {
                Vec::new()
            }
        };

        if !batch.is_empty() {
            debug!(user_id = %user_id, count = batch.len(), "Size-triggered batch flush");
            self.deliver(&user_id, batch);
        }
    }

    /// Flushes one user's buffer, if non-empty.
    pub async fn flush_user(&self, user_id: &Uuid) {
        let buffer = match self.buffers.get(user_id) {
            Some(entry) => entry.value().clone(),
            None => return,
        };

        let batch: Vec<Notification> = {
            let mut buf = buffer.lock().await;
            buf.drain(..).collect()
        };

        if !batch.is_empty() {
            self.deliver(user_id, batch);
        }
    }

    /// Flushes every user's buffer.
    pub async fn flush_all(&self) {
        let user_ids: Vec<Uuid> = self.buffers.iter().map(|entry| *entry.key()).collect();
        for user_id in user_ids {
            self.flush_user(&user_id).await;
        }
    }

    /// Number of buffered notifications for a user.
    pub async fn pending_count(&self, user_id: &Uuid) -> usize {
        match self.buffers.get(user_id) {
            Some(entry) => entry.value().clone().lock().await.len(),
            None => 0,
        }
    }

    fn deliver(&self, user_id: &Uuid, batch: Vec<Notification>) {
        let event = ServerEvent::NotificationBatch {
            count: batch.len(),
            notifications: batch,
            timestamp: Utc::now(),
        };
        self.registry.broadcast_to_user(user_id, &event);
    }

    /// Runs the periodic flush loop until shutdown.
    ///
    /// Remaining buffers are flushed one last time on shutdown.
    pub async fn run(self: Arc<Self>, mut shutdown: broadcast::Receiver<()>) {
        let mut interval =
            time::interval(std::time::Duration::from_secs(self.config.flush_interval_seconds));
        interval.tick().await;

        loop {
            tokio::select! {
                _ = interval.tick() => {
                    self.flush_all().await;
                }
                _ = shutdown.recv() => {
                    info!("Notification batcher shutting down, flushing buffers");
                    self.flush_all().await;
                    break;
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use tasklane_core::config::RealtimeConfig;
    use tasklane_entity::notification::NotificationKind;
    use tasklane_entity::user::UserSnapshot;

    fn notification(user_id: Uuid, title: &str) -> Notification {
        Notification {
            id: Uuid::new_v4(),
            user_id,
            kind: NotificationKind::TodoStateChanged.as_str().to_string(),
            title: title.to_string(),
            message: "moved".to_string(),
            payload: None,
            is_read: false,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    fn setup(max_batch_size: usize) -> (Arc<ConnectionRegistry>, NotificationBatcher) {
        let registry = Arc::new(ConnectionRegistry::new(RealtimeConfig::default()));
        let config = BatchingConfig {
            max_batch_size,
            flush_interval_seconds: 60,
        };
        let batcher = NotificationBatcher::new(registry.clone(), config);
        (registry, batcher)
    }

    #[tokio::test]
    async fn size_threshold_flushes_exactly_max_and_keeps_remainder() {
        let (registry, batcher) = setup(5);
        let user = UserSnapshot {
            id: Uuid::new_v4(),
            username: "alice".to_string(),
            theme: "light".to_string(),
        };
        let (_h, mut rx) = registry.register(user.clone());

        for i in 0..6 {
            batcher.enqueue(notification(user.id, &format!("n{i}"))).await;
        }

        let raw = rx.try_recv().unwrap();
        let json: serde_json::Value = serde_json::from_str(&raw).unwrap();
        assert_eq!(json["type"], "notification_batch");
        assert_eq!(json["count"], 5);
        assert_eq!(json["notifications"][0]["title"], "n0");

        // The sixth notification stays buffered.
        assert!(rx.try_recv().is_err());
        assert_eq!(batcher.pending_count(&user.id).await, 1);
    }

    #[tokio::test]
    async fn timer_flush_drains_remainder() {
        let (registry, batcher) = setup(5);
        let user = UserSnapshot {
            id: Uuid::new_v4(),
            username: "bob".to_string(),
            theme: "light".to_string(),
        };
        let (_h, mut rx) = registry.register(user.clone());

        batcher.enqueue(notification(user.id, "only")).await;
        assert!(rx.try_recv().is_err());

        batcher.flush_all().await;

        let raw = rx.try_recv().unwrap();
        let json: serde_json::Value = serde_json::from_str(&raw).unwrap();
        assert_eq!(json["count"], 1);
        assert_eq!(batcher.pending_count(&user.id).await, 0);
    }

    #[tokio::test]
    async fn flush_skips_empty_buffers() {
        let (registry, batcher) = setup(5);
        let user = UserSnapshot {
            id: Uuid::new_v4(),
            username: "carol".to_string(),
            theme: "light".to_string(),
        };
        let (_h, mut rx) = registry.register(user.clone());

        batcher.flush_all().await;
        batcher.flush_user(&user.id).await;

        assert!(rx.try_recv().is_err());
    }
}
