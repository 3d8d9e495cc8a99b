//! Event publisher — translates domain mutations into wire events and
//! persisted notifications.

use std::sync::Arc;

use async_trait::async_trait;
use tracing::{error, warn};
use uuid::Uuid;

use tasklane_core::error::AppError;
use tasklane_entity::attachment::Attachment;
use tasklane_entity::notification::{DeliveryPriority, NewNotification, Notification};
use tasklane_entity::todo::{Todo, TodoChanges, TodoPriority, TodoStatus};
use tasklane_entity::user::UserSnapshot;

use crate::batch::NotificationBatcher;
use crate::bridge::RedisPubSubBridge;
use crate::connection::ConnectionRegistry;
use crate::message::types::ServerEvent;

use super::templates::NotificationTemplates;

/// Persistence seam for notifications.
///
/// The service layer implements this over the notification repository;
/// tests use an in-memory sink.
#[async_trait]
pub trait NotificationSink: Send + Sync {
    /// Persists a notification row and returns the stored record.
    async fn persist(&self, notification: NewNotification) -> Result<Notification, AppError>;
}

/// Translates each domain mutation into its wire event and, where the
/// event warrants one, a persisted notification.
///
/// All delivery is best-effort: failures are logged and never propagated
/// back to the mutation that triggered them.
pub struct EventPublisher {
    /// Connection registry for fan-out.
    registry: Arc<ConnectionRegistry>,
    /// Batcher for normal-priority notifications.
    batcher: Arc<NotificationBatcher>,
    /// Notification persistence.
    sink: Arc<dyn NotificationSink>,
    /// Optional cross-process relay.
    bridge: Option<Arc<RedisPubSubBridge>>,
}

impl std::fmt::Debug for EventPublisher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EventPublisher").finish()
    }
}

impl EventPublisher {
    /// Creates a new event publisher.
    pub fn new(
        registry: Arc<ConnectionRegistry>,
        batcher: Arc<NotificationBatcher>,
        sink: Arc<dyn NotificationSink>,
        bridge: Option<Arc<RedisPubSubBridge>>,
    ) -> Self {
        Self {
            registry,
            batcher,
            sink,
            bridge,
        }
    }

    /// Delivers an event to a user's local connections and, when a relay
    /// bridge is configured, to their connections on other processes.
    fn push_to_user(&self, user_id: &Uuid, event: &ServerEvent) {
        self.registry.broadcast_to_user(user_id, event);

        if let Some(bridge) = &self.bridge {
            let payload = match serde_json::to_string(event) {
                Ok(p) => p,
                Err(e) => {
                    error!(error = %e, "Failed to serialize event for relay");
                    return;
                }
            };
            let bridge = bridge.clone();
            let user_id = *user_id;
            tokio::spawn(async move {
                if let Err(e) = bridge.publish(user_id, &payload).await {
                    warn!(error = %e, "Relay publish failed");
                }
            });
        }
    }

    /// A todo was created. High-priority todos additionally produce a
    /// persisted notification.
    pub async fn todo_created(&self, todo: &Todo) {
        self.push_to_user(&todo.user_id, &ServerEvent::TodoCreated { todo: todo.clone() });

        if todo.priority == TodoPriority::High {
            self.publish_notification(NotificationTemplates::high_priority_created(todo))
                .await;
        }
    }

    /// A todo's non-status fields changed. Wire event only.
    pub async fn todo_updated(&self, todo: &Todo, changes: &TodoChanges) {
        if changes.is_empty() {
            return;
        }
        let event = ServerEvent::TodoUpdated {
            todo: todo.clone(),
            changes: serde_json::Value::Object(changes.fields.clone()),
        };
        self.push_to_user(&todo.user_id, &event);
    }

    /// A todo moved through its lifecycle.
    pub async fn todo_moved(&self, todo: &Todo, from: TodoStatus, to: TodoStatus) {
        let event = ServerEvent::TodoMoved {
            todo: todo.clone(),
            from,
            to,
        };
        self.push_to_user(&todo.user_id, &event);

        self.publish_notification(NotificationTemplates::state_changed(todo, from, to))
            .await;
    }

    /// A todo was deleted.
    pub async fn todo_deleted(&self, user_id: Uuid, todo_id: Uuid, title: &str) {
        let event = ServerEvent::TodoDeleted {
            todo_id,
            title: title.to_string(),
        };
        self.push_to_user(&user_id, &event);

        self.publish_notification(NotificationTemplates::todo_deleted(user_id, todo_id, title))
            .await;
    }

    /// A file was attached to a todo.
    pub async fn file_uploaded(&self, user_id: Uuid, attachment: &Attachment, todo_title: &str) {
        let event = ServerEvent::FileUploaded {
            todo_id: attachment.todo_id,
            attachment: attachment.clone(),
        };
        self.push_to_user(&user_id, &event);

        self.publish_notification(NotificationTemplates::file_uploaded(
            user_id, attachment, todo_title,
        ))
        .await;
    }

    /// An attachment was removed.
    pub async fn file_deleted(
        &self,
        user_id: Uuid,
        todo_id: Uuid,
        attachment_id: Uuid,
        filename: &str,
    ) {
        let event = ServerEvent::FileDeleted {
            todo_id,
            attachment_id,
            filename: filename.to_string(),
        };
        self.push_to_user(&user_id, &event);

        self.publish_notification(NotificationTemplates::file_deleted(
            user_id, todo_id, filename,
        ))
        .await;
    }

    /// A bulk operation completed.
    pub async fn bulk_action(
        &self,
        user_id: Uuid,
        action: &str,
        succeeded: Vec<Uuid>,
        failed: Vec<Uuid>,
    ) {
        let notification = NotificationTemplates::bulk_action(
            user_id,
            action,
            succeeded.len(),
            failed.len(),
        );
        let event = ServerEvent::BulkAction {
            action: action.to_string(),
            succeeded,
            failed,
        };
        self.push_to_user(&user_id, &event);

        self.publish_notification(notification).await;
    }

    /// The user's profile changed.
    pub async fn profile_updated(&self, user: &UserSnapshot) {
        self.push_to_user(&user.id, &ServerEvent::ProfileUpdated { user: user.clone() });

        self.publish_notification(NotificationTemplates::profile_updated(user.id))
            .await;
    }

    /// The user's theme preference changed. Wire event only.
    pub async fn theme_changed(&self, user_id: Uuid, theme: &str) {
        self.push_to_user(
            &user_id,
            &ServerEvent::ThemeChanged {
                theme: theme.to_string(),
            },
        );
    }

    /// A todo's due date is approaching. Urgent: immediate push, no batch.
    pub async fn due_reminder(&self, todo: &Todo) {
        self.publish_notification(NotificationTemplates::due_reminder(todo))
            .await;
    }

    /// An operator-generated message. Urgent: immediate push, no batch.
    pub async fn system_notification(&self, user_id: Uuid, title: &str, message: &str) {
        self.publish_notification(NotificationTemplates::system(user_id, title, message))
            .await;
    }

    /// Notifications were marked read.
    pub async fn notifications_read(&self, user_id: Uuid, count: u64) {
        self.push_to_user(&user_id, &ServerEvent::NotificationsRead { count });
    }

    /// Persists a notification and routes it by delivery priority.
    ///
    /// Urgent notifications are pushed immediately; normal ones are folded
    /// into the recipient's next batched digest.
    async fn publish_notification(&self, new: NewNotification) {
        let priority = new.kind.priority();
        let stored = match self.sink.persist(new).await {
            Ok(n) => n,
            Err(e) => {
                error!(error = %e, "Failed to persist notification");
                return;
            }
        };

        match priority {
            DeliveryPriority::Urgent => {
                let user_id = stored.user_id;
                self.push_to_user(
                    &user_id,
                    &ServerEvent::Notification {
                        notification: stored,
                    },
                );
            }
            DeliveryPriority::Normal => {
                self.batcher.enqueue(stored).await;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use chrono::Utc;
    use tokio::sync::Mutex;

    use tasklane_core::config::{BatchingConfig, RealtimeConfig};
    use tasklane_entity::notification::NotificationKind;

    /// In-memory sink recording what was persisted.
    struct MemorySink {
        stored: Mutex<Vec<Notification>>,
    }

    impl MemorySink {
        fn new() -> Self {
            Self {
                stored: Mutex::new(Vec::new()),
            }
        }
    }

    #[async_trait]
    impl NotificationSink for MemorySink {
        async fn persist(&self, new: NewNotification) -> Result<Notification, AppError> {
            let now = Utc::now();
            let stored = Notification {
                id: Uuid::new_v4(),
                user_id: new.user_id,
                kind: new.kind.as_str().to_string(),
                title: new.title,
                message: new.message,
                payload: new.payload,
                is_read: false,
                created_at: now,
                updated_at: now,
            };
            self.stored.lock().await.push(stored.clone());
            Ok(stored)
        }
    }

    fn sample_todo(user_id: Uuid, priority: TodoPriority) -> Todo {
        Todo {
            id: Uuid::new_v4(),
            user_id,
            title: "Ship release".to_string(),
            description: None,
            priority,
            category: None,
            due_date: Some(Utc::now() + chrono::Duration::hours(3)),
            status: TodoStatus::Todo,
            started_at: None,
            completed_at: None,
            attachment_count: 0,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    fn setup() -> (
        Arc<ConnectionRegistry>,
        Arc<MemorySink>,
        EventPublisher,
    ) {
        let registry = Arc::new(ConnectionRegistry::new(RealtimeConfig::default()));
        let batcher = Arc::new(NotificationBatcher::new(
            registry.clone(),
            BatchingConfig {
                max_batch_size: 5,
                flush_interval_seconds: 60,
            },
        ));
        let sink = Arc::new(MemorySink::new());
        let publisher = EventPublisher::new(registry.clone(), batcher, sink.clone(), None);
        (registry, sink, publisher)
    }

    fn snapshot(user_id: Uuid) -> UserSnapshot {
        UserSnapshot {
            id: user_id,
            username: "alice".to_string(),
            theme: "light".to_string(),
        }
    }

    fn drain(rx: &mut tokio::sync::mpsc::Receiver<String>) -> Vec<serde_json::Value> {
        let mut out = Vec::new();
        while let Ok(raw) = rx.try_recv() {
            out.push(serde_json::from_str(&raw).unwrap());
        }
        out
    }

    #[tokio::test]
    async fn high_priority_creation_persists_a_notification() {
        let (registry, sink, publisher) = setup();
        let user_id = Uuid::new_v4();
        let (_h, mut rx) = registry.register(snapshot(user_id));

        let todo = sample_todo(user_id, TodoPriority::High);
        publisher.todo_created(&todo).await;

        let events = drain(&mut rx);
        assert_eq!(events.len(), 1);
        assert_eq!(events[0]["type"], "todo_created");

        let stored = sink.stored.lock().await;
        assert_eq!(stored.len(), 1);
        assert_eq!(stored[0].kind, "todo_created_high_priority");
    }

    #[tokio::test]
    async fn normal_priority_creation_skips_notifications() {
        let (registry, sink, publisher) = setup();
        let user_id = Uuid::new_v4();
        let (_h, mut rx) = registry.register(snapshot(user_id));

        let todo = sample_todo(user_id, TodoPriority::Medium);
        publisher.todo_created(&todo).await;

        let events = drain(&mut rx);
        assert_eq!(events.len(), 1);
        assert!(sink.stored.lock().await.is_empty());
    }

    #[tokio::test]
    async fn move_emits_event_and_batches_notification() {
        let (registry, sink, publisher) = setup();
        let user_id = Uuid::new_v4();
        let (_h, mut rx) = registry.register(snapshot(user_id));

        let mut todo = sample_todo(user_id, TodoPriority::Low);
        todo.status = TodoStatus::InProgress;
        publisher
            .todo_moved(&todo, TodoStatus::Todo, TodoStatus::InProgress)
            .await;

        // The move event is immediate; the notification waits in the batch.
        let events = drain(&mut rx);
        assert_eq!(events.len(), 1);
        assert_eq!(events[0]["type"], "todo_moved");
        assert_eq!(events[0]["from"], "todo");
        assert_eq!(events[0]["to"], "in_progress");

        let stored = sink.stored.lock().await;
        assert_eq!(stored[0].kind, "todo_state_changed");
    }

    #[tokio::test]
    async fn due_reminder_pushes_immediately_without_batching() {
        let (registry, sink, publisher) = setup();
        let user_id = Uuid::new_v4();
        let (_h, mut rx) = registry.register(snapshot(user_id));

        let todo = sample_todo(user_id, TodoPriority::Medium);
        publisher.due_reminder(&todo).await;

        let events = drain(&mut rx);
        assert_eq!(events.len(), 1);
        assert_eq!(events[0]["type"], "notification");
        assert_eq!(
            events[0]["notification"]["kind"],
            NotificationKind::DueDateReminder.as_str()
        );
        assert_eq!(sink.stored.lock().await.len(), 1);
    }

    #[tokio::test]
    async fn empty_update_is_suppressed() {
        let (registry, _sink, publisher) = setup();
        let user_id = Uuid::new_v4();
        let (_h, mut rx) = registry.register(snapshot(user_id));

        let todo = sample_todo(user_id, TodoPriority::Medium);
        publisher.todo_updated(&todo, &TodoChanges::default()).await;

        assert!(drain(&mut rx).is_empty());
    }

    #[tokio::test]
    async fn offline_user_still_gets_a_persisted_notification() {
        let (_registry, sink, publisher) = setup();
        let user_id = Uuid::new_v4();

        publisher
            .todo_deleted(user_id, Uuid::new_v4(), "Old chore")
            .await;

        let stored = sink.stored.lock().await;
        assert_eq!(stored.len(), 1);
        assert_eq!(stored[0].kind, "todo_deleted");
    }
}
