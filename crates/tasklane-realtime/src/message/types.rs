//! Inbound and outbound WebSocket message type definitions.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use tasklane_entity::attachment::Attachment;
use tasklane_entity::notification::Notification;
use tasklane_entity::todo::{Todo, TodoStatus};
use tasklane_entity::user::UserSnapshot;

/// Messages sent by the client to the server.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ClientMessage {
    /// Pong response to server ping.
    Pong {
        /// Echoed timestamp.
        timestamp: i64,
    },
    /// Activity hint (e.g. "typing", "viewing"), relayed to the user's
    /// other connections.
    Activity {
        /// Free-form activity label.
        activity: String,
    },
}

/// Events sent by the server to the client.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ServerEvent {
    /// A todo was created.
    TodoCreated {
        /// The new todo.
        todo: Todo,
    },
    /// A todo's fields changed.
    TodoUpdated {
        /// The todo after the update.
        todo: Todo,
        /// Field-level diff: field name → `{from, to}`.
        changes: serde_json::Value,
    },
    /// A todo was deleted.
    TodoDeleted {
        /// ID of the deleted todo.
        todo_id: Uuid,
        /// Title at deletion time.
        title: String,
    },
    /// A todo moved through its lifecycle.
    TodoMoved {
        /// The todo after the move.
        todo: Todo,
        /// Previous status.
        from: TodoStatus,
        /// New status.
        to: TodoStatus,
    },
    /// A file was attached to a todo.
    FileUploaded {
        /// The parent todo.
        todo_id: Uuid,
        /// The new attachment.
        attachment: Attachment,
    },
    /// An attachment was removed.
    FileDeleted {
        /// The parent todo.
        todo_id: Uuid,
        /// ID of the removed attachment.
        attachment_id: Uuid,
        /// Original filename of the removed attachment.
        filename: String,
    },
    /// A bulk operation completed.
    BulkAction {
        /// Action name (`"complete"` or `"delete"`).
        action: String,
        /// IDs the action was applied to.
        succeeded: Vec<Uuid>,
        /// IDs the action skipped or rejected.
        failed: Vec<Uuid>,
    },
    /// Immediate delivery of a single notification.
    Notification {
        /// The persisted notification.
        notification: Notification,
    },
    /// Batched digest of buffered notifications.
    NotificationBatch {
        /// The buffered notifications, oldest first.
        notifications: Vec<Notification>,
        /// Number of notifications in this batch.
        count: usize,
        /// When the batch was flushed.
        timestamp: DateTime<Utc>,
    },
    /// Notifications were marked read.
    NotificationsRead {
        /// Number of notifications affected.
        count: u64,
    },
    /// The user's profile changed.
    ProfileUpdated {
        /// Updated public profile.
        user: UserSnapshot,
    },
    /// Activity relayed from one of the user's connections.
    UserActivity {
        /// The acting user.
        user_id: Uuid,
        /// Free-form activity label.
        activity: String,
        /// When the activity was reported.
        timestamp: DateTime<Utc>,
    },
    /// The user's theme preference changed.
    ThemeChanged {
        /// New theme name.
        theme: String,
    },
    /// Ping (server keepalive).
    Ping {
        /// Server timestamp.
        timestamp: i64,
    },
    /// Error message.
    Error {
        /// Error code.
        code: String,
        /// Error description.
        message: String,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_server_event_wire_tags() {
        let event = ServerEvent::TodoDeleted {
            todo_id: Uuid::new_v4(),
            title: "old".to_string(),
        };
        let json: serde_json::Value =
            serde_json::from_str(&serde_json::to_string(&event).unwrap()).unwrap();
        assert_eq!(json["type"], "todo_deleted");

        let event = ServerEvent::NotificationBatch {
            notifications: vec![],
            count: 0,
            timestamp: Utc::now(),
        };
        let json: serde_json::Value =
            serde_json::from_str(&serde_json::to_string(&event).unwrap()).unwrap();
        assert_eq!(json["type"], "notification_batch");
    }

    #[test]
    fn test_client_message_parses() {
        let msg: ClientMessage =
            serde_json::from_str(r#"{"type": "pong", "timestamp": 123}"#).unwrap();
        assert!(matches!(msg, ClientMessage::Pong { timestamp: 123 }));
    }
}
