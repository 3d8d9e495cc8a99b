//! Notification text templates for domain events.

use uuid::Uuid;

use tasklane_entity::attachment::Attachment;
use tasklane_entity::notification::{NewNotification, NotificationKind};
use tasklane_entity::todo::{Todo, TodoStatus};

/// Builds notification rows for common events.
pub struct NotificationTemplates;

impl NotificationTemplates {
    /// A high-priority todo was created.
    pub fn high_priority_created(todo: &Todo) -> NewNotification {
        NewNotification {
            user_id: todo.user_id,
            kind: NotificationKind::TodoCreatedHighPriority,
            title: "High-priority todo created".to_string(),
            message: format!("'{}' was created with high priority", todo.title),
            payload: Some(serde_json::json!({
                "todo_id": todo.id,
                "title": todo.title,
            })),
        }
    }

    /// A todo moved through its lifecycle.
    pub fn state_changed(todo: &Todo, from: TodoStatus, to: TodoStatus) -> NewNotification {
        NewNotification {
            user_id: todo.user_id,
            kind: NotificationKind::TodoStateChanged,
            title: "Todo status changed".to_string(),
            message: format!("'{}' moved from {from} to {to}", todo.title),
            payload: Some(serde_json::json!({
                "todo_id": todo.id,
                "from": from,
                "to": to,
            })),
        }
    }

    /// A todo was deleted.
    pub fn todo_deleted(user_id: Uuid, todo_id: Uuid, title: &str) -> NewNotification {
        NewNotification {
            user_id,
            kind: NotificationKind::TodoDeleted,
            title: "Todo deleted".to_string(),
            message: format!("'{title}' was deleted"),
            payload: Some(serde_json::json!({ "todo_id": todo_id })),
        }
    }

    /// A file was attached to a todo.
    pub fn file_uploaded(
        user_id: Uuid,
        attachment: &Attachment,
        todo_title: &str,
    ) -> NewNotification {
        NewNotification {
            user_id,
            kind: NotificationKind::FileUploaded,
            title: "File attached".to_string(),
            message: format!(
                "'{}' was attached to '{todo_title}'",
                attachment.original_name
            ),
            payload: Some(serde_json::json!({
                "todo_id": attachment.todo_id,
                "attachment_id": attachment.id,
                "filename": attachment.original_name,
            })),
        }
    }

    /// An attachment was removed.
    pub fn file_deleted(user_id: Uuid, todo_id: Uuid, filename: &str) -> NewNotification {
        NewNotification {
            user_id,
            kind: NotificationKind::FileDeleted,
            title: "File removed".to_string(),
            message: format!("'{filename}' was removed"),
            payload: Some(serde_json::json!({
                "todo_id": todo_id,
                "filename": filename,
            })),
        }
    }

    /// A bulk operation completed.
    pub fn bulk_action(
        user_id: Uuid,
        action: &str,
        succeeded: usize,
        failed: usize,
    ) -> NewNotification {
        NewNotification {
            user_id,
            kind: NotificationKind::BulkAction,
            title: "Bulk action completed".to_string(),
            message: format!("Bulk {action}: {succeeded} succeeded, {failed} skipped"),
            payload: Some(serde_json::json!({
                "action": action,
                "succeeded": succeeded,
                "failed": failed,
            })),
        }
    }

    /// The user's profile was updated.
    pub fn profile_updated(user_id: Uuid) -> NewNotification {
        NewNotification {
            user_id,
            kind: NotificationKind::ProfileUpdated,
            title: "Profile updated".to_string(),
            message: "Your profile settings were updated".to_string(),
            payload: None,
        }
    }

    /// A todo's due date is approaching.
    pub fn due_reminder(todo: &Todo) -> NewNotification {
        let due = todo
            .due_date
            .map(|d| d.format("%Y-%m-%d %H:%M UTC").to_string())
            .unwrap_or_else(|| "soon".to_string());
        NewNotification {
            user_id: todo.user_id,
            kind: NotificationKind::DueDateReminder,
            title: "Todo due soon".to_string(),
            message: format!("'{}' is due {due}", todo.title),
            payload: Some(serde_json::json!({
                "todo_id": todo.id,
                "due_date": todo.due_date,
            })),
        }
    }

    /// Operator-generated message.
    pub fn system(user_id: Uuid, title: &str, message: &str) -> NewNotification {
        NewNotification {
            user_id,
            kind: NotificationKind::SystemNotification,
            title: title.to_string(),
            message: message.to_string(),
            payload: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use chrono::Utc;
    use tasklane_entity::todo::TodoPriority;

    fn sample_todo() -> Todo {
        Todo {
            id: Uuid::new_v4(),
            user_id: Uuid::new_v4(),
            title: "Ship release".to_string(),
            description: None,
            priority: TodoPriority::High,
            category: None,
            due_date: None,
            status: TodoStatus::Todo,
            started_at: None,
            completed_at: None,
            attachment_count: 0,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn test_state_changed_mentions_both_statuses() {
        let todo = sample_todo();
        let n = NotificationTemplates::state_changed(&todo, TodoStatus::Todo, TodoStatus::Complete);
        assert_eq!(n.kind, NotificationKind::TodoStateChanged);
        assert!(n.message.contains("todo"));
        assert!(n.message.contains("complete"));
    }

    #[test]
    fn test_bulk_action_counts() {
        let n = NotificationTemplates::bulk_action(Uuid::new_v4(), "complete", 3, 1);
        assert!(n.message.contains("3 succeeded"));
        assert!(n.message.contains("1 skipped"));
    }
}
