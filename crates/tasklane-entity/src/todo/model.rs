//! Todo entity model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

use super::priority::TodoPriority;
use super::status::TodoStatus;

/// A todo owned by a single user.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Todo {
    /// Unique todo identifier.
    pub id: Uuid,
    /// The owning user. All mutations are scoped to this user.
    pub user_id: Uuid,
    /// Short title.
    pub title: String,
    /// Optional longer description.
    pub description: Option<String>,
    /// Priority level.
    pub priority: TodoPriority,
    /// Free-form category label.
    pub category: Option<String>,
    /// Optional due date.
    pub due_date: Option<DateTime<Utc>>,
    /// Lifecycle status (forward-only transitions).
    pub status: TodoStatus,
    /// Set exactly once, on the first transition into `in_progress`.
    pub started_at: Option<DateTime<Utc>>,
    /// Set exactly once, on the first transition into `complete`.
    pub completed_at: Option<DateTime<Utc>>,
    /// Number of file attachments.
    pub attachment_count: i32,
    /// When the todo was created.
    pub created_at: DateTime<Utc>,
    /// When the todo was last updated.
    pub updated_at: DateTime<Utc>,
}

impl Todo {
    /// Whether the todo is past its due date and not complete.
    pub fn is_overdue(&self) -> bool {
        match self.due_date {
            Some(due) => due < Utc::now() && !self.status.is_terminal(),
            None => false,
        }
    }
}

/// Data required to create a new todo.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewTodo {
    /// Short title.
    pub title: String,
    /// Optional longer description.
    pub description: Option<String>,
    /// Priority level.
    pub priority: TodoPriority,
    /// Free-form category label.
    pub category: Option<String>,
    /// Optional due date.
    pub due_date: Option<DateTime<Utc>>,
}

/// Partial update of a todo's fields. `None` means "leave unchanged".
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UpdateTodo {
    /// New title.
    pub title: Option<String>,
    /// New description.
    pub description: Option<String>,
    /// New priority.
    pub priority: Option<TodoPriority>,
    /// New category.
    pub category: Option<String>,
    /// New due date.
    pub due_date: Option<DateTime<Utc>>,
    /// New lifecycle status (validated against the transition table).
    pub status: Option<TodoStatus>,
}

/// Field-level diff of an update, included in `todo_updated` events.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TodoChanges {
    /// Changed fields: field name → `{from, to}`.
    #[serde(flatten)]
    pub fields: serde_json::Map<String, serde_json::Value>,
}

impl TodoChanges {
    /// Compute the diff between a todo's previous state and the update.
    pub fn diff(before: &Todo, update: &UpdateTodo) -> Self {
        let mut fields = serde_json::Map::new();

        if let Some(title) = &update.title {
            if *title != before.title {
                fields.insert("title".into(), change(&before.title, title));
            }
        }
        if let Some(description) = &update.description {
            if Some(description) != before.description.as_ref() {
                fields.insert("description".into(), change(&before.description, description));
            }
        }
        if let Some(priority) = update.priority {
            if priority != before.priority {
                fields.insert("priority".into(), change(&before.priority, &priority));
            }
        }
        if let Some(category) = &update.category {
            if Some(category) != before.category.as_ref() {
                fields.insert("category".into(), change(&before.category, category));
            }
        }
        if let Some(due_date) = update.due_date {
            if Some(due_date) != before.due_date {
                fields.insert("due_date".into(), change(&before.due_date, &due_date));
            }
        }
        if let Some(status) = update.status {
            if status != before.status {
                fields.insert("status".into(), change(&before.status, &status));
            }
        }

        Self { fields }
    }

    /// Whether the update changed anything.
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// The status transition, if this update contains one.
    pub fn status_transition(&self) -> Option<&serde_json::Value> {
        self.fields.get("status")
    }
}

fn change<F: Serialize, T: Serialize>(from: &F, to: &T) -> serde_json::Value {
    serde_json::json!({ "from": from, "to": to })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_todo() -> Todo {
        Todo {
            id: Uuid::new_v4(),
            user_id: Uuid::new_v4(),
            title: "Write report".to_string(),
            description: None,
            priority: TodoPriority::Medium,
            category: Some("work".to_string()),
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
    fn test_diff_records_from_and_to() {
        let todo = sample_todo();
        let update = UpdateTodo {
            title: Some("Write final report".to_string()),
            status: Some(TodoStatus::InProgress),
            ..Default::default()
        };

        let changes = TodoChanges::diff(&todo, &update);
        assert_eq!(changes.fields.len(), 2);
        assert_eq!(
            changes.fields["status"],
            serde_json::json!({"from": "todo", "to": "in_progress"})
        );
    }

    #[test]
    fn test_diff_skips_unchanged_fields() {
        let todo = sample_todo();
        let update = UpdateTodo {
            title: Some(todo.title.clone()),
            ..Default::default()
        };

        let changes = TodoChanges::diff(&todo, &update);
        assert!(changes.is_empty());
    }

    #[test]
    fn test_overdue_requires_past_due_and_not_complete() {
        let mut todo = sample_todo();
        todo.due_date = Some(Utc::now() - chrono::Duration::hours(1));
        assert!(todo.is_overdue());

        todo.status = TodoStatus::Complete;
        assert!(!todo.is_overdue());
    }
}
