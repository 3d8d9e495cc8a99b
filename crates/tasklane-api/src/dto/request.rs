//! Request DTOs with validation.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use tasklane_entity::todo::{NewTodo, TodoPriority, TodoStatus, UpdateTodo};

/// Registration request body.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct RegisterRequest {
    /// Username.
    #[validate(length(min = 3, max = 100, message = "Username must be 3-100 characters"))]
    pub username: String,
    /// Email address.
    #[validate(email(message = "Invalid email address"))]
    pub email: String,
    /// Password.
    #[validate(length(min = 8, message = "Password must be at least 8 characters"))]
    pub password: String,
}

/// Login request body.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct LoginRequest {
    /// Username.
    #[validate(length(min = 1, message = "Username is required"))]
    pub username: String,
    /// Password.
    #[validate(length(min = 1, message = "Password is required"))]
    pub password: String,
}

/// Update profile request.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct UpdateProfileRequest {
    /// New email.
    #[validate(email(message = "Invalid email address"))]
    pub email: Option<String>,
    /// New theme (`"light"` or `"dark"`).
    pub theme: Option<String>,
}

/// Create todo request.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct CreateTodoRequest {
    /// Title.
    #[validate(length(min = 1, max = 200, message = "Title must be 1-200 characters"))]
    pub title: String,
    /// Optional description.
    pub description: Option<String>,
    /// Priority (defaults to medium).
    #[serde(default)]
    pub priority: TodoPriority,
    /// Free-form category label.
    pub category: Option<String>,
    /// Optional due date.
    pub due_date: Option<DateTime<Utc>>,
}

impl From<CreateTodoRequest> for NewTodo {
    fn from(req: CreateTodoRequest) -> Self {
        Self {
            title: req.title,
            description: req.description,
            priority: req.priority,
            category: req.category,
            due_date: req.due_date,
        }
    }
}

/// Partial todo update request. Absent fields are left unchanged.
#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
pub struct UpdateTodoRequest {
    /// New title.
    #[validate(length(min = 1, max = 200, message = "Title must be 1-200 characters"))]
    pub title: Option<String>,
    /// New description.
    pub description: Option<String>,
    /// New priority.
    pub priority: Option<TodoPriority>,
    /// New category.
    pub category: Option<String>,
    /// New due date.
    pub due_date: Option<DateTime<Utc>>,
    /// New lifecycle status.
    pub status: Option<TodoStatus>,
}

impl From<UpdateTodoRequest> for UpdateTodo {
    fn from(req: UpdateTodoRequest) -> Self {
        Self {
            title: req.title,
            description: req.description,
            priority: req.priority,
            category: req.category,
            due_date: req.due_date,
            status: req.status,
        }
    }
}

/// Bulk operation request.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct BulkTodoRequest {
    /// Targets of the operation.
    #[validate(length(min = 1, max = 100, message = "Provide 1-100 todo IDs"))]
    pub todo_ids: Vec<Uuid>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_update_accepts_legacy_status_names() {
        let req: UpdateTodoRequest =
            serde_json::from_str(r#"{"status": "inProgress"}"#).unwrap();
        assert_eq!(req.status, Some(TodoStatus::InProgress));

        let req: UpdateTodoRequest = serde_json::from_str(r#"{"status": "completed"}"#).unwrap();
        assert_eq!(req.status, Some(TodoStatus::Complete));
    }

    #[test]
    fn test_register_validation() {
        let req = RegisterRequest {
            username: "ab".to_string(),
            email: "not-an-email".to_string(),
            password: "short".to_string(),
        };
        assert!(req.validate().is_err());
    }
}
