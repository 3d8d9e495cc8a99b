//! Notification kind enumeration and delivery priority.

use std::fmt;

use serde::{Deserialize, Serialize};

/// The event type that produced a notification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NotificationKind {
    /// A todo's due date is approaching.
    DueDateReminder,
    /// A high-priority todo was created.
    TodoCreatedHighPriority,
    /// A todo moved through its lifecycle.
    TodoStateChanged,
    /// A todo was deleted.
    TodoDeleted,
    /// A file was attached to a todo.
    FileUploaded,
    /// An attachment was removed.
    FileDeleted,
    /// A bulk operation completed.
    BulkAction,
    /// The user's profile was updated.
    ProfileUpdated,
    /// Operator-generated message.
    SystemNotification,
}

/// Delivery priority of a notification.
///
/// Urgent notifications are pushed immediately; normal ones are folded
/// into the recipient's next batched digest.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DeliveryPriority {
    /// Immediate push.
    Urgent,
    /// Batched digest delivery.
    Normal,
}

impl NotificationKind {
    /// Return the kind as its wire string.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::DueDateReminder => "due_date_reminder",
            Self::TodoCreatedHighPriority => "todo_created_high_priority",
            Self::TodoStateChanged => "todo_state_changed",
            Self::TodoDeleted => "todo_deleted",
            Self::FileUploaded => "file_uploaded",
            Self::FileDeleted => "file_deleted",
            Self::BulkAction => "bulk_action",
            Self::ProfileUpdated => "profile_updated",
            Self::SystemNotification => "system_notification",
        }
    }

    /// Delivery priority for this kind.
    pub fn priority(&self) -> DeliveryPriority {
        match self {
            Self::DueDateReminder | Self::SystemNotification => DeliveryPriority::Urgent,
            _ => DeliveryPriority::Normal,
        }
    }
}

impl fmt::Display for NotificationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_wire_strings() {
        assert_eq!(
            NotificationKind::TodoCreatedHighPriority.as_str(),
            "todo_created_high_priority"
        );
        assert_eq!(NotificationKind::BulkAction.as_str(), "bulk_action");
    }

    #[test]
    fn test_urgent_kinds_skip_batching() {
        assert_eq!(
            NotificationKind::DueDateReminder.priority(),
            DeliveryPriority::Urgent
        );
        assert_eq!(
            NotificationKind::FileUploaded.priority(),
            DeliveryPriority::Normal
        );
    }
}
