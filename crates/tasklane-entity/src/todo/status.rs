//! Todo lifecycle status and the forward-only transition table.
//!
//! The canonical vocabulary is `todo` / `in_progress` / `complete`.
//! Legacy client vocabularies (`pending`, `inProgress`, `completed`) are
//! accepted on input via serde aliases but never produced on output.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use tasklane_core::AppError;

/// Lifecycle state of a todo.
///
/// Movement is forward-only: `todo` → `in_progress` → `complete`.
/// Re-entering the current state is a no-op; any backward transition
/// is rejected.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "todo_status", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum TodoStatus {
    /// Not yet started (initial state).
    #[serde(alias = "pending")]
    Todo,
    /// Work has begun.
    #[serde(alias = "inProgress")]
    InProgress,
    /// Finished (terminal state).
    #[serde(alias = "completed")]
    Complete,
}

impl TodoStatus {
    /// Position of the state in the lifecycle; used to order transitions.
    fn rank(&self) -> u8 {
        match self {
            Self::Todo => 0,
            Self::InProgress => 1,
            Self::Complete => 2,
        }
    }

    /// Whether moving from `self` to `target` is permitted.
    ///
    /// Allowed moves: todo→in_progress, todo→complete,
    /// in_progress→complete, and X→X (no-op).
    pub fn can_transition_to(&self, target: TodoStatus) -> bool {
        self.rank() <= target.rank()
    }

    /// Validate a transition, returning a domain error when it would
    /// move the todo backward in its lifecycle.
    pub fn validate_transition(&self, target: TodoStatus) -> Result<(), AppError> {
        if self.can_transition_to(target) {
            Ok(())
        } else {
            Err(AppError::validation(format!(
                "Cannot move todo from '{self}' back to '{target}': forward-only movement is enforced"
            )))
        }
    }

    /// Whether this state is terminal.
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Complete)
    }

    /// Return the status as its canonical string.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Todo => "todo",
            Self::InProgress => "in_progress",
            Self::Complete => "complete",
        }
    }
}

impl fmt::Display for TodoStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for TodoStatus {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "todo" | "pending" => Ok(Self::Todo),
            "in_progress" | "inProgress" => Ok(Self::InProgress),
            "complete" | "completed" => Ok(Self::Complete),
            _ => Err(AppError::validation(format!(
                "Invalid todo status: '{s}'. Expected one of: todo, in_progress, complete"
            ))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_forward_transitions_allowed() {
        assert!(TodoStatus::Todo.can_transition_to(TodoStatus::InProgress));
        assert!(TodoStatus::Todo.can_transition_to(TodoStatus::Complete));
        assert!(TodoStatus::InProgress.can_transition_to(TodoStatus::Complete));
    }

    #[test]
    fn test_same_state_is_noop_not_error() {
        assert!(TodoStatus::Todo.can_transition_to(TodoStatus::Todo));
        assert!(TodoStatus::InProgress.can_transition_to(TodoStatus::InProgress));
        assert!(TodoStatus::Complete.can_transition_to(TodoStatus::Complete));
    }

    #[test]
    fn test_backward_transitions_rejected() {
        assert!(!TodoStatus::Complete.can_transition_to(TodoStatus::Todo));
        assert!(!TodoStatus::Complete.can_transition_to(TodoStatus::InProgress));
        assert!(!TodoStatus::InProgress.can_transition_to(TodoStatus::Todo));
    }

    #[test]
    fn test_validate_transition_error_message() {
        let err = TodoStatus::Complete
            .validate_transition(TodoStatus::Todo)
            .unwrap_err();
        assert!(err.message.contains("forward-only"));
    }

    #[test]
    fn test_legacy_aliases_parse() {
        assert_eq!("pending".parse::<TodoStatus>().unwrap(), TodoStatus::Todo);
        assert_eq!(
            "inProgress".parse::<TodoStatus>().unwrap(),
            TodoStatus::InProgress
        );
        assert_eq!(
            "completed".parse::<TodoStatus>().unwrap(),
            TodoStatus::Complete
        );
        assert!("done".parse::<TodoStatus>().is_err());
    }

    #[test]
    fn test_serde_canonical_output() {
        let json = serde_json::to_string(&TodoStatus::InProgress).unwrap();
        assert_eq!(json, "\"in_progress\"");
        let parsed: TodoStatus = serde_json::from_str("\"completed\"").unwrap();
        assert_eq!(parsed, TodoStatus::Complete);
    }
}
