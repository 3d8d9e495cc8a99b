//! Todo priority enumeration.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use tasklane_core::AppError;

/// Priority of a todo.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "todo_priority", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum TodoPriority {
    /// Low priority.
    Low,
    /// Medium priority (default).
    Medium,
    /// High priority; creation triggers a dedicated notification.
    High,
}

impl TodoPriority {
    /// Return the priority as a lowercase string.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Low => "low",
            Self::Medium => "medium",
            Self::High => "high",
        }
    }
}

impl Default for TodoPriority {
    fn default() -> Self {
        Self::Medium
    }
}

impl fmt::Display for TodoPriority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for TodoPriority {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "low" => Ok(Self::Low),
            "medium" => Ok(Self::Medium),
            "high" => Ok(Self::High),
            _ => Err(AppError::validation(format!(
                "Invalid todo priority: '{s}'. Expected one of: low, medium, high"
            ))),
        }
    }
}
