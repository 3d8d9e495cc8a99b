//! Background worker configuration.

use serde::{Deserialize, Serialize};

/// Scheduled maintenance worker configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WorkerConfig {
    /// Whether the worker is enabled.
    #[serde(default = "default_true")]
    pub enabled: bool,
    /// Days after which read notifications are deleted.
    #[serde(default = "default_notification_max_age")]
    pub notification_max_age_days: u32,
    /// Maximum stored notifications kept per user.
    #[serde(default = "default_max_per_user")]
    pub notification_max_per_user: i64,
    /// Minutes after which offline presence rows are deleted.
    #[serde(default = "default_presence_max_age")]
    pub presence_max_age_minutes: u32,
    /// Hours ahead to look when sending due-date reminders.
    #[serde(default = "default_reminder_window")]
    pub due_reminder_window_hours: u32,
}

impl Default for WorkerConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            notification_max_age_days: default_notification_max_age(),
            notification_max_per_user: default_max_per_user(),
            presence_max_age_minutes: default_presence_max_age(),
            due_reminder_window_hours: default_reminder_window(),
        }
    }
}

fn default_true() -> bool {
    true
}

fn default_notification_max_age() -> u32 {
    30
}

fn default_max_per_user() -> i64 {
    500
}

fn default_presence_max_age() -> u32 {
    60
}

fn default_reminder_window() -> u32 {
    24
}
