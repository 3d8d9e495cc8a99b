//! Built-in maintenance job implementations.

pub mod notification;
pub mod presence;
pub mod reminder;

pub use notification::NotificationCleanupJob;
pub use presence::PresenceCleanupJob;
pub use reminder::DueReminderJob;
