//! # tasklane-worker
//!
//! Scheduled maintenance tasks for Tasklane: notification retention,
//! stale presence cleanup, and due-date reminders.

pub mod jobs;
pub mod scheduler;

pub use scheduler::CronScheduler;
