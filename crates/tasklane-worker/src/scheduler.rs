//! Cron scheduler for periodic maintenance tasks.

use std::future::Future;
use std::sync::Arc;

use tokio_cron_scheduler::{Job as CronJob, JobScheduler};
use tracing::info;

use tasklane_core::error::AppError;

use crate::jobs::{DueReminderJob, NotificationCleanupJob, PresenceCleanupJob};

/// Cron-based scheduler for periodic background tasks.
pub struct CronScheduler {
    /// The underlying job scheduler.
    scheduler: JobScheduler,
    /// Notification retention job.
    notification_cleanup: Arc<NotificationCleanupJob>,
    /// Stale presence cleanup job.
    presence_cleanup: Arc<PresenceCleanupJob>,
    /// Due-date reminder job.
    due_reminder: Arc<DueReminderJob>,
}

impl std::fmt::Debug for CronScheduler {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CronScheduler").finish()
    }
}

impl CronScheduler {
    /// Creates a new cron scheduler.
    pub async fn new(
        notification_cleanup: Arc<NotificationCleanupJob>,
        presence_cleanup: Arc<PresenceCleanupJob>,
        due_reminder: Arc<DueReminderJob>,
    ) -> Result<Self, AppError> {
        let scheduler = JobScheduler::new()
            .await
            .map_err(|e| AppError::internal(format!("Failed to create scheduler: {e}")))?;

        Ok(Self {
            scheduler,
            notification_cleanup,
            presence_cleanup,
            due_reminder,
        })
    }

    /// Registers all default scheduled tasks.
    pub async fn register_default_tasks(&self) -> Result<(), AppError> {
        // Notification retention — hourly.
        let job = self.notification_cleanup.clone();
        self.register("0 0 * * * *", "notification_cleanup", move || {
            let job = job.clone();
            Box::pin(async move { job.run().await })
        })
        .await?;

        // Stale presence cleanup — every 10 minutes.
        let job = self.presence_cleanup.clone();
        self.register("0 */10 * * * *", "presence_cleanup", move || {
            let job = job.clone();
            Box::pin(async move { job.run().await })
        })
        .await?;

        // Due-date reminders — every 15 minutes.
        let job = self.due_reminder.clone();
        self.register("0 */15 * * * *", "due_reminder", move || {
            let job = job.clone();
            Box::pin(async move { job.run().await })
        })
        .await?;

        info!("All scheduled tasks registered");
        Ok(())
    }

    async fn register<F>(&self, schedule: &str, name: &str, run: F) -> Result<(), AppError>
    where
        F: Fn() -> std::pin::Pin<Box<dyn Future<Output = ()> + Send>> + Send + Sync + 'static,
    {
        let job = CronJob::new_async(schedule, move |_uuid, _lock| run())
            .map_err(|e| AppError::internal(format!("Failed to create {name} schedule: {e}")))?;

        self.scheduler
            .add(job)
            .await
            .map_err(|e| AppError::internal(format!("Failed to register {name}: {e}")))?;

        Ok(())
    }

    /// Starts the scheduler.
    pub async fn start(&self) -> Result<(), AppError> {
        self.scheduler
            .start()
            .await
            .map_err(|e| AppError::internal(format!("Failed to start scheduler: {e}")))?;

        info!("Cron scheduler started");
        Ok(())
    }

    /// Shuts down the scheduler.
    pub async fn shutdown(&mut self) -> Result<(), AppError> {
        self.scheduler
            .shutdown()
            .await
            .map_err(|e| AppError::internal(format!("Failed to shutdown scheduler: {e}")))?;

        info!("Cron scheduler shut down");
        Ok(())
    }
}
