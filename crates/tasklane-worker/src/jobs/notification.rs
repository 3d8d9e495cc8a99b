//! Notification retention job.

use std::sync::Arc;

use chrono::{Duration, Utc};
use tracing::{error, info};

use tasklane_core::config::WorkerConfig;
use tasklane_database::repositories::notification::NotificationRepository;

/// Deletes old read notifications and trims per-user overflow.
#[derive(Debug)]
pub struct NotificationCleanupJob {
    /// Notification repository.
    repo: Arc<NotificationRepository>,
    /// Retention settings.
    config: WorkerConfig,
}

impl NotificationCleanupJob {
    /// Creates a new cleanup job.
    pub fn new(repo: Arc<NotificationRepository>, config: WorkerConfig) -> Self {
        Self { repo, config }
    }

    /// Runs one cleanup pass.
    pub async fn run(&self) {
        let cutoff = Utc::now() - Duration::days(self.config.notification_max_age_days as i64);

        let expired = match self.repo.cleanup_old(cutoff).await {
            Ok(n) => n,
            Err(e) => {
                error!(error = %e, "Notification cleanup failed");
                return;
            }
        };

        let overflow = match self
            .repo
            .trim_per_user(self.config.notification_max_per_user)
            .await
        {
            Ok(n) => n,
            Err(e) => {
                error!(error = %e, "Notification per-user trim failed");
                return;
            }
        };

        info!(
            expired_removed = expired,
            overflow_removed = overflow,
            "Notification cleanup finished"
        );
    }
}
