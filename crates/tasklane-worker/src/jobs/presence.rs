//! Stale presence cleanup job.

use std::sync::Arc;

use chrono::{Duration, Utc};
use tracing::{error, info};

use tasklane_core::config::WorkerConfig;
use tasklane_database::repositories::presence::PresenceRepository;

/// Deletes presence rows whose sockets went away without a clean
/// disconnect (crashed server, dropped TCP connection).
#[derive(Debug)]
pub struct PresenceCleanupJob {
    /// Presence repository.
    repo: Arc<PresenceRepository>,
    /// Retention settings.
    config: WorkerConfig,
}

impl PresenceCleanupJob {
    /// Creates a new cleanup job.
    pub fn new(repo: Arc<PresenceRepository>, config: WorkerConfig) -> Self {
        Self { repo, config }
    }

    /// Runs one cleanup pass.
    pub async fn run(&self) {
        let cutoff = Utc::now() - Duration::minutes(self.config.presence_max_age_minutes as i64);

        match self.repo.cleanup_stale(cutoff).await {
            Ok(removed) if removed > 0 => {
                info!(removed, "Stale presence rows cleaned up");
            }
            Ok(_) => {}
            Err(e) => error!(error = %e, "Presence cleanup failed"),
        }
    }
}
