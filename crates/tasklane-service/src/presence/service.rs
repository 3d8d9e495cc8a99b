//! Presence bookkeeping for WebSocket sessions.
//!
//! Presence rows are a side channel: failures here never affect the
//! connection that triggered them.

use std::sync::Arc;

use tracing::warn;
use uuid::Uuid;

use tasklane_core::error::AppError;
use tasklane_database::repositories::presence::PresenceRepository;
use tasklane_entity::presence::UserPresence;

/// Records socket connect/disconnect events in the presence table.
#[derive(Clone)]
pub struct PresenceService {
    /// Presence repository.
    repo: Arc<PresenceRepository>,
}

impl std::fmt::Debug for PresenceService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PresenceService").finish()
    }
}

impl PresenceService {
    /// Creates a new presence service.
    pub fn new(repo: Arc<PresenceRepository>) -> Self {
        Self { repo }
    }

    /// Records a socket coming online. Best-effort.
    pub async fn socket_connected(&self, user_id: Uuid, socket_id: Uuid) {
        if let Err(e) = self.repo.upsert_online(user_id, socket_id).await {
            warn!(user_id = %user_id, error = %e, "Failed to record presence");
        }
    }

    /// Records a socket going offline. Best-effort.
    pub async fn socket_disconnected(&self, user_id: Uuid, socket_id: Uuid) {
        if let Err(e) = self.repo.mark_offline(user_id, socket_id).await {
            warn!(user_id = %user_id, error = %e, "Failed to clear presence");
        }
    }

    /// Returns a user's presence rows.
    pub async fn status(&self, user_id: Uuid) -> Result<Vec<UserPresence>, AppError> {
        self.repo.find_by_user(user_id).await
    }
}
