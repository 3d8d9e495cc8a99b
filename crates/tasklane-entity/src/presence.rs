//! User presence entity model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// Presence record for one (user, socket) pair.
///
/// Upserted when the socket connects, flipped offline on disconnect,
/// and garbage-collected by age from the worker.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct UserPresence {
    /// The user owning the connection.
    pub user_id: Uuid,
    /// The connection identifier.
    pub socket_id: Uuid,
    /// Whether the socket is currently connected.
    pub is_online: bool,
    /// Last time the socket was seen alive.
    pub last_seen: DateTime<Utc>,
}
