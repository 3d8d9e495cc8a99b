//! Presence repository implementation.

use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use tasklane_core::error::{AppError, ErrorKind};
use tasklane_core::result::AppResult;
use tasklane_entity::presence::UserPresence;

/// Repository for user presence records.
#[derive(Debug, Clone)]
pub struct PresenceRepository {
    pool: PgPool,
}

impl PresenceRepository {
    /// Create a new presence repository.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Upsert a presence row as online for a (user, socket) pair.
    pub async fn upsert_online(&self, user_id: Uuid, socket_id: Uuid) -> AppResult<()> {
        sqlx::query(
            "INSERT INTO user_presence (user_id, socket_id, is_online, last_seen) \
             VALUES ($1, $2, TRUE, NOW()) \
             ON CONFLICT (user_id, socket_id) \
             DO UPDATE SET is_online = TRUE, last_seen = NOW()",
        )
        .bind(user_id)
        .bind(socket_id)
        .execute(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to upsert presence", e))?;
        Ok(())
    }

    /// Flip a presence row to offline.
    pub async fn mark_offline(&self, user_id: Uuid, socket_id: Uuid) -> AppResult<()> {
        sqlx::query(
            "UPDATE user_presence SET is_online = FALSE, last_seen = NOW() \
             WHERE user_id = $1 AND socket_id = $2",
        )
        .bind(user_id)
        .bind(socket_id)
        .execute(&self.pool)
        .await
        .map_err(|e| {
            AppError::with_source(ErrorKind::Database, "Failed to mark presence offline", e)
        })?;
        Ok(())
    }

    /// List presence rows for a user.
    pub async fn find_by_user(&self, user_id: Uuid) -> AppResult<Vec<UserPresence>> {
        sqlx::query_as::<_, UserPresence>(
            "SELECT * FROM user_presence WHERE user_id = $1 ORDER BY last_seen DESC",
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to list presence", e))
    }

    /// Delete presence rows not seen since the given cutoff.
    pub async fn cleanup_stale(&self, before: DateTime<Utc>) -> AppResult<u64> {
        let result = sqlx::query("DELETE FROM user_presence WHERE last_seen < $1")
            .bind(before)
            .execute(&self.pool)
            .await
            .map_err(|e| {
                AppError::with_source(ErrorKind::Database, "Failed to cleanup presence", e)
            })?;
        Ok(result.rows_affected())
    }
}
