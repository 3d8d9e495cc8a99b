//! User entity model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// A registered user.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct User {
    /// Unique user identifier.
    pub id: Uuid,
    /// Unique username.
    pub username: String,
    /// Unique email address.
    pub email: String,
    /// Argon2 password hash. Never serialized into responses.
    #[serde(skip_serializing)]
    pub password_hash: String,
    /// UI theme preference (`"light"` or `"dark"`).
    pub theme: String,
    /// When the account was created.
    pub created_at: DateTime<Utc>,
    /// When the account was last updated.
    pub updated_at: DateTime<Utc>,
}

/// Public view of a user, safe to embed in tokens and events.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserSnapshot {
    /// User identifier.
    pub id: Uuid,
    /// Username.
    pub username: String,
    /// UI theme preference.
    pub theme: String,
}

impl From<&User> for UserSnapshot {
    fn from(user: &User) -> Self {
        Self {
            id: user.id,
            username: user.username.clone(),
            theme: user.theme.clone(),
        }
    }
}
