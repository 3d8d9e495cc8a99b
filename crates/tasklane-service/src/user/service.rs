//! User registration, login, and profile management.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use tracing::info;

use tasklane_auth::jwt::JwtEncoder;
use tasklane_auth::password::PasswordHasher;
use tasklane_core::config::AuthConfig;
use tasklane_core::error::AppError;
use tasklane_database::repositories::user::UserRepository;
use tasklane_entity::user::{User, UserSnapshot};
use tasklane_realtime::EventPublisher;

use crate::context::RequestContext;

/// Successful authentication result.
#[derive(Debug, Clone, serde::Serialize)]
pub struct AuthSession {
    /// Signed bearer token.
    pub token: String,
    /// When the token expires.
    pub expires_at: DateTime<Utc>,
    /// The authenticated user.
    pub user: User,
}

/// Handles registration, login, and profile updates.
#[derive(Clone)]
pub struct UserService {
    /// User repository.
    user_repo: Arc<UserRepository>,
    /// Token issuer.
    encoder: Arc<JwtEncoder>,
    /// Password hasher.
    hasher: PasswordHasher,
    /// Real-time event publisher.
    publisher: Arc<EventPublisher>,
    /// Auth configuration.
    config: AuthConfig,
}

impl std::fmt::Debug for UserService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("UserService").finish()
    }
}

impl UserService {
    /// Creates a new user service.
    pub fn new(
        user_repo: Arc<UserRepository>,
        encoder: Arc<JwtEncoder>,
        publisher: Arc<EventPublisher>,
        config: AuthConfig,
    ) -> Self {
        Self {
            user_repo,
            encoder,
            hasher: PasswordHasher::new(),
            publisher,
            config,
        }
    }

    /// Registers a new account and logs it in.
    pub async fn register(
        &self,
        username: &str,
        email: &str,
        password: &str,
    ) -> Result<AuthSession, AppError> {
        let username = username.trim();
        if username.is_empty() {
            return Err(AppError::validation("Username cannot be empty"));
        }
        if password.len() < self.config.password_min_length {
            return Err(AppError::validation(format!(
                "Password must be at least {} characters",
                self.config.password_min_length
            )));
        }

        let password_hash = self.hasher.hash_password(password)?;
        let user = self.user_repo.create(username, email, &password_hash).await?;

        info!(user_id = %user.id, username = %user.username, "User registered");
        self.issue_session(user)
    }

    /// Verifies credentials and issues a token.
    pub async fn login(&self, username: &str, password: &str) -> Result<AuthSession, AppError> {
        let user = self
            .user_repo
            .find_by_username(username)
            .await?
            .ok_or_else(|| AppError::authentication("Invalid username or password"))?;

        if !self.hasher.verify_password(password, &user.password_hash)? {
            return Err(AppError::authentication("Invalid username or password"));
        }

        info!(user_id = %user.id, "User logged in");
        self.issue_session(user)
    }

    /// Returns the current user's profile.
    pub async fn get_profile(&self, ctx: &RequestContext) -> Result<User, AppError> {
        self.user_repo
            .find_by_id(ctx.user_id)
            .await?
            .ok_or_else(|| AppError::not_found("User not found"))
    }

    /// Updates the current user's profile fields.
    ///
    /// A theme change additionally notifies the user's other connections
    /// so open tabs can switch immediately.
    pub async fn update_profile(
        &self,
        ctx: &RequestContext,
        email: Option<&str>,
        theme: Option<&str>,
    ) -> Result<User, AppError> {
        if let Some(theme) = theme {
            if !matches!(theme, "light" | "dark") {
                return Err(AppError::validation("Theme must be 'light' or 'dark'"));
            }
        }

        let user = self
            .user_repo
            .update_profile(ctx.user_id, email, theme)
            .await?;

        self.publisher
            .profile_updated(&UserSnapshot::from(&user))
            .await;
        if let Some(theme) = theme {
            self.publisher.theme_changed(ctx.user_id, theme).await;
        }

        Ok(user)
    }

    fn issue_session(&self, user: User) -> Result<AuthSession, AppError> {
        let issued = self.encoder.generate_token(user.id, &user.username)?;
        Ok(AuthSession {
            token: issued.token,
            expires_at: issued.expires_at,
            user,
        })
    }
}
