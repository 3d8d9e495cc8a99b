//! Application state shared across all handlers and middleware.

use std::sync::Arc;

use sqlx::PgPool;

use tasklane_auth::jwt::JwtDecoder;
use tasklane_core::config::AppConfig;
use tasklane_realtime::RealtimeEngine;
use tasklane_service::{
    AttachmentService, NotificationService, PresenceService, TodoService, UserService,
};

/// Application state containing all shared dependencies.
///
/// Passed to every Axum handler via `State<AppState>`.
/// All fields are `Arc`-wrapped for cheap cloning across tasks.
#[derive(Debug, Clone)]
pub struct AppState {
    /// Application configuration.
    pub config: Arc<AppConfig>,
    /// PostgreSQL connection pool.
    pub db_pool: PgPool,
    /// JWT token decoder and validator.
    pub jwt_decoder: Arc<JwtDecoder>,
    /// WebSocket realtime engine.
    pub realtime: Arc<RealtimeEngine>,
    /// User service.
    pub user_service: Arc<UserService>,
    /// Todo service.
    pub todo_service: Arc<TodoService>,
    /// Attachment service.
    pub attachment_service: Arc<AttachmentService>,
    /// Notification service.
    pub notification_service: Arc<NotificationService>,
    /// Presence service.
    pub presence_service: Arc<PresenceService>,
}
