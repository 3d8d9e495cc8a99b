//! Route definitions for the Tasklane HTTP API.
//!
//! All REST routes are organized by domain and mounted under `/api`.
//! The router receives `AppState` and passes it to all handlers via
//! Axum's `State` extractor.

use axum::{
    Router,
    extract::DefaultBodyLimit,
    middleware as axum_middleware,
    routing::{delete, get, post, put},
};
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::handlers;
use crate::middleware;
use crate::state::AppState;

/// Build the complete Axum router with all routes and middleware.
pub fn build_router(state: AppState) -> Router {
    let max_upload = state.config.storage.max_upload_size_bytes as usize;

    let api_routes = Router::new()
        .merge(auth_routes())
        .merge(user_routes())
        .merge(todo_routes())
        .merge(attachment_routes())
        .merge(notification_routes())
        .merge(health_routes());

    let ws_routes = Router::new().route("/ws", get(handlers::ws::ws_upgrade));

    Router::new()
        .nest("/api", api_routes)
        .merge(ws_routes)
        .layer(DefaultBodyLimit::max(max_upload))
        .layer(TraceLayer::new_for_http())
        .layer(build_cors_layer(&state.config.server.cors))
        .layer(axum_middleware::from_fn(
            middleware::logging::request_logging,
        ))
        .with_state(state)
}

/// Builds the CORS layer from configuration.
fn build_cors_layer(cors_config: &tasklane_core::config::CorsConfig) -> CorsLayer {
    use axum::http::{HeaderValue, Method};
    use tower_http::cors::Any;

    let mut cors = CorsLayer::new();

    if cors_config.allowed_origins.iter().any(|o| o == "*") {
        cors = cors.allow_origin(Any);
    } else {
        let origins: Vec<HeaderValue> = cors_config
            .allowed_origins
            .iter()
            .filter_map(|o| o.parse().ok())
            .collect();
        cors = cors.allow_origin(origins);
    }

    cors.allow_methods([
        Method::GET,
        Method::POST,
        Method::PUT,
        Method::PATCH,
        Method::DELETE,
    ])
    .allow_headers(Any)
    .max_age(std::time::Duration::from_secs(cors_config.max_age_seconds))
}

/// Auth endpoints: register, login.
fn auth_routes() -> Router<AppState> {
    Router::new()
        .route("/auth/register", post(handlers::auth::register))
        .route("/auth/login", post(handlers::auth::login))
}

/// User self-service endpoints.
fn user_routes() -> Router<AppState> {
    Router::new()
        .route("/users/me", get(handlers::auth::get_profile))
        .route("/users/me", put(handlers::auth::update_profile))
        .route("/users/{id}/presence", get(handlers::presence::status))
}

/// Todo CRUD, bulk operations, and export.
fn todo_routes() -> Router<AppState> {
    Router::new()
        .route("/todos", get(handlers::todo::list))
        .route("/todos", post(handlers::todo::create))
        .route("/todos/export", get(handlers::todo::export))
        .route("/todos/bulk/complete", post(handlers::todo::bulk_complete))
        .route("/todos/bulk/delete", post(handlers::todo::bulk_delete))
        .route("/todos/{id}", get(handlers::todo::get))
        .route("/todos/{id}", put(handlers::todo::update))
        .route("/todos/{id}", delete(handlers::todo::delete))
}

/// Attachment upload, listing, download, and removal.
fn attachment_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/todos/{id}/attachments",
            post(handlers::attachment::upload),
        )
        .route("/todos/{id}/attachments", get(handlers::attachment::list))
        .route(
            "/attachments/{id}/download",
            get(handlers::attachment::download),
        )
        .route(
            "/attachments/{id}/thumbnail",
            get(handlers::attachment::thumbnail),
        )
        .route("/attachments/{id}", delete(handlers::attachment::delete))
}

/// Notification listing and read state.
fn notification_routes() -> Router<AppState> {
    Router::new()
        .route("/notifications", get(handlers::notification::list))
        .route(
            "/notifications/unread-count",
            get(handlers::notification::unread_count),
        )
        .route(
            "/notifications/read-all",
            put(handlers::notification::mark_all_read),
        )
        .route(
            "/notifications/{id}/read",
            put(handlers::notification::mark_read),
        )
        .route(
            "/notifications/{id}",
            delete(handlers::notification::delete),
        )
}

/// Health check.
fn health_routes() -> Router<AppState> {
    Router::new().route("/health", get(handlers::health::health))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tasklane_core::config::CorsConfig;

    #[test]
    fn cors_layer_builds_from_explicit_origins() {
        let config = CorsConfig {
            allowed_origins: vec!["https://app.tasklane.dev".to_string()],
            max_age_seconds: 600,
        };
        let _layer = build_cors_layer(&config);
    }

    #[test]
    fn cors_layer_builds_from_wildcard() {
        let config = CorsConfig {
            allowed_origins: vec!["*".to_string()],
            max_age_seconds: 3600,
        };
        let _layer = build_cors_layer(&config);
    }
}
