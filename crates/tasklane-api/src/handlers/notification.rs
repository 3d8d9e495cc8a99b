//! Notification handlers — listing and read state.

use axum::Json;
use axum::extract::{Path, Query, State};
use serde::Deserialize;
use uuid::Uuid;

use tasklane_core::types::pagination::PageResponse;
use tasklane_entity::notification::Notification;

use crate::dto::response::{ApiResponse, MessageResponse, UnreadCountResponse};
use crate::error::ApiError;
use crate::extractors::AuthUser;
use crate::extractors::pagination::PaginationParams;
use crate::state::AppState;

/// Query parameters for listing notifications.
#[derive(Debug, Clone, Deserialize)]
pub struct NotificationListQuery {
    /// Only return unread notifications.
    #[serde(default)]
    pub unread_only: bool,
    /// Pagination.
    #[serde(flatten)]
    pub page: PaginationParams,
}

/// GET /api/notifications
pub async fn list(
    State(state): State<AppState>,
    auth: AuthUser,
    Query(query): Query<NotificationListQuery>,
) -> Result<Json<ApiResponse<PageResponse<Notification>>>, ApiError> {
    let page = query.page.into_page_request();
    let notifications = state
        .notification_service
        .list(&auth, query.unread_only, &page)
        .await?;
    Ok(Json(ApiResponse::ok(notifications)))
}

/// GET /api/notifications/unread-count
pub async fn unread_count(
    State(state): State<AppState>,
    auth: AuthUser,
) -> Result<Json<ApiResponse<UnreadCountResponse>>, ApiError> {
    let count = state.notification_service.unread_count(&auth).await?;
    Ok(Json(ApiResponse::ok(UnreadCountResponse { count })))
}

/// PUT /api/notifications/{id}/read
pub async fn mark_read(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(notification_id): Path<Uuid>,
) -> Result<Json<ApiResponse<MessageResponse>>, ApiError> {
    state
        .notification_service
        .mark_read(&auth, notification_id)
        .await?;
    Ok(Json(ApiResponse::ok(MessageResponse {
        message: "Notification marked read".to_string(),
    })))
}

/// PUT /api/notifications/read-all
pub async fn mark_all_read(
    State(state): State<AppState>,
    auth: AuthUser,
) -> Result<Json<ApiResponse<MessageResponse>>, ApiError> {
    let affected = state.notification_service.mark_all_read(&auth).await?;
    Ok(Json(ApiResponse::ok(MessageResponse {
        message: format!("{affected} notifications marked read"),
    })))
}

/// DELETE /api/notifications/{id}
pub async fn delete(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(notification_id): Path<Uuid>,
) -> Result<Json<ApiResponse<MessageResponse>>, ApiError> {
    state
        .notification_service
        .delete(&auth, notification_id)
        .await?;
    Ok(Json(ApiResponse::ok(MessageResponse {
        message: "Notification deleted".to_string(),
    })))
}
