//! Presence handler.

use axum::Json;
use axum::extract::{Path, State};
use uuid::Uuid;

use crate::dto::response::{ApiResponse, PresenceResponse};
use crate::error::ApiError;
use crate::extractors::AuthUser;
use crate::state::AppState;

/// GET /api/users/{id}/presence
///
/// Online state comes from the live connection registry; recorded
/// sessions come from the presence table.
pub async fn status(
    State(state): State<AppState>,
    _auth: AuthUser,
    Path(user_id): Path<Uuid>,
) -> Result<Json<ApiResponse<PresenceResponse>>, ApiError> {
    let sessions = state.presence_service.status(user_id).await?;
    let is_online = state.realtime.connections.is_online(&user_id);

    Ok(Json(ApiResponse::ok(PresenceResponse {
        user_id,
        is_online,
        sessions,
    })))
}
