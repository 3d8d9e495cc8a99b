//! Auth handlers — register, login, profile.

use axum::Json;
use axum::extract::State;
use validator::Validate;

use tasklane_core::error::AppError;

use crate::dto::request::{LoginRequest, RegisterRequest, UpdateProfileRequest};
use crate::dto::response::{ApiResponse, AuthResponse, UserResponse};
use crate::error::ApiError;
use crate::extractors::AuthUser;
use crate::state::AppState;

/// POST /api/auth/register
pub async fn register(
    State(state): State<AppState>,
    Json(req): Json<RegisterRequest>,
) -> Result<Json<ApiResponse<AuthResponse>>, ApiError> {
    req.validate()
        .map_err(|e| AppError::validation(e.to_string()))?;

    let session = state
        .user_service
        .register(&req.username, &req.email, &req.password)
        .await?;

    Ok(Json(ApiResponse::ok(AuthResponse {
        token: session.token,
        expires_at: session.expires_at,
        user: session.user.into(),
    })))
}

/// POST /api/auth/login
pub async fn login(
    State(state): State<AppState>,
    Json(req): Json<LoginRequest>,
) -> Result<Json<ApiResponse<AuthResponse>>, ApiError> {
    req.validate()
        .map_err(|e| AppError::validation(e.to_string()))?;

    let session = state.user_service.login(&req.username, &req.password).await?;

    Ok(Json(ApiResponse::ok(AuthResponse {
        token: session.token,
        expires_at: session.expires_at,
        user: session.user.into(),
    })))
}

/// GET /api/users/me
pub async fn get_profile(
    State(state): State<AppState>,
    auth: AuthUser,
) -> Result<Json<ApiResponse<UserResponse>>, ApiError> {
    let user = state.user_service.get_profile(&auth).await?;
    Ok(Json(ApiResponse::ok(user.into())))
}

/// PUT /api/users/me
pub async fn update_profile(
    State(state): State<AppState>,
    auth: AuthUser,
    Json(req): Json<UpdateProfileRequest>,
) -> Result<Json<ApiResponse<UserResponse>>, ApiError> {
    req.validate()
        .map_err(|e| AppError::validation(e.to_string()))?;

    let user = state
        .user_service
        .update_profile(&auth, req.email.as_deref(), req.theme.as_deref())
        .await?;

    Ok(Json(ApiResponse::ok(user.into())))
}
