//! Attachment handlers — upload, list, download, delete.

use axum::Json;
use axum::extract::{Multipart, Path, State};
use axum::http::header;
use axum::response::{IntoResponse, Response};
use bytes::Bytes;
use uuid::Uuid;

use tasklane_core::error::AppError;
use tasklane_entity::attachment::Attachment;
use tasklane_service::attachment::service::UploadParams;

use crate::dto::response::ApiResponse;
use crate::error::ApiError;
use crate::extractors::AuthUser;
use crate::state::AppState;

/// POST /api/todos/{id}/attachments (multipart, field name `file`)
pub async fn upload(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(todo_id): Path<Uuid>,
    mut multipart: Multipart,
) -> Result<Json<ApiResponse<Attachment>>, ApiError> {
    let mut file_name: Option<String> = None;
    let mut mime_type: Option<String> = None;
    let mut data: Option<Bytes> = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::validation(format!("Multipart error: {e}")))?
    {
        if field.name() == Some("file") {
            file_name = field.file_name().map(String::from);
            mime_type = field.content_type().map(String::from);
            data = Some(
                field
                    .bytes()
                    .await
                    .map_err(|e| AppError::validation(format!("Failed to read upload: {e}")))?,
            );
        }
    }

    let data = data.ok_or_else(|| AppError::validation("Missing 'file' field"))?;
    let file_name = file_name.ok_or_else(|| AppError::validation("Uploaded file has no name"))?;

    let attachment = state
        .attachment_service
        .upload(
            &auth,
            UploadParams {
                todo_id,
                file_name,
                mime_type,
                data,
            },
        )
        .await?;

    Ok(Json(ApiResponse::ok(attachment)))
}

/// GET /api/todos/{id}/attachments
pub async fn list(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(todo_id): Path<Uuid>,
) -> Result<Json<ApiResponse<Vec<Attachment>>>, ApiError> {
    let attachments = state.attachment_service.list(&auth, todo_id).await?;
    Ok(Json(ApiResponse::ok(attachments)))
}

/// GET /api/attachments/{id}/download
pub async fn download(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(attachment_id): Path<Uuid>,
) -> Result<Response, ApiError> {
    let (attachment, data) = state
        .attachment_service
        .download(&auth, attachment_id)
        .await?;

    Ok((
        [
            (header::CONTENT_TYPE, attachment.mime_type.clone()),
            (
                header::CONTENT_DISPOSITION,
                format!("attachment; filename=\"{}\"", attachment.original_name),
            ),
        ],
        data,
    )
        .into_response())
}

/// GET /api/attachments/{id}/thumbnail
pub async fn thumbnail(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(attachment_id): Path<Uuid>,
) -> Result<Response, ApiError> {
    let data = state
        .attachment_service
        .download_thumbnail(&auth, attachment_id)
        .await?;

    Ok(([(header::CONTENT_TYPE, "image/jpeg")], data).into_response())
}

/// DELETE /api/attachments/{id}
pub async fn delete(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(attachment_id): Path<Uuid>,
) -> Result<Json<ApiResponse<Attachment>>, ApiError> {
    let attachment = state.attachment_service.delete(&auth, attachment_id).await?;
    Ok(Json(ApiResponse::ok(attachment)))
}
