//! Todo handlers — CRUD, bulk operations, export.

use axum::Json;
use axum::extract::{Path, Query, State};
use axum::http::header;
use axum::response::{IntoResponse, Response};
use serde::Deserialize;
use uuid::Uuid;
use validator::Validate;

use tasklane_core::error::AppError;
use tasklane_core::types::pagination::PageResponse;
use tasklane_database::repositories::todo::TodoFilter;
use tasklane_entity::todo::{Todo, TodoPriority, TodoStatus};
use tasklane_service::ExportFormat;
use tasklane_service::todo::service::BulkOutcome;

use crate::dto::request::{BulkTodoRequest, CreateTodoRequest, UpdateTodoRequest};
use crate::dto::response::ApiResponse;
use crate::error::ApiError;
use crate::extractors::AuthUser;
use crate::extractors::pagination::PaginationParams;
use crate::state::AppState;

/// Query parameters for listing todos.
#[derive(Debug, Clone, Deserialize)]
pub struct TodoListQuery {
    /// Filter by lifecycle status.
    pub status: Option<TodoStatus>,
    /// Filter by priority.
    pub priority: Option<TodoPriority>,
    /// Filter by category label.
    pub category: Option<String>,
    /// Search in title and description.
    pub search: Option<String>,
    /// Pagination.
    #[serde(flatten)]
    pub page: PaginationParams,
}

/// Query parameters for export.
#[derive(Debug, Clone, Deserialize)]
pub struct ExportQuery {
    /// Output format, `csv` or `json`.
    #[serde(default = "default_format")]
    pub format: String,
}

fn default_format() -> String {
    "json".to_string()
}

/// GET /api/todos
pub async fn list(
    State(state): State<AppState>,
    auth: AuthUser,
    Query(query): Query<TodoListQuery>,
) -> Result<Json<ApiResponse<PageResponse<Todo>>>, ApiError> {
    let filter = TodoFilter {
        status: query.status,
        priority: query.priority,
        category: query.category,
        search: query.search,
    };
    let page = query.page.into_page_request();

    let todos = state.todo_service.list(&auth, &filter, &page).await?;
    Ok(Json(ApiResponse::ok(todos)))
}

/// POST /api/todos
pub async fn create(
    State(state): State<AppState>,
    auth: AuthUser,
    Json(req): Json<CreateTodoRequest>,
) -> Result<Json<ApiResponse<Todo>>, ApiError> {
    req.validate()
        .map_err(|e| AppError::validation(e.to_string()))?;

    let todo = state.todo_service.create(&auth, req.into()).await?;
    Ok(Json(ApiResponse::ok(todo)))
}

/// GET /api/todos/{id}
pub async fn get(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(todo_id): Path<Uuid>,
) -> Result<Json<ApiResponse<Todo>>, ApiError> {
    let todo = state.todo_service.get(&auth, todo_id).await?;
    Ok(Json(ApiResponse::ok(todo)))
}

/// PUT /api/todos/{id}
pub async fn update(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(todo_id): Path<Uuid>,
    Json(req): Json<UpdateTodoRequest>,
) -> Result<Json<ApiResponse<Todo>>, ApiError> {
    req.validate()
        .map_err(|e| AppError::validation(e.to_string()))?;

    let todo = state.todo_service.update(&auth, todo_id, req.into()).await?;
    Ok(Json(ApiResponse::ok(todo)))
}

/// DELETE /api/todos/{id}
pub async fn delete(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(todo_id): Path<Uuid>,
) -> Result<Json<ApiResponse<Todo>>, ApiError> {
    let todo = state.todo_service.delete(&auth, todo_id).await?;
    Ok(Json(ApiResponse::ok(todo)))
}

/// POST /api/todos/bulk/complete
pub async fn bulk_complete(
    State(state): State<AppState>,
    auth: AuthUser,
    Json(req): Json<BulkTodoRequest>,
) -> Result<Json<ApiResponse<BulkOutcome>>, ApiError> {
    req.validate()
        .map_err(|e| AppError::validation(e.to_string()))?;

    let outcome = state.todo_service.bulk_complete(&auth, req.todo_ids).await?;
    Ok(Json(ApiResponse::ok(outcome)))
}

/// POST /api/todos/bulk/delete
pub async fn bulk_delete(
    State(state): State<AppState>,
    auth: AuthUser,
    Json(req): Json<BulkTodoRequest>,
) -> Result<Json<ApiResponse<BulkOutcome>>, ApiError> {
    req.validate()
        .map_err(|e| AppError::validation(e.to_string()))?;

    let outcome = state.todo_service.bulk_delete(&auth, req.todo_ids).await?;
    Ok(Json(ApiResponse::ok(outcome)))
}

/// GET /api/todos/export?format={csv|json}
pub async fn export(
    State(state): State<AppState>,
    auth: AuthUser,
    Query(query): Query<ExportQuery>,
) -> Result<Response, ApiError> {
    let format = ExportFormat::parse(&query.format)?;
    let (body, content_type) = state.todo_service.export(&auth, format).await?;

    let extension = match format {
        ExportFormat::Csv => "csv",
        ExportFormat::Json => "json",
    };

    Ok((
        [
            (header::CONTENT_TYPE, content_type.to_string()),
            (
                header::CONTENT_DISPOSITION,
                format!("attachment; filename=\"todos.{extension}\""),
            ),
        ],
        body,
    )
        .into_response())
}
