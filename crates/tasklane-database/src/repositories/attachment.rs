//! Attachment repository implementation.

use sqlx::PgPool;
use uuid::Uuid;

use tasklane_core::error::{AppError, ErrorKind};
use tasklane_core::result::AppResult;
use tasklane_entity::attachment::{Attachment, NewAttachment};

/// Repository for attachment CRUD operations.
#[derive(Debug, Clone)]
pub struct AttachmentRepository {
    pool: PgPool,
}

impl AttachmentRepository {
    /// Create a new attachment repository.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Insert an attachment row.
    pub async fn create(&self, new: &NewAttachment) -> AppResult<Attachment> {
        sqlx::query_as::<_, Attachment>(
            "INSERT INTO attachments \
                (todo_id, stored_name, original_name, storage_path, size_bytes, mime_type, category, thumbnail_path) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8) RETURNING *",
        )
        .bind(new.todo_id)
        .bind(&new.stored_name)
        .bind(&new.original_name)
        .bind(&new.storage_path)
        .bind(new.size_bytes)
        .bind(&new.mime_type)
        .bind(new.category)
        .bind(&new.thumbnail_path)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| {
            AppError::with_source(ErrorKind::Database, "Failed to create attachment", e)
        })
    }

    /// Find an attachment by ID.
    pub async fn find_by_id(&self, attachment_id: Uuid) -> AppResult<Option<Attachment>> {
        sqlx::query_as::<_, Attachment>("SELECT * FROM attachments WHERE id = $1")
            .bind(attachment_id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| {
                AppError::with_source(ErrorKind::Database, "Failed to find attachment", e)
            })
    }

    /// List all attachments for a todo.
    pub async fn list_by_todo(&self, todo_id: Uuid) -> AppResult<Vec<Attachment>> {
        sqlx::query_as::<_, Attachment>(
            "SELECT * FROM attachments WHERE todo_id = $1 ORDER BY created_at ASC",
        )
        .bind(todo_id)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to list attachments", e))
    }

    /// List the original filenames already used for a todo, for dedup.
    pub async fn list_original_names(&self, todo_id: Uuid) -> AppResult<Vec<String>> {
        sqlx::query_scalar("SELECT original_name FROM attachments WHERE todo_id = $1")
            .bind(todo_id)
            .fetch_all(&self.pool)
            .await
            .map_err(|e| {
                AppError::with_source(ErrorKind::Database, "Failed to list attachment names", e)
            })
    }

    /// Delete an attachment row, returning it for file cleanup.
    pub async fn delete(&self, attachment_id: Uuid) -> AppResult<Option<Attachment>> {
        sqlx::query_as::<_, Attachment>("DELETE FROM attachments WHERE id = $1 RETURNING *")
            .bind(attachment_id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| {
                AppError::with_source(ErrorKind::Database, "Failed to delete attachment", e)
            })
    }
}
