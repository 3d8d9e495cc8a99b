//! Todo repository implementation.
//!
//! Every update is a single atomic SQL statement; row-level consistency
//! is delegated to PostgreSQL (last writer wins, no version column).

use sqlx::{PgPool, QueryBuilder};
use uuid::Uuid;

use chrono::{DateTime, Utc};

use tasklane_core::error::{AppError, ErrorKind};
use tasklane_core::result::AppResult;
use tasklane_core::types::pagination::{PageRequest, PageResponse};
use tasklane_entity::todo::{NewTodo, Todo, TodoPriority, TodoStatus, UpdateTodo};

/// Filter parameters for listing todos.
#[derive(Debug, Clone, Default)]
pub struct TodoFilter {
    /// Only todos in this status.
    pub status: Option<TodoStatus>,
    /// Only todos with this priority.
    pub priority: Option<TodoPriority>,
    /// Only todos in this category.
    pub category: Option<String>,
    /// Case-insensitive substring match against title and description.
    pub search: Option<String>,
}

/// Repository for todo CRUD operations.
#[derive(Debug, Clone)]
pub struct TodoRepository {
    pool: PgPool,
}

impl TodoRepository {
    /// Create a new todo repository.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Insert a new todo for a user.
    pub async fn create(&self, user_id: Uuid, new: &NewTodo) -> AppResult<Todo> {
        sqlx::query_as::<_, Todo>(
            "INSERT INTO todos (user_id, title, description, priority, category, due_date) \
             VALUES ($1, $2, $3, $4, $5, $6) RETURNING *",
        )
        .bind(user_id)
        .bind(&new.title)
        .bind(&new.description)
        .bind(new.priority)
        .bind(&new.category)
        .bind(new.due_date)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to create todo", e))
    }

    /// Find a todo by ID, scoped to its owner.
    pub async fn find_by_id(&self, todo_id: Uuid, user_id: Uuid) -> AppResult<Option<Todo>> {
        sqlx::query_as::<_, Todo>("SELECT * FROM todos WHERE id = $1 AND user_id = $2")
            .bind(todo_id)
            .bind(user_id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to find todo", e))
    }

    /// List a user's todos with filtering and pagination.
    pub async fn list(
        &self,
        user_id: Uuid,
        filter: &TodoFilter,
        page: &PageRequest,
    ) -> AppResult<PageResponse<Todo>> {
        let mut count_qb = QueryBuilder::new("SELECT COUNT(*) FROM todos WHERE user_id = ");
        count_qb.push_bind(user_id);
        push_filter(&mut count_qb, filter);

        let total: i64 = count_qb
            .build_query_scalar()
            .fetch_one(&self.pool)
            .await
            .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to count todos", e))?;

        let mut qb = QueryBuilder::new("SELECT * FROM todos WHERE user_id = ");
        qb.push_bind(user_id);
        push_filter(&mut qb, filter);
        qb.push(" ORDER BY created_at DESC LIMIT ");
        qb.push_bind(page.limit() as i64);
        qb.push(" OFFSET ");
        qb.push_bind(page.offset() as i64);

        let todos = qb
            .build_query_as::<Todo>()
            .fetch_all(&self.pool)
            .await
            .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to list todos", e))?;

        Ok(PageResponse::new(
            todos,
            page.page,
            page.page_size,
            total as u64,
        ))
    }

    /// List all of a user's todos, newest first (used for export).
    pub async fn list_all(&self, user_id: Uuid) -> AppResult<Vec<Todo>> {
        sqlx::query_as::<_, Todo>(
            "SELECT * FROM todos WHERE user_id = $1 ORDER BY created_at DESC",
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to list todos", e))
    }

    /// Apply a partial update as one atomic statement.
    ///
    /// `started_at` is stamped on the first entry into `in_progress` and
    /// `completed_at` on the first entry into `complete`; both are left
    /// untouched on every later update. Transition legality is validated
    /// by the service before this is called.
    pub async fn update(
        &self,
        todo_id: Uuid,
        user_id: Uuid,
        update: &UpdateTodo,
    ) -> AppResult<Option<Todo>> {
        sqlx::query_as::<_, Todo>(
            "UPDATE todos SET \
                title = COALESCE($3, title), \
                description = COALESCE($4, description), \
                priority = COALESCE($5, priority), \
                category = COALESCE($6, category), \
                due_date = COALESCE($7, due_date), \
                status = COALESCE($8, status), \
                started_at = CASE \
                    WHEN $8 = 'in_progress'::todo_status AND started_at IS NULL THEN NOW() \
                    ELSE started_at END, \
                completed_at = CASE \
                    WHEN $8 = 'complete'::todo_status AND completed_at IS NULL THEN NOW() \
                    ELSE completed_at END, \
                updated_at = NOW() \
             WHERE id = $1 AND user_id = $2 RETURNING *",
        )
        .bind(todo_id)
        .bind(user_id)
        .bind(&update.title)
        .bind(&update.description)
        .bind(update.priority)
        .bind(&update.category)
        .bind(update.due_date)
        .bind(update.status)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to update todo", e))
    }

    /// Delete a todo, scoped to its owner. Returns the deleted row.
    pub async fn delete(&self, todo_id: Uuid, user_id: Uuid) -> AppResult<Option<Todo>> {
        sqlx::query_as::<_, Todo>(
            "DELETE FROM todos WHERE id = $1 AND user_id = $2 RETURNING *",
        )
        .bind(todo_id)
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to delete todo", e))
    }

    /// Adjust a todo's attachment counter.
    pub async fn adjust_attachment_count(&self, todo_id: Uuid, delta: i32) -> AppResult<()> {
        sqlx::query(
            "UPDATE todos SET attachment_count = attachment_count + $2, updated_at = NOW() \
             WHERE id = $1",
        )
        .bind(todo_id)
        .bind(delta)
        .execute(&self.pool)
        .await
        .map_err(|e| {
            AppError::with_source(ErrorKind::Database, "Failed to adjust attachment count", e)
        })?;
        Ok(())
    }

    /// Find incomplete todos due within a window, across all users.
    pub async fn list_due_between(
        &self,
        from: DateTime<Utc>,
        to: DateTime<Utc>,
    ) -> AppResult<Vec<Todo>> {
        sqlx::query_as::<_, Todo>(
            "SELECT * FROM todos \
             WHERE due_date >= $1 AND due_date < $2 AND status != 'complete' \
             ORDER BY due_date ASC",
        )
        .bind(from)
        .bind(to)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to list due todos", e))
    }
}

fn push_filter(qb: &mut QueryBuilder<'_, sqlx::Postgres>, filter: &TodoFilter) {
    if let Some(status) = filter.status {
        qb.push(" AND status = ");
        qb.push_bind(status);
    }
    if let Some(priority) = filter.priority {
        qb.push(" AND priority = ");
        qb.push_bind(priority);
    }
    if let Some(category) = &filter.category {
        qb.push(" AND category = ");
        qb.push_bind(category.clone());
    }
    if let Some(search) = &filter.search {
        qb.push(" AND (title ILIKE ");
        qb.push_bind(format!("%{search}%"));
        qb.push(" OR description ILIKE ");
        qb.push_bind(format!("%{search}%"));
        qb.push(")");
    }
}
