//! Persistence seam for todos.

use async_trait::async_trait;
use uuid::Uuid;

use tasklane_core::result::AppResult;
use tasklane_core::types::pagination::{PageRequest, PageResponse};
use tasklane_database::repositories::todo::{TodoFilter, TodoRepository};
use tasklane_entity::todo::{NewTodo, Todo, UpdateTodo};

/// Persistence operations the todo service needs.
///
/// The sqlx repository is the production implementation; tests use an
/// in-memory store.
#[async_trait]
pub trait TodoStore: Send + Sync {
    /// Inserts a todo for the user.
    async fn create(&self, user_id: Uuid, new: &NewTodo) -> AppResult<Todo>;

    /// Fetches one todo, scoped to its owner.
    async fn find_by_id(&self, todo_id: Uuid, user_id: Uuid) -> AppResult<Option<Todo>>;

    /// Lists the user's todos with filtering and pagination.
    async fn list(
        &self,
        user_id: Uuid,
        filter: &TodoFilter,
        page: &PageRequest,
    ) -> AppResult<PageResponse<Todo>>;

    /// Lists all of the user's todos, unpaginated.
    async fn list_all(&self, user_id: Uuid) -> AppResult<Vec<Todo>>;

    /// Applies a partial update, scoped to the owner.
    async fn update(
        &self,
        todo_id: Uuid,
        user_id: Uuid,
        update: &UpdateTodo,
    ) -> AppResult<Option<Todo>>;

    /// Deletes a todo, scoped to the owner, returning the deleted row.
    async fn delete(&self, todo_id: Uuid, user_id: Uuid) -> AppResult<Option<Todo>>;
}

#[async_trait]
impl TodoStore for TodoRepository {
    async fn create(&self, user_id: Uuid, new: &NewTodo) -> AppResult<Todo> {
        TodoRepository::create(self, user_id, new).await
    }

    async fn find_by_id(&self, todo_id: Uuid, user_id: Uuid) -> AppResult<Option<Todo>> {
        TodoRepository::find_by_id(self, todo_id, user_id).await
    }

    async fn list(
        &self,
        user_id: Uuid,
        filter: &TodoFilter,
        page: &PageRequest,
    ) -> AppResult<PageResponse<Todo>> {
        TodoRepository::list(self, user_id, filter, page).await
    }

    async fn list_all(&self, user_id: Uuid) -> AppResult<Vec<Todo>> {
        TodoRepository::list_all(self, user_id).await
    }

    async fn update(
        &self,
        todo_id: Uuid,
        user_id: Uuid,
        update: &UpdateTodo,
    ) -> AppResult<Option<Todo>> {
        TodoRepository::update(self, todo_id, user_id, update).await
    }

    async fn delete(&self, todo_id: Uuid, user_id: Uuid) -> AppResult<Option<Todo>> {
        TodoRepository::delete(self, todo_id, user_id).await
    }
}
