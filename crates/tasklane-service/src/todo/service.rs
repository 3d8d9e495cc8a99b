//! Core todo CRUD with forward-only lifecycle enforcement.

use std::sync::Arc;

use tracing::info;
use uuid::Uuid;

use tasklane_core::error::AppError;
use tasklane_core::types::pagination::{PageRequest, PageResponse};
use tasklane_database::repositories::todo::TodoFilter;
use tasklane_entity::todo::{NewTodo, Todo, TodoChanges, TodoStatus, UpdateTodo};
use tasklane_realtime::EventPublisher;

use crate::context::RequestContext;

use super::export::{self, ExportFormat};
use super::store::TodoStore;

/// Outcome of a bulk operation.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct BulkOutcome {
    /// IDs the action was applied to.
    pub succeeded: Vec<Uuid>,
    /// IDs the action skipped or rejected.
    pub failed: Vec<Uuid>,
}

/// Handles todo CRUD, lifecycle transitions, and bulk operations.
#[derive(Clone)]
pub struct TodoService {
    /// Todo persistence.
    todo_repo: Arc<dyn TodoStore>,
    /// Real-time event publisher.
    publisher: Arc<EventPublisher>,
}

impl std::fmt::Debug for TodoService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TodoService").finish()
    }
}

impl TodoService {
    /// Creates a new todo service.
    pub fn new(todo_repo: Arc<dyn TodoStore>, publisher: Arc<EventPublisher>) -> Self {
        Self {
            todo_repo,
            publisher,
        }
    }

    /// Creates a todo for the current user.
    pub async fn create(&self, ctx: &RequestContext, new: NewTodo) -> Result<Todo, AppError> {
        if new.title.trim().is_empty() {
            return Err(AppError::validation("Title cannot be empty"));
        }

        let todo = self.todo_repo.create(ctx.user_id, &new).await?;

        info!(todo_id = %todo.id, user_id = %ctx.user_id, "Todo created");
        self.publisher.todo_created(&todo).await;

        Ok(todo)
    }

    /// Gets a single todo, scoped to its owner.
    pub async fn get(&self, ctx: &RequestContext, todo_id: Uuid) -> Result<Todo, AppError> {
        self.todo_repo
            .find_by_id(todo_id, ctx.user_id)
            .await?
            .ok_or_else(|| AppError::not_found("Todo not found"))
    }

    /// Lists the user's todos with filtering and pagination.
    pub async fn list(
        &self,
        ctx: &RequestContext,
        filter: &TodoFilter,
        page: &PageRequest,
    ) -> Result<PageResponse<Todo>, AppError> {
        self.todo_repo.list(ctx.user_id, filter, page).await
    }

    /// Applies a partial update.
    ///
    /// Status changes are validated against the forward-only lifecycle
    /// before anything is written. A status transition produces a
    /// `todo_moved` event; other field changes produce `todo_updated`.
    pub async fn update(
        &self,
        ctx: &RequestContext,
        todo_id: Uuid,
        update: UpdateTodo,
    ) -> Result<Todo, AppError> {
        let before = self.get(ctx, todo_id).await?;

        if let Some(target) = update.status {
            before.status.validate_transition(target)?;
        }

        let changes = TodoChanges::diff(&before, &update);
        if changes.is_empty() {
            return Ok(before);
        }

        let todo = self
            .todo_repo
            .update(todo_id, ctx.user_id, &update)
            .await?
            .ok_or_else(|| AppError::not_found("Todo not found"))?;

        let moved = changes.status_transition().is_some() && todo.status != before.status;
        if moved {
            self.publisher
                .todo_moved(&todo, before.status, todo.status)
                .await;
        }

        let mut field_changes = changes;
        field_changes.fields.remove("status");
        if !field_changes.is_empty() {
            self.publisher.todo_updated(&todo, &field_changes).await;
        }

        Ok(todo)
    }

    /// Deletes a todo, scoped to its owner.
    pub async fn delete(&self, ctx: &RequestContext, todo_id: Uuid) -> Result<Todo, AppError> {
        let todo = self
            .todo_repo
            .delete(todo_id, ctx.user_id)
            .await?
            .ok_or_else(|| AppError::not_found("Todo not found"))?;

        info!(todo_id = %todo.id, user_id = %ctx.user_id, "Todo deleted");
        self.publisher
            .todo_deleted(ctx.user_id, todo.id, &todo.title)
            .await;

        Ok(todo)
    }

    /// Marks a batch of todos complete.
    ///
    /// Todos that are missing or already complete are reported as failed;
    /// the rest of the batch still goes through.
    pub async fn bulk_complete(
        &self,
        ctx: &RequestContext,
        todo_ids: Vec<Uuid>,
    ) -> Result<BulkOutcome, AppError> {
        let mut succeeded = Vec::new();
        let mut failed = Vec::new();

        let update = UpdateTodo {
            status: Some(TodoStatus::Complete),
            ..Default::default()
        };

        for todo_id in todo_ids {
            let before = match self.todo_repo.find_by_id(todo_id, ctx.user_id).await? {
                Some(t) if t.status != TodoStatus::Complete => t,
                _ => {
                    failed.push(todo_id);
                    continue;
                }
            };

            match self.todo_repo.update(todo_id, ctx.user_id, &update).await? {
                Some(todo) => {
                    self.publisher
                        .todo_moved(&todo, before.status, todo.status)
                        .await;
                    succeeded.push(todo_id);
                }
                None => failed.push(todo_id),
            }
        }

        info!(
            user_id = %ctx.user_id,
            succeeded = succeeded.len(),
            failed = failed.len(),
            "Bulk complete finished"
        );
        self.publisher
            .bulk_action(ctx.user_id, "complete", succeeded.clone(), failed.clone())
            .await;

        Ok(BulkOutcome { succeeded, failed })
    }

    /// Deletes a batch of todos.
    pub async fn bulk_delete(
        &self,
        ctx: &RequestContext,
        todo_ids: Vec<Uuid>,
    ) -> Result<BulkOutcome, AppError> {
        let mut succeeded = Vec::new();
        let mut failed = Vec::new();

        for todo_id in todo_ids {
            match self.todo_repo.delete(todo_id, ctx.user_id).await? {
                Some(_) => succeeded.push(todo_id),
                None => failed.push(todo_id),
            }
        }

        info!(
            user_id = %ctx.user_id,
            succeeded = succeeded.len(),
            failed = failed.len(),
            "Bulk delete finished"
        );
        self.publisher
            .bulk_action(ctx.user_id, "delete", succeeded.clone(), failed.clone())
            .await;

        Ok(BulkOutcome { succeeded, failed })
    }

    /// Exports all of the user's todos in the requested format.
    ///
    /// Returns the serialized body and its content type.
    pub async fn export(
        &self,
        ctx: &RequestContext,
        format: ExportFormat,
    ) -> Result<(Vec<u8>, &'static str), AppError> {
        let todos = self.todo_repo.list_all(ctx.user_id).await?;
        export::render(&todos, format)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use std::collections::HashMap;
    use std::sync::Mutex;

    use async_trait::async_trait;
    use chrono::Utc;
    use tokio::sync::mpsc;

    use tasklane_core::config::{BatchingConfig, RealtimeConfig};
    use tasklane_core::result::AppResult;
    use tasklane_entity::notification::{NewNotification, Notification};
    use tasklane_entity::todo::TodoPriority;
    use tasklane_entity::user::UserSnapshot;
    use tasklane_realtime::events::NotificationSink;
    use tasklane_realtime::{ConnectionRegistry, NotificationBatcher};

    use crate::todo::store::TodoStore;

    struct NullSink;

    #[async_trait]
    impl NotificationSink for NullSink {
        async fn persist(&self, new: NewNotification) -> Result<Notification, AppError> {
            let now = Utc::now();
            Ok(Notification {
                id: Uuid::new_v4(),
                user_id: new.user_id,
                kind: new.kind.as_str().to_string(),
                title: new.title,
                message: new.message,
                payload: new.payload,
                is_read: false,
                created_at: now,
                updated_at: now,
            })
        }
    }

    /// Owner-scoped in-memory store.
    struct MemoryTodos {
        rows: Mutex<HashMap<Uuid, Todo>>,
    }

    impl MemoryTodos {
        fn new() -> Self {
            Self {
                rows: Mutex::new(HashMap::new()),
            }
        }

        fn insert(&self, todo: Todo) {
            self.rows.lock().unwrap().insert(todo.id, todo);
        }
    }

    #[async_trait]
    impl TodoStore for MemoryTodos {
        async fn create(&self, user_id: Uuid, new: &NewTodo) -> AppResult<Todo> {
            let now = Utc::now();
            let todo = Todo {
                id: Uuid::new_v4(),
                user_id,
                title: new.title.clone(),
                description: new.description.clone(),
                priority: new.priority,
                category: new.category.clone(),
                due_date: new.due_date,
                status: TodoStatus::Todo,
                started_at: None,
                completed_at: None,
                attachment_count: 0,
                created_at: now,
                updated_at: now,
            };
            self.insert(todo.clone());
            Ok(todo)
        }

        async fn find_by_id(&self, todo_id: Uuid, user_id: Uuid) -> AppResult<Option<Todo>> {
            Ok(self
                .rows
                .lock()
                .unwrap()
                .get(&todo_id)
                .filter(|t| t.user_id == user_id)
                .cloned())
        }

        async fn list(
            &self,
            user_id: Uuid,
            _filter: &TodoFilter,
            page: &PageRequest,
        ) -> AppResult<PageResponse<Todo>> {
            let items = self.list_all(user_id).await?;
            let total = items.len() as u64;
            Ok(PageResponse::new(items, page.page, page.page_size, total))
        }

        async fn list_all(&self, user_id: Uuid) -> AppResult<Vec<Todo>> {
            Ok(self
                .rows
                .lock()
                .unwrap()
                .values()
                .filter(|t| t.user_id == user_id)
                .cloned()
                .collect())
        }

        async fn update(
            &self,
            todo_id: Uuid,
            user_id: Uuid,
            update: &UpdateTodo,
        ) -> AppResult<Option<Todo>> {
            let mut rows = self.rows.lock().unwrap();
            let Some(todo) = rows.get_mut(&todo_id).filter(|t| t.user_id == user_id) else {
                return Ok(None);
            };

            if let Some(title) = &update.title {
                todo.title = title.clone();
            }
            if let Some(description) = &update.description {
                todo.description = Some(description.clone());
            }
            if let Some(priority) = update.priority {
                todo.priority = priority;
            }
            if let Some(category) = &update.category {
                todo.category = Some(category.clone());
            }
            if let Some(due_date) = update.due_date {
                todo.due_date = Some(due_date);
            }
            if let Some(status) = update.status {
                let now = Utc::now();
                if status == TodoStatus::InProgress && todo.started_at.is_none() {
                    todo.started_at = Some(now);
                }
                if status == TodoStatus::Complete && todo.completed_at.is_none() {
                    todo.completed_at = Some(now);
                }
                todo.status = status;
            }
            todo.updated_at = Utc::now();
            Ok(Some(todo.clone()))
        }

        async fn delete(&self, todo_id: Uuid, user_id: Uuid) -> AppResult<Option<Todo>> {
            let mut rows = self.rows.lock().unwrap();
            match rows.get(&todo_id) {
                Some(t) if t.user_id == user_id => Ok(rows.remove(&todo_id)),
                _ => Ok(None),
            }
        }
    }

    fn stored_todo(user_id: Uuid, status: TodoStatus) -> Todo {
        let now = Utc::now();
        Todo {
            id: Uuid::new_v4(),
            user_id,
            title: "Write report".to_string(),
            description: None,
            priority: TodoPriority::Medium,
            category: None,
            due_date: None,
            status,
            started_at: None,
            completed_at: None,
            attachment_count: 0,
            created_at: now,
            updated_at: now,
        }
    }

    fn harness(user: &UserSnapshot) -> (TodoService, Arc<MemoryTodos>, mpsc::Receiver<String>) {
        let registry = Arc::new(ConnectionRegistry::new(RealtimeConfig::default()));
        let batcher = Arc::new(NotificationBatcher::new(
            registry.clone(),
            BatchingConfig::default(),
        ));
        let publisher = Arc::new(EventPublisher::new(
            registry.clone(),
            batcher,
            Arc::new(NullSink),
            None,
        ));
        let (_handle, rx) = registry.register(user.clone());

        let store = Arc::new(MemoryTodos::new());
        let service = TodoService::new(store.clone(), publisher);
        (service, store, rx)
    }

    fn snapshot() -> UserSnapshot {
        UserSnapshot {
            id: Uuid::new_v4(),
            username: "alice".to_string(),
            theme: "light".to_string(),
        }
    }

    #[tokio::test]
    async fn status_only_update_emits_moved_not_updated() {
        let user = snapshot();
        let (service, store, mut rx) = harness(&user);
        let ctx = RequestContext::new(user.id, user.username.clone());

        let todo = stored_todo(user.id, TodoStatus::Todo);
        let todo_id = todo.id;
        store.insert(todo);

        let update = UpdateTodo {
            status: Some(TodoStatus::InProgress),
            ..Default::default()
        };
        let updated = service.update(&ctx, todo_id, update).await.unwrap();
        assert_eq!(updated.status, TodoStatus::InProgress);
        assert!(updated.started_at.is_some());

        let msg = rx.try_recv().unwrap();
        assert!(msg.contains("todo_moved"));
        assert!(rx.try_recv().is_err(), "no second event expected: {msg}");
    }

    #[tokio::test]
    async fn mixed_update_strips_status_from_field_changes() {
        let user = snapshot();
        let (service, store, mut rx) = harness(&user);
        let ctx = RequestContext::new(user.id, user.username.clone());

        let todo = stored_todo(user.id, TodoStatus::Todo);
        let todo_id = todo.id;
        store.insert(todo);

        let update = UpdateTodo {
            title: Some("Write final report".to_string()),
            status: Some(TodoStatus::InProgress),
            ..Default::default()
        };
        service.update(&ctx, todo_id, update).await.unwrap();

        let first = rx.try_recv().unwrap();
        let second = rx.try_recv().unwrap();
        assert!(first.contains("todo_moved"));
        assert!(second.contains("todo_updated"));

        // The lifecycle change rides the moved event only.
        let parsed: serde_json::Value = serde_json::from_str(&second).unwrap();
        let changes = &parsed["changes"];
        assert!(changes.get("title").is_some());
        assert!(changes.get("status").is_none());
    }

    #[tokio::test]
    async fn backward_transition_is_rejected_before_writing() {
        let user = snapshot();
        let (service, store, mut rx) = harness(&user);
        let ctx = RequestContext::new(user.id, user.username.clone());

        let todo = stored_todo(user.id, TodoStatus::Complete);
        let todo_id = todo.id;
        store.insert(todo);

        let update = UpdateTodo {
            status: Some(TodoStatus::Todo),
            ..Default::default()
        };
        let err = service.update(&ctx, todo_id, update).await.unwrap_err();
        assert!(err.to_string().contains("forward-only"));

        let unchanged = store.find_by_id(todo_id, user.id).await.unwrap().unwrap();
        assert_eq!(unchanged.status, TodoStatus::Complete);
        assert!(rx.try_recv().is_err());
    }

    #[tokio::test]
    async fn update_is_scoped_to_the_owner() {
        let user = snapshot();
        let (service, store, _rx) = harness(&user);

        let todo = stored_todo(user.id, TodoStatus::Todo);
        let todo_id = todo.id;
        store.insert(todo);

        let intruder = RequestContext::new(Uuid::new_v4(), "mallory".to_string());
        let update = UpdateTodo {
            title: Some("hijacked".to_string()),
            ..Default::default()
        };
        let err = service.update(&intruder, todo_id, update).await.unwrap_err();
        assert!(err.to_string().contains("not found"));
    }
}
