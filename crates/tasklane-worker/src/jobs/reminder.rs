//! Due-date reminder job.

use std::collections::HashSet;
use std::sync::Arc;

use chrono::{Duration, Utc};
use tokio::sync::Mutex;
use tracing::{error, info};
use uuid::Uuid;

use tasklane_core::config::WorkerConfig;
use tasklane_database::repositories::todo::TodoRepository;
use tasklane_realtime::EventPublisher;

/// Sends reminders for incomplete todos whose due date falls inside the
/// lookahead window.
///
/// Each todo is reminded at most once per process lifetime; retention of
/// the resulting notification rows is handled by the cleanup job.
pub struct DueReminderJob {
    /// Todo repository.
    todo_repo: Arc<TodoRepository>,
    /// Event publisher for urgent delivery.
    publisher: Arc<EventPublisher>,
    /// Lookahead settings.
    config: WorkerConfig,
    /// Todos already reminded.
    reminded: Mutex<HashSet<Uuid>>,
}

impl std::fmt::Debug for DueReminderJob {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DueReminderJob").finish()
    }
}

impl DueReminderJob {
    /// Creates a new reminder job.
    pub fn new(
        todo_repo: Arc<TodoRepository>,
        publisher: Arc<EventPublisher>,
        config: WorkerConfig,
    ) -> Self {
        Self {
            todo_repo,
            publisher,
            config,
            reminded: Mutex::new(HashSet::new()),
        }
    }

    /// Runs one reminder pass.
    pub async fn run(&self) {
        let now = Utc::now();
        let window_end = now + Duration::hours(self.config.due_reminder_window_hours as i64);

        let due = match self.todo_repo.list_due_between(now, window_end).await {
            Ok(todos) => todos,
            Err(e) => {
                error!(error = %e, "Due reminder query failed");
                return;
            }
        };

        let mut sent = 0usize;
        for todo in &due {
            {
                let mut reminded = self.reminded.lock().await;
                if !reminded.insert(todo.id) {
                    continue;
                }
            }
            self.publisher.due_reminder(todo).await;
            sent += 1;
        }

        if sent > 0 {
            info!(sent, window_hours = self.config.due_reminder_window_hours, "Due reminders sent");
        }
    }
}
