/// Reminder store
///
/// The sweep talks to persistence through the [`ReminderStore`] trait so
/// the scenario tests can drive it against an in-memory fake; production
/// uses [`PgReminderStore`] over the shared PostgreSQL pool.
///
/// # Idempotence
///
/// `mark_reminder_sent` is the only write: a guarded
/// `UPDATE … WHERE reminder_sent = FALSE`, so the flag can only ever flip
/// false→true. Whoever loses a race simply sees zero rows affected.

use async_trait::async_trait;
use sqlx::PgPool;
use uuid::Uuid;

use taskhive_shared::models::task::Task;

use crate::sweep::ReminderWindow;

/// Error type for reminder store operations
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
}

/// A task whose reminder deadline falls inside the sweep window,
/// joined with the assignee's address
///
/// `assignee_email` is `None` when the assignee has been deleted; the
/// sweep logs those and leaves the flag untouched.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct DueReminder {
    #[sqlx(flatten)]
    pub task: Task,
    pub assignee_email: Option<String>,
}

/// Persistence contract for the reminder sweep
#[async_trait]
pub trait ReminderStore: Send + Sync {
    /// Selects tasks with `remind_at` inside the window that are not
    /// completed and have not had their reminder delivered
    async fn due_reminders(&self, window: &ReminderWindow) -> Result<Vec<DueReminder>, StoreError>;

    /// Re-reads a single task mid-sweep
    ///
    /// Defends against the task being updated (or deleted) between the
    /// window select and the dispatch.
    async fn refresh(&self, task_id: Uuid) -> Result<Option<Task>, StoreError>;

    /// Atomically flips `reminder_sent` false→true
    ///
    /// Returns `true` only when this call performed the flip.
    async fn mark_reminder_sent(&self, task_id: Uuid) -> Result<bool, StoreError>;
}

/// PostgreSQL reminder store
pub struct PgReminderStore {
    db: PgPool,
}

impl PgReminderStore {
    pub fn new(db: PgPool) -> Self {
        PgReminderStore { db }
    }
}

#[async_trait]
impl ReminderStore for PgReminderStore {
    async fn due_reminders(&self, window: &ReminderWindow) -> Result<Vec<DueReminder>, StoreError> {
        let due: Vec<DueReminder> = sqlx::query_as(
            r#"
            SELECT
                t.id, t.title, t.description, t.status, t.priority,
                t.due_at, t.remind_at, t.reminder_sent,
                t.assigned_to, t.created_by, t.created_at, t.updated_at,
                a.email AS assignee_email
            FROM tasks t
            LEFT JOIN users a ON a.id = t.assigned_to
            WHERE t.remind_at >= $1
              AND t.remind_at <= $2
              AND t.status <> 'completed'
              AND t.reminder_sent = FALSE
            ORDER BY t.remind_at ASC
            "#,
        )
        .bind(window.start)
        .bind(window.end)
        .fetch_all(&self.db)
        .await?;

        Ok(due)
    }

    async fn refresh(&self, task_id: Uuid) -> Result<Option<Task>, StoreError> {
        Ok(Task::find_by_id(&self.db, task_id).await?)
    }

    async fn mark_reminder_sent(&self, task_id: Uuid) -> Result<bool, StoreError> {
        let result = sqlx::query(
            r#"
            UPDATE tasks
            SET reminder_sent = TRUE, updated_at = NOW()
            WHERE id = $1 AND reminder_sent = FALSE
            "#,
        )
        .bind(task_id)
        .execute(&self.db)
        .await?;

        Ok(result.rows_affected() > 0)
    }
}
