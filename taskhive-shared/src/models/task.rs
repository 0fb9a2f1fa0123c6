/// Task model and database operations
///
/// Tasks are the core entity of TaskHive. Every task carries a due
/// deadline and a separate reminder deadline, plus a monotonic
/// `reminder_sent` flag that guarantees at-most-once reminder delivery
/// across repeated scheduler sweeps.
///
/// # Status graph
///
/// The status graph is flat and fully connected: any status may move to
/// any other. `completed` only matters to the reminder sweep (completed
/// tasks are never reminded) and is freely reversible.
///
/// # Schema
///
/// ```sql
/// CREATE TYPE task_status AS ENUM ('pending', 'in_progress', 'completed');
/// CREATE TYPE task_priority AS ENUM ('low', 'medium', 'high');
///
/// CREATE TABLE tasks (
///     id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
///     title VARCHAR(255) NOT NULL,
///     description TEXT NOT NULL,
///     status task_status NOT NULL DEFAULT 'pending',
///     priority task_priority NOT NULL DEFAULT 'medium',
///     due_at TIMESTAMPTZ NOT NULL,
///     remind_at TIMESTAMPTZ NOT NULL,
///     reminder_sent BOOLEAN NOT NULL DEFAULT FALSE,
///     assigned_to UUID NOT NULL,
///     created_by UUID NOT NULL,
///     created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
///     updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
/// );
/// ```
///
/// `assigned_to` and `created_by` are weak references: deleting a user
/// leaves them dangling and reads render "Unknown user".
///
/// # Example
///
/// ```no_run
/// use taskhive_shared::models::task::{CreateTask, Task, TaskPriority};
/// use chrono::Utc;
/// use sqlx::PgPool;
/// use uuid::Uuid;
///
/// # async fn example(pool: PgPool, assignee: Uuid, manager: Uuid) -> Result<(), sqlx::Error> {
/// let task = Task::create(&pool, CreateTask {
///     title: "Quarterly report".to_string(),
///     description: "Compile Q2 numbers".to_string(),
///     priority: TaskPriority::High,
///     due_at: Utc::now() + chrono::Duration::days(7),
///     remind_at: Utc::now() + chrono::Duration::days(6),
///     assigned_to: assignee,
///     created_by: manager,
/// }).await?;
///
/// assert!(!task.reminder_sent);
/// # Ok(())
/// # }
/// ```

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use uuid::Uuid;

use crate::policy::TaskScope;

/// Task status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "task_status", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum TaskStatus {
    /// Not started
    Pending,

    /// Being worked
    InProgress,

    /// Done; excluded from reminder sweeps but freely reversible
    Completed,
}

impl TaskStatus {
    /// Converts the status to its wire/storage string
    pub fn as_str(&self) -> &'static str {
        match self {
            TaskStatus::Pending => "pending",
            TaskStatus::InProgress => "in_progress",
            TaskStatus::Completed => "completed",
        }
    }
}

/// Task priority
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "task_priority", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum TaskPriority {
    Low,
    Medium,
    High,
}

impl TaskPriority {
    pub fn as_str(&self) -> &'static str {
        match self {
            TaskPriority::Low => "low",
            TaskPriority::Medium => "medium",
            TaskPriority::High => "high",
        }
    }
}

/// Task row
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Task {
    pub id: Uuid,
    pub title: String,
    pub description: String,
    pub status: TaskStatus,
    pub priority: TaskPriority,

    /// When the task is due
    pub due_at: DateTime<Utc>,

    /// When the assignee should be reminded; distinct from `due_at`
    pub remind_at: DateTime<Utc>,

    /// Monotonic delivery flag: flips false→true exactly once and never
    /// reverts. This is what makes repeated sweeps idempotent.
    pub reminder_sent: bool,

    /// Weak reference to the assignee
    pub assigned_to: Uuid,

    /// Weak reference to the creator
    pub created_by: Uuid,

    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Fields for creating a task
#[derive(Debug, Clone)]
pub struct CreateTask {
    pub title: String,
    pub description: String,
    pub priority: TaskPriority,
    pub due_at: DateTime<Utc>,
    pub remind_at: DateTime<Utc>,
    pub assigned_to: Uuid,
    pub created_by: Uuid,
}

/// Partial update: only supplied fields are merged, the rest are untouched
#[derive(Debug, Clone, Default)]
pub struct TaskUpdate {
    pub title: Option<String>,
    pub description: Option<String>,
    pub status: Option<TaskStatus>,
    pub priority: Option<TaskPriority>,
    pub due_at: Option<DateTime<Utc>>,
    pub remind_at: Option<DateTime<Utc>>,
}

/// Optional list filters
///
/// Filters narrow the role scope, never widen it: they are ANDed onto the
/// scope predicate.
#[derive(Debug, Clone, Default)]
pub struct TaskFilter {
    pub status: Option<TaskStatus>,
    pub priority: Option<TaskPriority>,

    /// Upper bound on `due_at` (inclusive)
    pub due_before: Option<DateTime<Utc>>,
}

/// Task row joined with assignee/creator display fields
///
/// The display columns are `None` when the referenced user has been
/// deleted; response mapping renders those as "Unknown user".
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct TaskView {
    pub id: Uuid,
    pub title: String,
    pub description: String,
    pub status: TaskStatus,
    pub priority: TaskPriority,
    pub due_at: DateTime<Utc>,
    pub remind_at: DateTime<Utc>,
    pub reminder_sent: bool,
    pub assigned_to: Uuid,
    pub created_by: Uuid,
    pub assignee_name: Option<String>,
    pub assignee_email: Option<String>,
    pub creator_name: Option<String>,
    pub creator_email: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

const TASK_VIEW_SELECT: &str = r#"
    SELECT
        t.id, t.title, t.description, t.status, t.priority,
        t.due_at, t.remind_at, t.reminder_sent,
        t.assigned_to, t.created_by,
        a.name AS assignee_name,
        a.email AS assignee_email,
        c.name AS creator_name,
        c.email AS creator_email,
        t.created_at, t.updated_at
    FROM tasks t
    LEFT JOIN users a ON a.id = t.assigned_to
    LEFT JOIN users c ON c.id = t.created_by
"#;

impl Task {
    /// Creates a new task
    ///
    /// New tasks always start with `reminder_sent = FALSE`; there is no
    /// code path that creates a task already marked delivered.
    pub async fn create(pool: &PgPool, new_task: CreateTask) -> Result<Task, sqlx::Error> {
        let task: Task = sqlx::query_as(
            r#"
            INSERT INTO tasks (title, description, priority, due_at, remind_at, assigned_to, created_by)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            RETURNING
                id, title, description, status, priority,
                due_at, remind_at, reminder_sent,
                assigned_to, created_by, created_at, updated_at
            "#,
        )
        .bind(&new_task.title)
        .bind(&new_task.description)
        .bind(new_task.priority)
        .bind(new_task.due_at)
        .bind(new_task.remind_at)
        .bind(new_task.assigned_to)
        .bind(new_task.created_by)
        .fetch_one(pool)
        .await?;

        tracing::info!(
            task_id = %task.id,
            assigned_to = %task.assigned_to,
            created_by = %task.created_by,
            "Created task"
        );
        Ok(task)
    }

    /// Finds a task by ID (raw row, no display fields)
    pub async fn find_by_id(pool: &PgPool, id: Uuid) -> Result<Option<Task>, sqlx::Error> {
        sqlx::query_as(
            r#"
            SELECT
                id, title, description, status, priority,
                due_at, remind_at, reminder_sent,
                assigned_to, created_by, created_at, updated_at
            FROM tasks
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(pool)
        .await
    }

    /// Finds a task by ID with assignee/creator display fields
    pub async fn find_view_by_id(pool: &PgPool, id: Uuid) -> Result<Option<TaskView>, sqlx::Error> {
        let query = format!("{TASK_VIEW_SELECT} WHERE t.id = $1");

        sqlx::query_as(&query).bind(id).fetch_optional(pool).await
    }

    /// Lists tasks within a role scope, narrowed by optional filters
    ///
    /// The scope predicate comes from the policy engine and is applied
    /// first; filters only ever shrink the result. Ordered by `due_at`
    /// ascending.
    pub async fn list(
        pool: &PgPool,
        scope: &TaskScope,
        filter: &TaskFilter,
    ) -> Result<Vec<TaskView>, sqlx::Error> {
        let (created_by, assigned_to) = match scope {
            TaskScope::All => (None, None),
            TaskScope::CreatedBy(id) => (Some(*id), None),
            TaskScope::AssignedTo(id) => (None, Some(*id)),
        };

        let query = format!(
            r#"
            {TASK_VIEW_SELECT}
            WHERE ($1::uuid IS NULL OR t.created_by = $1)
              AND ($2::uuid IS NULL OR t.assigned_to = $2)
              AND ($3::task_status IS NULL OR t.status = $3)
              AND ($4::task_priority IS NULL OR t.priority = $4)
              AND ($5::timestamptz IS NULL OR t.due_at <= $5)
            ORDER BY t.due_at ASC
            "#
        );

        sqlx::query_as(&query)
            .bind(created_by)
            .bind(assigned_to)
            .bind(filter.status)
            .bind(filter.priority)
            .bind(filter.due_before)
            .fetch_all(pool)
            .await
    }

    /// Merges the supplied fields into a task
    ///
    /// Omitted fields are left untouched. `reminder_sent` is never
    /// writable through this path.
    ///
    /// Returns `None` if the task does not exist.
    pub async fn update(
        pool: &PgPool,
        id: Uuid,
        update: TaskUpdate,
    ) -> Result<Option<Task>, sqlx::Error> {
        let task: Option<Task> = sqlx::query_as(
            r#"
            UPDATE tasks
            SET
                title = COALESCE($2, title),
                description = COALESCE($3, description),
                status = COALESCE($4, status),
                priority = COALESCE($5, priority),
                due_at = COALESCE($6, due_at),
                remind_at = COALESCE($7, remind_at),
                updated_at = NOW()
            WHERE id = $1
            RETURNING
                id, title, description, status, priority,
                due_at, remind_at, reminder_sent,
                assigned_to, created_by, created_at, updated_at
            "#,
        )
        .bind(id)
        .bind(update.title)
        .bind(update.description)
        .bind(update.status)
        .bind(update.priority)
        .bind(update.due_at)
        .bind(update.remind_at)
        .fetch_optional(pool)
        .await?;

        if let Some(ref task) = task {
            tracing::info!(task_id = %task.id, "Updated task");
        }
        Ok(task)
    }

    /// Sets only the status
    ///
    /// Does not touch `reminder_sent`: completing and later reopening a
    /// task never re-arms an already-delivered reminder.
    ///
    /// Returns `None` if the task does not exist.
    pub async fn set_status(
        pool: &PgPool,
        id: Uuid,
        status: TaskStatus,
    ) -> Result<Option<Task>, sqlx::Error> {
        let task: Option<Task> = sqlx::query_as(
            r#"
            UPDATE tasks
            SET status = $2, updated_at = NOW()
            WHERE id = $1
            RETURNING
                id, title, description, status, priority,
                due_at, remind_at, reminder_sent,
                assigned_to, created_by, created_at, updated_at
            "#,
        )
        .bind(id)
        .bind(status)
        .fetch_optional(pool)
        .await?;

        if let Some(ref task) = task {
            tracing::info!(task_id = %task.id, status = status.as_str(), "Set task status");
        }
        Ok(task)
    }

    /// Permanently deletes a task
    ///
    /// Returns `false` if the task does not exist.
    pub async fn delete(pool: &PgPool, id: Uuid) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM tasks WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;

        if result.rows_affected() > 0 {
            tracing::info!(task_id = %id, "Deleted task");
        }
        Ok(result.rows_affected() > 0)
    }
}
