/// Task lifecycle endpoints
///
/// Every handler derives a policy [`Actor`] from the request's
/// [`CurrentUser`] and asks the policy engine before touching the store.
/// A denial produces a 403 (or 404 for reference-resolution failures)
/// with no partial effect.
///
/// Assignment emails are fire-and-forget: the task is committed first and
/// a dispatch failure is logged, never surfaced to the caller.

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Extension, Json,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use taskhive_shared::auth::middleware::CurrentUser;
use taskhive_shared::models::task::{
    CreateTask, Task, TaskFilter, TaskPriority, TaskStatus, TaskUpdate, TaskView,
};
use taskhive_shared::models::user::User;
use taskhive_shared::notify::render_assignment;
use taskhive_shared::policy::{decide, task_scope, Action};

use crate::app::AppState;
use crate::error::{ApiError, ApiResult};

/// Placeholder shown when a weak user reference no longer resolves
const UNKNOWN_USER: &str = "Unknown user";

/// Task as returned by the API
///
/// Dangling assignee/creator references render as "Unknown user" rather
/// than failing the read.
#[derive(Debug, Serialize)]
pub struct TaskResponse {
    pub id: Uuid,
    pub title: String,
    pub description: String,
    pub status: TaskStatus,
    pub priority: TaskPriority,
    pub due_at: DateTime<Utc>,
    pub remind_at: DateTime<Utc>,
    pub reminder_sent: bool,
    pub assigned_to: Uuid,
    pub assignee_name: String,
    pub created_by: Uuid,
    pub creator_name: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<TaskView> for TaskResponse {
    fn from(view: TaskView) -> Self {
        TaskResponse {
            id: view.id,
            title: view.title,
            description: view.description,
            status: view.status,
            priority: view.priority,
            due_at: view.due_at,
            remind_at: view.remind_at,
            reminder_sent: view.reminder_sent,
            assigned_to: view.assigned_to,
            assignee_name: view.assignee_name.unwrap_or_else(|| UNKNOWN_USER.to_string()),
            created_by: view.created_by,
            creator_name: view.creator_name.unwrap_or_else(|| UNKNOWN_USER.to_string()),
            created_at: view.created_at,
            updated_at: view.updated_at,
        }
    }
}

/// Query parameters for the task listing
#[derive(Debug, Default, Deserialize)]
pub struct ListTasksQuery {
    pub status: Option<TaskStatus>,
    pub priority: Option<TaskPriority>,
    pub due_before: Option<DateTime<Utc>>,
}

/// Request body for creating a task
#[derive(Debug, Deserialize, Validate)]
pub struct CreateTaskRequest {
    #[validate(length(min = 1, max = 255, message = "Title is required"))]
    pub title: String,

    #[validate(length(min = 1, message = "Description is required"))]
    pub description: String,

    pub priority: TaskPriority,
    pub due_at: DateTime<Utc>,
    pub remind_at: DateTime<Utc>,
    pub assigned_to: Uuid,
}

/// Request body for the partial-merge update
#[derive(Debug, Default, Deserialize, Validate)]
pub struct UpdateTaskRequest {
    #[validate(length(min = 1, max = 255, message = "Title must not be empty"))]
    pub title: Option<String>,

    #[validate(length(min = 1, message = "Description must not be empty"))]
    pub description: Option<String>,

    pub status: Option<TaskStatus>,
    pub priority: Option<TaskPriority>,
    pub due_at: Option<DateTime<Utc>>,
    pub remind_at: Option<DateTime<Utc>>,
}

/// Request body for the status-only update
#[derive(Debug, Deserialize)]
pub struct SetStatusRequest {
    pub status: TaskStatus,
}

/// `GET /v1/tasks`
///
/// The visible set is the actor's role scope; the optional filters only
/// narrow it further.
pub async fn list_tasks(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentUser>,
    Query(query): Query<ListTasksQuery>,
) -> ApiResult<Json<Vec<TaskResponse>>> {
    let actor = current.actor();
    decide(&actor, &Action::ListTasks).require()?;

    let scope = task_scope(&actor);
    let filter = TaskFilter {
        status: query.status,
        priority: query.priority,
        due_before: query.due_before,
    };

    let tasks = Task::list(&state.db, &scope, &filter).await?;

    Ok(Json(tasks.into_iter().map(TaskResponse::from).collect()))
}

/// `POST /v1/tasks`
///
/// The assignee must resolve at creation time; afterwards the reference
/// is weak and may dangle.
pub async fn create_task(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentUser>,
    Json(request): Json<CreateTaskRequest>,
) -> ApiResult<(StatusCode, Json<TaskResponse>)> {
    let actor = current.actor();
    decide(&actor, &Action::CreateTask).require()?;

    request.validate()?;

    let assignee = User::find_by_id(&state.db, request.assigned_to)
        .await?
        .ok_or_else(|| ApiError::NotFound("Assigned user not found".to_string()))?;

    let task = Task::create(
        &state.db,
        CreateTask {
            title: request.title,
            description: request.description,
            priority: request.priority,
            due_at: request.due_at,
            remind_at: request.remind_at,
            assigned_to: assignee.id,
            created_by: actor.id,
        },
    )
    .await?;

    // Fire-and-forget: the task is already committed and a dispatch
    // failure must not fail the request.
    let notifier = state.notifier.clone();
    let message = render_assignment(&task, &assignee.email, &current.name);
    let task_id = task.id;
    tokio::spawn(async move {
        if let Err(e) = notifier.send(&message).await {
            tracing::warn!(
                task_id = %task_id,
                channel = notifier.name(),
                error = %e,
                "Failed to send assignment notification"
            );
        }
    });

    let view = Task::find_view_by_id(&state.db, task.id)
        .await?
        .ok_or_else(|| ApiError::InternalError("Created task vanished".to_string()))?;

    Ok((StatusCode::CREATED, Json(TaskResponse::from(view))))
}

/// `GET /v1/tasks/:id`
pub async fn get_task(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentUser>,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<TaskResponse>> {
    let view = Task::find_view_by_id(&state.db, id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Task not found".to_string()))?;

    let actor = current.actor();
    decide(
        &actor,
        &Action::ReadTask {
            assigned_to: view.assigned_to,
            created_by: view.created_by,
        },
    )
    .require()?;

    Ok(Json(TaskResponse::from(view)))
}

/// `PUT /v1/tasks/:id`
///
/// Partial merge: omitted fields are untouched. Open to any authenticated
/// actor.
pub async fn update_task(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentUser>,
    Path(id): Path<Uuid>,
    Json(request): Json<UpdateTaskRequest>,
) -> ApiResult<Json<TaskResponse>> {
    let actor = current.actor();
    decide(&actor, &Action::UpdateTask).require()?;

    request.validate()?;

    let updated = Task::update(
        &state.db,
        id,
        TaskUpdate {
            title: request.title,
            description: request.description,
            status: request.status,
            priority: request.priority,
            due_at: request.due_at,
            remind_at: request.remind_at,
        },
    )
    .await?
    .ok_or_else(|| ApiError::NotFound("Task not found".to_string()))?;

    let view = Task::find_view_by_id(&state.db, updated.id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Task not found".to_string()))?;

    Ok(Json(TaskResponse::from(view)))
}

/// `PATCH /v1/tasks/:id/status`
///
/// Status-only update, open to any authenticated actor. Never touches
/// `reminder_sent`: completing and reopening a task does not re-arm an
/// already-delivered reminder.
pub async fn set_task_status(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentUser>,
    Path(id): Path<Uuid>,
    Json(request): Json<SetStatusRequest>,
) -> ApiResult<Json<TaskResponse>> {
    let actor = current.actor();
    decide(&actor, &Action::SetTaskStatus).require()?;

    let updated = Task::set_status(&state.db, id, request.status)
        .await?
        .ok_or_else(|| ApiError::NotFound("Task not found".to_string()))?;

    let view = Task::find_view_by_id(&state.db, updated.id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Task not found".to_string()))?;

    Ok(Json(TaskResponse::from(view)))
}

/// `DELETE /v1/tasks/:id`
pub async fn delete_task(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentUser>,
    Path(id): Path<Uuid>,
) -> ApiResult<StatusCode> {
    let actor = current.actor();
    decide(&actor, &Action::DeleteTask).require()?;

    let deleted = Task::delete(&state.db, id).await?;
    if !deleted {
        return Err(ApiError::NotFound("Task not found".to_string()));
    }

    Ok(StatusCode::NO_CONTENT)
}
