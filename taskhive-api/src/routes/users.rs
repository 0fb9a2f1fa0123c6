/// User administration endpoints
///
/// Listing is role-scoped (admins see everyone, managers see the people
/// they have assigned tasks to); mutation of roles and manager links is
/// admin-only. Assigning a manager resolves the target first so the
/// policy decision sees whether it really is a manager.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Extension, Json,
};
use serde::Deserialize;
use uuid::Uuid;

use taskhive_shared::auth::middleware::CurrentUser;
use taskhive_shared::models::user::{Role, User, UserWithManager};
use taskhive_shared::policy::{decide, user_scope, Action, UserScope};

use crate::app::AppState;
use crate::error::{ApiError, ApiResult};

/// Request body for the role change
#[derive(Debug, Deserialize)]
pub struct ChangeRoleRequest {
    pub role: Role,
}

/// Request body for the manager assignment
#[derive(Debug, Deserialize)]
pub struct AssignManagerRequest {
    pub manager_id: Uuid,
}

/// `GET /v1/users`
///
/// Admin: every user with manager links. Manager: the distinct assignees
/// of tasks they created. User: forbidden.
pub async fn list_users(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentUser>,
) -> ApiResult<Json<Vec<UserWithManager>>> {
    let actor = current.actor();

    let users = match user_scope(&actor)? {
        UserScope::All => User::list_all(&state.db).await?,
        UserScope::AssigneesOf(creator_id) => {
            User::list_assignees_of(&state.db, creator_id).await?
        }
    };

    Ok(Json(users))
}

/// `GET /v1/users/available`
///
/// Assignment candidates: every account whose role is `user`.
pub async fn list_available_users(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentUser>,
) -> ApiResult<Json<Vec<UserWithManager>>> {
    let actor = current.actor();
    decide(&actor, &Action::ListAssignableUsers).require()?;

    let users = User::list_by_role(&state.db, Role::User).await?;

    Ok(Json(users))
}

/// `GET /v1/users/managed`
///
/// Users whose manager link points at the caller.
pub async fn list_managed_users(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentUser>,
) -> ApiResult<Json<Vec<UserWithManager>>> {
    let actor = current.actor();
    decide(&actor, &Action::ListManagedUsers).require()?;

    let users = User::list_managed_by(&state.db, actor.id).await?;

    Ok(Json(users))
}

/// `PATCH /v1/users/:id/role`
pub async fn change_role(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentUser>,
    Path(id): Path<Uuid>,
    Json(request): Json<ChangeRoleRequest>,
) -> ApiResult<StatusCode> {
    let actor = current.actor();
    decide(&actor, &Action::ChangeUserRole).require()?;

    let changed = User::set_role(&state.db, id, request.role).await?;
    if !changed {
        return Err(ApiError::NotFound("User not found".to_string()));
    }

    Ok(StatusCode::NO_CONTENT)
}

/// `PATCH /v1/users/:id/manager`
///
/// The target is resolved before the policy decision so the engine sees
/// whether the proposed manager id really is a manager. A non-admin
/// caller is rejected on the role gate regardless of the target.
pub async fn assign_manager(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentUser>,
    Path(id): Path<Uuid>,
    Json(request): Json<AssignManagerRequest>,
) -> ApiResult<StatusCode> {
    let actor = current.actor();

    let target_is_manager = User::find_by_id(&state.db, request.manager_id)
        .await?
        .map(|u| u.role == Role::Manager)
        .unwrap_or(false);

    decide(&actor, &Action::AssignManager { target_is_manager }).require()?;

    let changed = User::set_manager(&state.db, id, request.manager_id).await?;
    if !changed {
        return Err(ApiError::NotFound("User not found".to_string()));
    }

    tracing::info!(user_id = %id, manager_id = %request.manager_id, "Assigned manager");
    Ok(StatusCode::NO_CONTENT)
}

/// `DELETE /v1/users/:id/manager`
pub async fn clear_manager(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentUser>,
    Path(id): Path<Uuid>,
) -> ApiResult<StatusCode> {
    let actor = current.actor();
    decide(&actor, &Action::ClearManager).require()?;

    let changed = User::clear_manager(&state.db, id).await?;
    if !changed {
        return Err(ApiError::NotFound("User not found".to_string()));
    }

    Ok(StatusCode::NO_CONTENT)
}

/// `DELETE /v1/users/:id`
///
/// Hard delete. Tasks referencing the user keep their dangling ids and
/// task reads render "Unknown user" for them.
pub async fn delete_user(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentUser>,
    Path(id): Path<Uuid>,
) -> ApiResult<StatusCode> {
    let actor = current.actor();
    decide(&actor, &Action::DeleteUser).require()?;

    let deleted = User::delete(&state.db, id).await?;
    if !deleted {
        return Err(ApiError::NotFound("User not found".to_string()));
    }

    Ok(StatusCode::NO_CONTENT)
}
