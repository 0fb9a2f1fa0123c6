/// Access policy engine
///
/// A pure decision table mapping (actor, action) to allow/deny. No I/O
/// happens here: any entity an action needs to reference (a task's
/// assignee/creator, whether a manager-assignment target really is a
/// manager) is resolved by the caller and passed in.
///
/// # Evaluation order
///
/// Role scoping is evaluated first and is authoritative; resource-level
/// ownership checks only run once the role gate passes. There is no
/// "unknown role" branch because [`Role`] is a closed enum: an actor
/// whose stored role cannot be decoded is rejected at the store boundary
/// and never reaches this module.
///
/// # Deliberately broad rules
///
/// Full task update and status-only update are allowed for any
/// authenticated actor, matching the system's intent; tightening them to
/// admin/manager/assignee would change observable behavior.
///
/// # Example
///
/// ```
/// use taskhive_shared::models::user::Role;
/// use taskhive_shared::policy::{decide, Action, Actor, Decision};
/// use uuid::Uuid;
///
/// let manager = Actor { id: Uuid::new_v4(), role: Role::Manager };
/// assert_eq!(decide(&manager, &Action::CreateTask), Decision::Allow);
///
/// let worker = Actor { id: Uuid::new_v4(), role: Role::User };
/// assert!(matches!(decide(&worker, &Action::DeleteTask), Decision::Deny(_)));
/// ```

use uuid::Uuid;

use crate::models::user::Role;

/// The authenticated identity performing an operation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Actor {
    pub id: Uuid,
    pub role: Role,
}

/// Operations subject to a policy decision
///
/// Actions that need resource relationships carry them already resolved.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    /// List tasks (always allowed; the visible set comes from [`task_scope`])
    ListTasks,

    /// Read a single task, given its resolved references
    ReadTask {
        assigned_to: Uuid,
        created_by: Uuid,
    },

    /// Create a task
    CreateTask,

    /// Full (partial-merge) update of a task by id
    UpdateTask,

    /// Status-only update of a task by id
    SetTaskStatus,

    /// Delete a task
    DeleteTask,

    /// List users (scope comes from [`user_scope`])
    ListUsers,

    /// List assignment candidates (users with role `user`)
    ListAssignableUsers,

    /// List users whose manager link points at the actor
    ListManagedUsers,

    /// Change a user's role
    ChangeUserRole,

    /// Assign a user's manager link
    ///
    /// `target_is_manager` is whether the proposed manager id resolved to
    /// a user with role manager.
    AssignManager { target_is_manager: bool },

    /// Clear a user's manager link
    ClearManager,

    /// Delete a user
    DeleteUser,
}

/// Why an action was denied
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum DenyReason {
    /// The actor's role does not permit the action
    #[error("You do not have permission to perform this action")]
    Forbidden,

    /// The role gate passed but the ownership check failed
    #[error("Unauthorized")]
    NotOwner,

    /// Manager assignment target did not resolve to a manager
    #[error("Manager not found")]
    ManagerNotFound,
}

/// Policy decision outcome
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    Allow,
    Deny(DenyReason),
}

impl Decision {
    /// Converts the decision into a `Result` for use with `?`
    pub fn require(self) -> Result<(), DenyReason> {
        match self {
            Decision::Allow => Ok(()),
            Decision::Deny(reason) => Err(reason),
        }
    }
}

/// The set of tasks a role is allowed to see
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TaskScope {
    /// Every task (admin)
    All,

    /// Tasks the actor created (manager)
    CreatedBy(Uuid),

    /// Tasks assigned to the actor (user)
    AssignedTo(Uuid),
}

/// The set of users a role is allowed to list
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UserScope {
    /// Every user, with manager links (admin)
    All,

    /// The distinct assignees of tasks the actor created (manager)
    AssigneesOf(Uuid),
}

/// Decides whether `actor` may perform `action`
pub fn decide(actor: &Actor, action: &Action) -> Decision {
    use Action::*;

    match *action {
        ListTasks => Decision::Allow,

        ReadTask {
            assigned_to,
            created_by,
        } => match actor.role {
            Role::Admin => Decision::Allow,
            Role::Manager if created_by == actor.id => Decision::Allow,
            Role::User if assigned_to == actor.id => Decision::Allow,
            _ => Decision::Deny(DenyReason::NotOwner),
        },

        CreateTask | DeleteTask => require_role(actor, &[Role::Admin, Role::Manager]),

        // Broad by design: any authenticated actor may mutate any task.
        UpdateTask | SetTaskStatus => Decision::Allow,

        ListUsers | ListAssignableUsers => require_role(actor, &[Role::Admin, Role::Manager]),

        ListManagedUsers => require_role(actor, &[Role::Manager]),

        ChangeUserRole | ClearManager | DeleteUser => require_role(actor, &[Role::Admin]),

        AssignManager { target_is_manager } => match actor.role {
            Role::Admin if target_is_manager => Decision::Allow,
            Role::Admin => Decision::Deny(DenyReason::ManagerNotFound),
            _ => Decision::Deny(DenyReason::Forbidden),
        },
    }
}

/// Returns the task visibility scope for an actor's role
///
/// Optional list filters apply after this scope and only narrow it.
pub fn task_scope(actor: &Actor) -> TaskScope {
    match actor.role {
        Role::Admin => TaskScope::All,
        Role::Manager => TaskScope::CreatedBy(actor.id),
        Role::User => TaskScope::AssignedTo(actor.id),
    }
}

/// Returns the user listing scope for an actor's role
pub fn user_scope(actor: &Actor) -> Result<UserScope, DenyReason> {
    match actor.role {
        Role::Admin => Ok(UserScope::All),
        Role::Manager => Ok(UserScope::AssigneesOf(actor.id)),
        Role::User => Err(DenyReason::Forbidden),
    }
}

fn require_role(actor: &Actor, allowed: &[Role]) -> Decision {
    if allowed.contains(&actor.role) {
        Decision::Allow
    } else {
        Decision::Deny(DenyReason::Forbidden)
    }
}
