/// Per-request actor context
///
/// After the API's auth layer validates a bearer token it resolves the
/// subject to a live user row and inserts a [`CurrentUser`] into the
/// request extensions. Handlers extract it with Axum's `Extension`
/// extractor and derive the policy [`Actor`] from it; there is no global
/// or cached session state anywhere.
///
/// # Example
///
/// ```
/// use axum::Extension;
/// use taskhive_shared::auth::middleware::CurrentUser;
///
/// async fn handler(Extension(current): Extension<CurrentUser>) -> String {
///     format!("{} ({})", current.name, current.role.as_str())
/// }
/// ```

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::models::user::{Role, User};
use crate::policy::Actor;

/// The authenticated user attached to a request
///
/// Carries the display fields needed for notifications alongside the
/// identity/role pair the policy engine consumes. Built fresh from the
/// store on every request, so role changes and deletions apply
/// immediately.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CurrentUser {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub role: Role,
}

impl CurrentUser {
    /// The policy-engine view of this user
    pub fn actor(&self) -> Actor {
        Actor {
            id: self.id,
            role: self.role,
        }
    }
}

impl From<&User> for CurrentUser {
    fn from(user: &User) -> Self {
        CurrentUser {
            id: user.id,
            name: user.name.clone(),
            email: user.email.clone(),
            role: user.role,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    #[test]
    fn test_actor_carries_id_and_role() {
        let current = CurrentUser {
            id: Uuid::new_v4(),
            name: "Sam".to_string(),
            email: "sam@example.com".to_string(),
            role: Role::Manager,
        };

        let actor = current.actor();
        assert_eq!(actor.id, current.id);
        assert_eq!(actor.role, Role::Manager);
    }

    #[test]
    fn test_from_user_row() {
        let user = User {
            id: Uuid::new_v4(),
            name: "Sam".to_string(),
            email: "sam@example.com".to_string(),
            password_hash: "$argon2id$x".to_string(),
            role: Role::Admin,
            manager_id: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        };

        let current = CurrentUser::from(&user);
        assert_eq!(current.id, user.id);
        assert_eq!(current.email, user.email);
        assert_eq!(current.role, Role::Admin);
    }
}
