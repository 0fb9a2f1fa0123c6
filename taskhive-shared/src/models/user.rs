/// User model and database operations
///
/// Users carry one of three closed roles (admin, manager, user) and an
/// optional weak reference to a manager. The role enumeration is a
/// Postgres enum, so an unknown role string can never round-trip through
/// the store.
///
/// # Schema
///
/// ```sql
/// CREATE TYPE user_role AS ENUM ('admin', 'manager', 'user');
///
/// CREATE TABLE users (
///     id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
///     name VARCHAR(255) NOT NULL,
///     email VARCHAR(255) NOT NULL UNIQUE,
///     password_hash VARCHAR(255) NOT NULL,
///     role user_role NOT NULL DEFAULT 'user',
///     manager_id UUID REFERENCES users(id) ON DELETE SET NULL,
///     created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
///     updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
/// );
/// ```
///
/// # Example
///
/// ```no_run
/// use taskhive_shared::models::user::{CreateUser, Role, User};
/// use sqlx::PgPool;
///
/// # async fn example(pool: PgPool) -> Result<(), sqlx::Error> {
/// let user = User::create(
///     &pool,
///     CreateUser {
///         name: "Jordan Diaz".to_string(),
///         email: "jordan@example.com".to_string(),
///         password_hash: "$argon2id$...".to_string(),
///     },
/// )
/// .await?;
///
/// assert_eq!(user.role, Role::User);
/// # Ok(())
/// # }
/// ```

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use uuid::Uuid;

/// Closed role enumeration
///
/// Every actor carries exactly one of these; an actor whose role cannot be
/// decoded is rejected at the store boundary rather than treated as some
/// implicit default.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "user_role", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// Full access to every task and every user-administration operation
    Admin,

    /// Creates and manages tasks; sees tasks they created
    Manager,

    /// Works tasks assigned to them
    User,
}

impl Role {
    /// Converts the role to its wire/storage string
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Admin => "admin",
            Role::Manager => "manager",
            Role::User => "user",
        }
    }
}

/// User account
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct User {
    /// Unique user ID (UUID v4)
    pub id: Uuid,

    /// Display name
    pub name: String,

    /// Email address, unique across all users
    pub email: String,

    /// Argon2id password hash, never serialized in responses
    #[serde(skip_serializing)]
    pub password_hash: String,

    /// Role, validated by the closed `user_role` Postgres enum
    pub role: Role,

    /// Weak reference to this user's manager
    ///
    /// When set it must point at a user whose role is manager; the API
    /// boundary enforces this on assignment.
    pub manager_id: Option<Uuid>,

    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Fields for creating a user
///
/// Role always starts as `user`; promotion is an admin operation.
#[derive(Debug, Clone)]
pub struct CreateUser {
    pub name: String,
    pub email: String,
    pub password_hash: String,
}

/// User row joined with the manager's display fields
///
/// Used by the admin user listing, which shows manager links. The manager
/// columns are `None` when no manager is assigned.
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct UserWithManager {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub role: Role,
    pub manager_id: Option<Uuid>,
    pub manager_name: Option<String>,
    pub manager_email: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl User {
    /// Creates a new user with role `user`
    ///
    /// # Errors
    ///
    /// Returns `sqlx::Error::Database` with a unique-violation code when
    /// the email is already registered.
    pub async fn create(pool: &PgPool, new_user: CreateUser) -> Result<User, sqlx::Error> {
        let user: User = sqlx::query_as(
            r#"
            INSERT INTO users (name, email, password_hash)
            VALUES ($1, $2, $3)
            RETURNING id, name, email, password_hash, role, manager_id, created_at, updated_at
            "#,
        )
        .bind(&new_user.name)
        .bind(&new_user.email)
        .bind(&new_user.password_hash)
        .fetch_one(pool)
        .await?;

        tracing::info!(user_id = %user.id, "Created user");
        Ok(user)
    }

    /// Finds a user by ID
    pub async fn find_by_id(pool: &PgPool, id: Uuid) -> Result<Option<User>, sqlx::Error> {
        sqlx::query_as(
            r#"
            SELECT id, name, email, password_hash, role, manager_id, created_at, updated_at
            FROM users
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(pool)
        .await
    }

    /// Finds a user by email (login path)
    pub async fn find_by_email(pool: &PgPool, email: &str) -> Result<Option<User>, sqlx::Error> {
        sqlx::query_as(
            r#"
            SELECT id, name, email, password_hash, role, manager_id, created_at, updated_at
            FROM users
            WHERE email = $1
            "#,
        )
        .bind(email)
        .fetch_optional(pool)
        .await
    }

    /// Lists every user with their manager display link (admin listing)
    pub async fn list_all(pool: &PgPool) -> Result<Vec<UserWithManager>, sqlx::Error> {
        sqlx::query_as(
            r#"
            SELECT
                u.id, u.name, u.email, u.role, u.manager_id,
                m.name AS manager_name,
                m.email AS manager_email,
                u.created_at
            FROM users u
            LEFT JOIN users m ON m.id = u.manager_id
            ORDER BY u.created_at ASC
            "#,
        )
        .fetch_all(pool)
        .await
    }

    /// Lists users with a given role
    ///
    /// Used for the assignment-candidate listing (`role = 'user'`).
    pub async fn list_by_role(pool: &PgPool, role: Role) -> Result<Vec<UserWithManager>, sqlx::Error> {
        sqlx::query_as(
            r#"
            SELECT
                u.id, u.name, u.email, u.role, u.manager_id,
                m.name AS manager_name,
                m.email AS manager_email,
                u.created_at
            FROM users u
            LEFT JOIN users m ON m.id = u.manager_id
            WHERE u.role = $1
            ORDER BY u.created_at ASC
            "#,
        )
        .bind(role)
        .fetch_all(pool)
        .await
    }

    /// Lists the distinct users assigned to tasks a given creator made
    ///
    /// This is the manager view of `GET /users`: the set of people the
    /// manager has handed work to, deduplicated.
    pub async fn list_assignees_of(pool: &PgPool, creator_id: Uuid) -> Result<Vec<UserWithManager>, sqlx::Error> {
        sqlx::query_as(
            r#"
            SELECT DISTINCT
                u.id, u.name, u.email, u.role, u.manager_id,
                m.name AS manager_name,
                m.email AS manager_email,
                u.created_at
            FROM users u
            INNER JOIN tasks t ON t.assigned_to = u.id
            LEFT JOIN users m ON m.id = u.manager_id
            WHERE t.created_by = $1
            ORDER BY u.created_at ASC
            "#,
        )
        .bind(creator_id)
        .fetch_all(pool)
        .await
    }

    /// Lists users whose manager link points at the given manager
    pub async fn list_managed_by(pool: &PgPool, manager_id: Uuid) -> Result<Vec<UserWithManager>, sqlx::Error> {
        sqlx::query_as(
            r#"
            SELECT
                u.id, u.name, u.email, u.role, u.manager_id,
                m.name AS manager_name,
                m.email AS manager_email,
                u.created_at
            FROM users u
            LEFT JOIN users m ON m.id = u.manager_id
            WHERE u.manager_id = $1
            ORDER BY u.created_at ASC
            "#,
        )
        .bind(manager_id)
        .fetch_all(pool)
        .await
    }

    /// Changes a user's role
    ///
    /// Returns `false` if the user does not exist.
    pub async fn set_role(pool: &PgPool, id: Uuid, role: Role) -> Result<bool, sqlx::Error> {
        let result = sqlx::query(
            r#"
            UPDATE users
            SET role = $2, updated_at = NOW()
            WHERE id = $1
            "#,
        )
        .bind(id)
        .bind(role)
        .execute(pool)
        .await?;

        if result.rows_affected() > 0 {
            tracing::info!(user_id = %id, role = role.as_str(), "Changed user role");
        }
        Ok(result.rows_affected() > 0)
    }

    /// Sets a user's manager link
    ///
    /// The caller is responsible for verifying the target resolves to a
    /// user with role manager before calling this.
    ///
    /// Returns `false` if the user does not exist.
    pub async fn set_manager(pool: &PgPool, id: Uuid, manager_id: Uuid) -> Result<bool, sqlx::Error> {
        let result = sqlx::query(
            r#"
            UPDATE users
            SET manager_id = $2, updated_at = NOW()
            WHERE id = $1
            "#,
        )
        .bind(id)
        .bind(manager_id)
        .execute(pool)
        .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Clears a user's manager link
    ///
    /// Returns `false` if the user does not exist.
    pub async fn clear_manager(pool: &PgPool, id: Uuid) -> Result<bool, sqlx::Error> {
        let result = sqlx::query(
            r#"
            UPDATE users
            SET manager_id = NULL, updated_at = NOW()
            WHERE id = $1
            "#,
        )
        .bind(id)
        .execute(pool)
        .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Hard-deletes a user
    ///
    /// Tasks that reference the user as assignee or creator keep their
    /// dangling ids; task reads render "Unknown user" for them.
    ///
    /// Returns `false` if the user does not exist.
    pub async fn delete(pool: &PgPool, id: Uuid) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM users WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;

        if result.rows_affected() > 0 {
            tracing::info!(user_id = %id, "Deleted user");
        }
        Ok(result.rows_affected() > 0)
    }
}
