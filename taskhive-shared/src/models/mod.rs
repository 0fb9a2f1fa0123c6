/// Database models for TaskHive
///
/// # Models
///
/// - `user`: User accounts, the closed role enumeration, and manager links
/// - `task`: Tasks with status/priority enumerations and reminder fields
///
/// All CRUD operations take a `&PgPool` and return `sqlx::Error` on store
/// failure; callers map those to their own error taxonomy.

pub mod task;
pub mod user;
