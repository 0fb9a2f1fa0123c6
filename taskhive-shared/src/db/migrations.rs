/// Embedded database migrations
///
/// Migrations live in `migrations/` at the workspace root and are compiled
/// into the binaries with `sqlx::migrate!`, so deployments never need the
/// SQL files on disk.

use sqlx::postgres::PgPool;
use tracing::info;

/// Runs all pending migrations
///
/// Safe to call at every startup; already-applied migrations are skipped.
///
/// # Errors
///
/// Returns an error if a migration file is malformed or a migration fails
/// to execute. Failed migrations are rolled back.
pub async fn run_migrations(pool: &PgPool) -> Result<(), sqlx::migrate::MigrateError> {
    info!("Running database migrations");

    sqlx::migrate!("../migrations").run(pool).await?;

    info!("Database migrations up to date");
    Ok(())
}
