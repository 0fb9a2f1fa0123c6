/// Database layer
///
/// Connection pool management and migration running for the PostgreSQL
/// store backing both the API server and the scheduler.
///
/// # Modules
///
/// - `pool`: Connection pool creation and health checks
/// - `migrations`: Embedded sqlx migration runner

pub mod migrations;
pub mod pool;
