/// Common test utilities for integration tests
///
/// Provides a [`TestContext`] that builds the router against a real
/// database, seeds one account per role, and issues tokens for each.
/// Assignment emails go to a shared [`MockNotifier`] so tests can assert
/// on what was dispatched.

use std::sync::Arc;

use sqlx::PgPool;
use taskhive_api::app::{build_router, AppState};
use taskhive_api::config::Config;
use taskhive_shared::auth::jwt::{create_token, Claims, TokenType};
use taskhive_shared::auth::password::hash_password;
use taskhive_shared::models::user::{CreateUser, Role, User};
use taskhive_shared::notify::mock::MockNotifier;
use uuid::Uuid;

/// Test context containing the app and one seeded account per role
pub struct TestContext {
    pub db: PgPool,
    pub app: axum::Router,
    pub notifier: Arc<MockNotifier>,
    pub admin: SeededAccount,
    pub manager: SeededAccount,
    pub worker: SeededAccount,
}

/// A seeded user plus a valid access token
pub struct SeededAccount {
    pub user: User,
    pub token: String,
}

impl SeededAccount {
    pub fn auth_header(&self) -> String {
        format!("Bearer {}", self.token)
    }
}

impl TestContext {
    /// Creates a fresh context with migrated schema and seeded accounts
    pub async fn new() -> anyhow::Result<Self> {
        let config = Config::from_env()?;

        let db = PgPool::connect(&config.database.url).await?;

        // Path relative to the workspace Cargo.toml, not this file.
        sqlx::migrate!("../migrations").run(&db).await?;

        let secret = config.jwt.secret.clone();
        let notifier = Arc::new(MockNotifier::new());

        let admin = seed_account(&db, &secret, Role::Admin).await?;
        let manager = seed_account(&db, &secret, Role::Manager).await?;
        let worker = seed_account(&db, &secret, Role::User).await?;

        let state = AppState::new(db.clone(), config, notifier.clone());
        let app = build_router(state);

        Ok(TestContext {
            db,
            app,
            notifier,
            admin,
            manager,
            worker,
        })
    }

    /// Deletes everything the context seeded
    pub async fn cleanup(&self) -> anyhow::Result<()> {
        for account in [&self.admin, &self.manager, &self.worker] {
            sqlx::query("DELETE FROM tasks WHERE created_by = $1 OR assigned_to = $1")
                .bind(account.user.id)
                .execute(&self.db)
                .await?;
            User::delete(&self.db, account.user.id).await?;
        }
        Ok(())
    }
}

async fn seed_account(pool: &PgPool, secret: &str, role: Role) -> anyhow::Result<SeededAccount> {
    let user = User::create(
        pool,
        CreateUser {
            name: format!("Test {}", role.as_str()),
            email: format!("test-{}-{}@example.com", role.as_str(), Uuid::new_v4()),
            password_hash: hash_password("test-password-1")?,
        },
    )
    .await?;

    if role != Role::User {
        User::set_role(pool, user.id, role).await?;
    }

    let user = User::find_by_id(pool, user.id)
        .await?
        .expect("seeded user exists");

    let token = create_token(&Claims::new(user.id, TokenType::Access), secret)?;

    Ok(SeededAccount { user, token })
}
