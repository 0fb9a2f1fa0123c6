//! # TaskHive API Server
//!
//! Binary entry point. Loads configuration, connects to PostgreSQL, runs
//! migrations, and serves the Axum router.
//!
//! ## Usage
//!
//! ```bash
//! cargo run -p taskhive-api
//! ```

use std::sync::Arc;

use taskhive_api::app::{build_router, AppState};
use taskhive_api::config::Config;
use taskhive_shared::db::migrations::run_migrations;
use taskhive_shared::db::pool::create_pool;
use taskhive_shared::notify::gateway::GatewayNotifier;
use taskhive_shared::notify::mock::MockNotifier;
use taskhive_shared::notify::Notifier;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "taskhive_api=info,taskhive_shared=info,tower_http=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("TaskHive API Server v{} starting", env!("CARGO_PKG_VERSION"));

    let config = Config::from_env()?;

    let pool = create_pool(config.database.clone()).await?;
    run_migrations(&pool).await?;

    let notifier: Arc<dyn Notifier> = match &config.email {
        Some(gateway) => Arc::new(
            GatewayNotifier::new(gateway.clone())
                .map_err(|e| anyhow::anyhow!("Failed to build email gateway client: {e}"))?,
        ),
        None => {
            tracing::warn!("EMAIL_GATEWAY_URL not set, assignment emails go to the mock channel");
            Arc::new(MockNotifier::new())
        }
    };

    let bind_address = config.bind_address();
    let state = AppState::new(pool, config, notifier);
    let router = build_router(state);

    let listener = tokio::net::TcpListener::bind(&bind_address).await?;
    tracing::info!(address = %bind_address, "Listening");

    axum::serve(listener, router).await?;

    Ok(())
}
