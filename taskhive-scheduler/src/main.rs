//! # TaskHive Scheduler
//!
//! Binary entry point for the daily reminder sweep. Connects to the
//! shared PostgreSQL store, wires the email-gateway notifier, and runs
//! the fixed daily trigger until interrupted.
//!
//! ## Usage
//!
//! ```bash
//! cargo run -p taskhive-scheduler
//! ```

use std::sync::Arc;

use taskhive_scheduler::config::Config;
use taskhive_scheduler::service::ReminderService;
use taskhive_scheduler::store::PgReminderStore;
use taskhive_shared::db::pool::create_pool;
use taskhive_shared::notify::gateway::GatewayNotifier;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "taskhive_scheduler=info,taskhive_shared=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("TaskHive Scheduler v{} starting", env!("CARGO_PKG_VERSION"));

    let config = Config::from_env()?;

    let pool = create_pool(config.database.clone()).await?;

    let notifier = GatewayNotifier::new(config.gateway.clone())
        .map_err(|e| anyhow::anyhow!("Failed to build email gateway client: {e}"))?;

    let service = ReminderService::new(
        Arc::new(PgReminderStore::new(pool)),
        Arc::new(notifier),
        config.service.clone(),
    );

    let shutdown = service.shutdown_token();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::info!("Shutdown signal received");
            shutdown.cancel();
        }
    });

    service.run().await;

    tracing::info!("Scheduler exited cleanly");
    Ok(())
}
