/// Scheduler configuration
///
/// Loaded from environment variables (a `.env` file is honored in
/// development).
///
/// # Environment Variables
///
/// - `DATABASE_URL`: PostgreSQL connection string (required)
/// - `SCHEDULER_FIRE_HOUR_UTC`: UTC hour for the daily sweep (default: 0)
/// - `EMAIL_GATEWAY_URL`: email gateway endpoint (required)
/// - `EMAIL_GATEWAY_TOKEN`: bearer token for the gateway (required)
/// - `EMAIL_FROM`: sender address (default: no-reply@taskhive.dev)
/// - `RUST_LOG`: log filter (default: info)

use std::env;

use taskhive_shared::db::pool::DatabaseConfig;
use taskhive_shared::notify::gateway::GatewayConfig;

use crate::service::ServiceConfig;

/// Complete scheduler configuration
#[derive(Debug, Clone)]
pub struct Config {
    pub database: DatabaseConfig,
    pub service: ServiceConfig,
    pub gateway: GatewayConfig,
}

impl Config {
    /// Loads configuration from environment variables
    pub fn from_env() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();

        let database_url = env::var("DATABASE_URL")
            .map_err(|_| anyhow::anyhow!("DATABASE_URL environment variable is required"))?;

        let fire_hour_utc = env::var("SCHEDULER_FIRE_HOUR_UTC")
            .unwrap_or_else(|_| "0".to_string())
            .parse::<u32>()?;
        if fire_hour_utc > 23 {
            anyhow::bail!("SCHEDULER_FIRE_HOUR_UTC must be between 0 and 23");
        }

        let gateway_url = env::var("EMAIL_GATEWAY_URL")
            .map_err(|_| anyhow::anyhow!("EMAIL_GATEWAY_URL environment variable is required"))?;
        let gateway_token = env::var("EMAIL_GATEWAY_TOKEN")
            .map_err(|_| anyhow::anyhow!("EMAIL_GATEWAY_TOKEN environment variable is required"))?;
        let from_address =
            env::var("EMAIL_FROM").unwrap_or_else(|_| "no-reply@taskhive.dev".to_string());

        Ok(Config {
            database: DatabaseConfig {
                url: database_url,
                ..DatabaseConfig::default()
            },
            service: ServiceConfig { fire_hour_utc },
            gateway: GatewayConfig {
                url: gateway_url,
                api_token: gateway_token,
                from_address,
                timeout_seconds: 30,
            },
        })
    }
}
