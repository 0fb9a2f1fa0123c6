/// Configuration for the API server
///
/// Loaded from environment variables into a typed struct; a `.env` file
/// is honored in development.
///
/// # Environment Variables
///
/// - `DATABASE_URL`: PostgreSQL connection string (required)
/// - `API_HOST`: bind host (default: 0.0.0.0)
/// - `API_PORT`: bind port (default: 8080)
/// - `JWT_SECRET`: HS256 signing secret, at least 32 bytes (required)
/// - `CORS_ORIGINS`: comma-separated allowed origins (default: *)
/// - `EMAIL_GATEWAY_URL` / `EMAIL_GATEWAY_TOKEN` / `EMAIL_FROM`:
///   assignment-email gateway; when unset the server logs outgoing mail
///   to a mock channel instead of delivering it
/// - `RUST_LOG`: log filter (default: info)

use std::env;

use taskhive_shared::db::pool::DatabaseConfig;
use taskhive_shared::notify::gateway::GatewayConfig;

/// Complete application configuration
#[derive(Debug, Clone)]
pub struct Config {
    pub api: ApiConfig,
    pub database: DatabaseConfig,
    pub jwt: JwtConfig,

    /// Email gateway; `None` falls back to the mock notifier
    pub email: Option<GatewayConfig>,
}

/// API server configuration
#[derive(Debug, Clone)]
pub struct ApiConfig {
    pub host: String,
    pub port: u16,

    /// Allowed CORS origins; `["*"]` means permissive
    pub cors_origins: Vec<String>,
}

/// JWT configuration
#[derive(Debug, Clone)]
pub struct JwtConfig {
    /// HS256 signing secret; must be at least 32 bytes
    pub secret: String,
}

impl Config {
    /// Loads configuration from environment variables
    ///
    /// # Errors
    ///
    /// Returns an error when a required variable is missing or a value
    /// fails to parse.
    pub fn from_env() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();

        let api_host = env::var("API_HOST").unwrap_or_else(|_| "0.0.0.0".to_string());
        let api_port = env::var("API_PORT")
            .unwrap_or_else(|_| "8080".to_string())
            .parse::<u16>()?;

        let cors_origins = env::var("CORS_ORIGINS")
            .unwrap_or_else(|_| "*".to_string())
            .split(',')
            .map(|origin| origin.trim().to_string())
            .filter(|origin| !origin.is_empty())
            .collect();

        let database_url = env::var("DATABASE_URL")
            .map_err(|_| anyhow::anyhow!("DATABASE_URL environment variable is required"))?;

        let jwt_secret = env::var("JWT_SECRET")
            .map_err(|_| anyhow::anyhow!("JWT_SECRET environment variable is required"))?;
        if jwt_secret.len() < 32 {
            anyhow::bail!("JWT_SECRET must be at least 32 characters long");
        }

        let email = match env::var("EMAIL_GATEWAY_URL") {
            Ok(url) => {
                let api_token = env::var("EMAIL_GATEWAY_TOKEN").map_err(|_| {
                    anyhow::anyhow!("EMAIL_GATEWAY_TOKEN is required when EMAIL_GATEWAY_URL is set")
                })?;
                let from_address =
                    env::var("EMAIL_FROM").unwrap_or_else(|_| "no-reply@taskhive.dev".to_string());
                Some(GatewayConfig {
                    url,
                    api_token,
                    from_address,
                    timeout_seconds: 30,
                })
            }
            Err(_) => None,
        };

        Ok(Config {
            api: ApiConfig {
                host: api_host,
                port: api_port,
                cors_origins,
            },
            database: DatabaseConfig {
                url: database_url,
                ..DatabaseConfig::default()
            },
            jwt: JwtConfig { secret: jwt_secret },
            email,
        })
    }

    /// The server bind address
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.api.host, self.api.port)
    }
}
