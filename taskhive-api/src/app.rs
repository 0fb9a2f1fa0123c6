/// Application state and router builder
///
/// # Architecture
///
/// ```text
/// /
/// ├── /health                        # Health check (public)
/// └── /v1/                           # API v1
///     ├── /auth/                     # Public
///     │   ├── POST /register
///     │   ├── POST /login
///     │   └── POST /refresh
///     ├── /tasks/                    # Authenticated
///     │   ├── GET    /               # Role-scoped list
///     │   ├── POST   /               # Create (admin/manager)
///     │   ├── GET    /:id
///     │   ├── PUT    /:id
///     │   ├── PATCH  /:id/status
///     │   └── DELETE /:id            # (admin/manager)
///     └── /users/                    # Authenticated
///         ├── GET    /               # Admin: all; manager: assignees
///         ├── GET    /available
///         ├── GET    /managed
///         ├── PATCH  /:id/role       # (admin)
///         ├── PATCH  /:id/manager    # (admin)
///         ├── DELETE /:id/manager    # (admin)
///         └── DELETE /:id            # (admin)
/// ```
///
/// The auth layer validates the bearer token and resolves it to a live
/// user row before any handler runs; role and ownership decisions then
/// happen in `taskhive_shared::policy`.

use axum::{
    extract::Request,
    http::{header, HeaderValue, Method},
    middleware::Next,
    response::Response,
    routing::{delete, get, patch, post, put},
    Router,
};
use sqlx::PgPool;
use std::sync::Arc;
use taskhive_shared::auth::{jwt, middleware::CurrentUser};
use taskhive_shared::models::user::User;
use taskhive_shared::notify::Notifier;
use tower_http::{
    cors::CorsLayer,
    trace::{DefaultMakeSpan, DefaultOnResponse, TraceLayer},
};
use tracing::Level;

use crate::config::Config;
use crate::error::ApiError;

/// Shared application state, cloned per request
#[derive(Clone)]
pub struct AppState {
    /// Database connection pool
    pub db: PgPool,

    /// Application configuration
    pub config: Arc<Config>,

    /// Notification channel for assignment emails
    pub notifier: Arc<dyn Notifier>,
}

impl AppState {
    pub fn new(db: PgPool, config: Config, notifier: Arc<dyn Notifier>) -> Self {
        Self {
            db,
            config: Arc::new(config),
            notifier,
        }
    }

    /// JWT secret for token operations
    pub fn jwt_secret(&self) -> &str {
        &self.config.jwt.secret
    }
}

/// Builds the complete Axum router with all routes and middleware
pub fn build_router(state: AppState) -> Router {
    use crate::routes;

    let health_routes = Router::new().route("/health", get(routes::health::health_check));

    // Public: no auth required.
    let auth_routes = Router::new()
        .route("/register", post(routes::auth::register))
        .route("/login", post(routes::auth::login))
        .route("/refresh", post(routes::auth::refresh));

    let task_routes = Router::new()
        .route("/", get(routes::tasks::list_tasks))
        .route("/", post(routes::tasks::create_task))
        .route("/:id", get(routes::tasks::get_task))
        .route("/:id", put(routes::tasks::update_task))
        .route("/:id/status", patch(routes::tasks::set_task_status))
        .route("/:id", delete(routes::tasks::delete_task))
        .layer(axum::middleware::from_fn_with_state(
            state.clone(),
            auth_layer,
        ));

    let user_routes = Router::new()
        .route("/", get(routes::users::list_users))
        .route("/available", get(routes::users::list_available_users))
        .route("/managed", get(routes::users::list_managed_users))
        .route("/:id/role", patch(routes::users::change_role))
        .route("/:id/manager", patch(routes::users::assign_manager))
        .route("/:id/manager", delete(routes::users::clear_manager))
        .route("/:id", delete(routes::users::delete_user))
        .layer(axum::middleware::from_fn_with_state(
            state.clone(),
            auth_layer,
        ));

    let v1_routes = Router::new()
        .nest("/auth", auth_routes)
        .nest("/tasks", task_routes)
        .nest("/users", user_routes);

    let cors = if state.config.api.cors_origins.contains(&"*".to_string()) {
        CorsLayer::permissive()
    } else {
        let origins: Vec<HeaderValue> = state
            .config
            .api
            .cors_origins
            .iter()
            .filter_map(|origin| origin.parse().ok())
            .collect();

        CorsLayer::new()
            .allow_origin(origins)
            .allow_methods([
                Method::GET,
                Method::POST,
                Method::PUT,
                Method::PATCH,
                Method::DELETE,
                Method::OPTIONS,
            ])
            .allow_headers([header::AUTHORIZATION, header::CONTENT_TYPE])
    };

    Router::new()
        .merge(health_routes)
        .nest("/v1", v1_routes)
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
                .on_response(DefaultOnResponse::new().level(Level::INFO)),
        )
        .layer(cors)
        .with_state(state)
}

/// Authentication middleware
///
/// Validates the bearer access token, then resolves the subject to a
/// live user row. A deleted user's token is therefore dead immediately,
/// and the role the policy engine sees is always the stored one, never a
/// stale claim.
async fn auth_layer(
    state: axum::extract::State<AppState>,
    mut req: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let auth_header = req
        .headers()
        .get(axum::http::header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .ok_or_else(|| ApiError::Unauthorized("Authentication required".to_string()))?;

    let token = auth_header
        .strip_prefix("Bearer ")
        .ok_or_else(|| ApiError::BadRequest("Expected Bearer token".to_string()))?;

    let claims = jwt::validate_access_token(token, state.jwt_secret())?;

    let user = User::find_by_id(&state.db, claims.sub)
        .await?
        .ok_or_else(|| ApiError::Unauthorized("User not found".to_string()))?;

    req.extensions_mut().insert(CurrentUser::from(&user));

    Ok(next.run(req).await)
}
