/// Authentication endpoints: register, login, refresh
///
/// Registration always creates a `user`-role account; promotion to
/// manager or admin is an admin operation on the users surface. Login and
/// refresh both return a fresh access/refresh token pair.

use axum::{extract::State, Json};
use serde::{Deserialize, Serialize};
use validator::Validate;

use taskhive_shared::auth::jwt::{create_token, validate_refresh_token, Claims, TokenType};
use taskhive_shared::auth::password::{hash_password, validate_password_strength, verify_password};
use taskhive_shared::models::user::{CreateUser, Role, User};

use crate::app::AppState;
use crate::error::{is_unique_violation, ApiError, ApiResult, ValidationErrorDetail};

/// Registration request
#[derive(Debug, Deserialize, Validate)]
pub struct RegisterRequest {
    #[validate(length(min = 1, max = 255, message = "Name is required"))]
    pub name: String,

    #[validate(email(message = "A valid email address is required"))]
    pub email: String,

    pub password: String,
}

/// Login request
#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

/// Refresh request
#[derive(Debug, Deserialize)]
pub struct RefreshRequest {
    pub refresh_token: String,
}

/// Token pair plus the authenticated user
#[derive(Debug, Serialize)]
pub struct AuthResponse {
    pub access_token: String,
    pub refresh_token: String,
    pub user: UserSummary,
}

/// User fields safe to return from auth endpoints
#[derive(Debug, Serialize)]
pub struct UserSummary {
    pub id: uuid::Uuid,
    pub name: String,
    pub email: String,
    pub role: Role,
}

impl From<&User> for UserSummary {
    fn from(user: &User) -> Self {
        UserSummary {
            id: user.id,
            name: user.name.clone(),
            email: user.email.clone(),
            role: user.role,
        }
    }
}

fn issue_tokens(state: &AppState, user: &User) -> ApiResult<AuthResponse> {
    let access = create_token(&Claims::new(user.id, TokenType::Access), state.jwt_secret())?;
    let refresh = create_token(&Claims::new(user.id, TokenType::Refresh), state.jwt_secret())?;

    Ok(AuthResponse {
        access_token: access,
        refresh_token: refresh,
        user: UserSummary::from(user),
    })
}

/// `POST /v1/auth/register`
pub async fn register(
    State(state): State<AppState>,
    Json(request): Json<RegisterRequest>,
) -> ApiResult<(axum::http::StatusCode, Json<AuthResponse>)> {
    request.validate()?;

    if let Err(message) = validate_password_strength(&request.password) {
        return Err(ApiError::ValidationError(vec![ValidationErrorDetail {
            field: "password".to_string(),
            message,
        }]));
    }

    let password_hash = hash_password(&request.password)?;

    let user = User::create(
        &state.db,
        CreateUser {
            name: request.name,
            email: request.email.to_lowercase(),
            password_hash,
        },
    )
    .await
    .map_err(|e| {
        if is_unique_violation(&e) {
            ApiError::Conflict("Email is already registered".to_string())
        } else {
            ApiError::from(e)
        }
    })?;

    tracing::info!(user_id = %user.id, "Registered user");

    let response = issue_tokens(&state, &user)?;
    Ok((axum::http::StatusCode::CREATED, Json(response)))
}

/// `POST /v1/auth/login`
///
/// The same 401 is returned for an unknown email and a wrong password, so
/// the endpoint does not confirm which addresses are registered.
pub async fn login(
    State(state): State<AppState>,
    Json(request): Json<LoginRequest>,
) -> ApiResult<Json<AuthResponse>> {
    let user = User::find_by_email(&state.db, &request.email.to_lowercase())
        .await?
        .ok_or_else(|| ApiError::Unauthorized("Invalid credentials".to_string()))?;

    let valid = verify_password(&request.password, &user.password_hash)?;
    if !valid {
        return Err(ApiError::Unauthorized("Invalid credentials".to_string()));
    }

    tracing::info!(user_id = %user.id, "User logged in");

    Ok(Json(issue_tokens(&state, &user)?))
}

/// `POST /v1/auth/refresh`
pub async fn refresh(
    State(state): State<AppState>,
    Json(request): Json<RefreshRequest>,
) -> ApiResult<Json<AuthResponse>> {
    let claims = validate_refresh_token(&request.refresh_token, state.jwt_secret())?;

    // The subject must still exist: deleting a user invalidates their
    // refresh tokens immediately.
    let user = User::find_by_id(&state.db, claims.sub)
        .await?
        .ok_or_else(|| ApiError::Unauthorized("User not found".to_string()))?;

    Ok(Json(issue_tokens(&state, &user)?))
}
