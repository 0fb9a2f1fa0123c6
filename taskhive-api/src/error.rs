/// Error handling for the API server
///
/// One unified error type that maps onto HTTP responses. Handlers return
/// `ApiResult<T>` and convert library errors with `?`.
///
/// # Taxonomy
///
/// - `Unauthorized` (401): missing/invalid credential, resolved user gone
/// - `Forbidden` (403): a policy denial; no partial effect
/// - `NotFound` (404): task/user/manager does not resolve
/// - `Conflict` (409): duplicate email
/// - `ValidationError` (422): every offending field, collected
/// - `BadRequest` (400): malformed request shape
/// - `InternalError` (500): store failures, surfaced opaquely
///
/// Dispatch failures never appear here: notification errors are logged at
/// their call sites and swallowed.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use std::fmt;

use taskhive_shared::auth::jwt::JwtError;
use taskhive_shared::auth::password::PasswordError;
use taskhive_shared::policy::DenyReason;

/// API result type alias
pub type ApiResult<T> = Result<T, ApiError>;

/// Unified API error type
#[derive(Debug)]
pub enum ApiError {
    /// Bad request (400)
    BadRequest(String),

    /// Unauthorized (401)
    Unauthorized(String),

    /// Forbidden (403)
    Forbidden(String),

    /// Not found (404)
    NotFound(String),

    /// Conflict (409), e.g. duplicate email
    Conflict(String),

    /// Unprocessable entity (422), all offending fields together
    ValidationError(Vec<ValidationErrorDetail>),

    /// Internal server error (500), detail never leaks to the caller
    InternalError(String),
}

/// One field that failed validation
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ValidationErrorDetail {
    pub field: String,
    pub message: String,
}

/// Error response body
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    /// Machine-readable code ("forbidden", "not_found", ...)
    pub error: String,

    /// Human-readable message
    pub message: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<Vec<ValidationErrorDetail>>,
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ApiError::BadRequest(msg) => write!(f, "Bad request: {}", msg),
            ApiError::Unauthorized(msg) => write!(f, "Unauthorized: {}", msg),
            ApiError::Forbidden(msg) => write!(f, "Forbidden: {}", msg),
            ApiError::NotFound(msg) => write!(f, "Not found: {}", msg),
            ApiError::Conflict(msg) => write!(f, "Conflict: {}", msg),
            ApiError::ValidationError(errors) => {
                write!(f, "Validation failed: {} field(s)", errors.len())
            }
            ApiError::InternalError(msg) => write!(f, "Internal error: {}", msg),
        }
    }
}

impl std::error::Error for ApiError {}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, error_code, message, details) = match self {
            ApiError::BadRequest(msg) => (StatusCode::BAD_REQUEST, "bad_request", msg, None),
            ApiError::Unauthorized(msg) => (StatusCode::UNAUTHORIZED, "unauthorized", msg, None),
            ApiError::Forbidden(msg) => (StatusCode::FORBIDDEN, "forbidden", msg, None),
            ApiError::NotFound(msg) => (StatusCode::NOT_FOUND, "not_found", msg, None),
            ApiError::Conflict(msg) => (StatusCode::CONFLICT, "conflict", msg, None),
            ApiError::ValidationError(errors) => (
                StatusCode::UNPROCESSABLE_ENTITY,
                "validation_error",
                "Validation failed".to_string(),
                Some(errors),
            ),
            ApiError::InternalError(msg) => {
                // Log the detail, return an opaque message.
                tracing::error!(error = %msg, "Internal server error");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "internal_error",
                    "Server error".to_string(),
                    None,
                )
            }
        };

        let body = Json(ErrorResponse {
            error: error_code.to_string(),
            message,
            details,
        });

        (status, body).into_response()
    }
}

impl From<sqlx::Error> for ApiError {
    fn from(e: sqlx::Error) -> Self {
        ApiError::InternalError(e.to_string())
    }
}

impl From<JwtError> for ApiError {
    fn from(e: JwtError) -> Self {
        ApiError::Unauthorized(e.to_string())
    }
}

impl From<PasswordError> for ApiError {
    fn from(e: PasswordError) -> Self {
        ApiError::InternalError(e.to_string())
    }
}

impl From<DenyReason> for ApiError {
    fn from(reason: DenyReason) -> Self {
        match reason {
            // The missing manager is a resolution failure, not a role
            // problem, so it surfaces as 404.
            DenyReason::ManagerNotFound => ApiError::NotFound(reason.to_string()),
            DenyReason::Forbidden | DenyReason::NotOwner => {
                ApiError::Forbidden(reason.to_string())
            }
        }
    }
}

impl From<validator::ValidationErrors> for ApiError {
    fn from(e: validator::ValidationErrors) -> Self {
        let errors: Vec<ValidationErrorDetail> = e
            .field_errors()
            .iter()
            .flat_map(|(field, errors)| {
                errors.iter().map(move |error| ValidationErrorDetail {
                    field: field.to_string(),
                    message: error
                        .message
                        .as_ref()
                        .map(|m| m.to_string())
                        .unwrap_or_else(|| "Validation failed".to_string()),
                })
            })
            .collect();

        ApiError::ValidationError(errors)
    }
}

/// Whether a sqlx error is a unique-constraint violation
///
/// Used to turn a duplicate email insert into a 409 instead of a 500.
pub fn is_unique_violation(e: &sqlx::Error) -> bool {
    matches!(
        e,
        sqlx::Error::Database(db) if db.code().as_deref() == Some("23505")
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_deny_reason_mapping() {
        assert!(matches!(
            ApiError::from(DenyReason::Forbidden),
            ApiError::Forbidden(_)
        ));
        assert!(matches!(
            ApiError::from(DenyReason::NotOwner),
            ApiError::Forbidden(_)
        ));
        assert!(matches!(
            ApiError::from(DenyReason::ManagerNotFound),
            ApiError::NotFound(_)
        ));
    }

    #[test]
    fn test_validation_errors_collect_every_field() {
        use validator::Validate;

        #[derive(Validate)]
        struct Probe {
            #[validate(length(min = 1, message = "Title is required"))]
            title: String,
            #[validate(length(min = 1, message = "Description is required"))]
            description: String,
        }

        let probe = Probe {
            title: String::new(),
            description: String::new(),
        };

        let err = ApiError::from(probe.validate().unwrap_err());
        match err {
            ApiError::ValidationError(details) => {
                assert_eq!(details.len(), 2);
                let fields: Vec<_> = details.iter().map(|d| d.field.as_str()).collect();
                assert!(fields.contains(&"title"));
                assert!(fields.contains(&"description"));
            }
            other => panic!("expected ValidationError, got {other:?}"),
        }
    }

    #[test]
    fn test_display_does_not_panic() {
        let err = ApiError::ValidationError(vec![ValidationErrorDetail {
            field: "title".to_string(),
            message: "Title is required".to_string(),
        }]);
        assert!(format!("{err}").contains("1 field"));
    }
}
