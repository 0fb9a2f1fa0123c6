/// Health check endpoint

use axum::{extract::State, Json};
use serde::Serialize;

use crate::app::AppState;
use crate::error::ApiResult;

/// Health check response
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub version: &'static str,
    pub database: &'static str,
}

/// `GET /health`
///
/// Verifies database connectivity; returns 500 when the pool is broken so
/// orchestrators can restart the process.
pub async fn health_check(State(state): State<AppState>) -> ApiResult<Json<HealthResponse>> {
    taskhive_shared::db::pool::health_check(&state.db).await?;

    Ok(Json(HealthResponse {
        status: "ok",
        version: env!("CARGO_PKG_VERSION"),
        database: "connected",
    }))
}
