//! Health, teapot and token check.

use axum::{Json, extract::State};
use serde::Serialize;
use tracing::instrument;

use crate::api::error::{ApiError, ApiResult};
use crate::api::response::ApiResponse;
use crate::api::state::AppState;
use crate::auth::AuthContext;

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub version: &'static str,
}

pub async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        version: env!("CARGO_PKG_VERSION"),
    })
}

pub async fn teapot() -> ApiError {
    ApiError::Teapot
}

pub async fn not_found() -> ApiError {
    ApiError::not_found("Route not found")
}

/// Confirm the presented tokens identify a live user.
#[instrument(skip(state, ctx), fields(user_id = %ctx.user_id()))]
pub async fn verify_token(
    State(state): State<AppState>,
    ctx: AuthContext,
) -> ApiResult<ApiResponse> {
    let user = state
        .users
        .get_user(ctx.user_id())
        .await?
        .ok_or_else(|| ApiError::Unauthorized("Token subject no longer exists".to_string()))?;

    Ok(ApiResponse::ok(format!("Successfully verified {}.", user.username)).auth(&ctx))
}
