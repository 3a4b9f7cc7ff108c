//! Registration, login, confirmation and profiles.

use axum::extract::{Path, State};
use chrono::Utc;
use serde::Serialize;
use tracing::{info, instrument};

use super::{JsonBody, ensure_id};
use crate::api::error::{ApiError, ApiResult};
use crate::api::response::ApiResponse;
use crate::api::state::AppState;
use crate::auth::AuthContext;
use crate::ids;
use crate::user::{LoginRequest, PublicUser, RegisterRequest, User, UserInfo};

/// User info plus a fresh token pair.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionPayload {
    pub user: UserInfo,
    pub access_token: String,
    pub refresh_token: String,
}

fn session_payload(state: &AppState, user: User) -> ApiResult<SessionPayload> {
    let tokens = state.auth.issue_session(&user.id)?;
    Ok(SessionPayload {
        user: user.into(),
        access_token: tokens.access.token,
        refresh_token: tokens.refresh.token,
    })
}

#[instrument(skip(state, request))]
pub async fn register(
    State(state): State<AppState>,
    JsonBody(request): JsonBody<RegisterRequest>,
) -> ApiResult<ApiResponse<SessionPayload>> {
    let user = state.users.register(request).await?;

    // Confirmation mail is not sent; the link goes to the log instead.
    let confirmation = state.auth.issue_confirmation(&user.id)?;
    info!(
        user_id = %user.id,
        "Confirmation link: {}/users/confirm/{}/{}",
        state.public_url,
        user.id,
        confirmation.token
    );

    let payload = session_payload(&state, user)?;
    Ok(ApiResponse::created("User registered.").payload(payload))
}

#[instrument(skip(state, request))]
pub async fn login(
    State(state): State<AppState>,
    JsonBody(request): JsonBody<LoginRequest>,
) -> ApiResult<ApiResponse<SessionPayload>> {
    let user = state.users.authenticate(request).await?;
    info!(user_id = %user.id, "User logged in");

    let payload = session_payload(&state, user)?;
    Ok(ApiResponse::ok("Logged in.").payload(payload))
}

#[instrument(skip(state, token))]
pub async fn confirm_account(
    State(state): State<AppState>,
    Path((user_id, token)): Path<(String, String)>,
) -> ApiResult<ApiResponse<UserInfo>> {
    if !ids::is_well_formed(ids::USER_PREFIX, &user_id) {
        return Err(ApiError::bad_request("Invalid link"));
    }

    let claims = state
        .auth
        .check_confirmation_at(&token, Utc::now().timestamp())
        .ok_or_else(|| ApiError::bad_request("Invalid link"))?;

    let user = state.users.confirm(&user_id, claims.subject()).await?;
    Ok(ApiResponse::ok("Account confirmed.").payload(user.into()))
}

#[instrument(skip(state, ctx))]
pub async fn get_user(
    State(state): State<AppState>,
    ctx: AuthContext,
    Path(id): Path<String>,
) -> ApiResult<ApiResponse<PublicUser>> {
    ensure_id(ids::USER_PREFIX, &id, "user")?;

    let user = state
        .users
        .get_user(&id)
        .await?
        .ok_or_else(|| ApiError::not_found(format!("User {id} not found")))?;

    Ok(ApiResponse::ok("User found.")
        .payload(PublicUser::from(user))
        .auth(&ctx))
}
