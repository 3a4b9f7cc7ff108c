//! Beer post handlers.

use axum::extract::{Path, State};
use tracing::{info, instrument};

use super::{JsonBody, ensure_id};
use crate::api::error::{ApiError, ApiResult};
use crate::api::response::ApiResponse;
use crate::api::state::AppState;
use crate::auth::AuthContext;
use crate::beer::{BeerPost, BeerPostRequest, NewBeerPost};
use crate::ids;

/// A post may only reference a brewery that exists.
async fn ensure_brewery_exists(state: &AppState, post: &NewBeerPost) -> ApiResult<()> {
    if let Some(brewery_id) = &post.brewery_id
        && !state.breweries.exists(brewery_id).await?
    {
        return Err(ApiError::bad_request(format!(
            "Brewery {brewery_id} does not exist"
        )));
    }
    Ok(())
}

/// Load a post and check that the caller posted it.
async fn owned_post(state: &AppState, ctx: &AuthContext, id: &str) -> ApiResult<BeerPost> {
    ensure_id(ids::BEER_PREFIX, id, "beer post")?;

    let post = state
        .beers
        .get(id)
        .await?
        .ok_or_else(|| ApiError::not_found(format!("Beer post {id} not found")))?;

    if post.posted_by != ctx.user_id() {
        return Err(ApiError::forbidden(
            "You are not authorized to modify this beer post",
        ));
    }
    Ok(post)
}

#[instrument(skip(state, ctx))]
pub async fn list_beers(
    State(state): State<AppState>,
    ctx: AuthContext,
) -> ApiResult<ApiResponse<Vec<BeerPost>>> {
    let posts = state.beers.list().await?;
    Ok(ApiResponse::ok(format!("{} beer posts found.", posts.len()))
        .payload(posts)
        .auth(&ctx))
}

#[instrument(skip(state, ctx, request), fields(user_id = %ctx.user_id()))]
pub async fn create_beer(
    State(state): State<AppState>,
    ctx: AuthContext,
    JsonBody(request): JsonBody<BeerPostRequest>,
) -> ApiResult<ApiResponse<BeerPost>> {
    let post = NewBeerPost::try_from(request)?;
    ensure_brewery_exists(&state, &post).await?;

    let created = state.beers.create(ctx.user_id(), post).await?;
    info!(beer_id = %created.id, "Created beer post");

    Ok(ApiResponse::created("Beer post created.")
        .payload(created)
        .auth(&ctx))
}

#[instrument(skip(state, ctx))]
pub async fn get_beer(
    State(state): State<AppState>,
    ctx: AuthContext,
    Path(id): Path<String>,
) -> ApiResult<ApiResponse<BeerPost>> {
    ensure_id(ids::BEER_PREFIX, &id, "beer post")?;

    let post = state
        .beers
        .get(&id)
        .await?
        .ok_or_else(|| ApiError::not_found(format!("Beer post {id} not found")))?;

    Ok(ApiResponse::ok("Beer post found.").payload(post).auth(&ctx))
}

#[instrument(skip(state, ctx, request), fields(user_id = %ctx.user_id()))]
pub async fn update_beer(
    State(state): State<AppState>,
    ctx: AuthContext,
    Path(id): Path<String>,
    JsonBody(request): JsonBody<BeerPostRequest>,
) -> ApiResult<ApiResponse<BeerPost>> {
    owned_post(&state, &ctx, &id).await?;

    let post = NewBeerPost::try_from(request)?;
    ensure_brewery_exists(&state, &post).await?;

    let updated = state
        .beers
        .update(&id, post)
        .await?
        .ok_or_else(|| ApiError::not_found(format!("Beer post {id} not found")))?;
    info!(beer_id = %id, "Updated beer post");

    Ok(ApiResponse::ok("Beer post updated.")
        .payload(updated)
        .auth(&ctx))
}

#[instrument(skip(state, ctx), fields(user_id = %ctx.user_id()))]
pub async fn delete_beer(
    State(state): State<AppState>,
    ctx: AuthContext,
    Path(id): Path<String>,
) -> ApiResult<ApiResponse> {
    owned_post(&state, &ctx, &id).await?;

    if !state.beers.delete(&id).await? {
        return Err(ApiError::not_found(format!("Beer post {id} not found")));
    }
    info!(beer_id = %id, "Deleted beer post");

    Ok(ApiResponse::ok(format!("Beer post {id} deleted.")).auth(&ctx))
}
