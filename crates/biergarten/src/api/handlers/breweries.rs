//! Brewery handlers.

use axum::{
    extract::{Path, Query, State},
    response::{IntoResponse, Response},
};
use serde::Deserialize;
use tracing::{info, instrument};

use super::{JsonBody, ensure_id};
use crate::api::error::{ApiError, ApiResult};
use crate::api::response::ApiResponse;
use crate::api::state::AppState;
use crate::auth::AuthContext;
use crate::brewery::{Brewery, BreweryDetails, BreweryRequest, NewBrewery};
use crate::ids;
use crate::user::PublicUser;

#[derive(Debug, Default, Deserialize)]
pub struct BreweryQuery {
    pub populate: Option<String>,
}

impl BreweryQuery {
    fn populate(&self) -> bool {
        self.populate.as_deref().is_some_and(is_truthy)
    }
}

fn is_truthy(value: &str) -> bool {
    matches!(
        value.trim().to_ascii_lowercase().as_str(),
        "true" | "1" | "yes"
    )
}

#[instrument(skip(state, ctx))]
pub async fn list_breweries(
    State(state): State<AppState>,
    ctx: AuthContext,
) -> ApiResult<ApiResponse<Vec<Brewery>>> {
    let breweries = state.breweries.list().await?;
    Ok(ApiResponse::ok(format!("{} breweries found.", breweries.len()))
        .payload(breweries)
        .auth(&ctx))
}

#[instrument(skip(state, ctx, request), fields(user_id = %ctx.user_id()))]
pub async fn create_brewery(
    State(state): State<AppState>,
    ctx: AuthContext,
    JsonBody(request): JsonBody<BreweryRequest>,
) -> ApiResult<ApiResponse<Brewery>> {
    let brewery = NewBrewery::try_from(request)?;
    let created = state.breweries.create(ctx.user_id(), brewery).await?;
    info!(brewery_id = %created.id, "Created brewery");

    Ok(ApiResponse::created("Brewery created.")
        .payload(created)
        .auth(&ctx))
}

/// `?populate=true` adds the brewery's beers and the user who posted it.
#[instrument(skip(state, ctx))]
pub async fn get_brewery(
    State(state): State<AppState>,
    ctx: AuthContext,
    Path(id): Path<String>,
    Query(query): Query<BreweryQuery>,
) -> ApiResult<Response> {
    ensure_id(ids::BREWERY_PREFIX, &id, "brewery")?;

    let brewery = state
        .breweries
        .get(&id)
        .await?
        .ok_or_else(|| ApiError::not_found(format!("Brewery {id} not found")))?;

    if !query.populate() {
        return Ok(ApiResponse::ok("Brewery found.")
            .payload(brewery)
            .auth(&ctx)
            .into_response());
    }

    let beers = state.beers.list_by_brewery(&brewery.id).await?;
    let poster = state
        .users
        .get_user(&brewery.posted_by)
        .await?
        .map(PublicUser::from);

    Ok(ApiResponse::ok("Brewery found.")
        .payload(BreweryDetails {
            brewery,
            beers,
            poster,
        })
        .auth(&ctx)
        .into_response())
}
