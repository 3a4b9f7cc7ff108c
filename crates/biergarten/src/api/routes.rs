//! API route definitions.

use axum::http::{HeaderName, HeaderValue, Method, header};
use axum::{
    Router, middleware,
    routing::{any, get, post},
};
use tower::ServiceBuilder;
use tower_http::cors::{AllowOrigin, Any, CorsLayer};
use tower_http::trace::{DefaultMakeSpan, DefaultOnRequest, DefaultOnResponse, TraceLayer};
use tracing::Level;

use super::handlers;
use super::server::ServerConfig;
use super::state::AppState;
use crate::auth::{ACCESS_TOKEN_HEADER, REFRESH_TOKEN_HEADER, auth_gate};

/// Create the application router.
pub fn create_router(state: AppState, server: &ServerConfig) -> Router {
    let cors = build_cors_layer(&server.allowed_origins);

    let trace_layer = TraceLayer::new_for_http()
        .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
        .on_request(DefaultOnRequest::new().level(Level::DEBUG))
        .on_response(DefaultOnResponse::new().level(Level::INFO));

    let auth_state = state.auth.clone();

    // Protected routes (require authentication)
    let protected_routes = Router::new()
        .route("/verifytoken", get(handlers::verify_token))
        .route("/users/{id}", get(handlers::get_user))
        .route(
            "/beers",
            get(handlers::list_beers).post(handlers::create_beer),
        )
        .route(
            "/beers/{id}",
            get(handlers::get_beer)
                .put(handlers::update_beer)
                .delete(handlers::delete_beer),
        )
        .route(
            "/breweries",
            get(handlers::list_breweries).post(handlers::create_brewery),
        )
        .route("/breweries/{id}", get(handlers::get_brewery))
        .layer(middleware::from_fn_with_state(auth_state, auth_gate))
        .with_state(state.clone());

    // Public routes (no authentication)
    let public_routes = Router::new()
        .route("/health", get(handlers::health))
        .route("/teapot", any(handlers::teapot))
        .route("/users/register", post(handlers::register))
        .route("/users/login", post(handlers::login))
        .route(
            "/users/confirm/{user_id}/{token}",
            get(handlers::confirm_account),
        )
        .with_state(state);

    Router::new()
        .merge(public_routes)
        .merge(protected_routes)
        .fallback(handlers::not_found)
        .layer(ServiceBuilder::new().layer(trace_layer).layer(cors))
}

fn build_cors_layer(allowed_origins: &[String]) -> CorsLayer {
    let methods = [
        Method::GET,
        Method::POST,
        Method::PUT,
        Method::DELETE,
        Method::OPTIONS,
    ];

    let access = HeaderName::from_static(ACCESS_TOKEN_HEADER);
    let refresh = HeaderName::from_static(REFRESH_TOKEN_HEADER);
    let headers = [
        header::AUTHORIZATION,
        header::CONTENT_TYPE,
        header::ACCEPT,
        header::ORIGIN,
        access.clone(),
        refresh,
    ];

    let cors = CorsLayer::new()
        .allow_methods(methods)
        .allow_headers(headers)
        .expose_headers([access]);

    if allowed_origins.is_empty() {
        tracing::warn!("CORS: No origins configured, allowing any origin");
        return cors.allow_origin(Any);
    }

    let origins: Vec<HeaderValue> = allowed_origins
        .iter()
        .filter_map(|origin| {
            origin.parse::<HeaderValue>().ok().or_else(|| {
                tracing::warn!("CORS: Invalid origin in config: {}", origin);
                None
            })
        })
        .collect();

    cors.allow_origin(AllowOrigin::list(origins))
}
