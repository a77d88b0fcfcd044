//! Top-level router configuration combining API and public routes.
//!
//! # Route Structure
//!
//! - `GET  /`            - Base URL redirect (public)
//! - `GET  /{shortCode}` - Short URL redirect (public)
//! - `GET  /robots.txt`  - Crawling rules for crawlable short URLs (public)
//! - `GET  /health`      - Health check: storage, cache, visit queue (public)
//! - `/api/*`            - REST API (API key required)
//! - anything else       - Regular 404 redirect (public)
//!
//! # Middleware
//!
//! - **Tracing** - Structured request/response logging
//! - **Rate limiting** - Per-IP token bucket (configurable for proxy deployments)
//! - **Authentication** - API key as Bearer token
//! - **Path normalization** - Trailing slash handling

use crate::api;
use crate::api::handlers::{
    base_url_handler, health_handler, redirect_handler, regular_404_handler, robots_handler,
};
use crate::api::middleware::{auth, rate_limit, tracing};
use crate::state::AppState;
use axum::routing::get;
use axum::{Router, middleware};
use tower::Layer;
use tower_http::normalize_path::{NormalizePath, NormalizePathLayer};

/// Builds every route and middleware, without path normalization.
///
/// Handlers on public routes read the peer address through
/// [`axum::extract::ConnectInfo`], so the router must be served with
/// `into_make_service_with_connect_info::<SocketAddr>()`.
///
/// # Arguments
///
/// - `state` - shared application state injected into all handlers
/// - `behind_proxy` - when `true`, rate limiting reads client IP from
///   `X-Forwarded-For` / `X-Real-IP` headers instead of the peer socket address;
///   enable only when the service runs behind a trusted reverse proxy
pub fn router(state: AppState, behind_proxy: bool) -> Router {
    let api_router = api::routes::protected_routes()
        .route_layer(middleware::from_fn_with_state(state.clone(), auth::layer))
        .layer(rate_limit::secure_layer(behind_proxy));

    let public_router = Router::new()
        .route("/", get(base_url_handler))
        .route("/robots.txt", get(robots_handler))
        .route("/{short_code}", get(redirect_handler))
        .fallback(regular_404_handler)
        .layer(rate_limit::layer(behind_proxy));

    Router::new()
        .route("/health", get(health_handler))
        .nest("/api", api_router)
        .merge(public_router)
        .with_state(state)
        .layer(tracing::layer())
}

/// Constructs the application router with trailing slashes trimmed.
pub fn app_router(state: AppState, behind_proxy: bool) -> NormalizePath<Router> {
    NormalizePathLayer::trim_trailing_slash().layer(router(state, behind_proxy))
}
