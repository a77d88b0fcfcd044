//! Handler for `robots.txt`.

use axum::{extract::State, http::header, response::IntoResponse};

use crate::error::AppError;
use crate::state::AppState;

/// Lets crawlers index crawlable short URLs only.
///
/// # Endpoint
///
/// `GET /robots.txt`
///
/// # Response
///
/// ```text
/// User-agent: *
/// Allow: /docs
/// Disallow: /
/// ```
pub async fn robots_handler(State(state): State<AppState>) -> Result<impl IntoResponse, AppError> {
    let body = state.short_url_service.robots_txt().await?;

    Ok(([(header::CONTENT_TYPE, "text/plain; charset=utf-8")], body))
}
