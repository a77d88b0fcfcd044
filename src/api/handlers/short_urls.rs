//! Handlers for short URL management endpoints.

use axum::{
    Extension, Json,
    extract::{Path, Query, State},
    http::StatusCode,
};
use validator::Validate;

use crate::api::dto::pagination::PaginatedData;
use crate::api::dto::short_url::{
    CreateShortUrlRequest, DomainQuery, EditShortUrlRequest, EditTagsRequest, EditTagsResponse,
    ShortUrlResponse, ShortUrlsListResponse, ShortUrlsQuery,
};
use crate::domain::entities::{ApiKey, ShortUrl, ShortUrlEdit};
use crate::error::AppError;
use crate::state::AppState;

fn to_response(state: &AppState, short_url: ShortUrl) -> ShortUrlResponse {
    let public_url = state.short_url_for(&short_url.short_code, short_url.domain.as_deref());
    ShortUrlResponse::new(short_url, public_url)
}

/// Lists the short URLs visible to the caller.
///
/// # Endpoint
///
/// `GET /api/short-urls`
///
/// # Query Parameters
///
/// - `page`, `items_per_page` (`-1` for all)
/// - `search_term` - matched against long URL, short code, title and domain
/// - `tags` - comma separated, keeps short URLs having any of them
/// - `order_by` - `long_url|short_code|date_created|visits|title` + `-ASC|-DESC`
/// - `start_date`, `end_date` - RFC 3339 creation date bounds
pub async fn list_short_urls_handler(
    State(state): State<AppState>,
    Extension(api_key): Extension<ApiKey>,
    Query(query): Query<ShortUrlsQuery>,
) -> Result<Json<ShortUrlsListResponse>, AppError> {
    let params = query.into_params()?;

    let page = state
        .short_url_service
        .list_short_urls(params, Some(&api_key))
        .await?;

    Ok(Json(ShortUrlsListResponse {
        short_urls: PaginatedData::from_page(page, |s| to_response(&state, s)),
    }))
}

/// Creates a short URL.
///
/// # Endpoint
///
/// `POST /api/short-urls`
///
/// # Request Body
///
/// ```json
/// {
///   "long_url": "https://example.com/docs",
///   "custom_slug": "docs",
///   "domain": "s.example.com",
///   "tags": ["foo"],
///   "max_visits": 100,
///   "find_if_exists": false
/// }
/// ```
///
/// # Errors
///
/// Returns 400 Bad Request on validation failures and 409 Conflict when the
/// custom slug is taken on that domain.
///
/// Any redirect cached for the new identifier is dropped.
pub async fn create_short_url_handler(
    State(state): State<AppState>,
    Extension(api_key): Extension<ApiKey>,
    Json(payload): Json<CreateShortUrlRequest>,
) -> Result<Json<ShortUrlResponse>, AppError> {
    payload.validate()?;

    let short_url = state
        .short_url_service
        .create_short_url(payload.into_meta(), Some(&api_key))
        .await?;

    state
        .redirect_service
        .invalidate(&short_url.identifier())
        .await;

    Ok(Json(to_response(&state, short_url)))
}

/// `GET /api/short-urls/{shortCode}?domain=`
pub async fn get_short_url_handler(
    State(state): State<AppState>,
    Extension(api_key): Extension<ApiKey>,
    Path(short_code): Path<String>,
    Query(query): Query<DomainQuery>,
) -> Result<Json<ShortUrlResponse>, AppError> {
    let identifier = query.identifier(short_code, state.default_domain());

    let short_url = state
        .short_url_service
        .get_short_url(&identifier, Some(&api_key))
        .await?;

    Ok(Json(to_response(&state, short_url)))
}

/// Partially updates a short URL.
///
/// # Endpoint
///
/// `PATCH /api/short-urls/{shortCode}?domain=`
///
/// The cached redirect is dropped so the change applies immediately.
pub async fn edit_short_url_handler(
    State(state): State<AppState>,
    Extension(api_key): Extension<ApiKey>,
    Path(short_code): Path<String>,
    Query(query): Query<DomainQuery>,
    Json(payload): Json<EditShortUrlRequest>,
) -> Result<Json<ShortUrlResponse>, AppError> {
    payload.validate()?;
    let identifier = query.identifier(short_code, state.default_domain());

    let short_url = state
        .short_url_service
        .update_short_url(&identifier, payload.into_edit()?, Some(&api_key))
        .await?;

    state.redirect_service.invalidate(&identifier).await;

    Ok(Json(to_response(&state, short_url)))
}

/// Replaces the tags of a short URL.
///
/// # Endpoint
///
/// `PUT /api/short-urls/{shortCode}/tags?domain=`
///
/// # Request Body
///
/// ```json
/// { "tags": ["foo", "bar"] }
/// ```
///
/// # Response
///
/// ```json
/// { "tags": ["foo", "bar"] }
/// ```
///
/// # Errors
///
/// Returns 400 Bad Request when `tags` is missing.
/// Returns 404 Not Found when no visible short URL matches.
pub async fn edit_short_url_tags_handler(
    State(state): State<AppState>,
    Extension(api_key): Extension<ApiKey>,
    Path(short_code): Path<String>,
    Query(query): Query<DomainQuery>,
    Json(payload): Json<EditTagsRequest>,
) -> Result<Json<EditTagsResponse>, AppError> {
    let Some(tags) = payload.tags else {
        return Err(AppError::from_fields([(
            "tags",
            "List of tags has to be provided",
        )]));
    };

    let identifier = query.identifier(short_code, state.default_domain());

    let short_url = state
        .short_url_service
        .update_short_url(&identifier, ShortUrlEdit::with_tags(tags), Some(&api_key))
        .await?;

    Ok(Json(EditTagsResponse {
        tags: short_url.tags,
    }))
}

/// Deletes a short URL and its visits.
///
/// # Endpoint
///
/// `DELETE /api/short-urls/{shortCode}?domain=`
///
/// # Response
///
/// `204 No Content`
pub async fn delete_short_url_handler(
    State(state): State<AppState>,
    Extension(api_key): Extension<ApiKey>,
    Path(short_code): Path<String>,
    Query(query): Query<DomainQuery>,
) -> Result<StatusCode, AppError> {
    let identifier = query.identifier(short_code, state.default_domain());

    state
        .short_url_service
        .delete_short_url(&identifier, Some(&api_key))
        .await?;

    state.redirect_service.invalidate(&identifier).await;

    Ok(StatusCode::NO_CONTENT)
}
