//! Handlers for visit listings.

use axum::{
    Extension, Json,
    extract::{Path, Query, State},
};

use crate::api::dto::pagination::PaginatedData;
use crate::api::dto::visits::{VisitResponse, VisitsQuery, VisitsResponse};
use crate::domain::entities::ApiKey;
use crate::domain::models::ShortUrlIdentifier;
use crate::error::AppError;
use crate::state::AppState;

/// Visits of one short URL, newest first.
///
/// # Endpoint
///
/// `GET /api/short-urls/{shortCode}/visits?domain=&page=&items_per_page=&start_date=&end_date=`
///
/// # Errors
///
/// Returns 404 Not Found when no visible short URL matches.
pub async fn short_url_visits_handler(
    State(state): State<AppState>,
    Extension(api_key): Extension<ApiKey>,
    Path(short_code): Path<String>,
    Query(query): Query<VisitsQuery>,
) -> Result<Json<VisitsResponse>, AppError> {
    let (page, items_per_page) = query.pagination.resolve()?;
    let identifier = ShortUrlIdentifier::from_api_request(
        short_code,
        query.domain.as_deref(),
        state.default_domain(),
    );

    let visits = state
        .visit_service
        .visits_for_short_url(
            &identifier,
            query.date_filter.date_range(),
            page,
            items_per_page,
            Some(&api_key),
        )
        .await?;

    Ok(Json(VisitsResponse {
        visits: PaginatedData::from_page(visits, VisitResponse::from),
    }))
}

/// Visits that did not match any short URL, newest first.
///
/// # Endpoint
///
/// `GET /api/visits/orphan?page=&items_per_page=&start_date=&end_date=`
///
/// # Errors
///
/// Returns 403 Forbidden for API keys with roles.
pub async fn orphan_visits_handler(
    State(state): State<AppState>,
    Extension(api_key): Extension<ApiKey>,
    Query(query): Query<VisitsQuery>,
) -> Result<Json<VisitsResponse>, AppError> {
    let (page, items_per_page) = query.pagination.resolve()?;

    let visits = state
        .visit_service
        .orphan_visits(
            query.date_filter.date_range(),
            page,
            items_per_page,
            Some(&api_key),
        )
        .await?;

    Ok(Json(VisitsResponse {
        visits: PaginatedData::from_page(visits, VisitResponse::from),
    }))
}
