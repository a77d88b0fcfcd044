//! Public handlers: short URL redirects and "not found" fallbacks.

use axum::{
    extract::{ConnectInfo, Path, State},
    http::{HeaderMap, HeaderValue, StatusCode, Uri, header},
    response::{IntoResponse, Response},
};
use serde_json::json;
use std::net::SocketAddr;

use crate::domain::entities::VisitType;
use crate::domain::visit_event::VisitEvent;
use crate::error::AppError;
use crate::state::AppState;
use crate::utils::extract_domain::{client_ip, extract_authority};

/// Request data shared by every public handler.
struct Visitor {
    authority: String,
    remote_addr: String,
    user_agent: Option<String>,
    referer: Option<String>,
}

impl Visitor {
    fn from_request(state: &AppState, headers: &HeaderMap, peer: SocketAddr) -> Self {
        let header_value = |name: header::HeaderName| {
            headers
                .get(name)
                .and_then(|v| v.to_str().ok())
                .map(str::to_string)
        };

        Self {
            authority: extract_authority(headers, state.behind_proxy)
                .unwrap_or_else(|| state.default_domain().to_string()),
            remote_addr: client_ip(headers, peer, state.behind_proxy).to_string(),
            user_agent: header_value(header::USER_AGENT),
            referer: header_value(header::REFERER),
        }
    }

    fn orphan_visit(self, state: &AppState, visit_type: VisitType, uri: &Uri) -> VisitEvent {
        let path = uri.path_and_query().map_or("/", |p| p.as_str());
        let visited_url = format!("{}://{}{}", state.short_url_schema, self.authority, path);

        VisitEvent::orphan(
            visit_type,
            visited_url,
            Some(self.remote_addr),
            self.user_agent.as_deref(),
            self.referer.as_deref(),
        )
    }
}

fn redirect_response(status: StatusCode, location: &str) -> Result<Response, AppError> {
    let location = HeaderValue::from_str(location).map_err(|_| {
        AppError::internal("Stored URL is not a valid header value", json!({}))
    })?;

    Ok((status, [(header::LOCATION, location)]).into_response())
}

/// Records an orphan visit and answers with the configured redirect or a 404.
async fn not_found(
    state: &AppState,
    visitor: Visitor,
    visit_type: VisitType,
    uri: &Uri,
) -> Result<Response, AppError> {
    metrics::counter!("urlkeeper_redirects_total", "type" => visit_type.as_str()).increment(1);

    let target = state
        .redirect_service
        .not_found_redirect(&visitor.authority, visit_type)
        .await?;

    state
        .redirect_service
        .track(visitor.orphan_visit(state, visit_type, uri));

    match target {
        Some(url) => redirect_response(StatusCode::FOUND, &url),
        None => Err(AppError::not_found(
            "Page not found",
            json!({ "path": uri.path() }),
        )),
    }
}

/// Redirects a short code to its long URL.
///
/// # Endpoint
///
/// `GET /{shortCode}`
///
/// # Request Flow
///
/// 1. Read the authority from the `Host` header (default domain if absent)
/// 2. Resolve through the cache, then the database; a code unknown on a
///    custom domain falls back to the default domain
/// 3. Queue the visit for the background worker
/// 4. Answer with the configured redirect status (302 or 301)
///
/// Unknown or disabled short URLs are recorded as `invalid_short_url` orphan
/// visits and follow the domain's invalid short URL redirect, if any.
pub async fn redirect_handler(
    Path(short_code): Path<String>,
    State(state): State<AppState>,
    headers: HeaderMap,
    ConnectInfo(addr): ConnectInfo<SocketAddr>,
    uri: Uri,
) -> Result<Response, AppError> {
    let visitor = Visitor::from_request(&state, &headers, addr);

    let Some(redirect) = state
        .redirect_service
        .resolve(&visitor.authority, &short_code)
        .await?
    else {
        tracing::debug!(short_code = %short_code, authority = %visitor.authority, "Short URL not found");
        return not_found(&state, visitor, VisitType::InvalidShortUrl, &uri).await;
    };

    metrics::counter!("urlkeeper_redirects_total", "type" => VisitType::Valid.as_str())
        .increment(1);

    state.redirect_service.track(VisitEvent::valid(
        redirect.short_url_id,
        Some(visitor.remote_addr),
        visitor.user_agent.as_deref(),
        visitor.referer.as_deref(),
    ));

    redirect_response(state.redirect_status, &redirect.long_url)
}

/// `GET /` - follows the base URL redirect of the domain, if any.
pub async fn base_url_handler(
    State(state): State<AppState>,
    headers: HeaderMap,
    ConnectInfo(addr): ConnectInfo<SocketAddr>,
    uri: Uri,
) -> Result<Response, AppError> {
    let visitor = Visitor::from_request(&state, &headers, addr);
    not_found(&state, visitor, VisitType::BaseUrl, &uri).await
}

/// Fallback for any unmatched path, recorded as a `regular_404` visit.
pub async fn regular_404_handler(
    State(state): State<AppState>,
    headers: HeaderMap,
    ConnectInfo(addr): ConnectInfo<SocketAddr>,
    uri: Uri,
) -> Result<Response, AppError> {
    let visitor = Visitor::from_request(&state, &headers, addr);
    not_found(&state, visitor, VisitType::Regular404, &uri).await
}
