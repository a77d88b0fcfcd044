//! Handlers for domain endpoints.

use axum::{Extension, Json, extract::State};
use serde_json::json;
use validator::Validate;

use crate::api::dto::domains::{
    DomainRedirectsRequest, DomainRedirectsResponse, DomainResponse, DomainsResponse,
};
use crate::api::dto::pagination::DataList;
use crate::domain::entities::ApiKey;
use crate::error::AppError;
use crate::state::AppState;

/// Lists the domains visible to the caller.
///
/// # Endpoint
///
/// `GET /api/domains`
///
/// The default domain comes first, except for domain-specific API keys which
/// only see their own domain.
///
/// # Response
///
/// ```json
/// {
///   "domains": {
///     "data": [
///       { "domain": "s.example.com", "is_default": true, "redirects": { ... } },
///       { "domain": "go.example.org", "is_default": false, "redirects": { ... } }
///     ]
///   }
/// }
/// ```
pub async fn list_domains_handler(
    State(state): State<AppState>,
    Extension(api_key): Extension<ApiKey>,
) -> Result<Json<DomainsResponse>, AppError> {
    let items = state.domain_service.list_domains(Some(&api_key)).await?;

    Ok(Json(DomainsResponse {
        domains: DataList {
            data: items.into_iter().map(DomainResponse::from).collect(),
        },
    }))
}

/// Sets the "not found" redirects of a domain, creating the domain if needed.
///
/// # Endpoint
///
/// `PATCH /api/domains/redirects`
///
/// # Request Body
///
/// ```json
/// {
///   "domain": "go.example.org",
///   "base_url_redirect": "https://example.org",
///   "regular_404_redirect": null,
///   "invalid_short_url_redirect": "https://example.org/oops"
/// }
/// ```
///
/// A domain-specific API key always configures its own domain.
///
/// # Errors
///
/// Returns 400 Bad Request for invalid URLs, an invalid authority, or the
/// default domain, whose redirects come from configuration.
pub async fn domain_redirects_handler(
    State(state): State<AppState>,
    Extension(api_key): Extension<ApiKey>,
    Json(payload): Json<DomainRedirectsRequest>,
) -> Result<Json<DomainRedirectsResponse>, AppError> {
    payload.validate()?;

    let authority = api_key
        .domain_authority()
        .unwrap_or(&payload.domain)
        .trim()
        .to_ascii_lowercase();

    if authority == state.default_domain() {
        return Err(AppError::bad_request(
            "Redirects of the default domain are set through configuration",
            json!({ "domain": authority }),
        ));
    }

    let domain = state
        .domain_service
        .configure_not_found_redirects(&authority, payload.redirects())
        .await?;

    tracing::info!(domain = %domain.authority, "Domain redirects updated");

    Ok(Json(DomainRedirectsResponse::from(domain)))
}
