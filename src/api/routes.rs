//! API route configuration.
//!
//! All API endpoints require an API key sent as a Bearer token, checked by
//! [`crate::api::middleware::auth`].

use crate::api::handlers::{
    create_short_url_handler, delete_short_url_handler, domain_redirects_handler,
    edit_short_url_handler, edit_short_url_tags_handler, get_short_url_handler,
    list_domains_handler, list_short_urls_handler, list_tags_handler, orphan_visits_handler,
    short_url_visits_handler,
};
use crate::state::AppState;
use axum::{
    Router,
    routing::{get, patch, put},
};

/// All API routes, protected by API key authentication.
///
/// # Endpoints
///
/// - `GET    /short-urls`                     - List short URLs (paginated, filtered)
/// - `POST   /short-urls`                     - Create a short URL
/// - `GET    /short-urls/{shortCode}`         - Get one short URL
/// - `PATCH  /short-urls/{shortCode}`         - Partially update a short URL
/// - `DELETE /short-urls/{shortCode}`         - Delete a short URL and its visits
/// - `PUT    /short-urls/{shortCode}/tags`    - Replace the tags of a short URL
/// - `GET    /short-urls/{shortCode}/visits`  - Visits of a short URL
/// - `GET    /visits/orphan`                  - Visits not matching any short URL
/// - `GET    /tags`                           - Tags in use
/// - `GET    /domains`                        - Default and custom domains
/// - `PATCH  /domains/redirects`              - Set a domain's "not found" redirects
pub fn protected_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/short-urls",
            get(list_short_urls_handler).post(create_short_url_handler),
        )
        .route(
            "/short-urls/{short_code}",
            get(get_short_url_handler)
                .patch(edit_short_url_handler)
                .delete(delete_short_url_handler),
        )
        .route(
            "/short-urls/{short_code}/tags",
            put(edit_short_url_tags_handler),
        )
        .route(
            "/short-urls/{short_code}/visits",
            get(short_url_visits_handler),
        )
        .route("/visits/orphan", get(orphan_visits_handler))
        .route("/tags", get(list_tags_handler))
        .route("/domains", get(list_domains_handler))
        .route("/domains/redirects", patch(domain_redirects_handler))
}
