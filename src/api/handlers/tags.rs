//! Handler for the tag listing.

use axum::{Extension, Json, extract::State};

use crate::api::dto::pagination::DataList;
use crate::api::dto::tags::TagsResponse;
use crate::domain::entities::ApiKey;
use crate::error::AppError;
use crate::state::AppState;

/// Tags used by the short URLs visible to the caller, sorted alphabetically.
///
/// # Endpoint
///
/// `GET /api/tags`
///
/// # Response
///
/// ```json
/// { "tags": { "data": ["bar", "foo"] } }
/// ```
pub async fn list_tags_handler(
    State(state): State<AppState>,
    Extension(api_key): Extension<ApiKey>,
) -> Result<Json<TagsResponse>, AppError> {
    let tags = state.short_url_service.list_tags(Some(&api_key)).await?;

    Ok(Json(TagsResponse {
        tags: DataList { data: tags },
    }))
}
