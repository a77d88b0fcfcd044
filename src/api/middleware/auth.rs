//! API key authentication middleware.

use axum::{
    extract::{FromRequestParts, Request, State},
    middleware::Next,
    response::Response,
};
use axum_auth::AuthBearer;

use crate::{error::AppError, state::AppState};

/// Authenticates requests using an API key sent as a Bearer token.
///
/// # Header Format
///
/// ```text
/// Authorization: Bearer <api-key>
/// ```
///
/// On success the resolved [`crate::domain::entities::ApiKey`] is stored in
/// the request extensions, where handlers read it with `Extension<ApiKey>`.
///
/// # Errors
///
/// Returns `401 Unauthorized` if:
/// - Authorization header is missing
/// - The key is unknown, disabled or expired
///
/// # Example
///
/// ```rust,ignore
/// let protected = Router::new()
///     .route("/api/tags", get(list_tags_handler))
///     .route_layer(middleware::from_fn_with_state(state.clone(), auth::layer));
/// ```
pub async fn layer(
    State(st): State<AppState>,
    req: Request,
    next: Next,
) -> Result<Response, AppError> {
    let (mut parts, body) = req.into_parts();

    let AuthBearer(token) = AuthBearer::from_request_parts(&mut parts, &())
        .await
        .map_err(|_| {
            AppError::unauthorized(
                "Unauthorized",
                serde_json::json!({"reason": "Authorization header is missing or invalid"}),
            )
        })?;

    let api_key = st.api_key_service.check(&token).await?;
    tracing::debug!(api_key = %api_key.name, "API key authenticated");

    let mut req = Request::from_parts(parts, body);
    req.extensions_mut().insert(api_key);

    Ok(next.run(req).await)
}
