use axum::{
    extract::{Request, State},
    http::StatusCode,
    middleware::Next,
    response::Response,
};

use crate::db::AppState;

/// Require the `x-api-key` header to match the configured admin key.
///
/// Authorization is checked before any license data is touched. When no
/// admin key is configured, every admin request is rejected.
pub async fn admin_auth(
    State(state): State<AppState>,
    request: Request,
    next: Next,
) -> Result<Response, StatusCode> {
    let provided = request
        .headers()
        .get("x-api-key")
        .and_then(|v| v.to_str().ok());

    match (state.admin_api_key.as_deref(), provided) {
        (Some(expected), Some(given)) if given == expected => Ok(next.run(request).await),
        _ => Err(StatusCode::UNAUTHORIZED),
    }
}
