//! Admin key middleware for the trip endpoints

use axum::{
    extract::{Request, State},
    middleware::Next,
    response::Response,
};
use catchlog_common::api::{validate_admin_key, ADMIN_KEY_HEADER};
use tracing::warn;

use crate::{ApiError, AppState};

/// Reject requests whose `x-admin-api-key` does not match the configured token
///
/// With no token configured every request passes through.
pub async fn admin_auth(
    State(state): State<AppState>,
    request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let Some(expected) = state.admin_token.as_deref() else {
        return Ok(next.run(request).await);
    };

    let provided = request
        .headers()
        .get(ADMIN_KEY_HEADER)
        .and_then(|value| value.to_str().ok());

    if let Err(e) = validate_admin_key(provided, expected) {
        warn!(
            method = %request.method(),
            path = %request.uri().path(),
            reason = %e,
            "Rejected admin request"
        );
        return Err(ApiError::Forbidden("Unauthorized access".to_string()));
    }

    Ok(next.run(request).await)
}
