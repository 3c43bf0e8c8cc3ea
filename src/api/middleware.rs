//! The auth gate: bearer-token verification for every protected route.

use axum::{
    body::Body,
    extract::State,
    http::{header, Request},
    middleware::Next,
    response::Response,
};
use uuid::Uuid;

use crate::error::ApiError;
use crate::AppState;

/// The authenticated caller, inserted into request extensions by
/// [`require_auth`] and read back by every protected handler.
#[derive(Debug, Clone, Copy)]
pub struct CurrentUser(pub Uuid);

/// Verify the `Authorization: Bearer` header and attach the resolved user id.
///
/// Runs before any service: missing, malformed, invalid, or expired
/// credentials short-circuit with the same generic 401.
pub async fn require_auth(
    State(state): State<AppState>,
    mut request: Request<Body>,
    next: Next,
) -> Result<Response, ApiError> {
    let auth_header = request
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|h| h.to_str().ok());

    let token = match auth_header {
        Some(header) if header.starts_with("Bearer ") => &header[7..],
        Some(_) => {
            tracing::warn!("invalid Authorization header format");
            return Err(unauthorized());
        }
        None => {
            tracing::warn!("missing Authorization header");
            return Err(unauthorized());
        }
    };

    let user_id = state.auth.verify_token(token)?;
    request.extensions_mut().insert(CurrentUser(user_id));
    Ok(next.run(request).await)
}

fn unauthorized() -> ApiError {
    ApiError::Unauthorized("Not authorized to access this route".to_string())
}
