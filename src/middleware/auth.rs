use axum::{
    extract::{Request, State},
    http::HeaderMap,
    middleware::Next,
    response::Response,
};

use crate::auth::{self, AuthError, Principal, RevokedSessions, SESSION_COOKIE};
use crate::error::ApiError;
use crate::state::AppState;

/// Session gate for `/api/videos/*` and `/api/auth/profile`. A valid
/// session cookie puts the [`Principal`] into request extensions; anything
/// else is a 401.
pub async fn session_auth_middleware(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let principal = authenticate(request.headers(), state.session_secret(), &state.sessions)
        .await
        .map_err(|e| {
            tracing::debug!("Rejected {} {}: {}", request.method(), request.uri().path(), e);
            ApiError::unauthorized("Authentication required.")
        })?;

    request.extensions_mut().insert(principal);
    Ok(next.run(request).await)
}

/// Resolve the session cookie to the signed-in user
pub async fn authenticate(
    headers: &HeaderMap,
    secret: &str,
    sessions: &RevokedSessions,
) -> Result<Principal, AuthError> {
    let token = auth::read_cookie(headers, SESSION_COOKIE).ok_or(AuthError::MissingSession)?;
    let claims = auth::verify_session(&token, secret)?;
    if sessions.is_revoked(claims.jti).await {
        return Err(AuthError::Revoked);
    }
    Ok(claims.into())
}
