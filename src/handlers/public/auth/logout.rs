use axum::{
    extract::State,
    http::{header, HeaderMap},
    response::{AppendHeaders, IntoResponse},
};

use crate::auth::{self, SESSION_COOKIE};
use crate::middleware::ApiResponse;
use crate::state::AppState;
use crate::types::MessageResponse;

/// GET /api/auth/logout - end the session and drop its cookie
///
/// A still-valid session token is revoked so a copied cookie stops working.
/// Always succeeds, signed in or not.
pub async fn logout(State(state): State<AppState>, headers: HeaderMap) -> impl IntoResponse {
    if let Some(token) = auth::read_cookie(&headers, SESSION_COOKIE) {
        match auth::verify_session(&token, state.session_secret()) {
            Ok(claims) => state.sessions.revoke(&claims).await,
            Err(e) => tracing::debug!("Logout with unusable session cookie: {}", e),
        }
    }

    let cookie = auth::clear_cookie(SESSION_COOKIE, state.config.security.secure_cookies);
    (
        AppendHeaders([(header::SET_COOKIE, cookie)]),
        ApiResponse::success(MessageResponse::new("Logged out successfully")),
    )
}
