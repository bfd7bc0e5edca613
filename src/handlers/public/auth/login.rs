use axum::{
    extract::{Query, State},
    http::{header, HeaderMap},
    response::{AppendHeaders, IntoResponse, Redirect, Response},
};
use serde::Deserialize;

use crate::auth::{self, AuthError, STATE_COOKIE, STATE_TTL_MINUTES, SESSION_COOKIE};
use crate::error::ApiError;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct CallbackQuery {
    pub code: Option<String>,
    pub state: Option<String>,
    pub error: Option<String>,
}

/// GET /api/auth/login - redirect to the identity provider
///
/// Sets a short-lived signed cookie holding the `state` value so the
/// callback can tell it started here.
pub async fn login(State(state): State<AppState>) -> Result<Response, ApiError> {
    let (login_state, token) = auth::issue_login_state(state.session_secret())?;
    let url = state.identity.authorization_url(&login_state)?;
    let cookie = auth::set_cookie(
        STATE_COOKIE,
        &token,
        STATE_TTL_MINUTES * 60,
        state.config.security.secure_cookies,
    );

    Ok((AppendHeaders([(header::SET_COOKIE, cookie)]), Redirect::to(&url)).into_response())
}

/// GET /api/auth/callback - finish the login
///
/// Success redirects to the frontend with a session cookie; any failure
/// redirects to `<frontend>/login?error=auth_failed`.
pub async fn callback(
    State(state): State<AppState>,
    headers: HeaderMap,
    Query(query): Query<CallbackQuery>,
) -> Response {
    let secure = state.config.security.secure_cookies;
    let frontend = state.config.server.frontend_url.as_str();
    let clear_state = auth::clear_cookie(STATE_COOKIE, secure);

    match complete_login(&state, &headers, query).await {
        Ok(session) => {
            let max_age = (state.config.security.session_ttl_hours * 3600) as i64;
            let cookie = auth::set_cookie(SESSION_COOKIE, &session, max_age, secure);
            (
                AppendHeaders([(header::SET_COOKIE, cookie), (header::SET_COOKIE, clear_state)]),
                Redirect::to(frontend),
            )
                .into_response()
        }
        Err(e) => {
            tracing::warn!("Login failed: {}", e);
            (
                AppendHeaders([(header::SET_COOKIE, clear_state)]),
                Redirect::to(&format!("{}/login?error=auth_failed", frontend)),
            )
                .into_response()
        }
    }
}

async fn complete_login(state: &AppState, headers: &HeaderMap, query: CallbackQuery) -> Result<String, AuthError> {
    if let Some(error) = query.error {
        return Err(AuthError::Provider(error));
    }
    let returned_state = query.state.ok_or(AuthError::StateMismatch)?;
    let cookie = auth::read_cookie(headers, STATE_COOKIE).ok_or(AuthError::StateMismatch)?;
    auth::verify_login_state(&cookie, state.session_secret(), &returned_state)?;

    let code = query
        .code
        .ok_or_else(|| AuthError::Provider("callback without authorization code".to_string()))?;
    let principal = state.identity.exchange_code(&code).await?;

    tracing::info!("User {} ({}) signed in", principal.name, principal.id);
    auth::issue_session(&principal, state.session_secret(), state.config.security.session_ttl_hours)
}
