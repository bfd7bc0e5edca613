pub mod oidc;
pub mod revocation;

use axum::http::{header, HeaderMap, HeaderValue};
use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

pub use oidc::{IdentityProvider, OidcProvider};
pub use revocation::RevokedSessions;

pub const SESSION_COOKIE: &str = "vkyc_session";
pub const STATE_COOKIE: &str = "vkyc_oauth_state";

/// Lifetime of the login round trip through the identity provider
pub const STATE_TTL_MINUTES: i64 = 10;

const SESSION_AUDIENCE: &str = "vkyc-session";
const STATE_AUDIENCE: &str = "vkyc-login";

/// Authenticated user, as reported by the identity provider
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Principal {
    pub id: String,
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct SessionClaims {
    pub sub: String,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    pub aud: String,
    pub exp: i64,
    pub iat: i64,
    /// Identifies this session for logout
    pub jti: Uuid,
}

impl SessionClaims {
    pub fn new(principal: &Principal, ttl_hours: u64) -> Self {
        let now = Utc::now();
        Self {
            sub: principal.id.clone(),
            name: principal.name.clone(),
            email: principal.email.clone(),
            aud: SESSION_AUDIENCE.to_string(),
            exp: (now + Duration::hours(ttl_hours as i64)).timestamp(),
            iat: now.timestamp(),
            jti: Uuid::new_v4(),
        }
    }
}

impl From<SessionClaims> for Principal {
    fn from(claims: SessionClaims) -> Self {
        Self {
            id: claims.sub,
            name: claims.name,
            email: claims.email,
        }
    }
}

/// Binds the `state` sent to the provider to this browser
#[derive(Debug, Serialize, Deserialize)]
pub struct LoginStateClaims {
    pub state: String,
    pub aud: String,
    pub exp: i64,
}

#[derive(Debug, Error)]
pub enum AuthError {
    #[error("no session cookie")]
    MissingSession,
    #[error("invalid session: {0}")]
    InvalidSession(#[source] jsonwebtoken::errors::Error),
    #[error("session was logged out")]
    Revoked,
    #[error("login state missing or does not match")]
    StateMismatch,
    #[error("token signing failed: {0}")]
    Signing(#[source] jsonwebtoken::errors::Error),
    #[error("{0} is not configured")]
    NotConfigured(&'static str),
    #[error("identity provider error: {0}")]
    Provider(String),
    #[error("identity provider request failed: {0}")]
    Http(#[from] reqwest::Error),
}

fn keys(secret: &str) -> Result<(EncodingKey, DecodingKey), AuthError> {
    if secret.is_empty() {
        return Err(AuthError::NotConfigured("SESSION_SECRET"));
    }
    Ok((
        EncodingKey::from_secret(secret.as_bytes()),
        DecodingKey::from_secret(secret.as_bytes()),
    ))
}

fn validation(audience: &str) -> Validation {
    let mut validation = Validation::default();
    validation.set_audience(&[audience]);
    validation
}

pub fn issue_session(principal: &Principal, secret: &str, ttl_hours: u64) -> Result<String, AuthError> {
    let (encoding_key, _) = keys(secret)?;
    encode(&Header::default(), &SessionClaims::new(principal, ttl_hours), &encoding_key).map_err(AuthError::Signing)
}

pub fn verify_session(token: &str, secret: &str) -> Result<SessionClaims, AuthError> {
    let (_, decoding_key) = keys(secret)?;
    let data = decode::<SessionClaims>(token, &decoding_key, &validation(SESSION_AUDIENCE))
        .map_err(AuthError::InvalidSession)?;
    Ok(data.claims)
}

/// Fresh random state plus the signed cookie value that remembers it
pub fn issue_login_state(secret: &str) -> Result<(String, String), AuthError> {
    let (encoding_key, _) = keys(secret)?;
    let state = Uuid::new_v4().simple().to_string();
    let claims = LoginStateClaims {
        state: state.clone(),
        aud: STATE_AUDIENCE.to_string(),
        exp: (Utc::now() + Duration::minutes(STATE_TTL_MINUTES)).timestamp(),
    };
    let token = encode(&Header::default(), &claims, &encoding_key).map_err(AuthError::Signing)?;
    Ok((state, token))
}

pub fn verify_login_state(token: &str, secret: &str, returned_state: &str) -> Result<(), AuthError> {
    let (_, decoding_key) = keys(secret)?;
    let data = decode::<LoginStateClaims>(token, &decoding_key, &validation(STATE_AUDIENCE))
        .map_err(|_| AuthError::StateMismatch)?;
    if data.claims.state != returned_state {
        return Err(AuthError::StateMismatch);
    }
    Ok(())
}

/// Value of a cookie from the `Cookie` request header(s)
pub fn read_cookie(headers: &HeaderMap, name: &str) -> Option<String> {
    headers
        .get_all(header::COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .flat_map(|value| value.split(';'))
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(key, _)| *key == name)
        .map(|(_, value)| value.trim().to_string())
        .filter(|value| !value.is_empty())
}

pub fn set_cookie(name: &str, value: &str, max_age_secs: i64, secure: bool) -> HeaderValue {
    let mut cookie = format!("{}={}; Path=/; HttpOnly; SameSite=Lax; Max-Age={}", name, value, max_age_secs);
    if secure {
        cookie.push_str("; Secure");
    }
    // JWTs and uuids are always valid header text
    HeaderValue::from_str(&cookie).unwrap_or_else(|_| clear_cookie(name, secure))
}

pub fn clear_cookie(name: &str, secure: bool) -> HeaderValue {
    let cookie = format!(
        "{}=; Path=/; HttpOnly; SameSite=Lax; Max-Age=0{}",
        name,
        if secure { "; Secure" } else { "" }
    );
    HeaderValue::from_str(&cookie).unwrap_or_else(|_| HeaderValue::from_static("invalid=; Max-Age=0"))
}
