//! OpenID Connect authorization-code flow against `{issuer}/authorize`,
//! `{issuer}/token` and `{issuer}/userinfo`.

use async_trait::async_trait;
use serde::Deserialize;
use url::Url;

use super::{AuthError, Principal};
use crate::config::OidcConfig;

#[async_trait]
pub trait IdentityProvider: Send + Sync {
    /// Where to send the browser to start a login
    fn authorization_url(&self, state: &str) -> Result<String, AuthError>;

    /// Trade an authorization code for the user it belongs to
    async fn exchange_code(&self, code: &str) -> Result<Principal, AuthError>;
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
}

#[derive(Debug, Deserialize)]
struct UserInfo {
    sub: String,
    name: Option<String>,
    preferred_username: Option<String>,
    email: Option<String>,
}

impl From<UserInfo> for Principal {
    fn from(info: UserInfo) -> Self {
        let name = info
            .name
            .or(info.preferred_username)
            .unwrap_or_else(|| info.sub.clone());
        Self {
            id: info.sub,
            name,
            email: info.email,
        }
    }
}

pub struct OidcProvider {
    config: OidcConfig,
    http: reqwest::Client,
}

impl OidcProvider {
    pub fn new(config: OidcConfig) -> Self {
        Self {
            config,
            http: reqwest::Client::new(),
        }
    }

    fn endpoint(&self, path: &str) -> Result<Url, AuthError> {
        if !self.config.is_configured() {
            return Err(AuthError::NotConfigured("OIDC_ISSUER"));
        }
        Url::parse(&format!("{}/{}", self.config.issuer.trim_end_matches('/'), path))
            .map_err(|e| AuthError::Provider(format!("invalid issuer URL: {}", e)))
    }
}

#[async_trait]
impl IdentityProvider for OidcProvider {
    fn authorization_url(&self, state: &str) -> Result<String, AuthError> {
        let mut url = self.endpoint("authorize")?;
        url.query_pairs_mut()
            .append_pair("response_type", "code")
            .append_pair("client_id", &self.config.client_id)
            .append_pair("redirect_uri", &self.config.redirect_uri)
            .append_pair("scope", &self.config.scope)
            .append_pair("state", state);
        Ok(url.into())
    }

    async fn exchange_code(&self, code: &str) -> Result<Principal, AuthError> {
        let token_url = self.endpoint("token")?;
        let response = self
            .http
            .post(token_url)
            .form(&[
                ("grant_type", "authorization_code"),
                ("code", code),
                ("redirect_uri", self.config.redirect_uri.as_str()),
                ("client_id", self.config.client_id.as_str()),
                ("client_secret", self.config.client_secret.as_str()),
            ])
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(AuthError::Provider(format!("token endpoint returned {}", response.status())));
        }
        let token: TokenResponse = response.json().await?;

        let response = self
            .http
            .get(self.endpoint("userinfo")?)
            .bearer_auth(&token.access_token)
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(AuthError::Provider(format!("userinfo endpoint returned {}", response.status())));
        }
        let info: UserInfo = response.json().await?;

        tracing::info!("User {} ({}) authenticated", info.name.as_deref().unwrap_or("-"), info.sub);
        Ok(info.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{
        http::{HeaderMap, StatusCode},
        routing::{get, post},
        Form, Json, Router,
    };
    use serde_json::{json, Value};
    use std::collections::HashMap;

    fn config(issuer: &str) -> OidcConfig {
        OidcConfig {
            issuer: issuer.to_string(),
            client_id: "vkyc-portal".to_string(),
            client_secret: "shh".to_string(),
            redirect_uri: "http://localhost:3000/api/auth/callback".to_string(),
            scope: "openid profile email".to_string(),
        }
    }

    async fn spawn_idp() -> String {
        async fn token(Form(form): Form<HashMap<String, String>>) -> Result<Json<Value>, StatusCode> {
            match form.get("code").map(String::as_str) {
                Some("good-code") if form.get("client_secret").map(String::as_str) == Some("shh") => {
                    Ok(Json(json!({ "access_token": "at-1", "token_type": "Bearer" })))
                }
                _ => Err(StatusCode::BAD_REQUEST),
            }
        }
        async fn userinfo(headers: HeaderMap) -> Result<Json<Value>, StatusCode> {
            match headers.get("authorization").and_then(|v| v.to_str().ok()) {
                Some("Bearer at-1") => Ok(Json(json!({
                    "sub": "emp-7",
                    "preferred_username": "ravi",
                    "email": "ravi@example.com"
                }))),
                _ => Err(StatusCode::UNAUTHORIZED),
            }
        }

        let app = Router::new()
            .route("/token", post(token))
            .route("/userinfo", get(userinfo));
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });
        format!("http://{}", addr)
    }

    #[test]
    fn authorization_url_carries_client_and_state() {
        let provider = OidcProvider::new(config("https://idp.example.com/"));
        let url = Url::parse(&provider.authorization_url("st4te").unwrap()).unwrap();
        assert_eq!(url.path(), "/authorize");

        let params: HashMap<_, _> = url.query_pairs().into_owned().collect();
        assert_eq!(params["response_type"], "code");
        assert_eq!(params["client_id"], "vkyc-portal");
        assert_eq!(params["scope"], "openid profile email");
        assert_eq!(params["state"], "st4te");
    }

    #[test]
    fn unconfigured_provider_refuses() {
        let provider = OidcProvider::new(config(""));
        assert!(matches!(provider.authorization_url("s"), Err(AuthError::NotConfigured(_))));
    }

    #[tokio::test]
    async fn exchanges_code_for_principal() {
        let provider = OidcProvider::new(config(&spawn_idp().await));
        let principal = provider.exchange_code("good-code").await.unwrap();
        assert_eq!(principal.id, "emp-7");
        assert_eq!(principal.name, "ravi");
        assert_eq!(principal.email.as_deref(), Some("ravi@example.com"));
    }

    #[tokio::test]
    async fn rejected_code_is_a_provider_error() {
        let provider = OidcProvider::new(config(&spawn_idp().await));
        let err = provider.exchange_code("bad-code").await.unwrap_err();
        assert!(matches!(err, AuthError::Provider(_)));
    }
}
