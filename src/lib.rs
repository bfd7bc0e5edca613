pub mod auth;
pub mod config;
pub mod database;
pub mod error;
pub mod filter;
pub mod handlers;
pub mod ingest;
pub mod middleware;
pub mod services;
pub mod state;
pub mod types;

use axum::{
    extract::DefaultBodyLimit,
    http::{header, HeaderValue, Method},
    routing::{get, post},
    Router,
};
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::config::AppConfig;
use crate::handlers::protected::videos::bulk_download::{SKIPPED_COUNT_HEADER, SKIPPED_LANS_HEADER};

pub use state::AppState;

/// Full application router
pub fn app(state: AppState) -> Router {
    let cors = cors_layer(&state.config);

    Router::new()
        // Public
        .route("/", get(handlers::public::system::root))
        .route("/health", get(handlers::public::system::health))
        .merge(auth_public_routes())
        // Session required
        .merge(protected_routes(state.clone()))
        // Global middleware
        .layer(axum::middleware::from_fn_with_state(
            state.config.clone(),
            middleware::error_trace_middleware,
        ))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

fn auth_public_routes() -> Router<AppState> {
    use handlers::public::auth;

    Router::new()
        .route("/api/auth/login", get(auth::login))
        .route("/api/auth/callback", get(auth::callback))
        .route("/api/auth/logout", get(auth::logout))
}

fn protected_routes(state: AppState) -> Router<AppState> {
    use handlers::protected::{auth, videos};

    let upload_limit = DefaultBodyLimit::max(state.config.server.max_upload_bytes);

    Router::new()
        .route("/api/auth/profile", get(auth::profile))
        .route("/api/videos", get(videos::list))
        .route("/api/videos/search", get(videos::search))
        .route("/api/videos/download/:lan", get(videos::download))
        .route("/api/videos/bulk-request", post(videos::bulk_request).layer(upload_limit))
        .route("/api/videos/bulk-download/:request_id", get(videos::bulk_download))
        .route_layer(axum::middleware::from_fn_with_state(
            state,
            middleware::session_auth_middleware,
        ))
}

/// Cookies need credentialed CORS, which rules out a wildcard origin
fn cors_layer(config: &AppConfig) -> CorsLayer {
    let origins: Vec<HeaderValue> = config
        .security
        .cors_origins
        .iter()
        .filter_map(|origin| match origin.parse() {
            Ok(value) => Some(value),
            Err(_) => {
                tracing::warn!("Ignoring invalid CORS origin {:?}", origin);
                None
            }
        })
        .collect();

    CorsLayer::new()
        .allow_origin(origins)
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([header::CONTENT_TYPE])
        .expose_headers([header::CONTENT_DISPOSITION, SKIPPED_LANS_HEADER, SKIPPED_COUNT_HEADER])
        .allow_credentials(true)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use async_trait::async_trait;
    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use tower::ServiceExt; // for oneshot

    use crate::auth::{AuthError, IdentityProvider, Principal};
    use crate::database::MemoryRecordingRepository;

    struct NoIdentity;

    #[async_trait]
    impl IdentityProvider for NoIdentity {
        fn authorization_url(&self, _state: &str) -> Result<String, AuthError> {
            Err(AuthError::NotConfigured("OIDC_ISSUER"))
        }

        async fn exchange_code(&self, _code: &str) -> Result<Principal, AuthError> {
            Err(AuthError::NotConfigured("OIDC_ISSUER"))
        }
    }

    fn test_app() -> Router {
        let state = AppState::new(
            AppConfig::development(),
            Arc::new(MemoryRecordingRepository::default()),
            Arc::new(NoIdentity),
        );
        app(state)
    }

    #[tokio::test]
    async fn preflight_allows_frontend_with_credentials() {
        let request = Request::builder()
            .method(Method::OPTIONS)
            .uri("/api/videos")
            .header(header::ORIGIN, "http://localhost:5173")
            .header(header::ACCESS_CONTROL_REQUEST_METHOD, "GET")
            .body(Body::empty())
            .unwrap();

        let response = test_app().oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let headers = response.headers();
        assert_eq!(headers[header::ACCESS_CONTROL_ALLOW_ORIGIN], "http://localhost:5173");
        assert_eq!(headers[header::ACCESS_CONTROL_ALLOW_CREDENTIALS], "true");
    }

    #[tokio::test]
    async fn login_without_provider_is_a_server_error() {
        let request = Request::builder().uri("/api/auth/login").body(Body::empty()).unwrap();
        let response = test_app().oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[tokio::test]
    async fn unknown_routes_are_not_found() {
        let request = Request::builder().uri("/api/nope").body(Body::empty()).unwrap();
        let response = test_app().oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }
}
