#![allow(dead_code)]

use std::path::Path;
use std::sync::Arc;

use anyhow::{Context, Result};
use async_trait::async_trait;
use chrono::{TimeZone, Utc};
use reqwest::header::COOKIE;
use tempfile::TempDir;

use vkyc_recordings_api::auth::{self, AuthError, IdentityProvider, Principal, SESSION_COOKIE};
use vkyc_recordings_api::config::AppConfig;
use vkyc_recordings_api::database::{MemoryRecordingRepository, Recording};
use vkyc_recordings_api::{app, AppState};

pub const FRONTEND_URL: &str = "http://frontend.test";
pub const IDP_AUTHORIZE_URL: &str = "https://idp.test/authorize";
pub const GOOD_CODE: &str = "good-code";

/// Identity provider that accepts exactly one authorization code
pub struct FakeIdentity;

#[async_trait]
impl IdentityProvider for FakeIdentity {
    fn authorization_url(&self, state: &str) -> Result<String, AuthError> {
        Ok(format!("{}?client_id=vkyc&state={}", IDP_AUTHORIZE_URL, state))
    }

    async fn exchange_code(&self, code: &str) -> Result<Principal, AuthError> {
        if code == GOOD_CODE {
            Ok(principal())
        } else {
            Err(AuthError::Provider("invalid_grant".to_string()))
        }
    }
}

pub fn principal() -> Principal {
    Principal {
        id: "emp-1001".to_string(),
        name: "Test Reviewer".to_string(),
        email: Some("reviewer@example.com".to_string()),
    }
}

pub struct TestServer {
    pub base_url: String,
    pub state: AppState,
    /// Owns the media files; dropped with the server
    pub media: TempDir,
    /// Client that does not follow redirects
    pub client: reqwest::Client,
}

impl TestServer {
    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    pub fn session_cookie(&self) -> String {
        let token = auth::issue_session(&principal(), &self.state.config.security.session_secret, 1)
            .expect("session signing");
        format!("{}={}", SESSION_COOKIE, token)
    }

    /// GET with a valid session
    pub fn get(&self, path: &str) -> reqwest::RequestBuilder {
        self.client.get(self.url(path)).header(COOKIE, self.session_cookie())
    }

    /// POST with a valid session
    pub fn post(&self, path: &str) -> reqwest::RequestBuilder {
        self.client.post(self.url(path)).header(COOKIE, self.session_cookie())
    }

    /// Upload `content` as the bulk request file
    pub async fn submit_bulk(&self, file_name: &str, content: &str) -> Result<reqwest::Response> {
        let part = reqwest::multipart::Part::bytes(content.as_bytes().to_vec())
            .file_name(file_name.to_string())
            .mime_str("text/csv")?;
        let form = reqwest::multipart::Form::new().part("file", part);
        Ok(self.post("/api/videos/bulk-request").multipart(form).send().await?)
    }
}

pub fn test_config() -> AppConfig {
    let mut config = AppConfig::development();
    config.server.frontend_url = FRONTEND_URL.to_string();
    config.security.cors_origins = vec![FRONTEND_URL.to_string()];
    config
}

pub async fn spawn_server() -> Result<TestServer> {
    spawn_server_with(test_config()).await
}

/// Serve the real router over a memory repository seeded with `seed`
pub async fn spawn_server_with(config: AppConfig) -> Result<TestServer> {
    let media = tempfile::tempdir().context("failed to create media dir")?;
    let repository = Arc::new(MemoryRecordingRepository::new(seed(media.path())?));
    let state = AppState::new(config, repository, Arc::new(FakeIdentity));

    // Pick an unused port for isolation
    let port = portpicker::pick_unused_port().context("failed to pick free port")?;
    let listener = tokio::net::TcpListener::bind(("127.0.0.1", port))
        .await
        .context("failed to bind test listener")?;
    let router = app(state.clone());
    tokio::spawn(async move {
        let _ = axum::serve(listener, router).await;
    });

    let client = reqwest::Client::builder()
        .redirect(reqwest::redirect::Policy::none())
        .build()?;

    Ok(TestServer {
        base_url: format!("http://127.0.0.1:{}", port),
        state,
        media,
        client,
    })
}

/// Media contents keyed by LAN, for comparing downloads
pub fn media_bytes(lan: &str) -> Vec<u8> {
    format!("fake video payload for {}", lan).repeat(64).into_bytes()
}

/// Six recordings: five APPROVED (two of them without a usable file) and one
/// REJECTED.
///
/// | id | lan     | status   | date       | duration | file              |
/// |----|---------|----------|------------|----------|-------------------|
/// | 1  | LAN1001 | APPROVED | 2024-01-15 | 300      | LAN1001.mp4       |
/// | 2  | LAN1002 | APPROVED | 2024-02-20 | -        | LAN1002.webm      |
/// | 3  | LAN1003 | REJECTED | 2024-02-21 | 120      | LAN1003.mp4       |
/// | 4  | LAN2001 | APPROVED | 2024-03-05 | 60       | (missing on disk) |
/// | 5  | LAN2002 | APPROVED | 2024-03-06 | 90       | (no path)         |
/// | 6  | LAN3001 | APPROVED | 2024-03-10 | 200      | LAN3001.mp4       |
fn seed(dir: &Path) -> Result<Vec<Recording>> {
    let write = |lan: &str, file: &str| -> Result<Option<String>> {
        let path = dir.join(file);
        std::fs::write(&path, media_bytes(lan))?;
        Ok(Some(path.to_string_lossy().into_owned()))
    };

    let row = |id: i64, lan: &str, status: &str, (m, d): (u32, u32), duration: Option<i32>, path: Option<String>| {
        Recording {
            id,
            lan: lan.to_string(),
            vkyc_date: Utc.with_ymd_and_hms(2024, m, d, 11, 0, 0).unwrap(),
            status: status.to_string(),
            call_duration: duration,
            nfs_file_path: path,
        }
    };

    let missing = dir.join("LAN2001.mp4").to_string_lossy().into_owned();

    Ok(vec![
        row(1, "LAN1001", "APPROVED", (1, 15), Some(300), write("LAN1001", "LAN1001.mp4")?),
        row(2, "LAN1002", "APPROVED", (2, 20), None, write("LAN1002", "LAN1002.webm")?),
        row(3, "LAN1003", "REJECTED", (2, 21), Some(120), write("LAN1003", "LAN1003.mp4")?),
        row(4, "LAN2001", "APPROVED", (3, 5), Some(60), Some(missing)),
        row(5, "LAN2002", "APPROVED", (3, 6), Some(90), None),
        row(6, "LAN3001", "APPROVED", (3, 10), Some(200), write("LAN3001", "LAN3001.mp4")?),
    ])
}
