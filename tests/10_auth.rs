mod common;

use anyhow::{Context, Result};
use reqwest::header::{COOKIE, LOCATION, SET_COOKIE};
use reqwest::StatusCode;
use serde_json::Value;

/// `name=value` part of the Set-Cookie header for `name`
fn cookie_pair(res: &reqwest::Response, name: &str) -> Option<String> {
    res.headers()
        .get_all(SET_COOKIE)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .find(|v| v.starts_with(&format!("{}=", name)))
        .and_then(|v| v.split(';').next())
        .map(str::to_string)
}

#[tokio::test]
async fn root_and_health_are_public() -> Result<()> {
    let server = common::spawn_server().await?;

    let res = server.client.get(server.url("/")).send().await?;
    assert_eq!(res.status(), StatusCode::OK);
    assert_eq!(res.text().await?, "V-KYC Recordings Backend API is running!");

    let res = server.client.get(server.url("/health")).send().await?;
    assert_eq!(res.status(), StatusCode::OK);
    let body = res.json::<Value>().await?;
    assert_eq!(body["status"], "ok");
    assert_eq!(body["database"], "ok");
    Ok(())
}

#[tokio::test]
async fn session_routes_require_a_session() -> Result<()> {
    let server = common::spawn_server().await?;

    for path in [
        "/api/auth/profile",
        "/api/videos",
        "/api/videos/search?lan=LAN1001",
        "/api/videos/download/LAN1001",
        "/api/videos/bulk-download/00000000-0000-0000-0000-000000000000",
    ] {
        let res = server.client.get(server.url(path)).send().await?;
        assert_eq!(res.status(), StatusCode::UNAUTHORIZED, "{}", path);
        let body = res.json::<Value>().await?;
        assert_eq!(body["error"], true);
        assert_eq!(body["code"], "UNAUTHORIZED");
        assert_eq!(body["message"], "Authentication required.");
    }

    let res = server
        .client
        .post(server.url("/api/videos/bulk-request"))
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
    Ok(())
}

#[tokio::test]
async fn forged_session_is_rejected() -> Result<()> {
    let server = common::spawn_server().await?;

    let res = server
        .client
        .get(server.url("/api/auth/profile"))
        .header(COOKIE, "vkyc_session=eyJhbGciOiJIUzI1NiJ9.e30.bogus")
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
    Ok(())
}

#[tokio::test]
async fn profile_returns_principal() -> Result<()> {
    let server = common::spawn_server().await?;

    let res = server.get("/api/auth/profile").send().await?;
    assert_eq!(res.status(), StatusCode::OK);
    let body = res.json::<Value>().await?;
    assert_eq!(body["id"], "emp-1001");
    assert_eq!(body["name"], "Test Reviewer");
    assert_eq!(body["email"], "reviewer@example.com");
    Ok(())
}

#[tokio::test]
async fn logout_clears_cookie() -> Result<()> {
    let server = common::spawn_server().await?;

    let res = server.get("/api/auth/logout").send().await?;
    assert_eq!(res.status(), StatusCode::OK);
    let set_cookie = res
        .headers()
        .get(SET_COOKIE)
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default()
        .to_string();
    assert!(set_cookie.starts_with("vkyc_session=;"), "{}", set_cookie);
    assert!(set_cookie.contains("Max-Age=0"));

    let body = res.json::<Value>().await?;
    assert_eq!(body["message"], "Logged out successfully");
    Ok(())
}

#[tokio::test]
async fn login_round_trip_establishes_session() -> Result<()> {
    let server = common::spawn_server().await?;

    // Start: redirect to the provider with a state cookie
    let res = server.client.get(server.url("/api/auth/login")).send().await?;
    assert_eq!(res.status(), StatusCode::SEE_OTHER);
    let location = res.headers()[LOCATION].to_str()?.to_string();
    assert!(location.starts_with(common::IDP_AUTHORIZE_URL), "{}", location);
    let state_cookie = cookie_pair(&res, "vkyc_oauth_state").context("no state cookie")?;

    let state = url::Url::parse(&location)?
        .query_pairs()
        .find(|(k, _)| k == "state")
        .map(|(_, v)| v.into_owned())
        .context("no state param")?;

    // Finish: provider sends the browser back with code + state
    let res = server
        .client
        .get(server.url(&format!("/api/auth/callback?code={}&state={}", common::GOOD_CODE, state)))
        .header(COOKIE, &state_cookie)
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::SEE_OTHER);
    assert_eq!(res.headers()[LOCATION], common::FRONTEND_URL);
    let session = cookie_pair(&res, "vkyc_session").context("no session cookie")?;

    let res = server
        .client
        .get(server.url("/api/auth/profile"))
        .header(COOKIE, &session)
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::OK);
    assert_eq!(res.json::<Value>().await?["id"], "emp-1001");
    Ok(())
}

#[tokio::test]
async fn callback_failures_redirect_to_login_error() -> Result<()> {
    let server = common::spawn_server().await?;
    let failed = format!("{}/login?error=auth_failed", common::FRONTEND_URL);

    let res = server.client.get(server.url("/api/auth/login")).send().await?;
    let state_cookie = cookie_pair(&res, "vkyc_oauth_state").context("no state cookie")?;

    // State that was never issued to this browser
    let res = server
        .client
        .get(server.url("/api/auth/callback?code=good-code&state=forged"))
        .header(COOKIE, &state_cookie)
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::SEE_OTHER);
    assert_eq!(res.headers()[LOCATION].to_str()?, failed);
    assert!(cookie_pair(&res, "vkyc_session").is_none());

    // No state cookie at all
    let res = server
        .client
        .get(server.url("/api/auth/callback?code=good-code&state=anything"))
        .send()
        .await?;
    assert_eq!(res.headers()[LOCATION].to_str()?, failed);

    // Provider reported an error
    let res = server
        .client
        .get(server.url("/api/auth/callback?error=access_denied"))
        .send()
        .await?;
    assert_eq!(res.headers()[LOCATION].to_str()?, failed);
    Ok(())
}

#[tokio::test]
async fn session_cookie_is_dead_after_logout() -> Result<()> {
    let server = common::spawn_server().await?;
    let session = server.session_cookie();

    let res = server
        .client
        .get(server.url("/api/auth/profile"))
        .header(COOKIE, &session)
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::OK);

    let res = server
        .client
        .get(server.url("/api/auth/logout"))
        .header(COOKIE, &session)
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::OK);

    // Replaying the old cookie must not work
    let res = server
        .client
        .get(server.url("/api/auth/profile"))
        .header(COOKIE, &session)
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
    Ok(())
}
