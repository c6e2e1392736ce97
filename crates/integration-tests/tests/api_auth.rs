//! Integration tests for session issuance.
//!
//! These tests require:
//! - A migrated `PostgreSQL` database
//! - The API server running (cargo run -p calorie-quest-api)
//!
//! Run with: cargo test -p calorie-quest-integration-tests -- --ignored

use calorie_quest_integration_tests::{api_base_url, verify_with_server_secret};
use reqwest::{Client, StatusCode};
use serde_json::{Value, json};

async fn post(client: &Client, path: &str, body: Option<Value>) -> (StatusCode, Value) {
    let mut request = client.post(format!("{}{path}", api_base_url()));
    if let Some(body) = body {
        request = request.json(&body);
    }
    let resp = request.send().await.expect("Failed to send request");
    let status = resp.status();
    let body = resp.json().await.expect("Response was not JSON");
    (status, body)
}

// ============================================================================
// Guest Sessions
// ============================================================================

#[tokio::test]
#[ignore = "Requires running API server and migrated database"]
async fn test_guest_session() {
    let client = Client::new();

    let (status, body) = post(&client, "/auth/guest", None).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["token_type"], "bearer");
    assert_eq!(body["user"]["is_guest"], true);
    assert_eq!(body["user"]["display_name"], "Guest User");
    assert!(body["user"]["email"].is_null());

    let token = body["access_token"].as_str().expect("access_token missing");
    assert_eq!(token.split('.').count(), 3, "expected a compact JWS");

    if let Some(verified) = verify_with_server_secret(token) {
        let claims = verified.expect("token did not verify");
        assert_eq!(claims.subject, body["user"]["user_id"].as_str().unwrap_or_default());
        assert!(claims.is_guest);
    }
}

#[tokio::test]
#[ignore = "Requires running API server and migrated database"]
async fn test_guest_sessions_are_distinct() {
    let client = Client::new();

    let (_, first) = post(&client, "/auth/guest", None).await;
    let (_, second) = post(&client, "/auth/guest", None).await;

    assert_ne!(first["user"]["user_id"], second["user"]["user_id"]);
}

// ============================================================================
// Google Sessions
// ============================================================================

#[tokio::test]
#[ignore = "Requires running API server and network access to Google"]
async fn test_google_rejects_invalid_token() {
    let client = Client::new();

    let (status, body) = post(
        &client,
        "/auth/google",
        Some(json!({"token": "definitely-not-a-google-token"})),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    let detail = body["detail"].as_str().expect("detail missing");
    assert!(
        detail.starts_with("Invalid Google token: ")
            || detail.starts_with("Google authentication failed: "),
        "unexpected detail: {detail}"
    );
}

#[tokio::test]
#[ignore = "Requires running API server and GOOGLE_TEST_TOKEN"]
async fn test_google_login_is_idempotent() {
    let Ok(token) = std::env::var("GOOGLE_TEST_TOKEN") else {
        return;
    };
    let client = Client::new();

    let (status, first) = post(&client, "/auth/google", Some(json!({"token": token}))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(first["user"]["is_guest"], false);

    let (_, second) = post(&client, "/auth/google", Some(json!({"token": token}))).await;
    assert_eq!(first["user"]["user_id"], second["user"]["user_id"]);
}

// ============================================================================
// Health
// ============================================================================

#[tokio::test]
#[ignore = "Requires running API server and migrated database"]
async fn test_healthz() {
    let resp = Client::new()
        .get(format!("{}/healthz", api_base_url()))
        .send()
        .await
        .expect("Failed to reach server");

    assert_eq!(resp.status(), StatusCode::OK);
    let body: Value = resp.json().await.expect("Response was not JSON");
    assert_eq!(body, json!({"status": "ok", "db": "connected"}));
}
