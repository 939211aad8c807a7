mod common;

use common::TestApp;
use serde_json::json;

#[tokio::test]
async fn test_invalid_credentials_are_rejected_with_challenge() {
    let app = TestApp::spawn().await;

    let resp = app.post_message_as("poster", "wrong-password", &json!({"message": "should not persist"})).await;
    assert_eq!(resp.status(), 401);
    assert_eq!(
        resp.headers().get("www-authenticate").and_then(|v| v.to_str().ok()),
        Some("Basic")
    );

    let body: serde_json::Value = resp.json().await.expect("invalid response body");
    assert_eq!(body["error"], "invalid credentials");
}

#[tokio::test]
async fn test_missing_credentials_are_rejected() {
    let app = TestApp::spawn().await;

    let resp = app
        .client
        .post(format!("{}/", app.server_url))
        .json(&json!({"message": "anonymous"}))
        .send()
        .await
        .expect("post request failed");
    assert_eq!(resp.status(), 401);
}

#[tokio::test]
async fn test_rejected_post_persists_nothing() {
    let app = TestApp::spawn().await;

    let resp = app.post_message_as("poster", "wrong-password", &json!({"message": "should not persist"})).await;
    assert_eq!(resp.status(), 401);

    // Nothing was issued, so any guessed id must come back absent.
    let resp = app.get_path("/abcdefghabcdefghabcdefghabcdefgh").await;
    assert_eq!(resp.status(), 404);
}

#[tokio::test]
async fn test_valid_credentials_with_invalid_message_still_rejected() {
    let app = TestApp::spawn().await;

    // Auth passes, validation does not; order of checks must not leak a record.
    let resp = app.post_message(&json!({"message": ""}), None).await;
    assert_eq!(resp.status(), 422);
}

#[tokio::test]
async fn test_fetch_requires_no_credentials() {
    let app = TestApp::spawn().await;

    let resp = app.post_message(&json!({"message": "public read"}), None).await;
    let record: serde_json::Value = resp.json().await.expect("invalid response body");
    let url = record["url"].as_str().expect("missing url");

    // Plain client, no auth header.
    let fetched = app.get_path(url).await;
    assert_eq!(fetched.status(), 200);
}
