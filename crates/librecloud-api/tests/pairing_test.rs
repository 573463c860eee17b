//! Desktop pairing flow integration tests.

mod helpers;

use helpers::{bearer, setup_test_app, SESSION_TOKEN};
use serde_json::{json, Value};

async fn initiate(app: &helpers::TestApp) -> Value {
    let response = app
        .client()
        .post("/api/desktop-init")
        .content_type("application/json")
        .json(&json!({}))
        .await;
    assert_eq!(response.status_code(), 200);
    response.json::<Value>()
}

#[tokio::test]
async fn test_full_pairing_flow() {
    let app = setup_test_app().await;
    let init = initiate(&app).await;

    let nonce = init["nonce"].as_str().unwrap().to_string();
    assert!(init["loginUrl"].as_str().unwrap().contains(&nonce));
    assert!(init["expiresAt"].as_i64().unwrap() > chrono::Utc::now().timestamp_millis());

    // Poll before sign-in: pending.
    let response = app
        .client()
        .get(&format!("/api/desktop-token?nonce={nonce}"))
        .await;
    assert_eq!(response.status_code(), 202);
    assert_eq!(response.json::<Value>()["status"], "pending");

    // Browser-side completion with a session token.
    let response = app
        .client()
        .post("/api/desktop-ready")
        .add_header("Authorization", bearer(SESSION_TOKEN))
        .json(&json!({ "nonce": nonce }))
        .await;
    assert_eq!(response.status_code(), 200);
    assert_eq!(response.json::<Value>()["status"], "ready");

    // First poll after ready: token issued.
    let response = app
        .client()
        .get(&format!("/api/desktop-token?nonce={nonce}"))
        .await;
    assert_eq!(response.status_code(), 200);
    let body = response.json::<Value>();
    let token = body["token"].as_str().unwrap().to_string();
    assert!(!token.is_empty());
    assert_eq!(body["user"]["id"], "user_ada");
    assert_eq!(body["user"]["email"], "ada@example.com");
    assert!(body["expiresAt"].as_i64().unwrap() > chrono::Utc::now().timestamp_millis());

    // Second poll: nonce already consumed, no second token.
    let response = app
        .client()
        .get(&format!("/api/desktop-token?nonce={nonce}"))
        .await;
    assert_eq!(response.status_code(), 400);

    // The minted token authenticates API requests.
    let response = app
        .client()
        .get("/api/documents")
        .add_header("Authorization", bearer(&token))
        .await;
    assert_eq!(response.status_code(), 200);
}

#[tokio::test]
async fn test_desktop_init_requires_json_content_type() {
    let app = setup_test_app().await;
    let response = app
        .client()
        .post("/api/desktop-init")
        .content_type("text/plain")
        .text("hello")
        .await;
    assert_eq!(response.status_code(), 400);
}

#[tokio::test]
async fn test_desktop_token_nonce_validation() {
    let app = setup_test_app().await;

    let response = app.client().get("/api/desktop-token").await;
    assert_eq!(response.status_code(), 400);

    let response = app
        .client()
        .get("/api/desktop-token?nonce=not-a-uuid-at-all")
        .await;
    assert_eq!(response.status_code(), 400);

    // Well-formed but unknown.
    let response = app
        .client()
        .get("/api/desktop-token?nonce=550e8400-e29b-41d4-a716-446655440000")
        .await;
    assert_eq!(response.status_code(), 404);
}

#[tokio::test]
async fn test_desktop_ready_requires_session_scheme() {
    let app = setup_test_app().await;

    // Mint a desktop token through a full pairing first.
    let init = initiate(&app).await;
    let nonce = init["nonce"].as_str().unwrap().to_string();
    app.client()
        .post("/api/desktop-ready")
        .add_header("Authorization", bearer(SESSION_TOKEN))
        .json(&json!({ "nonce": nonce }))
        .await;
    let token = app
        .client()
        .get(&format!("/api/desktop-token?nonce={nonce}"))
        .await
        .json::<Value>()["token"]
        .as_str()
        .unwrap()
        .to_string();

    // A desktop token must not be able to complete another pairing.
    let second = initiate(&app).await;
    let response = app
        .client()
        .post("/api/desktop-ready")
        .add_header("Authorization", bearer(&token))
        .json(&json!({ "nonce": second["nonce"] }))
        .await;
    assert_eq!(response.status_code(), 401);
}

#[tokio::test]
async fn test_desktop_ready_unknown_nonce_and_repeat() {
    let app = setup_test_app().await;

    let response = app
        .client()
        .post("/api/desktop-ready")
        .add_header("Authorization", bearer(SESSION_TOKEN))
        .json(&json!({ "nonce": "550e8400-e29b-41d4-a716-446655440000" }))
        .await;
    assert_eq!(response.status_code(), 404);

    let init = initiate(&app).await;
    let nonce = init["nonce"].as_str().unwrap().to_string();
    let response = app
        .client()
        .post("/api/desktop-ready")
        .add_header("Authorization", bearer(SESSION_TOKEN))
        .json(&json!({ "nonce": nonce }))
        .await;
    assert_eq!(response.status_code(), 200);

    // Completion is one-shot.
    let response = app
        .client()
        .post("/api/desktop-ready")
        .add_header("Authorization", bearer(SESSION_TOKEN))
        .json(&json!({ "nonce": nonce }))
        .await;
    assert_eq!(response.status_code(), 400);
}

#[tokio::test]
async fn test_desktop_init_rate_limited_per_ip() {
    let app = setup_test_app().await;

    // The limit is 10 per 15 minutes per client address; all test requests
    // share the "unknown" bucket.
    for _ in 0..10 {
        let response = app
            .client()
            .post("/api/desktop-init")
            .content_type("application/json")
            .json(&json!({}))
            .await;
        assert_eq!(response.status_code(), 200);
        assert!(response.headers().get("X-RateLimit-Limit").is_some());
    }

    let response = app
        .client()
        .post("/api/desktop-init")
        .content_type("application/json")
        .json(&json!({}))
        .await;
    assert_eq!(response.status_code(), 429);
    assert!(response.headers().get("Retry-After").is_some());
    assert_eq!(
        response.headers().get("X-RateLimit-Remaining").unwrap(),
        "0"
    );
}

#[tokio::test]
async fn test_requests_without_bearer_rejected() {
    let app = setup_test_app().await;

    let response = app.client().get("/api/documents").await;
    assert_eq!(response.status_code(), 401);

    let response = app
        .client()
        .get("/api/documents")
        .add_header("Authorization", "Basic dXNlcjpwYXNz")
        .await;
    assert_eq!(response.status_code(), 401);

    let response = app
        .client()
        .get("/api/documents")
        .add_header("Authorization", bearer("garbage-token"))
        .await;
    assert_eq!(response.status_code(), 401);
}
