//! Document metadata CRUD integration tests.

mod helpers;

use helpers::{bearer, setup_test_app, OTHER_SESSION_TOKEN, SESSION_TOKEN};
use serde_json::{json, Value};

async fn register_document(app: &helpers::TestApp, token: &str, file_name: &str) -> Value {
    let response = app
        .client()
        .post("/api/documents")
        .add_header("Authorization", bearer(token))
        .json(&json!({
            "fileName": file_name,
            "fileSize": 1024,
            "contentType": "application/vnd.oasis.opendocument.text",
        }))
        .await;
    assert_eq!(response.status_code(), 201);
    response.json::<Value>()
}

#[tokio::test]
async fn test_register_and_list_documents() {
    let app = setup_test_app().await;

    let first = register_document(&app, SESSION_TOKEN, "notes.odt").await;
    assert_eq!(first["fileName"], "notes.odt");
    assert_eq!(first["fileSize"], 1024);
    assert_eq!(first["userId"], "user_ada");
    assert!(first["docId"].as_str().is_some());

    let _second = register_document(&app, SESSION_TOKEN, "thesis.odt").await;

    let response = app
        .client()
        .get("/api/documents")
        .add_header("Authorization", bearer(SESSION_TOKEN))
        .await;
    assert_eq!(response.status_code(), 200);
    let body = response.json::<Value>();
    assert_eq!(body["total"], 2);
    let documents = body["documents"].as_array().unwrap();
    assert_eq!(documents.len(), 2);
    // Newest upload first.
    assert_eq!(documents[0]["fileName"], "thesis.odt");
    assert_eq!(documents[1]["fileName"], "notes.odt");
}

#[tokio::test]
async fn test_documents_are_scoped_to_owner() {
    let app = setup_test_app().await;
    let doc = register_document(&app, SESSION_TOKEN, "private.odt").await;
    let doc_id = doc["docId"].as_str().unwrap();

    // Another user sees an empty list and cannot fetch by id.
    let response = app
        .client()
        .get("/api/documents")
        .add_header("Authorization", bearer(OTHER_SESSION_TOKEN))
        .await;
    let body = response.json::<Value>();
    assert!(body["documents"].as_array().unwrap().is_empty());
    assert_eq!(body["total"], 0);

    let response = app
        .client()
        .get(&format!("/api/documents/{doc_id}"))
        .add_header("Authorization", bearer(OTHER_SESSION_TOKEN))
        .await;
    assert_eq!(response.status_code(), 404);

    // A cross-user update must not succeed silently.
    let response = app
        .client()
        .patch(&format!("/api/documents/{doc_id}"))
        .add_header("Authorization", bearer(OTHER_SESSION_TOKEN))
        .json(&json!({ "fileName": "stolen.odt" }))
        .await;
    assert_eq!(response.status_code(), 404);

    let response = app
        .client()
        .get(&format!("/api/documents/{doc_id}"))
        .add_header("Authorization", bearer(SESSION_TOKEN))
        .await;
    assert_eq!(response.status_code(), 200);
    assert_eq!(response.json::<Value>()["fileName"], "private.odt");
}

#[tokio::test]
async fn test_update_document_refreshes_last_modified() {
    let app = setup_test_app().await;
    let doc = register_document(&app, SESSION_TOKEN, "draft.odt").await;
    let doc_id = doc["docId"].as_str().unwrap();
    let before = doc["lastModified"].as_str().unwrap().to_string();

    let response = app
        .client()
        .patch(&format!("/api/documents/{doc_id}"))
        .add_header("Authorization", bearer(SESSION_TOKEN))
        .json(&json!({ "fileName": "final.odt" }))
        .await;
    assert_eq!(response.status_code(), 200);
    let updated = response.json::<Value>();
    assert_eq!(updated["fileName"], "final.odt");
    assert!(updated["lastModified"].as_str().unwrap() >= before.as_str());

    // An empty change set is valid and still refreshes the timestamp.
    let response = app
        .client()
        .patch(&format!("/api/documents/{doc_id}"))
        .add_header("Authorization", bearer(SESSION_TOKEN))
        .json(&json!({}))
        .await;
    assert_eq!(response.status_code(), 200);
    assert_eq!(response.json::<Value>()["fileName"], "final.odt");
}

#[tokio::test]
async fn test_update_requires_session_scheme() {
    let app = setup_test_app().await;
    let doc = register_document(&app, SESSION_TOKEN, "draft.odt").await;
    let doc_id = doc["docId"].as_str().unwrap();

    // Mint a desktop token through the pairing flow.
    let init = app
        .client()
        .post("/api/desktop-init")
        .content_type("application/json")
        .json(&json!({}))
        .await
        .json::<Value>();
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

    let response = app
        .client()
        .patch(&format!("/api/documents/{doc_id}"))
        .add_header("Authorization", bearer(&token))
        .json(&json!({ "fileName": "renamed.odt" }))
        .await;
    assert_eq!(response.status_code(), 401);
}

#[tokio::test]
async fn test_register_validation() {
    let app = setup_test_app().await;

    let response = app
        .client()
        .post("/api/documents")
        .add_header("Authorization", bearer(SESSION_TOKEN))
        .json(&json!({
            "fileName": "malware.exe",
            "fileSize": 1024,
            "contentType": "application/x-msdownload",
        }))
        .await;
    assert_eq!(response.status_code(), 400);

    let response = app
        .client()
        .post("/api/documents")
        .add_header("Authorization", bearer(SESSION_TOKEN))
        .json(&json!({
            "fileName": "huge.odt",
            "fileSize": 51 * 1024 * 1024,
        }))
        .await;
    assert_eq!(response.status_code(), 400);
    assert_eq!(response.json::<Value>()["code"], "PAYLOAD_TOO_LARGE");

    let response = app
        .client()
        .post("/api/documents")
        .add_header("Authorization", bearer(SESSION_TOKEN))
        .json(&json!({
            "docId": "not-a-uuid-at-all",
            "fileName": "notes.odt",
            "fileSize": 1024,
        }))
        .await;
    assert_eq!(response.status_code(), 400);
}

#[tokio::test]
async fn test_delete_document() {
    let app = setup_test_app().await;
    let doc = register_document(&app, SESSION_TOKEN, "obsolete.odt").await;
    let doc_id = doc["docId"].as_str().unwrap();

    let response = app
        .client()
        .delete(&format!("/api/documents?docId={doc_id}"))
        .add_header("Authorization", bearer(SESSION_TOKEN))
        .await;
    assert_eq!(response.status_code(), 200);
    assert_eq!(response.json::<Value>()["success"], true);

    let response = app
        .client()
        .get(&format!("/api/documents/{doc_id}"))
        .add_header("Authorization", bearer(SESSION_TOKEN))
        .await;
    assert_eq!(response.status_code(), 404);

    // Deleting again reports not found.
    let response = app
        .client()
        .delete(&format!("/api/documents?docId={doc_id}"))
        .add_header("Authorization", bearer(SESSION_TOKEN))
        .await;
    assert_eq!(response.status_code(), 404);
}
