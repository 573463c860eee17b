//! Test helpers: build the application against in-memory backends.
//!
//! No external services: records live in the in-memory stores and payloads in
//! a tempdir-backed local storage backend, so the full HTTP surface runs
//! in-process. Run with `cargo test -p librecloud-api`.

use axum_test::TestServer;
use librecloud_api::auth::{AuthState, DesktopTokenCodec, StaticSessionVerifier};
use librecloud_api::setup::routes::build_router;
use librecloud_api::state::AppState;
use librecloud_api::{FixedWindowLimiter, PairingService};
use librecloud_core::models::Identity;
use librecloud_core::{Config, StorageBackend, StoreBackend};
use librecloud_db::{MemoryDocumentStore, MemoryPairingStore};
use librecloud_storage::LocalStorage;
use std::sync::Arc;
use tempfile::TempDir;

/// Session bearer token accepted by the static verifier for the primary user.
pub const SESSION_TOKEN: &str = "sess_test_ada";
/// Session bearer token for a second, unrelated user.
pub const OTHER_SESSION_TOKEN: &str = "sess_test_grace";

pub const TEST_SECRET: &str = "test-secret";

pub fn primary_identity() -> Identity {
    Identity {
        user_id: "user_ada".to_string(),
        email: Some("ada@example.com".to_string()),
        first_name: Some("Ada".to_string()),
        last_name: Some("Lovelace".to_string()),
    }
}

pub fn other_identity() -> Identity {
    Identity {
        user_id: "user_grace".to_string(),
        email: Some("grace@example.com".to_string()),
        first_name: Some("Grace".to_string()),
        last_name: Some("Hopper".to_string()),
    }
}

pub struct TestApp {
    pub server: TestServer,
    pub _temp_dir: TempDir,
}

impl TestApp {
    pub fn client(&self) -> &TestServer {
        &self.server
    }
}

fn test_config() -> Config {
    Config {
        server_port: 3009,
        base_url: "http://localhost:3009".to_string(),
        environment: "test".to_string(),
        store_backend: StoreBackend::Memory,
        database_url: None,
        storage_backend: StorageBackend::Local,
        s3_bucket: None,
        s3_region: None,
        s3_endpoint: None,
        local_storage_path: None,
        local_storage_base_url: None,
        desktop_token_secret: TEST_SECRET.to_string(),
        session_jwks_url: None,
        session_issuer: None,
    }
}

pub async fn setup_test_app() -> TestApp {
    let temp_dir = TempDir::new().expect("create temp dir");
    let storage = LocalStorage::new(
        temp_dir.path().display().to_string(),
        "http://localhost:3009/files".to_string(),
    )
    .await
    .expect("create local storage");

    let codec = DesktopTokenCodec::new(TEST_SECRET);
    let session_verifier = StaticSessionVerifier::new()
        .with_session(SESSION_TOKEN, primary_identity())
        .with_session(OTHER_SESSION_TOKEN, other_identity());
    let auth_state = Arc::new(AuthState {
        token_codec: codec.clone(),
        session_verifier: Arc::new(session_verifier),
    });

    let state = AppState {
        config: Arc::new(test_config()),
        pairing: PairingService::new(Arc::new(MemoryPairingStore::new()), codec),
        documents: Arc::new(MemoryDocumentStore::new()),
        storage: Arc::new(storage),
        limiter: FixedWindowLimiter::new(),
    };

    let server = TestServer::new(build_router(state, auth_state)).expect("start test server");
    TestApp {
        server,
        _temp_dir: temp_dir,
    }
}

pub fn bearer(token: &str) -> String {
    format!("Bearer {token}")
}
