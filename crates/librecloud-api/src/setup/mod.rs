//! Application wiring: telemetry, routes, server lifecycle.

pub mod routes;
pub mod server;
pub mod telemetry;

use crate::auth::middleware::AuthState;
use crate::auth::session::{JwksSessionVerifier, SessionVerifier, StaticSessionVerifier};
use crate::auth::token::DesktopTokenCodec;
use crate::middleware::rate_limit::FixedWindowLimiter;
use crate::services::pairing::PairingService;
use crate::state::AppState;
use anyhow::Result;
use axum::Router;
use librecloud_core::Config;
use std::sync::Arc;

/// Build the full application from configuration: stores, storage, auth, and
/// the router.
pub async fn initialize_app(config: Config) -> Result<(AppState, Router)> {
    let config = Arc::new(config);

    let (pairing_store, document_store) = librecloud_db::factory::create_stores(&config).await?;
    let storage = librecloud_storage::create_storage(&config).await?;

    let codec = DesktopTokenCodec::new(config.desktop_token_secret.clone());
    let session_verifier: Arc<dyn SessionVerifier> = match &config.session_jwks_url {
        Some(jwks_url) => Arc::new(JwksSessionVerifier::new(
            jwks_url.clone(),
            config.session_issuer.clone(),
        )),
        None => {
            tracing::warn!(
                "SESSION_JWKS_URL not set; all browser-session tokens will be rejected"
            );
            Arc::new(StaticSessionVerifier::new())
        }
    };
    let auth_state = Arc::new(AuthState {
        token_codec: codec.clone(),
        session_verifier,
    });

    let state = AppState {
        config: config.clone(),
        pairing: PairingService::new(pairing_store, codec),
        documents: document_store,
        storage,
        limiter: FixedWindowLimiter::new(),
    };

    let router = routes::build_router(state.clone(), auth_state);
    Ok((state, router))
}
