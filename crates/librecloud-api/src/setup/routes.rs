//! Route configuration and setup

use crate::auth::middleware::{auth_middleware, AuthState};
use crate::handlers;
use crate::state::AppState;
use axum::{
    http::Method,
    routing::{get, post},
    Router,
};
use librecloud_core::constants::API_PREFIX;
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

/// Build the application router. Tests call this directly with in-memory
/// backends wired into `state` and a static session verifier in `auth_state`.
pub fn build_router(state: AppState, auth_state: Arc<AuthState>) -> Router {
    // The desktop client and the browser page run on different origins, so
    // the API is deliberately permissive; authorization lives in the bearer
    // token, never in the Origin header.
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PATCH,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers(Any);

    let public_routes = Router::new()
        .route("/health", get(handlers::health::health_check))
        .route(
            &format!("{API_PREFIX}/desktop-init"),
            post(handlers::desktop_init::desktop_init),
        )
        .route(
            &format!("{API_PREFIX}/desktop-token"),
            get(handlers::desktop_token::desktop_token),
        );

    let protected_routes = Router::new()
        .route(
            &format!("{API_PREFIX}/desktop-ready"),
            post(handlers::desktop_ready::desktop_ready),
        )
        .route(
            &format!("{API_PREFIX}/documents"),
            get(handlers::documents::list_documents)
                .post(handlers::documents::create_document)
                .delete(handlers::documents::delete_document),
        )
        .route(
            &format!("{API_PREFIX}/documents/{{doc_id}}"),
            get(handlers::document_detail::get_document)
                .patch(handlers::document_detail::update_document),
        )
        .route(
            &format!("{API_PREFIX}/presign"),
            post(handlers::presign::presign),
        )
        .layer(axum::middleware::from_fn_with_state(
            auth_state,
            auth_middleware,
        ));

    public_routes
        .merge(protected_routes)
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}
