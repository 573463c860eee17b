//! Bearer-token authentication middleware.
//!
//! Validation order matches token issuance volume: the desktop-token codec
//! runs first (both formats), then the session verifier. The winning scheme is
//! recorded on the request so session-only endpoints can reject desktop
//! callers.

use crate::auth::models::AuthContext;
use crate::auth::session::SessionVerifier;
use crate::auth::token::DesktopTokenCodec;
use crate::error::HttpAppError;
use axum::{
    extract::{Request, State},
    middleware::Next,
    response::{IntoResponse, Response},
};
use chrono::Utc;
use librecloud_core::models::AuthScheme;
use librecloud_core::AppError;
use std::sync::Arc;

#[derive(Clone)]
pub struct AuthState {
    pub token_codec: DesktopTokenCodec,
    pub session_verifier: Arc<dyn SessionVerifier>,
}

pub async fn auth_middleware(
    State(auth_state): State<Arc<AuthState>>,
    mut request: Request,
    next: Next,
) -> Response {
    let auth_header = match request
        .headers()
        .get("Authorization")
        .and_then(|h| h.to_str().ok())
    {
        Some(h) => h,
        None => {
            return HttpAppError(AppError::Unauthorized(
                "Missing authorization header".to_string(),
            ))
            .into_response()
        }
    };

    let Some(token) = auth_header.strip_prefix("Bearer ") else {
        return HttpAppError(AppError::Unauthorized(
            "Invalid authorization header format".to_string(),
        ))
        .into_response();
    };

    let context = match auth_state.token_codec.decode(token, Utc::now()) {
        Ok(identity) => AuthContext {
            identity,
            scheme: AuthScheme::Pairing,
        },
        Err(desktop_err) => match auth_state.session_verifier.verify(token).await {
            Ok(identity) => AuthContext {
                identity,
                scheme: AuthScheme::Session,
            },
            Err(_) => {
                tracing::debug!(error = %desktop_err, "Bearer token rejected by both schemes");
                return HttpAppError(AppError::Unauthorized(
                    "Invalid or expired token".to_string(),
                ))
                .into_response();
            }
        },
    };

    tracing::debug!(
        user_id = %context.identity.user_id,
        scheme = %context.scheme,
        "Request authenticated"
    );
    request.extensions_mut().insert(context);
    next.run(request).await
}
