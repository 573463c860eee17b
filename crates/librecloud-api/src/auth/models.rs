use crate::error::ErrorResponse;
use axum::extract::FromRequestParts;
use axum::http::{request::Parts, StatusCode};
use axum::Json;
use librecloud_core::models::{AuthScheme, Identity};

/// Authenticated caller, stored in request extensions by the auth middleware.
///
/// `scheme` records which credential kind validated the request; handlers
/// restricted to browser sessions check it instead of re-parsing the token.
#[derive(Debug, Clone)]
pub struct AuthContext {
    pub identity: Identity,
    pub scheme: AuthScheme,
}

impl AuthContext {
    pub fn user_id(&self) -> &str {
        &self.identity.user_id
    }
}

impl<S> FromRequestParts<S> for AuthContext
where
    S: Send + Sync,
{
    type Rejection = (StatusCode, Json<ErrorResponse>);

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<AuthContext>()
            .cloned()
            .ok_or_else(|| {
                (
                    StatusCode::UNAUTHORIZED,
                    Json(ErrorResponse::new("Authentication required", "UNAUTHORIZED")),
                )
            })
    }
}
