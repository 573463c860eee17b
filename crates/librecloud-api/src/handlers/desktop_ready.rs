//! Browser-side pairing completion endpoint.

use crate::auth::models::AuthContext;
use crate::error::HttpAppError;
use crate::services::pairing::CompleteOutcome;
use crate::state::AppState;
use axum::{extract::State, response::IntoResponse, Json};
use librecloud_core::models::AuthScheme;
use librecloud_core::validation::is_valid_document_id;
use librecloud_core::AppError;
use serde::Deserialize;
use serde_json::json;
use uuid::Uuid;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DesktopReadyRequest {
    pub nonce: String,
}

/// `POST /api/desktop-ready`
///
/// Called by the signed-in browser page after login; snapshots the session
/// identity onto the pairing record. Only a browser session may complete a
/// pairing — a desktop token must not be able to attach its own identity to a
/// second nonce.
#[tracing::instrument(skip(state, request), fields(user_id = %ctx.identity.user_id))]
pub async fn desktop_ready(
    ctx: AuthContext,
    State(state): State<AppState>,
    Json(request): Json<DesktopReadyRequest>,
) -> Result<impl IntoResponse, HttpAppError> {
    if ctx.scheme != AuthScheme::Session {
        return Err(HttpAppError(AppError::Unauthorized(
            "Session authentication required".to_string(),
        )));
    }

    if !is_valid_document_id(&request.nonce) {
        return Err(HttpAppError(AppError::BadRequest(
            "Invalid nonce format".to_string(),
        )));
    }
    let nonce = Uuid::parse_str(&request.nonce)
        .map_err(|_| AppError::BadRequest("Invalid nonce format".to_string()))?;

    match state.pairing.complete(nonce, ctx.identity).await? {
        CompleteOutcome::Completed => Ok(Json(json!({ "status": "ready" }))),
        CompleteOutcome::NotFound => Err(HttpAppError(AppError::NotFound(
            "Nonce not found".to_string(),
        ))),
        CompleteOutcome::Expired => Err(HttpAppError(AppError::Gone(
            "Nonce has expired".to_string(),
        ))),
        CompleteOutcome::AlreadyCompleted => Err(HttpAppError(AppError::BadRequest(
            "Invalid nonce status".to_string(),
        ))),
    }
}
