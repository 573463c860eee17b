//! Pairing poll endpoint.

use crate::constants::DESKTOP_TOKEN_RATE_LIMIT;
use crate::error::HttpAppError;
use crate::middleware::rate_limit::rate_limit_headers;
use crate::services::pairing::PollOutcome;
use crate::state::AppState;
use crate::utils::ip_extraction::client_ip;
use axum::{
    extract::{Query, State},
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use librecloud_core::validation::is_valid_document_id;
use librecloud_core::AppError;
use serde::{Deserialize, Serialize};
use serde_json::json;
use uuid::Uuid;

#[derive(Debug, Deserialize)]
pub struct DesktopTokenQuery {
    pub nonce: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TokenUser {
    pub id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub first_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_name: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DesktopTokenResponse {
    pub token: String,
    /// Epoch milliseconds.
    pub expires_at: i64,
    pub user: TokenUser,
}

/// `GET /api/desktop-token?nonce=<uuid>`
///
/// Status mapping: 400 malformed nonce, 404 unknown, 410 expired (checked
/// before stored status), 202 pending, 200 token issued, 400 already
/// consumed.
#[tracing::instrument(skip(state, headers, query))]
pub async fn desktop_token(
    State(state): State<AppState>,
    Query(query): Query<DesktopTokenQuery>,
    headers: HeaderMap,
) -> Result<Response, HttpAppError> {
    let ip = client_ip(&headers);
    let decision = state
        .limiter
        .check(&format!("desktop-token:{ip}"), DESKTOP_TOKEN_RATE_LIMIT)
        .await;
    if !decision.allowed {
        let mut response = HttpAppError(AppError::RateLimited {
            retry_after_secs: decision.retry_after_secs.unwrap_or(1),
        })
        .into_response();
        response.headers_mut().extend(rate_limit_headers(&decision));
        return Ok(response);
    }

    let nonce = query
        .nonce
        .as_deref()
        .ok_or_else(|| AppError::BadRequest("Missing nonce parameter".to_string()))?;
    // Structural check before the store is touched; malformed nonces never
    // reach a lookup.
    if !is_valid_document_id(nonce) {
        return Err(HttpAppError(AppError::BadRequest(
            "Invalid nonce format".to_string(),
        )));
    }
    let nonce = Uuid::parse_str(nonce)
        .map_err(|_| AppError::BadRequest("Invalid nonce format".to_string()))?;

    let mut response = match state.pairing.poll(nonce).await? {
        PollOutcome::NotFound => {
            HttpAppError(AppError::NotFound("Nonce not found".to_string())).into_response()
        }
        PollOutcome::Expired => {
            HttpAppError(AppError::Gone("Nonce has expired".to_string())).into_response()
        }
        PollOutcome::Pending => {
            (StatusCode::ACCEPTED, Json(json!({ "status": "pending" }))).into_response()
        }
        PollOutcome::AlreadyConsumed => {
            HttpAppError(AppError::BadRequest("Invalid nonce status".to_string())).into_response()
        }
        PollOutcome::Issued {
            token,
            expires_at,
            user,
        } => (
            StatusCode::OK,
            Json(DesktopTokenResponse {
                token,
                expires_at: expires_at.timestamp_millis(),
                user: TokenUser {
                    id: user.user_id,
                    email: user.email,
                    first_name: user.first_name,
                    last_name: user.last_name,
                },
            }),
        )
            .into_response(),
    };
    response.headers_mut().extend(rate_limit_headers(&decision));
    Ok(response)
}
