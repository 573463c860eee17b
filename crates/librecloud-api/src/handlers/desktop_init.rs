//! Pairing initiation endpoint.

use crate::constants::DESKTOP_INIT_RATE_LIMIT;
use crate::error::HttpAppError;
use crate::middleware::rate_limit::rate_limit_headers;
use crate::state::AppState;
use crate::utils::ip_extraction::client_ip;
use axum::{
    extract::State,
    http::{header::CONTENT_TYPE, HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use librecloud_core::AppError;
use serde::Serialize;
use uuid::Uuid;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DesktopInitResponse {
    pub nonce: Uuid,
    /// URL the desktop client opens in the system browser.
    pub login_url: String,
    /// Epoch milliseconds; the desktop client compares against local time.
    pub expires_at: i64,
}

/// `POST /api/desktop-init`
///
/// Unauthenticated by design (the desktop client has no credentials yet), so
/// it is the most tightly rate limited endpoint.
#[tracing::instrument(skip(state, headers))]
pub async fn desktop_init(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<Response, HttpAppError> {
    let is_json = headers
        .get(CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .is_some_and(|ct| ct.contains("application/json"));
    if !is_json {
        return Err(HttpAppError(AppError::BadRequest(
            "Content-Type must be application/json".to_string(),
        )));
    }

    let ip = client_ip(&headers);
    let decision = state
        .limiter
        .check(&format!("desktop-init:{ip}"), DESKTOP_INIT_RATE_LIMIT)
        .await;
    if !decision.allowed {
        let mut response = HttpAppError(AppError::RateLimited {
            retry_after_secs: decision.retry_after_secs.unwrap_or(1),
        })
        .into_response();
        response.headers_mut().extend(rate_limit_headers(&decision));
        return Ok(response);
    }

    let record = state.pairing.initiate(Some(ip)).await?;

    let body = DesktopInitResponse {
        nonce: record.nonce,
        login_url: state.config.login_url(&record.nonce.to_string()),
        expires_at: record.expires_at.timestamp_millis(),
    };
    let mut response = (StatusCode::OK, Json(body)).into_response();
    response.headers_mut().extend(rate_limit_headers(&decision));
    Ok(response)
}
