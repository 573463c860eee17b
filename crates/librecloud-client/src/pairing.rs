//! Desktop pairing bootstrap.
//!
//! The desktop application calls `initiate`, opens `login_url` in the system
//! browser, and drives `poll_until_ready` until the server hands over a
//! bearer token or the attempt terminates (expiry, consumption, unknown
//! nonce).

use crate::{ApiClient, API_PREFIX};
use anyhow::{Context, Result};
use reqwest::StatusCode;
use serde::Deserialize;
use std::time::Duration;
use uuid::Uuid;

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DesktopInitResponse {
    pub nonce: Uuid,
    pub login_url: String,
    /// Epoch milliseconds.
    pub expires_at: i64,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TokenUser {
    pub id: String,
    pub email: Option<String>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
}

/// Token handed over when pairing completes.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DesktopToken {
    pub token: String,
    /// Epoch milliseconds.
    pub expires_at: i64,
    pub user: TokenUser,
}

/// Terminal pairing failures. Each maps to a status the poll loop must stop
/// on; transient transport errors are retried by the caller instead.
#[derive(Debug, thiserror::Error)]
pub enum PairingError {
    #[error("pairing nonce is unknown to the server")]
    UnknownNonce,
    #[error("pairing attempt expired before sign-in completed")]
    Expired,
    #[error("pairing nonce was already consumed")]
    AlreadyConsumed,
    #[error("sign-in did not complete before the deadline")]
    DeadlineElapsed,
}

impl ApiClient {
    /// Start a pairing attempt. No credentials required.
    pub async fn initiate_pairing(&self) -> Result<DesktopInitResponse> {
        self.post_json(&format!("{API_PREFIX}/desktop-init"), &serde_json::json!({}))
            .await
            .context("Failed to initiate pairing")
    }

    /// Poll until the browser sign-in completes and a token is issued.
    ///
    /// Polls every `interval` up to `deadline`. Returns the token on success;
    /// terminal server statuses surface as `PairingError`.
    pub async fn poll_until_ready(
        &self,
        nonce: Uuid,
        interval: Duration,
        deadline: Duration,
    ) -> Result<DesktopToken> {
        let started = std::time::Instant::now();
        let url = self.build_url(&format!("{API_PREFIX}/desktop-token"));

        loop {
            if started.elapsed() >= deadline {
                return Err(PairingError::DeadlineElapsed.into());
            }

            let response = self
                .client()
                .get(&url)
                .query(&[("nonce", nonce.to_string())])
                .send()
                .await
                .context("Failed to poll pairing status")?;

            match response.status() {
                StatusCode::OK => {
                    return response
                        .json::<DesktopToken>()
                        .await
                        .context("Failed to parse token response");
                }
                StatusCode::ACCEPTED => {
                    // Sign-in still pending.
                }
                StatusCode::NOT_FOUND => return Err(PairingError::UnknownNonce.into()),
                StatusCode::GONE => return Err(PairingError::Expired.into()),
                StatusCode::BAD_REQUEST => return Err(PairingError::AlreadyConsumed.into()),
                StatusCode::TOO_MANY_REQUESTS => {
                    // Back off for the window the server reports, then resume.
                    let retry_after = response
                        .headers()
                        .get("Retry-After")
                        .and_then(|v| v.to_str().ok())
                        .and_then(|v| v.parse::<u64>().ok())
                        .unwrap_or(interval.as_secs().max(1));
                    tokio::time::sleep(Duration::from_secs(retry_after)).await;
                    continue;
                }
                status => {
                    return Err(anyhow::anyhow!("Unexpected pairing status: {status}"));
                }
            }

            tokio::time::sleep(interval).await;
        }
    }
}
