//! HTTP client for the LibreCloud API.
//!
//! Used by the desktop application: the `pairing` module bootstraps a bearer
//! token through the browser pairing flow, and `api` carries the document
//! operations (register, list, update, delete, presigned upload/download).

pub mod api;
pub mod pairing;

use anyhow::{Context, Result};
use reqwest::Client;
use serde::de::DeserializeOwned;
use std::time::Duration;

/// API route prefix, matching the server.
pub const API_PREFIX: &str = "/api";

/// Authentication strategy.
#[derive(Clone, Debug)]
pub enum Auth {
    /// No credentials; only the pairing endpoints accept this.
    None,
    /// `Authorization: Bearer {token}` — desktop or session token.
    Bearer(String),
}

/// HTTP client for the LibreCloud API.
#[derive(Clone, Debug)]
pub struct ApiClient {
    client: Client,
    base_url: String,
    auth: Auth,
}

impl ApiClient {
    pub fn new(base_url: String, auth: Auth) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(60))
            .build()
            .context("Failed to create HTTP client")?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            auth,
        })
    }

    /// Create client from environment: LIBRECLOUD_API_URL and
    /// LIBRECLOUD_TOKEN (bearer). Without a token the client is anonymous and
    /// suitable only for the pairing flow.
    pub fn from_env() -> Result<Self> {
        let base_url = std::env::var("LIBRECLOUD_API_URL")
            .unwrap_or_else(|_| "http://localhost:3009".to_string());
        let auth = match std::env::var("LIBRECLOUD_TOKEN") {
            Ok(token) => Auth::Bearer(token),
            Err(_) => Auth::None,
        };
        Self::new(base_url, auth)
    }

    /// Replace the credentials, e.g. after pairing completes.
    pub fn with_bearer(mut self, token: String) -> Self {
        self.auth = Auth::Bearer(token);
        self
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn build_url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    fn apply_auth(&self, request: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        match &self.auth {
            Auth::None => request,
            Auth::Bearer(token) => request.header("Authorization", format!("Bearer {}", token)),
        }
    }

    async fn read_error(response: reqwest::Response) -> anyhow::Error {
        let status = response.status();
        let error_text = response
            .text()
            .await
            .unwrap_or_else(|_| "Unknown error".to_string());
        anyhow::anyhow!("API request failed with status {}: {}", status, error_text)
    }

    /// GET request with optional query parameters. Deserializes JSON response.
    pub async fn get<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, String)],
    ) -> Result<T> {
        let url = self.build_url(path);
        let mut request = self.apply_auth(self.client.get(&url));
        if !query.is_empty() {
            request = request.query(query);
        }

        let response = request.send().await.context("Failed to send request")?;
        if !response.status().is_success() {
            return Err(Self::read_error(response).await);
        }
        response
            .json()
            .await
            .context("Failed to parse response as JSON")
    }

    /// POST JSON body and deserialize response.
    pub async fn post_json<T: DeserializeOwned, B: serde::Serialize>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<T> {
        let url = self.build_url(path);
        let request = self.apply_auth(self.client.post(&url).json(body));

        let response = request.send().await.context("Failed to send request")?;
        if !response.status().is_success() {
            return Err(Self::read_error(response).await);
        }
        response
            .json()
            .await
            .context("Failed to parse response as JSON")
    }

    /// PATCH JSON body and deserialize response.
    pub async fn patch_json<T: DeserializeOwned, B: serde::Serialize>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<T> {
        let url = self.build_url(path);
        let request = self.apply_auth(self.client.patch(&url).json(body));

        let response = request.send().await.context("Failed to send request")?;
        if !response.status().is_success() {
            return Err(Self::read_error(response).await);
        }
        response
            .json()
            .await
            .context("Failed to parse response as JSON")
    }

    /// DELETE request with query parameters. Returns Ok(()) on success.
    pub async fn delete(&self, path: &str, query: &[(&str, String)]) -> Result<()> {
        let url = self.build_url(path);
        let mut request = self.apply_auth(self.client.delete(&url));
        if !query.is_empty() {
            request = request.query(query);
        }

        let response = request.send().await.context("Failed to send request")?;
        if !response.status().is_success() {
            return Err(Self::read_error(response).await);
        }
        Ok(())
    }

    /// Raw client for presigned-URL transfers, which bypass API auth.
    pub fn client(&self) -> &Client {
        &self.client
    }
}

pub use api::{DocumentListResponse, PresignResponse};
pub use pairing::{DesktopInitResponse, DesktopToken, PairingError};
