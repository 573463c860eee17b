//! Session token verification against the identity provider.
//!
//! Browser-session bearer tokens are RS256 JWTs issued by the external
//! identity provider. Verification fetches the provider's JWKS and caches
//! decoding keys by key id. The trait seam exists so tests can swap in a
//! static verifier and run without a provider.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use jsonwebtoken::{decode, decode_header, Algorithm, DecodingKey, Validation};
use librecloud_core::models::Identity;
use librecloud_core::AppError;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

/// Validates a browser-session bearer token.
#[async_trait]
pub trait SessionVerifier: Send + Sync {
    async fn verify(&self, token: &str) -> Result<Identity, AppError>;
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Jwks {
    pub keys: Vec<Jwk>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Jwk {
    #[serde(rename = "kty")]
    pub key_type: String,
    #[serde(rename = "kid")]
    pub key_id: Option<String>,
    #[serde(rename = "n")]
    pub modulus: Option<String>,
    #[serde(rename = "e")]
    pub exponent: Option<String>,
}

#[derive(Debug, Deserialize)]
struct SessionClaims {
    sub: String,
    #[serde(default)]
    email: Option<String>,
    #[serde(default)]
    given_name: Option<String>,
    #[serde(default)]
    family_name: Option<String>,
}

#[derive(Clone)]
struct CachedKey {
    key: DecodingKey,
    expires_at: DateTime<Utc>,
}

/// JWKS-backed verifier with per-kid key caching.
pub struct JwksSessionVerifier {
    jwks_url: String,
    expected_issuer: Option<String>,
    cache: Arc<RwLock<HashMap<String, CachedKey>>>,
    cache_ttl_seconds: i64,
}

impl JwksSessionVerifier {
    pub fn new(jwks_url: String, expected_issuer: Option<String>) -> Self {
        Self {
            jwks_url,
            expected_issuer,
            cache: Arc::new(RwLock::new(HashMap::new())),
            cache_ttl_seconds: 3600,
        }
    }

    async fn fetch_jwks(&self) -> Result<Jwks, AppError> {
        let response = reqwest::get(&self.jwks_url)
            .await
            .map_err(|e| AppError::Unauthorized(format!("Failed to fetch JWKS: {e}")))?;

        if !response.status().is_success() {
            return Err(AppError::Unauthorized(format!(
                "JWKS endpoint returned error: {}",
                response.status()
            )));
        }

        response
            .json()
            .await
            .map_err(|e| AppError::Unauthorized(format!("Failed to parse JWKS: {e}")))
    }

    fn jwk_to_decoding_key(jwk: &Jwk) -> Result<DecodingKey, AppError> {
        if jwk.key_type != "RSA" {
            return Err(AppError::Unauthorized(format!(
                "Unsupported key type: {}",
                jwk.key_type
            )));
        }
        let n = jwk
            .modulus
            .as_ref()
            .ok_or_else(|| AppError::Unauthorized("RSA key missing modulus".to_string()))?;
        let e = jwk
            .exponent
            .as_ref()
            .ok_or_else(|| AppError::Unauthorized("RSA key missing exponent".to_string()))?;
        DecodingKey::from_rsa_components(n, e)
            .map_err(|e| AppError::Unauthorized(format!("Failed to create RSA key: {e}")))
    }

    async fn get_decoding_key(&self, kid: Option<&str>) -> Result<DecodingKey, AppError> {
        let cache_key = kid.unwrap_or("default").to_string();

        {
            let cache = self.cache.read().await;
            if let Some(cached) = cache.get(&cache_key) {
                if cached.expires_at > Utc::now() {
                    return Ok(cached.key.clone());
                }
            }
        }

        let jwks = self.fetch_jwks().await?;
        let jwk = if let Some(kid) = kid {
            jwks.keys
                .iter()
                .find(|k| k.key_id.as_deref() == Some(kid))
                .ok_or_else(|| {
                    AppError::Unauthorized(format!("Key ID {kid} not found in JWKS"))
                })?
        } else {
            jwks.keys
                .first()
                .ok_or_else(|| AppError::Unauthorized("No keys found in JWKS".to_string()))?
        };

        let decoding_key = Self::jwk_to_decoding_key(jwk)?;

        {
            let mut cache = self.cache.write().await;
            cache.insert(
                cache_key,
                CachedKey {
                    key: decoding_key.clone(),
                    expires_at: Utc::now() + chrono::Duration::seconds(self.cache_ttl_seconds),
                },
            );
        }

        Ok(decoding_key)
    }
}

#[async_trait]
impl SessionVerifier for JwksSessionVerifier {
    async fn verify(&self, token: &str) -> Result<Identity, AppError> {
        let header = decode_header(token)
            .map_err(|e| AppError::Unauthorized(format!("Invalid token header: {e}")))?;
        let decoding_key = self.get_decoding_key(header.kid.as_deref()).await?;

        let mut validation = Validation::new(Algorithm::RS256);
        validation.validate_exp = true;
        validation.validate_aud = false;
        validation.leeway = 0;
        if let Some(issuer) = &self.expected_issuer {
            validation.set_issuer(&[issuer]);
        }

        let data = decode::<SessionClaims>(token, &decoding_key, &validation).map_err(|e| {
            tracing::debug!("Session token validation failed: {}", e);
            match e.kind() {
                jsonwebtoken::errors::ErrorKind::ExpiredSignature => {
                    AppError::Unauthorized("Session has expired".to_string())
                }
                _ => AppError::Unauthorized("Invalid session token".to_string()),
            }
        })?;

        Ok(Identity {
            user_id: data.claims.sub,
            email: data.claims.email,
            first_name: data.claims.given_name,
            last_name: data.claims.family_name,
        })
    }
}

/// Fixed token-to-identity table for tests and local development.
#[derive(Default)]
pub struct StaticSessionVerifier {
    sessions: HashMap<String, Identity>,
}

impl StaticSessionVerifier {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_session(mut self, token: impl Into<String>, identity: Identity) -> Self {
        self.sessions.insert(token.into(), identity);
        self
    }
}

#[async_trait]
impl SessionVerifier for StaticSessionVerifier {
    async fn verify(&self, token: &str) -> Result<Identity, AppError> {
        self.sessions
            .get(token)
            .cloned()
            .ok_or_else(|| AppError::Unauthorized("Invalid session token".to_string()))
    }
}
