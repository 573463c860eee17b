//! Configuration module
//!
//! Loads all service settings from the environment (with `.env` support via
//! dotenvy) and validates them at startup so misconfiguration fails fast
//! instead of surfacing as request-time 500s.

use std::env;

use anyhow::{bail, Context, Result};

/// Which backend holds pairing and document records.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum StoreBackend {
    /// Postgres via sqlx (production)
    Postgres,
    /// In-process map (tests, local development)
    Memory,
}

/// Which backend serves object payloads.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum StorageBackend {
    S3,
    Local,
}

#[derive(Clone, Debug)]
pub struct Config {
    pub server_port: u16,
    /// Public base URL of this deployment; pairing login URLs are built from it.
    pub base_url: String,
    pub environment: String,

    pub store_backend: StoreBackend,
    pub database_url: Option<String>,

    pub storage_backend: StorageBackend,
    pub s3_bucket: Option<String>,
    pub s3_region: Option<String>,
    /// Custom endpoint for S3-compatible providers (MinIO etc.)
    pub s3_endpoint: Option<String>,
    pub local_storage_path: Option<String>,
    pub local_storage_base_url: Option<String>,

    /// HMAC secret for the legacy signed desktop-token format.
    pub desktop_token_secret: String,
    /// JWKS endpoint of the identity provider for session-token verification.
    pub session_jwks_url: Option<String>,
    /// Expected issuer on session tokens, when the provider sets one.
    pub session_issuer: Option<String>,
}

impl Config {
    /// Load configuration from the environment.
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok();

        let server_port = env::var("PORT")
            .unwrap_or_else(|_| "3009".to_string())
            .parse::<u16>()
            .context("PORT must be a valid port number")?;

        let base_url = env::var("BASE_URL")
            .unwrap_or_else(|_| format!("http://localhost:{}", server_port));

        let environment =
            env::var("ENVIRONMENT").unwrap_or_else(|_| "development".to_string());

        let store_backend = match env::var("STORE_BACKEND").as_deref() {
            Ok("postgres") => StoreBackend::Postgres,
            Ok("memory") | Err(_) => StoreBackend::Memory,
            Ok(other) => bail!("Unknown STORE_BACKEND: {other} (expected postgres or memory)"),
        };

        let storage_backend = match env::var("STORAGE_BACKEND").as_deref() {
            Ok("s3") => StorageBackend::S3,
            Ok("local") | Err(_) => StorageBackend::Local,
            Ok(other) => bail!("Unknown STORAGE_BACKEND: {other} (expected s3 or local)"),
        };

        let config = Config {
            server_port,
            base_url: base_url.trim_end_matches('/').to_string(),
            environment,
            store_backend,
            database_url: env::var("DATABASE_URL").ok(),
            storage_backend,
            s3_bucket: env::var("S3_BUCKET").ok(),
            s3_region: env::var("S3_REGION").or_else(|_| env::var("AWS_REGION")).ok(),
            s3_endpoint: env::var("S3_ENDPOINT").ok(),
            local_storage_path: env::var("LOCAL_STORAGE_PATH").ok(),
            local_storage_base_url: env::var("LOCAL_STORAGE_BASE_URL").ok(),
            desktop_token_secret: env::var("DESKTOP_TOKEN_SECRET")
                .unwrap_or_else(|_| "fallback-secret-for-development".to_string()),
            session_jwks_url: env::var("SESSION_JWKS_URL").ok(),
            session_issuer: env::var("SESSION_ISSUER").ok(),
        };

        config.validate()?;
        Ok(config)
    }

    /// Validate cross-field requirements. Called by `from_env`; exposed for tests.
    pub fn validate(&self) -> Result<()> {
        if self.store_backend == StoreBackend::Postgres && self.database_url.is_none() {
            bail!("DATABASE_URL is required when STORE_BACKEND=postgres");
        }
        if self.storage_backend == StorageBackend::S3 {
            if self.s3_bucket.is_none() {
                bail!("S3_BUCKET is required when STORAGE_BACKEND=s3");
            }
            if self.s3_region.is_none() {
                bail!("S3_REGION or AWS_REGION is required when STORAGE_BACKEND=s3");
            }
        }
        if self.is_production() && self.desktop_token_secret == "fallback-secret-for-development" {
            bail!("DESKTOP_TOKEN_SECRET must be set in production");
        }
        Ok(())
    }

    pub fn is_production(&self) -> bool {
        self.environment == "production"
    }

    /// URL the desktop client opens in a browser to complete pairing.
    pub fn login_url(&self, nonce: &str) -> String {
        format!("{}/desktop-login?nonce={}", self.base_url, nonce)
    }
}
