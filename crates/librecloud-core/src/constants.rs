//! Shared constants for the LibreCloud services.

use std::time::Duration;

/// API route prefix for all HTTP endpoints.
pub const API_PREFIX: &str = "/api";

/// How long a pairing nonce stays valid after initiation.
pub const PAIRING_TTL: Duration = Duration::from_secs(5 * 60);

/// Lifetime of a minted desktop bearer token.
pub const DESKTOP_TOKEN_TTL_SECS: i64 = 3600;

/// Issuer claim expected on desktop tokens.
pub const DESKTOP_TOKEN_ISSUER: &str = "librecloud-app";

/// Audience claim expected on desktop tokens.
pub const DESKTOP_TOKEN_AUDIENCE: &str = "librecloud-desktop";

/// Presigned URLs are deliberately short-lived and single-operation.
pub const PRESIGNED_URL_TTL: Duration = Duration::from_secs(60);

/// Upper bound on uploaded document size.
pub const MAX_DOCUMENT_SIZE_BYTES: u64 = 50 * 1024 * 1024;
