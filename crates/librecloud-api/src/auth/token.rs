//! Desktop bearer token minting and validation.
//!
//! The primary wire format is base64-encoded JSON claims; it carries no
//! signature and is validated structurally (type, expiry, issuer/audience when
//! present). Desktop clients from before the format change still send HMAC
//! signed JWTs, so validation falls back to a signed-JWT path: the claims are
//! peeked without verification first, and only tokens claiming `type=desktop`
//! proceed to full signature verification. Both paths produce the same
//! normalized identity.

use base64::{engine::general_purpose::STANDARD as BASE64, Engine as _};
use chrono::{DateTime, Utc};
use jsonwebtoken::{Algorithm, DecodingKey, Validation};
use librecloud_core::constants::{
    DESKTOP_TOKEN_AUDIENCE, DESKTOP_TOKEN_ISSUER, DESKTOP_TOKEN_TTL_SECS,
};
use librecloud_core::models::Identity;
use librecloud_core::AppError;
use serde::{Deserialize, Serialize};

/// Claims carried by a desktop token in either format.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DesktopClaims {
    pub user_id: String,
    pub email: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub first_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_name: Option<String>,
    /// Discriminator separating desktop tokens from other bearer credentials.
    #[serde(rename = "type")]
    pub token_type: String,
    pub iat: i64,
    pub exp: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub iss: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub aud: Option<String>,
}

impl DesktopClaims {
    fn into_identity(self) -> Identity {
        Identity {
            user_id: self.user_id,
            email: Some(self.email),
            first_name: self.first_name,
            last_name: self.last_name,
        }
    }
}

/// Mints and validates desktop tokens. Cheap to clone; holds only the legacy
/// signing secret.
#[derive(Clone)]
pub struct DesktopTokenCodec {
    legacy_secret: String,
}

impl DesktopTokenCodec {
    pub fn new(legacy_secret: impl Into<String>) -> Self {
        Self {
            legacy_secret: legacy_secret.into(),
        }
    }

    /// Mint a token for `identity` in the primary format. Returns the encoded
    /// token and its expiry instant.
    pub fn mint(
        &self,
        identity: &Identity,
        now: DateTime<Utc>,
    ) -> Result<(String, DateTime<Utc>), AppError> {
        let expires_at = now + chrono::Duration::seconds(DESKTOP_TOKEN_TTL_SECS);
        let claims = DesktopClaims {
            user_id: identity.user_id.clone(),
            email: identity.email.clone().unwrap_or_default(),
            first_name: identity.first_name.clone(),
            last_name: identity.last_name.clone(),
            token_type: "desktop".to_string(),
            iat: now.timestamp(),
            exp: expires_at.timestamp(),
            iss: Some(DESKTOP_TOKEN_ISSUER.to_string()),
            aud: Some(DESKTOP_TOKEN_AUDIENCE.to_string()),
        };
        let json = serde_json::to_vec(&claims)
            .map_err(|e| AppError::Internal(format!("Failed to encode token claims: {e}")))?;
        Ok((BASE64.encode(json), expires_at))
    }

    /// Validate a bearer token in either format and return its identity.
    pub fn decode(&self, token: &str, now: DateTime<Utc>) -> Result<Identity, AppError> {
        if let Some(identity) = self.try_decode_primary(token, now)? {
            return Ok(identity);
        }
        self.try_decode_legacy(token, now)
    }

    /// Primary format: base64 JSON claims. `Ok(None)` means the token is not
    /// in this format at all and the legacy path should run; `Err` means it
    /// was this format but failed validation.
    fn try_decode_primary(
        &self,
        token: &str,
        now: DateTime<Utc>,
    ) -> Result<Option<Identity>, AppError> {
        let bytes = match BASE64.decode(token) {
            Ok(bytes) => bytes,
            Err(_) => return Ok(None),
        };
        let claims: DesktopClaims = match serde_json::from_slice(&bytes) {
            Ok(claims) => claims,
            Err(_) => return Ok(None),
        };

        if claims.token_type != "desktop" {
            return Err(AppError::Unauthorized("Not a desktop token".to_string()));
        }
        if claims.exp <= now.timestamp() {
            return Err(AppError::Unauthorized("Token has expired".to_string()));
        }
        if let Some(iss) = &claims.iss {
            if iss != DESKTOP_TOKEN_ISSUER {
                return Err(AppError::Unauthorized("Invalid token issuer".to_string()));
            }
        }
        if let Some(aud) = &claims.aud {
            if aud != DESKTOP_TOKEN_AUDIENCE {
                return Err(AppError::Unauthorized("Invalid token audience".to_string()));
            }
        }
        if claims.user_id.is_empty() || claims.email.is_empty() {
            return Err(AppError::Unauthorized(
                "Token is missing required claims".to_string(),
            ));
        }

        Ok(Some(claims.into_identity()))
    }

    /// Legacy format: HMAC-signed JWT. Claims are peeked unverified to confirm
    /// this is a desktop token before the signature check runs, so
    /// session-provider JWTs fall through to the session path with a clean
    /// error instead of a misleading signature failure.
    fn try_decode_legacy(&self, token: &str, _now: DateTime<Utc>) -> Result<Identity, AppError> {
        let mut peek = Validation::new(Algorithm::HS256);
        peek.insecure_disable_signature_validation();
        peek.validate_exp = false;
        peek.validate_aud = false;
        peek.required_spec_claims.clear();

        let peeked =
            jsonwebtoken::decode::<DesktopClaims>(token, &DecodingKey::from_secret(&[]), &peek)
                .map_err(|_| AppError::Unauthorized("Invalid token format".to_string()))?;
        if peeked.claims.token_type != "desktop" {
            return Err(AppError::Unauthorized("Not a desktop token".to_string()));
        }

        let mut validation = Validation::new(Algorithm::HS256);
        validation.set_issuer(&[DESKTOP_TOKEN_ISSUER]);
        validation.set_audience(&[DESKTOP_TOKEN_AUDIENCE]);
        validation.required_spec_claims.clear();

        let data = jsonwebtoken::decode::<DesktopClaims>(
            token,
            &DecodingKey::from_secret(self.legacy_secret.as_bytes()),
            &validation,
        )
        .map_err(|e| match e.kind() {
            jsonwebtoken::errors::ErrorKind::ExpiredSignature => {
                AppError::Unauthorized("Token has expired".to_string())
            }
            _ => AppError::Unauthorized("Invalid or expired token".to_string()),
        })?;

        Ok(data.claims.into_identity())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use jsonwebtoken::{encode, EncodingKey, Header};

    fn codec() -> DesktopTokenCodec {
        DesktopTokenCodec::new("test-secret")
    }

    fn identity() -> Identity {
        Identity {
            user_id: "user_2abc".to_string(),
            email: Some("ada@example.com".to_string()),
            first_name: Some("Ada".to_string()),
            last_name: Some("Lovelace".to_string()),
        }
    }

    #[test]
    fn test_mint_then_decode_round_trip() {
        let now = Utc::now();
        let (token, expires_at) = codec().mint(&identity(), now).unwrap();
        assert_eq!(
            expires_at.timestamp(),
            now.timestamp() + DESKTOP_TOKEN_TTL_SECS
        );

        let decoded = codec().decode(&token, now).unwrap();
        assert_eq!(decoded, identity());
    }

    #[test]
    fn test_expired_primary_token_rejected() {
        let now = Utc::now();
        let (token, _) = codec().mint(&identity(), now - chrono::Duration::hours(2)).unwrap();
        let err = codec().decode(&token, now).unwrap_err();
        assert!(matches!(err, AppError::Unauthorized(_)));
    }

    #[test]
    fn test_wrong_type_rejected() {
        let now = Utc::now();
        let claims = serde_json::json!({
            "userId": "user_2abc",
            "email": "ada@example.com",
            "type": "session",
            "iat": now.timestamp(),
            "exp": now.timestamp() + 600,
        });
        let token = BASE64.encode(serde_json::to_vec(&claims).unwrap());
        assert!(codec().decode(&token, now).is_err());
    }

    #[test]
    fn test_wrong_issuer_rejected() {
        let now = Utc::now();
        let claims = serde_json::json!({
            "userId": "user_2abc",
            "email": "ada@example.com",
            "type": "desktop",
            "iat": now.timestamp(),
            "exp": now.timestamp() + 600,
            "iss": "someone-else",
        });
        let token = BASE64.encode(serde_json::to_vec(&claims).unwrap());
        assert!(codec().decode(&token, now).is_err());
    }

    #[test]
    fn test_legacy_signed_jwt_accepted() {
        let now = Utc::now();
        let claims = DesktopClaims {
            user_id: "user_2abc".to_string(),
            email: "ada@example.com".to_string(),
            first_name: Some("Ada".to_string()),
            last_name: Some("Lovelace".to_string()),
            token_type: "desktop".to_string(),
            iat: now.timestamp(),
            exp: now.timestamp() + 600,
            iss: Some(DESKTOP_TOKEN_ISSUER.to_string()),
            aud: Some(DESKTOP_TOKEN_AUDIENCE.to_string()),
        };
        let token = encode(
            &Header::new(Algorithm::HS256),
            &claims,
            &EncodingKey::from_secret(b"test-secret"),
        )
        .unwrap();

        let decoded = codec().decode(&token, now).unwrap();
        assert_eq!(decoded, identity());
    }

    #[test]
    fn test_legacy_jwt_with_bad_signature_rejected() {
        let now = Utc::now();
        let claims = DesktopClaims {
            user_id: "user_2abc".to_string(),
            email: "ada@example.com".to_string(),
            first_name: None,
            last_name: None,
            token_type: "desktop".to_string(),
            iat: now.timestamp(),
            exp: now.timestamp() + 600,
            iss: Some(DESKTOP_TOKEN_ISSUER.to_string()),
            aud: Some(DESKTOP_TOKEN_AUDIENCE.to_string()),
        };
        let token = encode(
            &Header::new(Algorithm::HS256),
            &claims,
            &EncodingKey::from_secret(b"a-different-secret"),
        )
        .unwrap();

        assert!(codec().decode(&token, now).is_err());
    }

    #[test]
    fn test_garbage_token_rejected() {
        assert!(codec().decode("not a token", Utc::now()).is_err());
    }
}
