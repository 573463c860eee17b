use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter, Result as FmtResult};
use uuid::Uuid;

use super::Identity;

/// Stored status of a pairing attempt.
///
/// Status only ever moves forward: `Pending -> Ready -> Consumed`. Expiry is
/// not a stored status; every reader derives it from `expires_at` at read
/// time, so a record whose deadline has passed is dead regardless of what is
/// stored here.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PairingStatus {
    Pending,
    Ready,
    Consumed,
}

impl Display for PairingStatus {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        match self {
            PairingStatus::Pending => write!(f, "pending"),
            PairingStatus::Ready => write!(f, "ready"),
            PairingStatus::Consumed => write!(f, "consumed"),
        }
    }
}

impl PairingStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            PairingStatus::Pending => "pending",
            PairingStatus::Ready => "ready",
            PairingStatus::Consumed => "consumed",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "pending" => Some(PairingStatus::Pending),
            "ready" => Some(PairingStatus::Ready),
            "consumed" => Some(PairingStatus::Consumed),
            _ => None,
        }
    }
}

/// One desktop pairing attempt, keyed by its nonce.
///
/// Created `pending` by initiation, moved to `ready` (with an identity
/// snapshot) when the browser sign-in completes, and to `consumed` by the
/// poll that mints the token. Records are never deleted; they become
/// permanently invalid once `expires_at` passes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PairingRecord {
    pub nonce: Uuid,
    pub status: PairingStatus,
    pub expires_at: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ready_at: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub consumed_at: Option<DateTime<Utc>>,
    /// Identity attached at the pending -> ready transition, immutable after.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user: Option<Identity>,
    /// Informational only, captured at creation.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub client_ip: Option<String>,
}

impl PairingRecord {
    /// Create a fresh pending record.
    pub fn pending(
        nonce: Uuid,
        created_at: DateTime<Utc>,
        expires_at: DateTime<Utc>,
        client_ip: Option<String>,
    ) -> Self {
        Self {
            nonce,
            status: PairingStatus::Pending,
            expires_at,
            created_at,
            ready_at: None,
            consumed_at: None,
            user: None,
            client_ip,
        }
    }

    /// Whether the record is logically dead at `now`, regardless of status.
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        now > self.expires_at
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    #[test]
    fn test_expiry_is_derived_not_stored() {
        let now = Utc::now();
        let mut record = PairingRecord::pending(
            Uuid::new_v4(),
            now - Duration::minutes(10),
            now - Duration::minutes(5),
            None,
        );
        record.status = PairingStatus::Ready;
        // Still `ready` in the store, but dead for every reader.
        assert!(record.is_expired(now));
    }

    #[test]
    fn test_status_parse_round_trip() {
        for status in [
            PairingStatus::Pending,
            PairingStatus::Ready,
            PairingStatus::Consumed,
        ] {
            assert_eq!(PairingStatus::parse(status.as_str()), Some(status));
        }
        assert_eq!(PairingStatus::parse("expired"), None);
    }
}
