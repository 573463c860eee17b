//! Desktop pairing flow.
//!
//! Three phases, all keyed by a server-generated nonce:
//!
//! 1. `initiate` creates a `pending` record and hands the desktop client a
//!    browser login URL embedding the nonce.
//! 2. `complete` runs when the browser sign-in finishes: it snapshots the
//!    signed-in identity onto the record and moves it to `ready`.
//! 3. `poll` is the desktop client's loop: it reports progress until the
//!    record is `ready`, then consumes it and mints a bearer token. The
//!    consume is a conditional write, so concurrent polls for the same nonce
//!    mint at most one token.
//!
//! Expiry is evaluated on read against `expires_at` and always wins over
//! stored status.

use crate::auth::token::DesktopTokenCodec;
use chrono::{DateTime, Utc};
use librecloud_core::constants::PAIRING_TTL;
use librecloud_core::models::{Identity, PairingRecord, PairingStatus};
use librecloud_core::AppError;
use librecloud_db::PairingStore;
use std::sync::Arc;
use uuid::Uuid;

/// What a poll observed. Terminal variants (`Expired`, `Issued`,
/// `AlreadyConsumed`) mean the client must stop polling this nonce.
#[derive(Debug)]
pub enum PollOutcome {
    /// No record for this nonce.
    NotFound,
    /// Record exists but its deadline has passed; reported regardless of
    /// stored status.
    Expired,
    /// Browser sign-in has not completed yet; keep polling.
    Pending,
    /// This poll won the consume race; the token is minted exactly once.
    Issued {
        token: String,
        expires_at: DateTime<Utc>,
        user: Identity,
    },
    /// A previous poll already consumed this nonce.
    AlreadyConsumed,
}

/// Outcome of the browser-side completion step.
#[derive(Debug, PartialEq, Eq)]
pub enum CompleteOutcome {
    Completed,
    NotFound,
    Expired,
    /// Record was no longer `pending`; completion happens at most once.
    AlreadyCompleted,
}

#[derive(Clone)]
pub struct PairingService {
    store: Arc<dyn PairingStore>,
    codec: DesktopTokenCodec,
}

impl PairingService {
    pub fn new(store: Arc<dyn PairingStore>, codec: DesktopTokenCodec) -> Self {
        Self { store, codec }
    }

    /// Create a fresh pending record and return it.
    #[tracing::instrument(skip(self))]
    pub async fn initiate(&self, client_ip: Option<String>) -> Result<PairingRecord, AppError> {
        let now = Utc::now();
        let record = PairingRecord::pending(
            Uuid::new_v4(),
            now,
            now + chrono::Duration::from_std(PAIRING_TTL)
                .map_err(|e| AppError::Internal(e.to_string()))?,
            client_ip,
        );
        self.store.put(record.clone()).await?;
        tracing::info!(nonce = %record.nonce, "Pairing initiated");
        Ok(record)
    }

    /// Attach the signed-in identity and move the record to `ready`.
    #[tracing::instrument(skip(self, identity), fields(user_id = %identity.user_id))]
    pub async fn complete(
        &self,
        nonce: Uuid,
        identity: Identity,
    ) -> Result<CompleteOutcome, AppError> {
        let now = Utc::now();
        let Some(record) = self.store.get(nonce).await? else {
            return Ok(CompleteOutcome::NotFound);
        };
        if record.is_expired(now) {
            return Ok(CompleteOutcome::Expired);
        }
        if self.store.mark_ready(nonce, identity, now).await? {
            tracing::info!(nonce = %nonce, "Pairing marked ready");
            Ok(CompleteOutcome::Completed)
        } else {
            Ok(CompleteOutcome::AlreadyCompleted)
        }
    }

    /// One iteration of the desktop client's poll loop.
    #[tracing::instrument(skip(self))]
    pub async fn poll(&self, nonce: Uuid) -> Result<PollOutcome, AppError> {
        let now = Utc::now();
        let Some(record) = self.store.get(nonce).await? else {
            return Ok(PollOutcome::NotFound);
        };

        // Expiry beats status: a ready-but-expired record never yields a token.
        if record.is_expired(now) {
            return Ok(PollOutcome::Expired);
        }

        match record.status {
            PairingStatus::Pending => Ok(PollOutcome::Pending),
            PairingStatus::Consumed => Ok(PollOutcome::AlreadyConsumed),
            PairingStatus::Ready => {
                // The identity snapshot is written in the same conditional
                // update that sets `ready`; a ready record without one is
                // corrupt.
                let user = record.user.clone().ok_or_else(|| {
                    AppError::Internal(format!("Ready pairing record {nonce} has no identity"))
                })?;

                if !self.store.consume(nonce, now).await? {
                    // Lost the race to a concurrent poll.
                    return Ok(PollOutcome::AlreadyConsumed);
                }

                let (token, expires_at) = self.codec.mint(&user, now)?;
                tracing::info!(nonce = %nonce, user_id = %user.user_id, "Desktop token issued");
                Ok(PollOutcome::Issued {
                    token,
                    expires_at,
                    user,
                })
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use librecloud_db::MemoryPairingStore;

    fn service() -> PairingService {
        service_with_store(Arc::new(MemoryPairingStore::new()))
    }

    fn service_with_store(store: Arc<dyn PairingStore>) -> PairingService {
        PairingService::new(store, DesktopTokenCodec::new("test-secret"))
    }

    fn identity() -> Identity {
        Identity {
            user_id: "user_1".to_string(),
            email: Some("ada@example.com".to_string()),
            first_name: None,
            last_name: None,
        }
    }

    #[tokio::test]
    async fn test_full_flow_issues_token_once() {
        let svc = service();
        let record = svc.initiate(Some("203.0.113.1".to_string())).await.unwrap();

        assert!(matches!(
            svc.poll(record.nonce).await.unwrap(),
            PollOutcome::Pending
        ));

        assert_eq!(
            svc.complete(record.nonce, identity()).await.unwrap(),
            CompleteOutcome::Completed
        );

        match svc.poll(record.nonce).await.unwrap() {
            PollOutcome::Issued { user, .. } => assert_eq!(user.user_id, "user_1"),
            other => panic!("expected Issued, got {other:?}"),
        }

        // Second poll after consumption is terminal.
        assert!(matches!(
            svc.poll(record.nonce).await.unwrap(),
            PollOutcome::AlreadyConsumed
        ));
    }

    #[tokio::test]
    async fn test_unknown_nonce_not_found() {
        let svc = service();
        assert!(matches!(
            svc.poll(Uuid::new_v4()).await.unwrap(),
            PollOutcome::NotFound
        ));
        assert_eq!(
            svc.complete(Uuid::new_v4(), identity()).await.unwrap(),
            CompleteOutcome::NotFound
        );
    }

    #[tokio::test]
    async fn test_complete_is_idempotent_rejecting() {
        let svc = service();
        let record = svc.initiate(None).await.unwrap();
        svc.complete(record.nonce, identity()).await.unwrap();
        assert_eq!(
            svc.complete(record.nonce, identity()).await.unwrap(),
            CompleteOutcome::AlreadyCompleted
        );
    }

    #[tokio::test]
    async fn test_expired_record_reported_expired_even_when_ready() {
        let store: Arc<dyn PairingStore> = Arc::new(MemoryPairingStore::new());
        let svc = service_with_store(store.clone());

        let now = Utc::now();
        let nonce = Uuid::new_v4();
        let record = PairingRecord::pending(
            nonce,
            now - chrono::Duration::minutes(10),
            now - chrono::Duration::minutes(5),
            None,
        );
        store.put(record).await.unwrap();
        store
            .mark_ready(nonce, identity(), now - chrono::Duration::minutes(6))
            .await
            .unwrap();

        assert!(matches!(
            svc.poll(nonce).await.unwrap(),
            PollOutcome::Expired
        ));
        assert_eq!(
            svc.complete(nonce, identity()).await.unwrap(),
            CompleteOutcome::Expired
        );
    }

    #[tokio::test]
    async fn test_concurrent_polls_mint_at_most_one_token() {
        let svc = service();
        let record = svc.initiate(None).await.unwrap();
        svc.complete(record.nonce, identity()).await.unwrap();

        let mut handles = Vec::new();
        for _ in 0..16 {
            let svc = svc.clone();
            let nonce = record.nonce;
            handles.push(tokio::spawn(async move { svc.poll(nonce).await.unwrap() }));
        }

        let mut issued = 0;
        for handle in handles {
            if matches!(handle.await.unwrap(), PollOutcome::Issued { .. }) {
                issued += 1;
            }
        }
        assert_eq!(issued, 1);
    }
}
