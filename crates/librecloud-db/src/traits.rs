//! Store traits for pairing and document records.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use librecloud_core::models::{DocumentRecord, DocumentUpdate, Identity, PairingRecord};
use librecloud_core::AppError;
use uuid::Uuid;

/// One record per pairing attempt, keyed by nonce.
///
/// Transitions are forward-only. Backends rely on per-key atomicity:
/// `mark_ready` and `consume` are conditional writes that succeed for exactly
/// one caller when raced.
#[async_trait]
pub trait PairingStore: Send + Sync {
    /// Insert a fresh pending record. Nonces are never reused, so this is a
    /// plain insert.
    async fn put(&self, record: PairingRecord) -> Result<(), AppError>;

    /// Fetch a record by nonce. Expiry is the caller's concern; stored state
    /// is returned as-is.
    async fn get(&self, nonce: Uuid) -> Result<Option<PairingRecord>, AppError>;

    /// Conditionally transition `pending -> ready` and attach the identity
    /// snapshot. Returns `false` when the record is missing or no longer
    /// pending.
    async fn mark_ready(
        &self,
        nonce: Uuid,
        identity: Identity,
        ready_at: DateTime<Utc>,
    ) -> Result<bool, AppError>;

    /// Conditionally transition `ready -> consumed`. Returns `false` when the
    /// record is missing or not currently `ready` — concurrent consumers race
    /// here and exactly one wins.
    async fn consume(&self, nonce: Uuid, consumed_at: DateTime<Utc>) -> Result<bool, AppError>;
}

/// Per-user document metadata, keyed by `(user_id, doc_id)`.
#[async_trait]
pub trait DocumentStore: Send + Sync {
    async fn create(&self, record: DocumentRecord) -> Result<(), AppError>;

    async fn get(&self, user_id: &str, doc_id: Uuid) -> Result<Option<DocumentRecord>, AppError>;

    /// All documents for a user, newest upload first.
    async fn list(&self, user_id: &str) -> Result<Vec<DocumentRecord>, AppError>;

    /// Owner-conditioned partial update. `last_modified` is always refreshed
    /// (to `changes.last_modified` when supplied, otherwise now), even for an
    /// otherwise empty change set. Returns `None` when no record exists for
    /// this `(user_id, doc_id)` — an update against someone else's document
    /// must not silently succeed.
    async fn update(
        &self,
        user_id: &str,
        doc_id: Uuid,
        changes: DocumentUpdate,
    ) -> Result<Option<DocumentRecord>, AppError>;

    /// Owner-conditioned delete. Returns `false` when nothing was deleted.
    async fn delete(&self, user_id: &str, doc_id: Uuid) -> Result<bool, AppError>;
}
