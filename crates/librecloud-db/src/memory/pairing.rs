use async_trait::async_trait;
use chrono::{DateTime, Utc};
use librecloud_core::models::{Identity, PairingRecord, PairingStatus};
use librecloud_core::AppError;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::Mutex;
use uuid::Uuid;

use crate::traits::PairingStore;

/// Mutex-guarded map of pairing records.
#[derive(Clone, Default)]
pub struct MemoryPairingStore {
    records: Arc<Mutex<HashMap<Uuid, PairingRecord>>>,
}

impl MemoryPairingStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl PairingStore for MemoryPairingStore {
    async fn put(&self, record: PairingRecord) -> Result<(), AppError> {
        self.records.lock().await.insert(record.nonce, record);
        Ok(())
    }

    async fn get(&self, nonce: Uuid) -> Result<Option<PairingRecord>, AppError> {
        Ok(self.records.lock().await.get(&nonce).cloned())
    }

    async fn mark_ready(
        &self,
        nonce: Uuid,
        identity: Identity,
        ready_at: DateTime<Utc>,
    ) -> Result<bool, AppError> {
        let mut records = self.records.lock().await;
        match records.get_mut(&nonce) {
            Some(record) if record.status == PairingStatus::Pending => {
                record.status = PairingStatus::Ready;
                record.ready_at = Some(ready_at);
                record.user = Some(identity);
                Ok(true)
            }
            _ => Ok(false),
        }
    }

    async fn consume(&self, nonce: Uuid, consumed_at: DateTime<Utc>) -> Result<bool, AppError> {
        let mut records = self.records.lock().await;
        match records.get_mut(&nonce) {
            Some(record) if record.status == PairingStatus::Ready => {
                record.status = PairingStatus::Consumed;
                record.consumed_at = Some(consumed_at);
                Ok(true)
            }
            _ => Ok(false),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn pending_record(nonce: Uuid) -> PairingRecord {
        let now = Utc::now();
        PairingRecord::pending(nonce, now, now + Duration::minutes(5), None)
    }

    #[tokio::test]
    async fn test_forward_only_transitions() {
        let store = MemoryPairingStore::new();
        let nonce = Uuid::new_v4();
        store.put(pending_record(nonce)).await.unwrap();

        // Consume before ready must fail.
        assert!(!store.consume(nonce, Utc::now()).await.unwrap());

        assert!(store
            .mark_ready(nonce, Identity::new("user_1"), Utc::now())
            .await
            .unwrap());
        // Second mark_ready is a no-op: status is no longer pending.
        assert!(!store
            .mark_ready(nonce, Identity::new("user_2"), Utc::now())
            .await
            .unwrap());

        let record = store.get(nonce).await.unwrap().unwrap();
        assert_eq!(record.status, PairingStatus::Ready);
        assert_eq!(record.user.as_ref().unwrap().user_id, "user_1");

        assert!(store.consume(nonce, Utc::now()).await.unwrap());
        assert!(!store.consume(nonce, Utc::now()).await.unwrap());
    }

    #[tokio::test]
    async fn test_mark_ready_on_unknown_nonce_is_false() {
        let store = MemoryPairingStore::new();
        assert!(!store
            .mark_ready(Uuid::new_v4(), Identity::new("user_1"), Utc::now())
            .await
            .unwrap());
    }

    #[tokio::test]
    async fn test_concurrent_consume_has_exactly_one_winner() {
        let store = MemoryPairingStore::new();
        let nonce = Uuid::new_v4();
        store.put(pending_record(nonce)).await.unwrap();
        store
            .mark_ready(nonce, Identity::new("user_1"), Utc::now())
            .await
            .unwrap();

        let mut handles = Vec::new();
        for _ in 0..16 {
            let store = store.clone();
            handles.push(tokio::spawn(
                async move { store.consume(nonce, Utc::now()).await },
            ));
        }

        let mut winners = 0;
        for handle in handles {
            if handle.await.unwrap().unwrap() {
                winners += 1;
            }
        }
        assert_eq!(winners, 1);
    }
}
