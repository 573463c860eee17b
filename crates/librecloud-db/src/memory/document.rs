use async_trait::async_trait;
use chrono::Utc;
use librecloud_core::models::{DocumentRecord, DocumentUpdate};
use librecloud_core::AppError;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::Mutex;
use uuid::Uuid;

use crate::traits::DocumentStore;

/// Mutex-guarded map of document records keyed by `(user_id, doc_id)`.
#[derive(Clone, Default)]
pub struct MemoryDocumentStore {
    records: Arc<Mutex<HashMap<(String, Uuid), DocumentRecord>>>,
}

impl MemoryDocumentStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl DocumentStore for MemoryDocumentStore {
    async fn create(&self, record: DocumentRecord) -> Result<(), AppError> {
        self.records
            .lock()
            .await
            .insert((record.user_id.clone(), record.doc_id), record);
        Ok(())
    }

    async fn get(&self, user_id: &str, doc_id: Uuid) -> Result<Option<DocumentRecord>, AppError> {
        Ok(self
            .records
            .lock()
            .await
            .get(&(user_id.to_string(), doc_id))
            .cloned())
    }

    async fn list(&self, user_id: &str) -> Result<Vec<DocumentRecord>, AppError> {
        let records = self.records.lock().await;
        let mut documents: Vec<DocumentRecord> = records
            .values()
            .filter(|record| record.user_id == user_id)
            .cloned()
            .collect();
        documents.sort_by(|a, b| b.uploaded_at.cmp(&a.uploaded_at));
        Ok(documents)
    }

    async fn update(
        &self,
        user_id: &str,
        doc_id: Uuid,
        changes: DocumentUpdate,
    ) -> Result<Option<DocumentRecord>, AppError> {
        let mut records = self.records.lock().await;
        let Some(record) = records.get_mut(&(user_id.to_string(), doc_id)) else {
            return Ok(None);
        };
        if let Some(file_name) = changes.file_name {
            record.file_name = file_name;
        }
        if let Some(file_size) = changes.file_size {
            record.file_size = file_size;
        }
        record.last_modified = changes.last_modified.unwrap_or_else(Utc::now);
        Ok(Some(record.clone()))
    }

    async fn delete(&self, user_id: &str, doc_id: Uuid) -> Result<bool, AppError> {
        Ok(self
            .records
            .lock()
            .await
            .remove(&(user_id.to_string(), doc_id))
            .is_some())
    }
}
