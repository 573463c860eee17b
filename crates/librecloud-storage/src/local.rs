use crate::traits::{PresignOperation, Storage, StorageError, StorageResult};
use async_trait::async_trait;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Local filesystem storage for development and tests.
///
/// Real presigning needs a signing backend, so the "presigned" URLs here are
/// plain URLs under `base_url` tagged with the authorized operation and
/// lifetime. They carry no signature and must never be used outside local
/// setups.
#[derive(Clone)]
pub struct LocalStorage {
    base_path: PathBuf,
    base_url: String,
}

impl LocalStorage {
    pub async fn new(base_path: impl Into<PathBuf>, base_url: String) -> StorageResult<Self> {
        let base_path = base_path.into();
        tokio::fs::create_dir_all(&base_path).await?;
        Ok(Self {
            base_path,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    fn key_to_path(&self, key: &str) -> StorageResult<PathBuf> {
        // Reject anything that could escape the base directory.
        if key.split('/').any(|part| {
            part.is_empty() || part == "." || part == ".." || part.contains('\\')
        }) {
            return Err(StorageError::InvalidKey(key.to_string()));
        }
        Ok(self.base_path.join(key))
    }

    fn url_for(&self, key: &str, operation: PresignOperation, expires_in: Duration) -> String {
        format!(
            "{}/{}?op={}&expires={}",
            self.base_url,
            key,
            operation,
            expires_in.as_secs()
        )
    }

    async fn ensure_parent_dir(&self, path: &Path) -> StorageResult<()> {
        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }
        Ok(())
    }

    /// Write an object directly. Test helper standing in for the client-side
    /// PUT that would hit a real presigned URL.
    pub async fn put_object(&self, key: &str, data: &[u8]) -> StorageResult<()> {
        let path = self.key_to_path(key)?;
        self.ensure_parent_dir(&path).await?;
        tokio::fs::write(&path, data).await?;
        Ok(())
    }
}

#[async_trait]
impl Storage for LocalStorage {
    async fn presigned_put_url(
        &self,
        key: &str,
        _content_type: &str,
        expires_in: Duration,
    ) -> StorageResult<String> {
        let path = self.key_to_path(key)?;
        self.ensure_parent_dir(&path).await?;
        Ok(self.url_for(key, PresignOperation::Put, expires_in))
    }

    async fn presigned_get_url(&self, key: &str, expires_in: Duration) -> StorageResult<String> {
        self.key_to_path(key)?;
        Ok(self.url_for(key, PresignOperation::Get, expires_in))
    }

    async fn delete(&self, key: &str) -> StorageResult<()> {
        let path = self.key_to_path(key)?;
        match tokio::fs::remove_file(&path).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(StorageError::DeleteFailed(e.to_string())),
        }
    }

    async fn exists(&self, key: &str) -> StorageResult<bool> {
        let path = self.key_to_path(key)?;
        Ok(tokio::fs::try_exists(&path).await?)
    }

    fn backend_name(&self) -> &'static str {
        "local"
    }
}
