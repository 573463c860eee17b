//! Storage abstraction trait.

use async_trait::async_trait;
use std::fmt::{Display, Formatter, Result as FmtResult};
use std::time::Duration;
use thiserror::Error;

/// Storage operation errors
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Delete failed: {0}")]
    DeleteFailed(String),

    #[error("Invalid storage key: {0}")]
    InvalidKey(String),

    #[error("Storage backend error: {0}")]
    BackendError(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Configuration error: {0}")]
    ConfigError(String),
}

/// Result type for storage operations
pub type StorageResult<T> = Result<T, StorageError>;

/// Which single operation a presigned URL authorizes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PresignOperation {
    Put,
    Get,
}

impl Display for PresignOperation {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        match self {
            PresignOperation::Put => write!(f, "put"),
            PresignOperation::Get => write!(f, "get"),
        }
    }
}

/// Storage abstraction trait.
///
/// Backends issue presigned URLs scoped to exactly one operation and remove
/// payloads. Keys follow the `{user_id}/{doc_id}` format from `keys.rs`.
#[async_trait]
pub trait Storage: Send + Sync {
    /// Generate a presigned PUT URL for a direct client upload.
    async fn presigned_put_url(
        &self,
        key: &str,
        content_type: &str,
        expires_in: Duration,
    ) -> StorageResult<String>;

    /// Generate a presigned GET URL for a direct client download.
    async fn presigned_get_url(&self, key: &str, expires_in: Duration) -> StorageResult<String>;

    /// Delete an object. Deleting a missing object is not an error.
    async fn delete(&self, key: &str) -> StorageResult<()>;

    /// Check whether an object exists.
    async fn exists(&self, key: &str) -> StorageResult<bool>;

    /// Human-readable backend name for logs.
    fn backend_name(&self) -> &'static str;
}
