use crate::{LocalStorage, S3Storage, Storage, StorageError, StorageResult};
use librecloud_core::{Config, StorageBackend};
use std::sync::Arc;

/// Create a storage backend based on configuration
pub async fn create_storage(config: &Config) -> StorageResult<Arc<dyn Storage>> {
    match config.storage_backend {
        StorageBackend::S3 => {
            let bucket = config
                .s3_bucket
                .clone()
                .ok_or_else(|| StorageError::ConfigError("S3_BUCKET not configured".to_string()))?;
            let region = config.s3_region.clone().ok_or_else(|| {
                StorageError::ConfigError("S3_REGION or AWS_REGION not configured".to_string())
            })?;

            let storage = S3Storage::new(bucket, region, config.s3_endpoint.clone())?;
            Ok(Arc::new(storage))
        }
        StorageBackend::Local => {
            let base_path = config
                .local_storage_path
                .clone()
                .unwrap_or_else(|| std::env::temp_dir().join("librecloud-storage").display().to_string());
            let base_url = config
                .local_storage_base_url
                .clone()
                .unwrap_or_else(|| format!("{}/files", config.base_url));

            let storage = LocalStorage::new(base_path, base_url).await?;
            Ok(Arc::new(storage))
        }
    }
}
