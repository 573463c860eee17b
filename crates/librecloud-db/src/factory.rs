//! Store backend selection from configuration.

use anyhow::Result;
use librecloud_core::{Config, StoreBackend};
use std::sync::Arc;

use crate::{
    MemoryDocumentStore, MemoryPairingStore, PgDocumentStore, PgPairingStore,
};
use crate::{DocumentStore, PairingStore};

/// Create the pairing and document stores configured by `STORE_BACKEND`.
pub async fn create_stores(
    config: &Config,
) -> Result<(Arc<dyn PairingStore>, Arc<dyn DocumentStore>)> {
    match config.store_backend {
        StoreBackend::Postgres => {
            // Validated by Config::validate, but don't panic if called with a
            // hand-built config.
            let database_url = config
                .database_url
                .as_deref()
                .ok_or_else(|| anyhow::anyhow!("DATABASE_URL not configured"))?;
            let pool = crate::postgres::setup_pool(database_url).await?;
            Ok((
                Arc::new(PgPairingStore::new(pool.clone())),
                Arc::new(PgDocumentStore::new(pool)),
            ))
        }
        StoreBackend::Memory => {
            tracing::warn!("Using in-memory stores; records do not survive restart");
            Ok((
                Arc::new(MemoryPairingStore::new()),
                Arc::new(MemoryDocumentStore::new()),
            ))
        }
    }
}
