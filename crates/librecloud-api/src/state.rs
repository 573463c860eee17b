//! Shared application state.

use crate::middleware::rate_limit::FixedWindowLimiter;
use crate::services::pairing::PairingService;
use librecloud_core::Config;
use librecloud_db::DocumentStore;
use librecloud_storage::Storage;
use std::sync::Arc;

/// Everything handlers need, cloned per request. All fields are cheap clones
/// (Arcs or small values).
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub pairing: PairingService,
    pub documents: Arc<dyn DocumentStore>,
    pub storage: Arc<dyn Storage>,
    /// Owned here and injected into handlers, never a process-wide global.
    pub limiter: FixedWindowLimiter,
}
