//! LibreCloud Core Library
//!
//! This crate provides the domain models, error types, configuration, and validation
//! shared across all LibreCloud components.

pub mod config;
pub mod constants;
pub mod error;
pub mod models;
pub mod validation;

// Re-export commonly used types
pub use config::{Config, StorageBackend, StoreBackend};
pub use error::{AppError, ErrorMetadata, LogLevel};
pub use models::{
    AuthScheme, DocumentRecord, DocumentUpdate, Identity, PairingRecord, PairingStatus,
};
