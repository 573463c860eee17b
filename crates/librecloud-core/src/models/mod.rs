//! Data models for the application
//!
//! This module contains the data structures used throughout the application,
//! organized by domain.

mod document;
mod identity;
mod pairing;

// Re-export all models for convenient imports
pub use document::{DocumentRecord, DocumentUpdate};
pub use identity::{AuthScheme, Identity};
pub use pairing::{PairingRecord, PairingStatus};
