//! Object storage gateway.
//!
//! Issues short-lived, operation-scoped presigned URLs for document payloads
//! and deletes payloads on document removal. The application server never
//! proxies document bytes; clients talk to storage directly through the
//! signed URLs.

mod factory;
mod keys;
mod local;
mod s3;
mod traits;

pub use factory::create_storage;
pub use keys::document_key;
pub use local::LocalStorage;
pub use s3::S3Storage;
pub use traits::{PresignOperation, Storage, StorageError, StorageResult};
