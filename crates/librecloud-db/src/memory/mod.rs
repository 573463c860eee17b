//! In-process store backends.
//!
//! Used by the test suites and for local development without Postgres. Both
//! stores keep every record behind one `tokio::sync::Mutex`, which gives the
//! same per-key atomicity the conditional UPDATEs provide on Postgres: the
//! compare half and the set half of `mark_ready`/`consume` happen under the
//! lock.

mod document;
mod pairing;

pub use document::MemoryDocumentStore;
pub use pairing::MemoryPairingStore;
