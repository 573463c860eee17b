//! Store contracts and backends for pairing and document records.
//!
//! The pairing and document tables are externally-managed key-value stores by
//! contract; this crate pins that contract down as the `PairingStore` and
//! `DocumentStore` traits and ships two backends: Postgres (sqlx, production)
//! and an in-process map (tests, local development). The one correctness-
//! critical piece is `PairingStore::consume`: it must be a conditional
//! `ready -> consumed` transition so concurrent polls can never both mint a
//! token.

mod memory;
mod postgres;
mod traits;

pub mod factory;

pub use memory::{MemoryDocumentStore, MemoryPairingStore};
pub use postgres::{setup_pool, PgDocumentStore, PgPairingStore};
pub use traits::{DocumentStore, PairingStore};
