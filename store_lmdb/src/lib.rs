//! LMDB storage backend for the BURST protocol ledger.
//!
//! Implements every storage trait from `burst-store` on a single
//! `LmdbEnvironment` using the `heed` LMDB bindings, split across named
//! databases per §4.1's table layout.

pub mod account;
pub mod block;
pub mod environment;
pub mod error;
pub mod frontier;
pub mod meta;
pub mod migration;
pub mod online_weight;
pub mod peer;
pub mod pending;
pub mod representation;
pub mod unchecked;
pub mod vote;
pub mod write_batch;

pub use environment::LmdbEnvironment;
pub use error::LmdbError;
pub use migration::{Migrator, CURRENT_SCHEMA_VERSION};
pub use write_batch::WriteBatch;

/// Convenience alias — the unified LMDB store wrapping every sub-store.
pub type LmdbStore = LmdbEnvironment;
