//! Frontier storage trait.
//!
//! A frontier maps a non-state block's hash to its owning account (§4.1
//! "Frontiers" — legacy lookup table; state blocks carry their account in the
//! block body and never need this). Distinct from the in-memory
//! `DagFrontier` convenience map in `burst-ledger`, which tracks *heads*, not
//! this hash-to-account index.

use crate::StoreError;
use burst_types::{BlockHash, WalletAddress};

/// Trait for the legacy non-state-block hash-to-account index.
pub trait FrontierStore {
    /// Record that `hash` (a non-state block) belongs to `account`.
    fn put_frontier(&self, hash: &BlockHash, account: &WalletAddress) -> Result<(), StoreError>;

    /// Look up the owning account of a non-state block hash.
    fn get_frontier(&self, hash: &BlockHash) -> Result<Option<WalletAddress>, StoreError>;

    /// Remove a frontier entry (rollback of a non-state block).
    fn delete_frontier(&self, hash: &BlockHash) -> Result<(), StoreError>;

    /// Iterate over all frontier entries, returning `(hash, account)` pairs
    /// ordered by hash.
    fn iter_frontiers(&self) -> Result<Vec<(BlockHash, WalletAddress)>, StoreError>;

    /// Total number of frontier entries.
    fn frontier_count(&self) -> Result<u64, StoreError>;
}
