//! Representative weight storage trait.
//!
//! Delegated weight is derived from account balances, not stored per-block;
//! this table is the materialized cache the representative crawler and
//! active-elections quorum check read from (§4.1 "Representation").

use crate::StoreError;
use burst_types::{Amount, WalletAddress};

/// Persistent storage for representatives' total delegated weight.
pub trait RepresentationStore {
    /// Add `delta` (may be negative) to a representative's total weight,
    /// creating the entry if absent.
    fn add_weight(&self, rep: &WalletAddress, delta: i128) -> Result<(), StoreError>;

    /// Get a representative's total delegated weight.
    fn get_weight(&self, rep: &WalletAddress) -> Result<Amount, StoreError>;

    /// Iterate over every representative with nonzero weight.
    fn iter_weights(&self) -> Result<Vec<(WalletAddress, Amount)>, StoreError>;

    /// Sum of every representative's weight; should equal the ledger's total
    /// circulating supply.
    fn total_weight(&self) -> Result<Amount, StoreError>;
}
