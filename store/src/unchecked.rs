//! Unchecked (gap cache) storage trait.
//!
//! Blocks that arrive before a dependency they need are held here, keyed on
//! the missing hash, until that dependency is satisfied (§4.4 "Gap cache").

use crate::StoreError;
use burst_types::{BlockHash, Timestamp};
use serde::{Deserialize, Serialize};

/// Which dependency a block is waiting on.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum GapType {
    /// Waiting on its `previous` block.
    Previous,
    /// A `receive`/`open`/state-receive waiting on its `source` send.
    Source,
    /// A state block waiting on the epoch-authority's epoch block.
    EpochOpenPending,
}

/// An entry in the unchecked table: a block body plus what it's waiting on.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct UncheckedInfo {
    pub block_bytes: Vec<u8>,
    pub gap_type: GapType,
    pub received: Timestamp,
}

/// Trait for the gap cache.
pub trait UncheckedStore {
    /// Hold `info` under the hash it's waiting on.
    fn put(&self, waiting_on: &BlockHash, info: &UncheckedInfo) -> Result<(), StoreError>;

    /// Retrieve and remove every entry waiting on `hash`, in arrival order.
    fn take(&self, waiting_on: &BlockHash) -> Result<Vec<UncheckedInfo>, StoreError>;

    fn exists(&self, waiting_on: &BlockHash) -> Result<bool, StoreError>;

    /// Total number of held entries, across all waited-on hashes.
    fn count(&self) -> Result<u64, StoreError>;

    /// Drop every entry received before `cutoff` (§6 "unchecked cutoff age").
    fn trim_older_than(&self, cutoff: Timestamp) -> Result<usize, StoreError>;
}
