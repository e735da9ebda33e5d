//! Block storage trait.
//!
//! The store is deliberately ignorant of the `Block` enum itself (defined in
//! `burst-ledger`, which depends on this crate, not the other way around):
//! callers hand over the block's canonical serialized bytes plus a
//! [`Sideband`] describing how to route and interpret the record. This
//! mirrors the one-physical-table-per-variant layout of §4.1 — `send`,
//! `receive`, `open`, `change` are non-state tables; `state_v0`/`state_v1`
//! are split by epoch like the account and pending tables.

use crate::StoreError;
use burst_types::{Amount, BlockHash, Epoch, Timestamp, WalletAddress};
use serde::{Deserialize, Serialize};

/// Which physical table a block belongs to.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BlockVariant {
    Open,
    Send,
    Receive,
    Change,
    State,
}

/// Per-block metadata stored alongside the block body (§3.1 "Sideband").
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Sideband {
    pub variant: BlockVariant,
    /// Owning account. The ledger processor populates this for every variant
    /// (it always knows the account it just resolved) so the `heights` index
    /// can be maintained uniformly; legacy blocks additionally rely on it for
    /// the `frontiers` lookup (§4.1), while state blocks are self-describing
    /// and would not strictly need it stored twice. `None` only appears for
    /// records written before this field existed (pre-migration).
    pub account: Option<WalletAddress>,
    /// Hash of the block whose `previous` equals this block's hash; zero if
    /// this block is currently its account's head (§3.2 invariant 5).
    pub successor: BlockHash,
    /// Account balance immediately after this block.
    pub balance_after: Amount,
    /// Height of this block within its account chain (1 at `open_block`).
    pub height: u64,
    pub timestamp: Timestamp,
    /// Epoch of the owning account at the time this block was appended;
    /// used to route state blocks to `state_v0`/`state_v1`.
    pub epoch: Epoch,
}

/// A block record as the store sees it: opaque bytes plus routing metadata.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoredBlock {
    /// Canonical serialized block bytes (produced by `burst-ledger`'s codec).
    pub bytes: Vec<u8>,
    pub sideband: Sideband,
}

/// Trait for block storage operations over the DAG block-lattice.
pub trait BlockStore {
    fn put_block(&self, hash: &BlockHash, block: &StoredBlock) -> Result<(), StoreError>;

    /// Retrieve a block by hash.
    ///
    /// Implementations probe tables in the order state_v0/v1, send, receive,
    /// open, change (§4.1 "Block raw get") since state blocks dominate at
    /// steady state, returning the first hit.
    fn get_block(&self, hash: &BlockHash) -> Result<Option<StoredBlock>, StoreError>;

    fn exists(&self, hash: &BlockHash) -> Result<bool, StoreError> {
        Ok(self.get_block(hash)?.is_some())
    }

    /// Delete a block (rollback only — §3.3 "Block" lifecycle).
    fn delete_block(&self, hash: &BlockHash) -> Result<(), StoreError>;

    /// Rewrite `hash`'s sideband successor pointer. Used when `hash`'s child
    /// arrives, or re-zeroed when the child is rolled back.
    fn set_successor(&self, hash: &BlockHash, successor: BlockHash) -> Result<(), StoreError>;

    /// Total number of blocks across every table.
    fn block_count(&self) -> Result<u64, StoreError>;

    /// Number of blocks of a given variant (and, for `State`, epoch).
    fn count_by_variant(
        &self,
        variant: BlockVariant,
        epoch: Option<Epoch>,
    ) -> Result<u64, StoreError>;

    /// Choose a variant proportionally to its count, seek a cursor to a
    /// random 256-bit key in its table, and return the next existing entry,
    /// wrapping to the first past the end (§4.1 "Random block sampling").
    fn random_block(&self, seed: [u8; 32]) -> Result<Option<(BlockHash, StoredBlock)>, StoreError>;

    /// Get all block hashes belonging to an account's chain, in ascending
    /// height order (convenience for bootstrap-adjacent tooling).
    fn get_account_blocks(&self, address: &WalletAddress) -> Result<Vec<BlockHash>, StoreError>;
}
