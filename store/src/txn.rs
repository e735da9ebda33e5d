//! Atomic multi-table write transaction for the ledger processor.
//!
//! `process`/`rollback` (§4.3) touch several tables — accounts, blocks,
//! pending, frontiers, representation — and must commit them together
//! (§4.1 "Transactions": "Commit is atomic across tables"). The per-table
//! traits in this crate (`AccountStore`, `BlockStore`, ...) each commit their
//! own transaction for standalone convenience reads/writes; this trait is
//! the one the ledger processor drives instead, so a whole `process` call is
//! exactly one LMDB write transaction.

use crate::account::AccountInfo;
use crate::block::StoredBlock;
use crate::pending::{PendingInfo, PendingKey};
use crate::StoreError;
use burst_types::{Amount, BlockHash, WalletAddress};

/// One atomic write transaction spanning every table the ledger processor
/// touches. Implementations wrap a single underlying database transaction;
/// nothing is visible to other readers until `commit` is called, and
/// dropping without committing discards every operation (§4.1).
pub trait LedgerWriteTxn {
    fn get_account(&self, address: &WalletAddress) -> Result<Option<AccountInfo>, StoreError>;
    fn put_account(&mut self, address: &WalletAddress, info: &AccountInfo) -> Result<(), StoreError>;
    fn delete_account(&mut self, address: &WalletAddress) -> Result<(), StoreError>;

    fn get_block(&self, hash: &BlockHash) -> Result<Option<StoredBlock>, StoreError>;
    fn put_block(&mut self, hash: &BlockHash, block: &StoredBlock) -> Result<(), StoreError>;
    fn delete_block(&mut self, hash: &BlockHash) -> Result<(), StoreError>;
    fn set_successor(&mut self, hash: &BlockHash, successor: BlockHash) -> Result<(), StoreError>;

    fn get_pending(&self, key: &PendingKey) -> Result<Option<PendingInfo>, StoreError>;
    fn put_pending(&mut self, key: &PendingKey, info: &PendingInfo) -> Result<(), StoreError>;
    fn delete_pending(&mut self, key: &PendingKey) -> Result<(), StoreError>;

    fn get_frontier(&self, hash: &BlockHash) -> Result<Option<WalletAddress>, StoreError>;
    fn put_frontier(&mut self, hash: &BlockHash, account: &WalletAddress) -> Result<(), StoreError>;
    fn delete_frontier(&mut self, hash: &BlockHash) -> Result<(), StoreError>;

    fn get_weight(&self, rep: &WalletAddress) -> Result<Amount, StoreError>;
    /// Add `delta` (may be negative) to a representative's total delegated
    /// weight (§4.3 per-variant representation updates).
    fn add_weight(&mut self, rep: &WalletAddress, delta: i128) -> Result<(), StoreError>;

    /// Every block hash belonging to `account`, ordered by height. Used by
    /// rollback's cascade to locate the block that claimed a pending credit
    /// when the pending entry itself has already been consumed.
    fn get_account_blocks(&self, account: &WalletAddress) -> Result<Vec<BlockHash>, StoreError>;

    /// Commit every operation performed through this handle in one atomic
    /// transaction.
    fn commit(self) -> Result<(), StoreError>;
}
