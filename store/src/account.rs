//! Account storage trait.
//!
//! Backed by two physical tables split by epoch (`accounts_v0`, `accounts_v1`,
//! §4.1); an account moves from v0 to v1 exactly once, by epoch upgrade or by
//! receiving from a v1 pending entry, and never moves back. `iter_accounts`
//! presents a merged, ordered view across both tables.

use crate::StoreError;
use burst_types::{Amount, BlockHash, Epoch, Timestamp, WalletAddress};
use serde::{Deserialize, Serialize};

/// Per-account information stored in the ledger (§3.1 "Account info").
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccountInfo {
    /// Hash of the latest (head) block in this account's chain.
    pub head: BlockHash,
    /// Hash of the most recent block that changed the representative.
    pub rep_block: BlockHash,
    /// Hash of this account's first (opening) block.
    pub open_block: BlockHash,
    /// Current delegated representative.
    pub representative: WalletAddress,
    /// Current balance.
    pub balance: Amount,
    /// Wall-clock time of the most recent block append.
    pub modified_timestamp: Timestamp,
    /// Number of blocks in this account's chain (height of `head`).
    pub block_count: u64,
    /// Epoch this account's chain currently belongs to.
    pub epoch: Epoch,
}

/// Trait for account storage operations.
///
/// Implementations must maintain invariant 3.2.6: `block_count` equals the
/// height of `head`, with heights contiguous from 1 at `open_block`.
pub trait AccountStore {
    fn get_account(&self, address: &WalletAddress) -> Result<Option<AccountInfo>, StoreError>;

    /// Insert or update an account record, routing to the physical table
    /// matching `info.epoch`. If the account previously lived in the other
    /// epoch's table (a v0→v1 promotion), the old record is removed.
    fn put_account(&self, address: &WalletAddress, info: &AccountInfo) -> Result<(), StoreError>;

    fn delete_account(&self, address: &WalletAddress) -> Result<(), StoreError>;

    fn exists(&self, address: &WalletAddress) -> Result<bool, StoreError> {
        Ok(self.get_account(address)?.is_some())
    }

    /// Total number of accounts across both epoch tables.
    fn account_count(&self) -> Result<u64, StoreError>;

    /// Merged, address-ordered iteration across `accounts_v0` and
    /// `accounts_v1`: at each step the lesser key is emitted, v0 preferred on
    /// a tie (§4.1 "Iterators").
    fn iter_accounts(&self) -> Result<Vec<(WalletAddress, AccountInfo)>, StoreError>;
}
