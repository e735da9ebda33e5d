//! Pending receive storage trait.
//!
//! Mirrors the account split: `pending_v0`/`pending_v1`, keyed on the epoch of
//! the *send* block that created the entry, not the destination's own epoch
//! (§4.1 "Pending"). Receiving a v1 pending is one of the two ways an account
//! is promoted to v1 (§3.2 "Epoch promotion").

use crate::StoreError;
use burst_types::{Amount, BlockHash, Epoch, WalletAddress};
use serde::{Deserialize, Serialize};

/// Composite key identifying a pending entry: the destination account and the
/// hash of the send block that created it.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PendingKey {
    pub destination: WalletAddress,
    pub source_hash: BlockHash,
}

/// Information about a pending incoming transfer (§3.1 "Pending info").
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PendingInfo {
    /// Account that sent the funds.
    pub source: WalletAddress,
    pub amount: Amount,
    /// Epoch of the send block that created this entry.
    pub epoch: Epoch,
}

/// Trait for tracking pending receives.
pub trait PendingStore {
    /// Record a pending receive, routing to `pending_v0`/`pending_v1` by
    /// `info.epoch`.
    fn put_pending(&self, key: &PendingKey, info: &PendingInfo) -> Result<(), StoreError>;

    /// Retrieve a specific pending receive, probing both epoch tables.
    fn get_pending(&self, key: &PendingKey) -> Result<Option<PendingInfo>, StoreError>;

    fn exists(&self, key: &PendingKey) -> Result<bool, StoreError> {
        Ok(self.get_pending(key)?.is_some())
    }

    /// Delete a pending receive (once it has been pocketed by a receive or
    /// open block).
    fn delete_pending(&self, key: &PendingKey) -> Result<(), StoreError>;

    /// Get all pending receives for a given destination account, merged
    /// across both epoch tables, ordered by source hash.
    fn get_pending_for_account(
        &self,
        destination: &WalletAddress,
    ) -> Result<Vec<(PendingKey, PendingInfo)>, StoreError>;

    /// Total number of pending receives across both epoch tables.
    fn pending_count(&self) -> Result<u64, StoreError>;
}
