//! Vote cache storage trait.
//!
//! Tracks, per block root, the highest-sequence vote seen from each
//! representative so a duplicate or stale resend can be rejected without
//! re-verifying its signature (§4.3 "Vote processor").

use crate::StoreError;
use burst_types::{BlockHash, WalletAddress};

/// Where a vote came from, for spam-tier accounting (§4.3 "Vote spacing").
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum VoteSource {
    Live,
    Rebroadcast,
    Cache,
}

/// Trait for the last-seen-vote-per-representative cache.
pub trait VoteStore {
    /// Record that `rep` voted for `hash` at `sequence`, provided `sequence`
    /// exceeds any previously stored sequence for this `(root, rep)` pair.
    /// Returns `true` if the vote was newer and thus recorded.
    fn record_vote(
        &self,
        root: &BlockHash,
        rep: &WalletAddress,
        hash: &BlockHash,
        sequence: u64,
    ) -> Result<bool, StoreError>;

    /// The last recorded `(hash, sequence)` for a representative at a root.
    fn last_vote(
        &self,
        root: &BlockHash,
        rep: &WalletAddress,
    ) -> Result<Option<(BlockHash, u64)>, StoreError>;

    /// Drop all cached votes for a root once its election concludes.
    fn clear_root(&self, root: &BlockHash) -> Result<(), StoreError>;
}
