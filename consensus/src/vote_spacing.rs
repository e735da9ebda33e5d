//! Vote spacing — prevents rapid vote flip-flopping during fork resolution.
//!
//! When the leading candidate changes in an election, a node should not
//! immediately flip its vote. Vote spacing enforces a minimum time gap
//! between vote changes for the same account root, preventing vote
//! oscillation attacks where an adversary rapidly alternates the winner.

use burst_types::{BlockHash, WalletAddress};
use std::collections::HashMap;
use std::time::{Duration, Instant};

const MIN_VOTE_SPACING: Duration = Duration::from_millis(1500);

/// Tracks per-root vote timing to prevent rapid vote flipping.
pub struct VoteSpacing {
    last_vote: HashMap<WalletAddress, (Instant, BlockHash)>,
}

impl VoteSpacing {
    pub fn new() -> Self {
        Self {
            last_vote: HashMap::new(),
        }
    }

    /// Check if a vote can be generated for this account root.
    /// Returns true if enough time has passed since the last vote on this root,
    /// or if the candidate is the same block (reconfirmation is always OK).
    pub fn votable(&self, root: &WalletAddress, candidate: &BlockHash) -> bool {
        match self.last_vote.get(root) {
            None => true,
            Some((last_time, last_hash)) => {
                if last_hash == candidate {
                    return true;
                }
                last_time.elapsed() >= MIN_VOTE_SPACING
            }
        }
    }

    /// Record that a vote was cast for this root.
    pub fn record(&mut self, root: WalletAddress, hash: BlockHash) {
        self.last_vote.insert(root, (Instant::now(), hash));
    }

    /// Cleanup old entries (older than 2x spacing to prevent memory growth).
    pub fn cleanup(&mut self) {
        let cutoff = Instant::now() - (MIN_VOTE_SPACING * 2);
        self.last_vote.retain(|_, (t, _)| *t > cutoff);
    }

    /// Number of tracked roots.
    pub fn len(&self) -> usize {
        self.last_vote.len()
    }

    /// Whether there are no tracked roots.
    pub fn is_empty(&self) -> bool {
        self.last_vote.is_empty()
    }
}

impl Default for VoteSpacing {
    fn default() -> Self {
        Self::new()
    }
}
