//! Election schedulers — decide which blocks should have elections started.
//!
//! Two scheduler strategies:
//!
//! - **Hinted**: Starts elections for blocks that have already accumulated
//!   significant vote weight in the vote cache (i.e. representatives voted
//!   before the node saw the fork).
//!
//! - **Priority**: Schedules elections based on account importance (balance),
//!   ensuring that high-value accounts get elections resolved first during
//!   contention.

use burst_types::{BlockHash, WalletAddress};

use crate::vote_cache::VoteCache;

/// Election scheduling behaviors.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ElectionBehavior {
    /// Based on account balance.
    Priority,
    /// Based on accumulated vote weight in cache.
    Hinted,
    /// RPC-triggered.
    Manual,
}

// ── Hinted scheduler ────────────────────────────────────────────────────

/// Starts elections for blocks that already have significant vote weight
/// in the cache.
///
/// This is useful when votes arrive before the node has detected the fork.
/// Instead of waiting for the block processor to see the fork, the hinted
/// scheduler proactively starts elections based on vote-cache evidence.
pub struct HintedScheduler {
    /// Minimum accumulated weight to trigger an election.
    min_weight_threshold: u128,
    /// Maximum elections to start per check cycle.
    max_per_cycle: usize,
}

impl HintedScheduler {
    pub fn new(min_weight_threshold: u128, max_per_cycle: usize) -> Self {
        Self {
            min_weight_threshold,
            max_per_cycle,
        }
    }

    /// Find blocks in the vote cache with enough accumulated weight
    /// to warrant starting an election proactively.
    ///
    /// Returns roots (block hashes) that should have elections started.
    pub fn check(&self, cache: &VoteCache) -> Vec<BlockHash> {
        let top = cache.top(self.max_per_cycle);
        top.into_iter()
            .filter(|(_, weight)| *weight >= self.min_weight_threshold)
            .map(|(root, _)| root)
            .collect()
    }
}

// ── Priority scheduler ──────────────────────────────────────────────────

/// Schedules elections based on account importance (balance).
///
/// Higher-balance accounts get their elections resolved first. This is a
/// simple max-heap (sorted Vec) of pending election requests.
pub struct PriorityScheduler {
    /// Pending accounts needing election, maintained in sorted order.
    queue: Vec<PriorityEntry>,
    /// Maximum queue size.
    max_queue: usize,
}

struct PriorityEntry {
    root: BlockHash,
    account: WalletAddress,
    priority: u64,
}

impl PriorityScheduler {
    pub fn new(max_queue: usize) -> Self {
        Self {
            queue: Vec::new(),
            max_queue,
        }
    }

    /// Add a block that needs an election, with its account balance as priority.
    ///
    /// If the queue is full, the entry is dropped (lower priority than
    /// everything already queued). Duplicate roots are silently ignored.
    pub fn push(&mut self, root: BlockHash, account: WalletAddress, balance: u64) {
        // Deduplicate by root
        if self.queue.iter().any(|e| e.root == root) {
            return;
        }

        if self.queue.len() >= self.max_queue {
            // Only insert if higher priority than the lowest entry
            if let Some(min) = self.queue.last() {
                if balance <= min.priority {
                    return;
                }
                self.queue.pop();
            }
        }

        let entry = PriorityEntry {
            root,
            account,
            priority: balance,
        };
        // Insert in sorted order (highest priority first)
        let pos = self
            .queue
            .binary_search_by(|e| balance.cmp(&e.priority))
            .unwrap_or_else(|pos| pos);
        self.queue.insert(pos, entry);
    }

    /// Pop the highest-priority entry.
    pub fn pop(&mut self) -> Option<(BlockHash, WalletAddress)> {
        if self.queue.is_empty() {
            None
        } else {
            let entry = self.queue.remove(0);
            Some((entry.root, entry.account))
        }
    }

    /// Current queue length.
    pub fn len(&self) -> usize {
        self.queue.len()
    }

    /// Whether the queue is empty.
    pub fn is_empty(&self) -> bool {
        self.queue.is_empty()
    }
}
