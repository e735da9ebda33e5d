//! Bounded backlog — limits unconfirmed blocks to prevent DoS.
//!
//! Tracks unconfirmed blocks with priority-based eviction. When the backlog
//! exceeds its capacity, the lowest-priority blocks (by PoW difficulty) that
//! are not in active elections are candidates for proactive rollback.

use burst_types::{BlockHash, WalletAddress};
use std::collections::{BTreeMap, HashMap, HashSet};

/// Maximum unconfirmed blocks before proactive rollback.
const DEFAULT_MAX_BACKLOG: usize = 100_000;

/// Maximum unconfirmed blocks per account (prevents single-account spam).
const MAX_BACKLOG_PER_ACCOUNT: usize = 128;

/// Tracks unconfirmed blocks with priority-based eviction.
pub struct BoundedBacklog {
    /// All unconfirmed blocks: hash → entry metadata.
    entries: HashMap<BlockHash, BacklogEntry>,
    /// Priority index: (priority, hash) for efficient lowest-priority lookup.
    by_priority: BTreeMap<(u64, BlockHash), WalletAddress>,
    /// Per-account unconfirmed block counts.
    per_account: HashMap<WalletAddress, usize>,
    /// Max entries.
    max_size: usize,
    /// Hashes currently in active elections (cannot be rolled back).
    protected: HashSet<BlockHash>,
}

struct BacklogEntry {
    #[allow(dead_code)] // stored for future per-account eviction policies
    account: WalletAddress,
    priority: u64,
    #[allow(dead_code)]
    inserted_at: u64,
}

impl BoundedBacklog {
    pub fn new(max_size: usize) -> Self {
        Self {
            entries: HashMap::new(),
            by_priority: BTreeMap::new(),
            per_account: HashMap::new(),
            max_size,
            protected: HashSet::new(),
        }
    }

    pub fn with_default_size() -> Self {
        Self::new(DEFAULT_MAX_BACKLOG)
    }

    /// Check if an account can accept another unconfirmed block.
    pub fn can_accept(&self, account: &WalletAddress) -> bool {
        if self.entries.len() >= self.max_size {
            return false;
        }
        self.per_account.get(account).copied().unwrap_or(0) < MAX_BACKLOG_PER_ACCOUNT
    }

    /// Number of unconfirmed blocks for a specific account.
    pub fn account_backlog_count(&self, account: &WalletAddress) -> usize {
        self.per_account.get(account).copied().unwrap_or(0)
    }

    /// Add an unconfirmed block to the backlog.
    pub fn insert(
        &mut self,
        hash: BlockHash,
        account: WalletAddress,
        priority: u64,
        now: u64,
    ) {
        if self.entries.contains_key(&hash) {
            return;
        }
        self.entries.insert(
            hash,
            BacklogEntry {
                account: account.clone(),
                priority,
                inserted_at: now,
            },
        );
        self.by_priority.insert((priority, hash), account.clone());
        *self.per_account.entry(account).or_insert(0) += 1;
    }

    /// Remove a block (confirmed or rolled back).
    pub fn remove(&mut self, hash: &BlockHash) {
        if let Some(entry) = self.entries.remove(hash) {
            self.by_priority.remove(&(entry.priority, *hash));
            self.protected.remove(hash);
            if let Some(count) = self.per_account.get_mut(&entry.account) {
                *count = count.saturating_sub(1);
                if *count == 0 {
                    self.per_account.remove(&entry.account);
                }
            }
        }
    }

    /// Mark a block as protected (in active election).
    pub fn protect(&mut self, hash: &BlockHash) {
        self.protected.insert(*hash);
    }

    /// Unprotect a block.
    pub fn unprotect(&mut self, hash: &BlockHash) {
        self.protected.remove(hash);
    }

    /// Get lowest-priority blocks that should be rolled back to stay within bounds.
    /// Returns block hashes to evict (lowest priority first), skipping protected ones.
    pub fn blocks_to_evict(&self) -> Vec<BlockHash> {
        if self.entries.len() <= self.max_size {
            return Vec::new();
        }
        let overage = self.entries.len() - self.max_size;
        let mut to_evict = Vec::with_capacity(overage);
        for ((_, hash), _) in self.by_priority.iter() {
            if to_evict.len() >= overage {
                break;
            }
            if !self.protected.contains(hash) {
                to_evict.push(*hash);
            }
        }
        to_evict
    }

    /// Current backlog size.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the backlog is empty.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Whether backlog is over limit.
    pub fn is_over_limit(&self) -> bool {
        self.entries.len() > self.max_size
    }
}
