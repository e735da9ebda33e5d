//! Unchecked block queue — holds blocks whose dependencies are not yet known.
//!
//! When a block arrives referencing a previous block or a source (linked send)
//! block we haven't seen, it is stored here keyed by the missing dependency hash.
//! Once that dependency is confirmed, all waiting blocks are drained and
//! re-submitted to the block processor (§4.1 "unchecked" table, §4.7).

use burst_ledger::Block;
use burst_types::BlockHash;
use std::collections::HashMap;

/// Reason a block is in the unchecked map.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum GapType {
    /// Block's `previous` hash is unknown.
    Previous,
    /// Block's `link` (source send block) is unknown (for receive blocks).
    Source,
}

/// A block waiting for its dependency to arrive.
#[derive(Clone, Debug)]
pub struct UncheckedEntry {
    /// The block awaiting its dependency.
    pub block: Block,
    /// Unix timestamp (seconds) when this entry was received.
    pub received_at: u64,
}

/// Extended unchecked map that tracks both gap-previous and gap-source.
///
/// Maps `dependency_hash -> Vec<UncheckedEntry>`. When the missing block arrives,
/// dependents can be drained and re-processed.
pub struct UncheckedMap {
    /// Maps previous_hash → blocks waiting for it (gap-previous).
    entries: HashMap<BlockHash, Vec<UncheckedEntry>>,
    /// Maps source_hash → blocks waiting for the linked send block (gap-source).
    source_dependents: HashMap<BlockHash, Vec<UncheckedEntry>>,
    /// Total number of individual entries across all dependency keys.
    count: usize,
    /// Maximum total entries allowed (prevents memory exhaustion from spam).
    max_size: usize,
}

impl UncheckedMap {
    /// Create a new unchecked map with the given capacity limit.
    pub fn new(max_size: usize) -> Self {
        Self {
            entries: HashMap::new(),
            source_dependents: HashMap::new(),
            count: 0,
            max_size,
        }
    }

    /// Insert a block that depends on `dependency` (the hash of its missing previous block).
    ///
    /// Returns `true` if the entry was inserted, `false` if the map is full.
    pub fn insert(&mut self, dependency: BlockHash, block: Block, now: u64) -> bool {
        if self.count >= self.max_size {
            return false;
        }
        let entry = UncheckedEntry {
            block,
            received_at: now,
        };
        self.entries.entry(dependency).or_default().push(entry);
        self.count += 1;
        true
    }

    /// Insert a block waiting for its source (linked send) block to arrive.
    ///
    /// Returns `true` if the entry was inserted, `false` if the map is full.
    pub fn insert_source(&mut self, source_hash: BlockHash, block: Block, now: u64) -> bool {
        if self.count >= self.max_size {
            return false;
        }
        let entry = UncheckedEntry {
            block,
            received_at: now,
        };
        self.source_dependents
            .entry(source_hash)
            .or_default()
            .push(entry);
        self.count += 1;
        true
    }

    /// Drain all entries that were waiting for `hash` to arrive (gap-previous).
    ///
    /// Returns the blocks that can now be re-processed.
    pub fn get_dependents(&mut self, hash: &BlockHash) -> Vec<Block> {
        match self.entries.remove(hash) {
            Some(entries) => {
                self.count -= entries.len();
                entries.into_iter().map(|e| e.block).collect()
            }
            None => Vec::new(),
        }
    }

    /// Drain all entries that were waiting for `source_hash` as their linked send
    /// block (gap-source).
    ///
    /// Returns the blocks that can now be re-processed.
    pub fn get_source_dependents(&mut self, source_hash: &BlockHash) -> Vec<Block> {
        match self.source_dependents.remove(source_hash) {
            Some(entries) => {
                self.count -= entries.len();
                entries.into_iter().map(|e| e.block).collect()
            }
            None => Vec::new(),
        }
    }

    /// Total number of unchecked entries (both gap-previous and gap-source).
    pub fn len(&self) -> usize {
        self.count
    }

    /// Whether the unchecked map is empty.
    pub fn is_empty(&self) -> bool {
        self.count == 0
    }

    /// Remove entries older than `max_age_secs` relative to `now`
    /// (§6 "unchecked cutoff age (seconds)").
    ///
    /// Returns the number of entries removed.
    pub fn clear_expired(&mut self, max_age_secs: u64, now: u64) -> usize {
        let mut removed = 0;

        self.entries.retain(|_dep, entries| {
            let before = entries.len();
            entries.retain(|e| now.saturating_sub(e.received_at) < max_age_secs);
            removed += before - entries.len();
            !entries.is_empty()
        });

        self.source_dependents.retain(|_dep, entries| {
            let before = entries.len();
            entries.retain(|e| now.saturating_sub(e.received_at) < max_age_secs);
            removed += before - entries.len();
            !entries.is_empty()
        });

        self.count -= removed;
        removed
    }
}
