//! Local block re-broadcaster — ensures locally created blocks reach consensus.
//! Re-broadcasts with exponential backoff until confirmed.

use burst_types::BlockHash;
use std::collections::HashMap;

/// Maximum locally tracked blocks.
const MAX_LOCAL_BLOCKS: usize = 1024;
/// Initial re-broadcast interval (ms).
const INITIAL_INTERVAL_MS: u64 = 1_000;
/// Maximum re-broadcast interval (ms).
const MAX_INTERVAL_MS: u64 = 60_000;
/// Maximum re-broadcasts per block.
const MAX_REBROADCASTS: u32 = 15;

pub struct LocalBroadcaster {
    /// Blocks created locally that haven't been confirmed yet.
    blocks: HashMap<BlockHash, LocalBlockEntry>,
    /// Maximum tracked blocks.
    max_entries: usize,
}

struct LocalBlockEntry {
    block_bytes: Vec<u8>,
    created_at_ms: u64,
    last_broadcast_ms: u64,
    broadcast_count: u32,
    interval_ms: u64,
}

impl LocalBroadcaster {
    pub fn new(max_entries: usize) -> Self {
        Self {
            blocks: HashMap::new(),
            max_entries,
        }
    }

    pub fn with_default() -> Self {
        Self::new(MAX_LOCAL_BLOCKS)
    }

    /// Track a locally created block for re-broadcasting.
    pub fn track(&mut self, hash: BlockHash, block_bytes: Vec<u8>, now_ms: u64) {
        if self.blocks.len() >= self.max_entries {
            // Evict oldest
            if let Some(oldest) = self
                .blocks
                .iter()
                .min_by_key(|(_, e)| e.created_at_ms)
                .map(|(h, _)| *h)
            {
                self.blocks.remove(&oldest);
            }
        }
        self.blocks.insert(
            hash,
            LocalBlockEntry {
                block_bytes,
                created_at_ms: now_ms,
                last_broadcast_ms: now_ms,
                broadcast_count: 1,
                interval_ms: INITIAL_INTERVAL_MS,
            },
        );
    }

    /// Get blocks that need re-broadcasting now.
    /// Returns (hash, block_bytes) for each block needing re-broadcast.
    pub fn blocks_needing_rebroadcast(&mut self, now_ms: u64) -> Vec<(BlockHash, Vec<u8>)> {
        let mut result = Vec::new();
        for (hash, entry) in &mut self.blocks {
            if entry.broadcast_count >= MAX_REBROADCASTS {
                continue;
            }
            if now_ms.saturating_sub(entry.last_broadcast_ms) >= entry.interval_ms {
                result.push((*hash, entry.block_bytes.clone()));
                entry.last_broadcast_ms = now_ms;
                entry.broadcast_count += 1;
                // Exponential backoff
                entry.interval_ms = (entry.interval_ms * 2).min(MAX_INTERVAL_MS);
            }
        }
        result
    }

    /// Mark a block as confirmed (stop re-broadcasting).
    pub fn confirmed(&mut self, hash: &BlockHash) {
        self.blocks.remove(hash);
    }

    /// Number of tracked blocks.
    pub fn len(&self) -> usize {
        self.blocks.len()
    }

    /// Whether no blocks are being tracked.
    pub fn is_empty(&self) -> bool {
        self.blocks.is_empty()
    }

    /// Cleanup blocks that exceeded max retries.
    pub fn cleanup_expired(&mut self) {
        self.blocks
            .retain(|_, entry| entry.broadcast_count < MAX_REBROADCASTS);
    }
}
