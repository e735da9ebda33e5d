//! Confirmation height processor — cements blocks in causal order (§4.2).
//!
//! When consensus confirms a block, this processor walks the account chain
//! from its current confirmation height up to the confirmed block and marks
//! every intermediate block as cemented (final). Cemented blocks cannot be
//! rolled back.

use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Mutex};

use burst_store::block::BlockStore;
use burst_types::{BlockHash, WalletAddress};

/// Outcome of processing a confirmation.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum CementResult {
    /// Blocks were successfully cemented.
    Cemented {
        /// Number of blocks cemented in this batch.
        blocks_cemented: u64,
        /// New confirmation height after cementing.
        new_height: u64,
    },
    /// The block was already cemented (height already past it).
    AlreadyCemented,
    /// The confirmed block could not be found in the account chain.
    BlockNotFound,
    /// The account is unknown.
    AccountNotFound,
}

/// An account's identity plus its confirmation progress, as seen by a
/// [`ChainWalker`]. Deliberately narrower than the ledger's own
/// `AccountInfo` — confirmation height is this processor's own concern, not
/// part of consensus-relevant account state.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ChainPosition {
    pub account: WalletAddress,
    pub confirmation_height: u64,
}

/// Walks an account chain and cements blocks up to a confirmed block hash.
///
/// This processor is stateless — it receives the chain data it needs via the
/// `ChainWalker` trait, making it testable without a real store.
pub struct ConfirmationProcessor;

/// Trait abstracting the ability to walk an account's block chain.
///
/// Implementations can read from LMDB, in-memory maps, or test fixtures.
pub trait ChainWalker {
    /// Look up the account that owns the chain containing `hash`, along with
    /// its current confirmation height.
    fn account_for_block(&self, hash: &BlockHash) -> Option<ChainPosition>;

    /// Get the block hash at a specific height in an account's chain.
    /// Height 1 is the open block.
    fn block_at_height(&self, position: &ChainPosition, height: u64) -> Option<BlockHash>;

    /// Get the height of a specific block in an account's chain.
    /// Returns `None` if the block doesn't belong to this account.
    fn height_of_block(&self, position: &ChainPosition, hash: &BlockHash) -> Option<u64>;

    /// Persist the updated confirmation height for an account. Takes `&self`
    /// rather than `&mut self` because every real implementation already
    /// needs interior mutability to be shared across concurrent callers
    /// (e.g. behind an `Arc`) — there's no benefit to forcing exclusive
    /// access here too.
    fn set_confirmation_height(&self, position: &mut ChainPosition, new_height: u64);
}

impl ConfirmationProcessor {
    /// Cement all blocks from the account's current confirmation height up to
    /// (and including) the block identified by `confirmed_hash`.
    ///
    /// Returns a list of block hashes cemented in causal order (oldest first).
    pub fn process<W: ChainWalker>(
        &self,
        confirmed_hash: &BlockHash,
        walker: &W,
    ) -> (CementResult, Vec<BlockHash>) {
        let mut position = match walker.account_for_block(confirmed_hash) {
            Some(p) => p,
            None => return (CementResult::AccountNotFound, vec![]),
        };

        let confirmed_height = match walker.height_of_block(&position, confirmed_hash) {
            Some(h) => h,
            None => return (CementResult::BlockNotFound, vec![]),
        };

        let current_height = position.confirmation_height;

        if confirmed_height <= current_height {
            return (CementResult::AlreadyCemented, vec![]);
        }

        let mut cemented: VecDeque<BlockHash> = VecDeque::new();
        for h in (current_height + 1)..=confirmed_height {
            match walker.block_at_height(&position, h) {
                Some(hash) => cemented.push_back(hash),
                None => return (CementResult::BlockNotFound, cemented.into()),
            }
        }

        let blocks_cemented = cemented.len() as u64;
        let new_height = confirmed_height;

        walker.set_confirmation_height(&mut position, new_height);

        (
            CementResult::Cemented {
                blocks_cemented,
                new_height,
            },
            cemented.into(),
        )
    }
}

// ── LmdbChainWalker — real store-backed ChainWalker ─────────────────────

/// A [`ChainWalker`] backed by the real block store via [`BlockStore`].
///
/// `BlockStore` itself has no notion of confirmation height (§4.1's physical
/// tables only track chain position via `Sideband::height`), so this walker
/// keeps its own in-memory index, seeded from the store at startup and kept
/// current as blocks are cemented.
pub struct LmdbChainWalker {
    block_store: Arc<dyn BlockStore + Send + Sync>,
    confirmation_heights: Mutex<HashMap<WalletAddress, u64>>,
}

impl LmdbChainWalker {
    pub fn new(block_store: Arc<dyn BlockStore + Send + Sync>) -> Self {
        Self {
            block_store,
            confirmation_heights: Mutex::new(HashMap::new()),
        }
    }

    /// Seed (or overwrite) the cached confirmation height for an account,
    /// e.g. from a durable index read back at startup.
    pub fn seed(&self, account: WalletAddress, height: u64) {
        self.confirmation_heights.lock().unwrap().insert(account, height);
    }
}

impl ChainWalker for LmdbChainWalker {
    fn account_for_block(&self, hash: &BlockHash) -> Option<ChainPosition> {
        let stored = self.block_store.get_block(hash).ok()??;
        let account = stored.sideband.account?;
        let confirmation_height = *self
            .confirmation_heights
            .lock()
            .unwrap()
            .get(&account)
            .unwrap_or(&0);
        Some(ChainPosition {
            account,
            confirmation_height,
        })
    }

    fn block_at_height(&self, position: &ChainPosition, height: u64) -> Option<BlockHash> {
        if height == 0 {
            return None;
        }
        let chain = self.block_store.get_account_blocks(&position.account).ok()?;
        chain.get((height - 1) as usize).copied()
    }

    fn height_of_block(&self, _position: &ChainPosition, hash: &BlockHash) -> Option<u64> {
        self.block_store.get_block(hash).ok()?.map(|b| b.sideband.height)
    }

    fn set_confirmation_height(&self, position: &mut ChainPosition, new_height: u64) {
        position.confirmation_height = new_height;
        self.confirmation_heights
            .lock()
            .unwrap()
            .insert(position.account.clone(), new_height);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::collections::HashMap as Map;

    /// In-memory chain walker for testing.
    struct MockChainWalker {
        /// account address → vec of block hashes (index 0 = height 1)
        chains: Map<WalletAddress, Vec<BlockHash>>,
        /// block hash → account address
        block_to_account: Map<BlockHash, WalletAddress>,
        /// account address → confirmation height
        heights: RefCell<Map<WalletAddress, u64>>,
    }

    impl MockChainWalker {
        fn new() -> Self {
            Self {
                chains: Map::new(),
                block_to_account: Map::new(),
                heights: RefCell::new(Map::new()),
            }
        }

        fn add_account(&mut self, account: WalletAddress, chain: Vec<BlockHash>) {
            for hash in &chain {
                self.block_to_account.insert(*hash, account.clone());
            }
            self.chains.insert(account.clone(), chain);
            self.heights.borrow_mut().insert(account, 0);
        }
    }

    impl ChainWalker for MockChainWalker {
        fn account_for_block(&self, hash: &BlockHash) -> Option<ChainPosition> {
            let account = self.block_to_account.get(hash)?.clone();
            let confirmation_height = *self.heights.borrow().get(&account)?;
            Some(ChainPosition {
                account,
                confirmation_height,
            })
        }

        fn block_at_height(&self, position: &ChainPosition, height: u64) -> Option<BlockHash> {
            let chain = self.chains.get(&position.account)?;
            if height == 0 || height as usize > chain.len() {
                return None;
            }
            Some(chain[(height - 1) as usize])
        }

        fn height_of_block(&self, position: &ChainPosition, hash: &BlockHash) -> Option<u64> {
            let chain = self.chains.get(&position.account)?;
            chain.iter().position(|h| h == hash).map(|i| (i + 1) as u64)
        }

        fn set_confirmation_height(&self, position: &mut ChainPosition, new_height: u64) {
            position.confirmation_height = new_height;
            self.heights.borrow_mut().insert(position.account.clone(), new_height);
        }
    }

    fn test_addr() -> WalletAddress {
        WalletAddress::new(
            "brst_1111111111111111111111111111111111111111111111111111111111111111111",
        )
    }

    fn make_hash(byte: u8) -> BlockHash {
        BlockHash::new([byte; 32])
    }

    #[test]
    fn cement_single_block() {
        let processor = ConfirmationProcessor;
        let mut walker = MockChainWalker::new();

        let h1 = make_hash(0x01);
        walker.add_account(test_addr(), vec![h1]);

        let (result, cemented) = processor.process(&h1, &walker);
        assert_eq!(
            result,
            CementResult::Cemented {
                blocks_cemented: 1,
                new_height: 1,
            }
        );
        assert_eq!(cemented, vec![h1]);
        assert_eq!(*walker.heights.borrow().get(&test_addr()).unwrap(), 1);
    }

    #[test]
    fn cement_multiple_blocks() {
        let processor = ConfirmationProcessor;
        let mut walker = MockChainWalker::new();

        let h1 = make_hash(0x01);
        let h2 = make_hash(0x02);
        let h3 = make_hash(0x03);
        walker.add_account(test_addr(), vec![h1, h2, h3]);

        let (result, cemented) = processor.process(&h3, &walker);
        assert_eq!(
            result,
            CementResult::Cemented {
                blocks_cemented: 3,
                new_height: 3,
            }
        );
        assert_eq!(cemented, vec![h1, h2, h3]);
    }

    #[test]
    fn cement_incremental() {
        let processor = ConfirmationProcessor;
        let mut walker = MockChainWalker::new();

        let h1 = make_hash(0x01);
        let h2 = make_hash(0x02);
        let h3 = make_hash(0x03);
        walker.add_account(test_addr(), vec![h1, h2, h3]);

        let (result, cemented) = processor.process(&h1, &walker);
        assert_eq!(
            result,
            CementResult::Cemented {
                blocks_cemented: 1,
                new_height: 1,
            }
        );
        assert_eq!(cemented, vec![h1]);

        let (result, cemented) = processor.process(&h3, &walker);
        assert_eq!(
            result,
            CementResult::Cemented {
                blocks_cemented: 2,
                new_height: 3,
            }
        );
        assert_eq!(cemented, vec![h2, h3]);
    }

    #[test]
    fn already_cemented() {
        let processor = ConfirmationProcessor;
        let mut walker = MockChainWalker::new();

        let h1 = make_hash(0x01);
        let h2 = make_hash(0x02);
        walker.add_account(test_addr(), vec![h1, h2]);

        processor.process(&h2, &walker);

        let (result, cemented) = processor.process(&h1, &walker);
        assert_eq!(result, CementResult::AlreadyCemented);
        assert!(cemented.is_empty());
    }

    #[test]
    fn account_not_found() {
        let processor = ConfirmationProcessor;
        let mut walker = MockChainWalker::new();

        let unknown = make_hash(0xFF);
        let (result, cemented) = processor.process(&unknown, &walker);
        assert_eq!(result, CementResult::AccountNotFound);
        assert!(cemented.is_empty());
    }

    #[test]
    fn cement_does_not_skip_blocks() {
        let processor = ConfirmationProcessor;
        let mut walker = MockChainWalker::new();

        let h1 = make_hash(0x01);
        let h2 = make_hash(0x02);
        let h3 = make_hash(0x03);
        let h4 = make_hash(0x04);
        walker.add_account(test_addr(), vec![h1, h2, h3, h4]);

        let (result, cemented) = processor.process(&h2, &walker);
        assert_eq!(cemented, vec![h1, h2]);
        assert_eq!(
            result,
            CementResult::Cemented {
                blocks_cemented: 2,
                new_height: 2,
            }
        );

        let (result, cemented) = processor.process(&h4, &walker);
        assert_eq!(cemented, vec![h3, h4]);
        assert_eq!(
            result,
            CementResult::Cemented {
                blocks_cemented: 2,
                new_height: 4,
            }
        );
    }
}
