//! Unified `Ledger` trait — a coherent facade over the storage subsystems
//! the processor and the rest of the node read from.
//!
//! Mutating operations (`process`, `rollback`) go through
//! `burst_store::LedgerWriteTxn`, not through this trait — it exists for the
//! read-mostly accessors shared by RPC-style summaries, the block processor,
//! and tests.

use burst_store::account::AccountStore;
use burst_store::block::BlockStore;
use burst_store::frontier::FrontierStore;
use burst_store::pending::PendingStore;
use burst_store::representation::RepresentationStore;
use burst_store::StoreError;
use burst_types::{Amount, BlockHash, WalletAddress};

/// Unified ledger interface providing access to every storage subsystem the
/// ledger processor touches, plus a handful of derived read-only queries.
pub trait Ledger {
    type Accounts: AccountStore;
    type Blocks: BlockStore;
    type Frontiers: FrontierStore;
    type Pending: PendingStore;
    type Representation: RepresentationStore;

    fn account_store(&self) -> &Self::Accounts;
    fn block_store(&self) -> &Self::Blocks;
    fn frontier_store(&self) -> &Self::Frontiers;
    fn pending_store(&self) -> &Self::Pending;
    fn representation_store(&self) -> &Self::Representation;

    /// Check whether an account exists and has at least one block.
    fn account_exists(&self, address: &WalletAddress) -> Result<bool, StoreError> {
        self.account_store().exists(address)
    }

    /// The account's current head block hash, if it has been opened.
    fn head_block(&self, address: &WalletAddress) -> Result<Option<BlockHash>, StoreError> {
        Ok(self.account_store().get_account(address)?.map(|info| info.head))
    }

    /// A representative's total delegated voting weight.
    fn weight(&self, representative: &WalletAddress) -> Result<Amount, StoreError> {
        self.representation_store().get_weight(representative)
    }

    /// Ledger summary statistics.
    fn summary(&self) -> Result<LedgerSummary, StoreError> {
        Ok(LedgerSummary {
            accounts: self.account_store().account_count()?,
            blocks: self.block_store().block_count()?,
            pending: self.pending_store().pending_count()?,
            frontiers: self.frontier_store().frontier_count()?,
            online_weight: self.representation_store().total_weight()?,
        })
    }
}

/// Summary statistics for the ledger.
#[derive(Clone, Debug)]
pub struct LedgerSummary {
    pub accounts: u64,
    pub blocks: u64,
    pub pending: u64,
    pub frontiers: u64,
    pub online_weight: Amount,
}
