//! Abstract storage traits for the ledger.
//!
//! Every storage backend (LMDB today; RocksDB or an in-memory map for tests)
//! implements these traits. The rest of the codebase depends only on the
//! traits, never on a concrete backend — see `burst-store-lmdb`.

pub mod account;
pub mod block;
pub mod error;
pub mod frontier;
pub mod meta;
pub mod online_weight;
pub mod peer;
pub mod pending;
pub mod representation;
pub mod txn;
pub mod unchecked;
pub mod vote;

pub use account::{AccountInfo, AccountStore};
pub use block::{BlockStore, BlockVariant, Sideband, StoredBlock};
pub use error::StoreError;
pub use frontier::FrontierStore;
pub use meta::MetaStore;
pub use online_weight::OnlineWeightStore;
pub use peer::PeerStore;
pub use pending::{PendingInfo, PendingKey, PendingStore};
pub use representation::RepresentationStore;
pub use txn::LedgerWriteTxn;
pub use unchecked::{GapType, UncheckedInfo, UncheckedStore};
pub use vote::{VoteSource, VoteStore};

/// Opaque read transaction handle. Implementations downcast to their
/// concrete transaction type; all reads within one handle observe a single
/// consistent snapshot.
pub trait ReadTxn {}

/// Writable transaction handle. Only one write transaction may be open at a
/// time per store (§4.1 "Transactions").
pub trait WriteTxn: ReadTxn {}
