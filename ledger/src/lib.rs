//! DAG block-lattice ledger.
//!
//! Each account has its own chain (like Nano's block-lattice).
//! Transactions are asynchronous â€” no global ordering.
//! Consensus is only needed for conflict resolution (double-spends).

pub mod block;
pub mod builder;
pub mod error;
pub mod frontier;
pub mod genesis;
pub mod ledger;
pub mod process;

pub use block::{
    account_link, decode, election_root, encode, is_burn_account, link_to_address,
    verify_signature, verify_work, Block, BlockType,
};
pub use builder::{
    BuildError, ChangeBlockBuilder, OpenBlockBuilder, ReceiveBlockBuilder, SendBlockBuilder,
    StateBlockBuilder,
};
pub use error::{LedgerError, ProcessCode, ProcessReturn};
pub use frontier::DagFrontier;
pub use genesis::{create_genesis_block, genesis_amount, genesis_creator, genesis_hash, GenesisConfig};
pub use ledger::{Ledger, LedgerSummary};
pub use process::{process, rollback, ProcessConfig};
