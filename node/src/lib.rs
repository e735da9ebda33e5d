//! The BURST full node — wires the ledger, store, and consensus engines
//! together into a running process (§2 "Control flow at steady state").
//!
//! Bootstrap, wire-format parsing, and other network-layer concerns are
//! external collaborators here (§1 "Explicitly out of scope"); this crate
//! owns the block/vote processing pipeline and the in-memory election and
//! gap-cache state that sits in front of the store.

pub mod block_processor;
pub mod bounded_backlog;
pub mod config;
pub mod confirmation_processor;
pub mod confirming_set;
pub mod error;
pub mod gap_cache;
pub mod ledger_cache;
pub mod ledger_event;
pub mod local_broadcaster;
pub mod logging;
pub mod metrics;
pub mod node;
pub mod online_weight;
pub mod parallel_processor;
pub mod priority_queue;
pub mod recently_confirmed;
pub mod shutdown;
pub mod tracing_spans;
pub mod unchecked;
pub mod vote_processor;

pub use block_processor::{
    BlockContext, BlockProcessor, BlockSource, ProcessResult, ProcessingQueue, RollbackResult,
};
pub use bounded_backlog::BoundedBacklog;
pub use config::CoreConfig;
pub use confirmation_processor::{
    CementResult, ChainPosition, ChainWalker, ConfirmationProcessor, LmdbChainWalker,
};
pub use confirming_set::ConfirmingSet;
pub use error::NodeError;
pub use gap_cache::{BootstrapRequester, GapCache};
pub use ledger_event::{EventBus, LedgerEvent};
pub use local_broadcaster::LocalBroadcaster;
pub use logging::{init_logging, LogFormat};
pub use metrics::NodeMetrics;
pub use node::BurstNode;
pub use online_weight::OnlineWeightTracker;
pub use parallel_processor::ParallelBlockProcessor;
pub use priority_queue::{work_difficulty, BlockPriorityQueue};
pub use recently_confirmed::RecentlyConfirmed;
pub use shutdown::ShutdownController;
pub use unchecked::{GapType, UncheckedMap};
pub use vote_processor::{VoteProcessor, VoteQueueTier};
