//! Consensus — double-spend resolution via representative voting (§4.4).
//!
//! Inspired by Nano's Open Representative Voting (ORV):
//! - Each account delegates its weight to a representative.
//! - Representatives vote on conflicting blocks.
//! - A block is confirmed once it holds a quorum of online voting weight.
//! - Finality is typically sub-second, driven by the active elections table
//!   rather than block production (there is no block time).

pub mod active_elections;
pub mod backlog_scanner;
pub mod election;
pub mod equivocation;
pub mod error;
pub mod fork_cache;
pub mod online_weight;
pub mod rep_crawler;
pub mod rep_weights;
pub mod request_aggregator;
pub mod scheduler;
pub mod vote_by_hash;
pub mod vote_cache;
pub mod vote_info;
pub mod vote_rebroadcast;
pub mod vote_solicitor;
pub mod vote_spacing;

pub use active_elections::ActiveElections;
pub use backlog_scanner::BacklogScanner;
pub use election::{Election, ElectionState, ElectionStatus};
pub use equivocation::{EquivocationDetector, EquivocationProof};
pub use error::ConsensusError;
pub use fork_cache::ForkCache;
pub use online_weight::OnlineWeightSampler;
pub use rep_crawler::{DiscoveredRep, RepCrawler};
pub use rep_weights::RepWeightCache;
pub use request_aggregator::RequestAggregator;
pub use scheduler::{ElectionBehavior, HintedScheduler, PriorityScheduler};
pub use vote_by_hash::VoteByHash;
pub use vote_cache::VoteCache;
pub use vote_info::{VoteInfo, VoteResult};
pub use vote_rebroadcast::VoteRebroadcaster;
pub use vote_solicitor::VoteSolicitor;
pub use vote_spacing::VoteSpacing;
