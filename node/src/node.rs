//! The main BURST node — wires the ledger, store, and consensus engines
//! together into a running process (§2 "Control flow at steady state").
//!
//! Bootstrap, wire-format parsing, and other network-layer concerns are
//! external collaborators here (§1 "Explicitly out of scope"); this crate
//! owns the block/vote processing pipeline and the in-memory election and
//! gap-cache state that sits in front of the store.

use std::sync::Arc;
use std::time::{SystemTime, UNIX_EPOCH};

use tokio::sync::{Mutex, RwLock};
use tokio::task::JoinHandle;

use burst_consensus::{
    ActiveElections, BacklogScanner, ElectionStatus, ForkCache, HintedScheduler,
    OnlineWeightSampler, PriorityScheduler, RepCrawler, RepWeightCache, RequestAggregator,
    VoteCache, VoteSpacing,
};
use burst_ledger::{
    create_genesis_block, election_root, genesis_creator, GenesisConfig, ProcessConfig,
};
use burst_store::account::{AccountInfo, AccountStore};
use burst_store::block::{BlockStore, BlockVariant, Sideband, StoredBlock};
use burst_store::LedgerWriteTxn;
use burst_store_lmdb::LmdbStore;
use burst_types::{BlockHash, Epoch, NetworkId, PublicKey, Timestamp, WalletAddress};

use crate::block_processor::{BlockProcessor, BlockSource, ProcessResult};
use crate::bounded_backlog::BoundedBacklog;
use crate::config::CoreConfig;
use crate::confirmation_processor::ConfirmationProcessor;
use crate::confirming_set::ConfirmingSet;
use crate::error::NodeError;
use crate::gap_cache::GapCache;
use crate::ledger_cache::LedgerCache;
use crate::ledger_event::{EventBus, LedgerEvent};
use crate::local_broadcaster::LocalBroadcaster;
use crate::metrics::NodeMetrics;
use crate::online_weight::OnlineWeightTracker;
use crate::parallel_processor::ParallelBlockProcessor;
use crate::priority_queue::BlockPriorityQueue;
use crate::recently_confirmed::RecentlyConfirmed;
use crate::shutdown::ShutdownController;
use crate::vote_processor::{Vote, VoteProcessor};
use crate::LmdbChainWalker;

/// Default LMDB map size: 1 GiB.
const DEFAULT_MAP_SIZE: usize = 1 << 30;
/// Capacity of the PoW-priority block-admission queue.
const BLOCK_QUEUE_CAPACITY: usize = 4096;
/// Default maximum concurrent elections.
const MAX_ACTIVE_ELECTIONS: usize = 5_000;
/// Bounded cache of recently confirmed hashes (prevents re-electing them).
const RECENTLY_CONFIRMED_CAPACITY: usize = 65_536;
/// Cementation batches are retried at most this many times before deferral.
const CONFIRMING_SET_MAX_RETRIES: u32 = 3;
/// Per-tier capacity of the vote admission queue.
const VOTE_QUEUE_CAPACITY_PER_TIER: usize = 4_096;
/// Batch size drained from the vote queue per processing tick.
const VOTE_DRAIN_BATCH_SIZE: usize = 256;
/// Election age (ms) after which a still-unconfirmed election is dropped.
const ELECTION_TIMEOUT_MS: u64 = 5 * 60 * 1_000;
/// Rolling window used by the online-weight sampler to smooth out dips.
const ONLINE_WEIGHT_WINDOW_SECS: u64 = 5 * 60;
/// Query timeout and crawl interval for the representative crawler.
const REP_CRAWLER_QUERY_TIMEOUT_SECS: u64 = 5;
const REP_CRAWLER_INTERVAL_SECS: u64 = 15;
/// Minimum delegated weight (bps) for the hinted scheduler to pick up a backlog entry.
const HINTED_SCHEDULER_MIN_WEIGHT_BPS: u128 = 100;
const HINTED_SCHEDULER_MAX_PER_CYCLE: usize = 64;

fn now() -> Timestamp {
    let secs = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or(0);
    Timestamp::new(secs)
}

/// A running BURST node: the store plus every in-memory subsystem that sits
/// in front of it (block/vote admission, consensus, cementation).
pub struct BurstNode {
    pub config: CoreConfig,
    pub store: Arc<LmdbStore>,
    pub metrics: Arc<NodeMetrics>,
    pub shutdown: Arc<ShutdownController>,
    pub events: Arc<RwLock<EventBus>>,
    pub ledger_cache: Arc<LedgerCache>,

    /// Priority queue for submitting blocks into the processing pipeline.
    pub block_queue: Arc<BlockPriorityQueue>,
    /// Drives accepted blocks through `burst_ledger::process` and tracks gaps.
    pub block_processor: Arc<Mutex<BlockProcessor>>,
    /// Bounded backlog protecting against an unconfirmed-chain flood.
    pub backlog: Arc<Mutex<BoundedBacklog>>,
    /// Re-broadcaster for locally originated blocks awaiting confirmation.
    pub local_broadcaster: Arc<Mutex<LocalBroadcaster>>,
    /// Weighted cache of blocks seen only via votes, pending bootstrap.
    pub gap_cache: Arc<Mutex<GapCache>>,
    /// Signature-verification worker pool sizing for the state-block lane.
    pub parallel_processor: Arc<ParallelBlockProcessor>,

    /// Active consensus elections for double-spend resolution.
    pub active_elections: Arc<RwLock<ActiveElections>>,
    /// Pre-election vote cache for out-of-order vote arrival.
    pub vote_cache: Arc<RwLock<VoteCache>>,
    /// Admission queue and batched verifier for inbound votes.
    pub vote_processor: Arc<Mutex<VoteProcessor>>,
    /// Cached representative weights for vote routing and quorum.
    pub rep_weights: Arc<RwLock<RepWeightCache>>,
    /// Discovers representatives reachable from the peer set.
    pub rep_crawler: Arc<Mutex<RepCrawler>>,
    /// Tracks recently-active reps for the quorum's effective weight.
    pub online_weight_sampler: Arc<Mutex<OnlineWeightSampler>>,
    /// Aggregate online weight tracker with historical smoothing.
    pub online_weight_tracker: Arc<Mutex<OnlineWeightTracker>>,
    /// Fork candidates kept alongside their elections.
    pub fork_cache: Arc<Mutex<ForkCache>>,
    /// Prevents a representative from flip-flopping its vote too quickly.
    pub vote_spacing: Arc<Mutex<VoteSpacing>>,
    /// Batches inbound vote requests before they hit the network.
    pub request_aggregator: Arc<Mutex<RequestAggregator>>,
    /// Scans the confirmation backlog for stalled accounts.
    pub backlog_scanner: Arc<Mutex<BacklogScanner>>,
    /// Starts elections for unconfirmed blocks, highest-balance first.
    pub priority_scheduler: Arc<Mutex<PriorityScheduler>>,
    /// Starts elections hinted by inbound votes for roots with no election yet.
    pub hinted_scheduler: Arc<Mutex<HintedScheduler>>,

    /// Height-walking cementation over the block store.
    confirmation_processor: ConfirmationProcessor,
    /// Confirmation-height index plus chain-walk lookups for cementation.
    pub chain_walker: Arc<LmdbChainWalker>,
    /// Blocks confirmed by consensus but not yet cemented.
    pub confirming_set: Arc<Mutex<ConfirmingSet>>,
    /// Bounded de-dup set of recently cemented hashes.
    pub recently_confirmed: Arc<RwLock<RecentlyConfirmed>>,

    task_handles: Mutex<Vec<JoinHandle<()>>>,
}

impl BurstNode {
    /// Open the LMDB environment at `config.data_dir`, seed the genesis
    /// block if the store is empty, and prepare every in-memory subsystem.
    /// Call [`Self::start`] to begin the background processing loops.
    pub async fn new(config: CoreConfig) -> Result<Self, NodeError> {
        let store = LmdbStore::open(&config.data_dir, DEFAULT_MAP_SIZE)
            .map_err(|e| NodeError::Other(format!("failed to open LMDB: {e}")))?;
        let store = Arc::new(store);

        let process_config = ProcessConfig {
            epoch_v1_authority: config.epoch_v1_authority.clone(),
            epoch_v1_link: config.epoch_v1_link,
            work_difficulty: config.work_threshold,
            now: now(),
        };

        let mut active_elections = ActiveElections::with_quorum_bps(
            MAX_ACTIVE_ELECTIONS,
            config.online_weight_minimum,
            quorum_bps(config.quorum_pct),
        );
        active_elections.set_online_weight_minimum(config.online_weight_minimum);

        let node = Self {
            block_queue: Arc::new(BlockPriorityQueue::new(BLOCK_QUEUE_CAPACITY)),
            block_processor: Arc::new(Mutex::new(BlockProcessor::new(process_config))),
            backlog: Arc::new(Mutex::new(BoundedBacklog::with_default_size())),
            local_broadcaster: Arc::new(Mutex::new(LocalBroadcaster::with_default())),
            gap_cache: Arc::new(Mutex::new(GapCache::new(
                config.bootstrap_fraction_numerator,
                config.online_weight_minimum,
            ))),
            parallel_processor: Arc::new(ParallelBlockProcessor::new(
                config.signature_check_thread_count,
            )),

            active_elections: Arc::new(RwLock::new(active_elections)),
            vote_cache: Arc::new(RwLock::new(VoteCache::new())),
            vote_processor: Arc::new(Mutex::new(VoteProcessor::new(VOTE_QUEUE_CAPACITY_PER_TIER))),
            rep_weights: Arc::new(RwLock::new(RepWeightCache::new())),
            rep_crawler: Arc::new(Mutex::new(RepCrawler::new(
                REP_CRAWLER_QUERY_TIMEOUT_SECS,
                REP_CRAWLER_INTERVAL_SECS,
            ))),
            online_weight_sampler: Arc::new(Mutex::new(OnlineWeightSampler::new(
                ONLINE_WEIGHT_WINDOW_SECS,
            ))),
            online_weight_tracker: Arc::new(Mutex::new(OnlineWeightTracker::new(
                config.online_weight_minimum,
                config.online_weight_minimum,
            ))),
            fork_cache: Arc::new(Mutex::new(ForkCache::new())),
            vote_spacing: Arc::new(Mutex::new(VoteSpacing::new())),
            request_aggregator: Arc::new(Mutex::new(RequestAggregator::new(
                config.max_peers.max(1) * 16,
                64,
            ))),
            backlog_scanner: Arc::new(Mutex::new(BacklogScanner::new(65_536, 60))),
            priority_scheduler: Arc::new(Mutex::new(PriorityScheduler::new(65_536))),
            hinted_scheduler: Arc::new(Mutex::new(HintedScheduler::new(
                HINTED_SCHEDULER_MIN_WEIGHT_BPS,
                HINTED_SCHEDULER_MAX_PER_CYCLE,
            ))),

            confirmation_processor: ConfirmationProcessor,
            chain_walker: Arc::new(LmdbChainWalker::new(store.clone())),
            confirming_set: Arc::new(Mutex::new(ConfirmingSet::new(CONFIRMING_SET_MAX_RETRIES))),
            recently_confirmed: Arc::new(RwLock::new(RecentlyConfirmed::new(
                RECENTLY_CONFIRMED_CAPACITY,
            ))),

            metrics: Arc::new(NodeMetrics::new()),
            shutdown: Arc::new(ShutdownController::new()),
            events: Arc::new(RwLock::new(EventBus::new())),
            ledger_cache: Arc::new(LedgerCache::new(0, 0, 0)),

            config,
            store,
            task_handles: Mutex::new(Vec::new()),
        };

        node.initialize_genesis()?;
        node.refresh_ledger_cache()?;
        Ok(node)
    }

    /// Create the genesis account and block directly (bypassing
    /// `burst_ledger::process`, which has no concept of a bootstrapping
    /// ledger with no accounts yet) if the store is completely empty.
    fn initialize_genesis(&self) -> Result<(), NodeError> {
        if self.store.block_count()? > 0 {
            return Ok(());
        }
        tracing::info!("empty database — creating genesis block");

        let creator = genesis_creator(self.config.network);
        let block = create_genesis_block(&GenesisConfig {
            network: self.config.network,
            creator: creator.clone(),
        });
        let hash = block.hash();
        let balance = block.claimed_balance().expect("genesis is a State block");
        let timestamp = now();

        let mut batch = self.store.write_batch()?;
        batch.put_block(
            &hash,
            &StoredBlock {
                bytes: burst_ledger::encode(&block),
                sideband: Sideband {
                    variant: BlockVariant::State,
                    account: Some(creator.clone()),
                    successor: BlockHash::ZERO,
                    balance_after: balance,
                    height: 1,
                    timestamp,
                    epoch: Epoch::V0,
                },
            },
        )?;
        batch.put_account(
            &creator,
            &AccountInfo {
                head: hash,
                rep_block: hash,
                open_block: hash,
                representative: creator.clone(),
                balance,
                modified_timestamp: timestamp,
                block_count: 1,
                epoch: Epoch::V0,
            },
        )?;
        batch.add_weight(&creator, balance.raw() as i128)?;
        batch.commit()?;

        tracing::info!(%hash, "genesis block created");
        Ok(())
    }

    fn refresh_ledger_cache(&self) -> Result<(), NodeError> {
        self.metrics.block_count.set(self.store.block_count()? as i64);
        self.metrics.account_count.set(self.store.account_count()? as i64);
        Ok(())
    }

    /// Submit a block into the ledger, outside the PoW-priority queue (used
    /// for locally originated blocks and test harnesses). Network-received
    /// blocks should go through [`Self::block_queue`] instead so PoW
    /// difficulty governs admission order.
    pub async fn submit_block(
        &self,
        block: burst_ledger::Block,
        source: BlockSource,
    ) -> Result<ProcessResult, NodeError> {
        let account = block.account();
        let hash = block.hash();

        let result = {
            let mut batch = self.store.write_batch()?;
            let mut processor = self.block_processor.lock().await;
            let result = processor.process_one(&mut batch, &block, now())?;
            if matches!(result, ProcessResult::Accepted) {
                batch.commit()?;
            }
            result
        };

        self.metrics.blocks_processed.inc();
        match &result {
            ProcessResult::Accepted => {
                self.metrics.blocks_accepted.inc();
                self.ledger_cache.inc_block_count();
                if let Some(account) = account {
                    self.events.read().await.emit(&LedgerEvent::BlockConfirmed {
                        hash,
                        account: account.clone(),
                    });
                }
                if matches!(source, BlockSource::Local) {
                    self.local_broadcaster
                        .lock()
                        .await
                        .track(hash, burst_ledger::encode(&block), wall_clock_ms());
                }
                self.start_election_for(&block).await?;
            }
            ProcessResult::Gap | ProcessResult::GapSource => {
                self.events.read().await.emit(&LedgerEvent::BlockQueued {
                    hash,
                    dependency: block.previous(),
                });
            }
            ProcessResult::Fork => {
                if let Some(account) = account {
                    self.events.read().await.emit(&LedgerEvent::ForkDetected {
                        account: account.clone(),
                        existing: hash,
                        incoming: hash,
                    });
                }
            }
            ProcessResult::Rejected(reason) => {
                self.events.read().await.emit(&LedgerEvent::BlockRejected {
                    hash,
                    reason: format!("{reason:?}"),
                });
            }
            ProcessResult::Duplicate => {}
        }
        Ok(result)
    }

    /// Start (or no-op if one is already running) a consensus election for
    /// the root of `block`'s account chain, using the election-root rule
    /// that maps legacy-block forks onto their owning state-block root.
    async fn start_election_for(&self, block: &burst_ledger::Block) -> Result<(), NodeError> {
        let Some(account) = block.account() else {
            return Ok(());
        };
        if self.recently_confirmed.read().await.contains(&block.hash()) {
            return Ok(());
        }
        let root = election_root(account, block);
        let mut elections = self.active_elections.write().await;
        if elections.is_at_capacity() {
            return Ok(());
        }
        elections
            .start_election(root, now())
            .map_err(|e| NodeError::Consensus(e))?;
        self.metrics.election_count.set(elections.election_count() as i64);
        Ok(())
    }

    /// Enqueue a representative's vote for batched admission. The caller
    /// supplies the voter's current delegated weight and the node's online
    /// stake estimate so the vote lands in the correct priority tier.
    pub async fn submit_vote(
        &self,
        vote: Vote,
        sender_pubkey: PublicKey,
        voter_weight: u128,
    ) -> bool {
        let online_stake = self.online_weight_tracker.lock().await.current_weight();
        self.metrics.votes_received.inc();
        self.vote_processor
            .lock()
            .await
            .enqueue(vote, sender_pubkey, voter_weight, online_stake)
    }

    /// Drain one batch of admitted, signature-verified votes and route each
    /// to its election, cementing any block whose election just confirmed.
    ///
    /// Called periodically by [`Self::start`]'s background loop; exposed
    /// directly so tests and a single-step CLI can drive it without a
    /// running task.
    pub async fn process_vote_batch(&self) -> Result<Vec<ElectionStatus>, NodeError> {
        let batch = self
            .vote_processor
            .lock()
            .await
            .drain_verified_batch(VOTE_DRAIN_BATCH_SIZE);

        let mut confirmed = Vec::new();
        for vote in batch {
            let weight = self
                .rep_weights
                .read()
                .await
                .weight_of(&vote.account)
                .unwrap_or(0);
            let mut elections = self.active_elections.write().await;
            for hash in &vote.hashes {
                let Some(root) = self.root_for_hash(*hash).await? else {
                    continue;
                };
                match elections.process_vote(&root, &vote.account, *hash, weight, vote.is_final, now()) {
                    Ok(Some(status)) => {
                        let dependent_roots = self.dependent_roots_for(status.winner).await?;
                        let cascaded = elections.cascade_confirm(&dependent_roots, now());
                        confirmed.push(status);
                        confirmed.extend(cascaded);
                    }
                    Ok(None) | Err(_) => {}
                }
            }
        }

        for status in &confirmed {
            self.on_election_confirmed(status.winner).await?;
        }
        Ok(confirmed)
    }

    /// Resolve the election root a hash belongs to: the hash itself if an
    /// election already exists for it, otherwise the root computed from its
    /// stored sideband account (covering legacy-block forks that vote on a
    /// candidate hash different from the state-block root).
    async fn root_for_hash(&self, hash: BlockHash) -> Result<Option<BlockHash>, NodeError> {
        if self.active_elections.read().await.get_election(&hash).is_some() {
            return Ok(Some(hash));
        }
        let Some(stored) = self.store.get_block(&hash)? else {
            return Ok(None);
        };
        let Some(account) = stored.sideband.account else {
            return Ok(None);
        };
        let block = burst_ledger::decode(&stored.bytes)?;
        Ok(Some(election_root(&account, &block)))
    }

    /// Election roots for `winner`'s `previous`/`source`/`link` blocks, for
    /// cascading confirmation onto elections still open on them (§4.4
    /// `confirm_if_quorum`, §8 "Cascade correctness"). Looks up only the
    /// block store, never `active_elections`, so it's safe to call while
    /// holding that lock.
    async fn dependent_roots_for(&self, winner: BlockHash) -> Result<Vec<BlockHash>, NodeError> {
        let Some(stored) = self.store.get_block(&winner)? else {
            return Ok(Vec::new());
        };
        let block = burst_ledger::decode(&stored.bytes)?;
        let mut candidates = vec![block.previous()];
        match &block {
            burst_ledger::Block::Open { source, .. } => candidates.push(*source),
            burst_ledger::Block::Receive { source, .. } => candidates.push(*source),
            burst_ledger::Block::State { link, .. } => candidates.push(*link),
            _ => {}
        }

        let mut roots = Vec::new();
        for hash in candidates {
            if hash.is_zero() {
                continue;
            }
            let Some(dep_stored) = self.store.get_block(&hash)? else {
                continue;
            };
            let Some(dep_account) = dep_stored.sideband.account else {
                continue;
            };
            let dep_block = burst_ledger::decode(&dep_stored.bytes)?;
            roots.push(election_root(&dep_account, &dep_block));
        }
        Ok(roots)
    }

    /// An election confirmed `winner`: queue it for cementation and record
    /// it so a duplicate vote burst can't re-elect the same root.
    async fn on_election_confirmed(&self, winner: BlockHash) -> Result<(), NodeError> {
        self.recently_confirmed.write().await.insert(winner);
        self.confirming_set.lock().await.add(winner);
        self.metrics.blocks_confirmed.inc();
        Ok(())
    }

    /// Drain one batch from the confirming set and cement every block up to
    /// each confirmed height. A cemented receive block whose source block on
    /// the sender's chain isn't cemented yet has that source queued too —
    /// confirmation cascades across the account that funded it, not just
    /// along the confirmed account's own chain.
    pub async fn cement_next_batch(&self) -> Result<u64, NodeError> {
        let batch = self.confirming_set.lock().await.next_batch();
        let mut total_cemented = 0u64;

        for hash in batch {
            let (result, cemented) = self
                .confirmation_processor
                .process(&hash, self.chain_walker.as_ref());
            match result {
                crate::confirmation_processor::CementResult::Cemented { blocks_cemented, .. } => {
                    total_cemented += blocks_cemented;
                    for cemented_hash in cemented {
                        self.cascade_source_confirmation(cemented_hash).await?;
                    }
                }
                crate::confirmation_processor::CementResult::BlockNotFound
                | crate::confirmation_processor::CementResult::AccountNotFound => {
                    self.confirming_set.lock().await.defer(hash, 1);
                }
                crate::confirmation_processor::CementResult::AlreadyCemented => {}
            }
        }

        self.confirming_set.lock().await.record_cemented(total_cemented);
        if total_cemented > 0 {
            self.refresh_ledger_cache()?;
        }
        Ok(total_cemented)
    }

    /// If `hash` is a receive, queue its source send block for cementation
    /// when it hasn't been cemented on its own account yet.
    async fn cascade_source_confirmation(&self, hash: BlockHash) -> Result<(), NodeError> {
        let Some(stored) = self.store.get_block(&hash)? else {
            return Ok(());
        };
        let block = burst_ledger::decode(&stored.bytes)?;
        let source = match &block {
            burst_ledger::Block::Open { source, .. } => Some(*source),
            burst_ledger::Block::Receive { source, .. } => Some(*source),
            burst_ledger::Block::State { link, .. } if !link.is_zero() => Some(*link),
            _ => None,
        };
        if let Some(source_hash) = source {
            if self.store.get_block(&source_hash)?.is_some() {
                self.confirming_set.lock().await.add(source_hash);
            }
        }
        Ok(())
    }

    /// Spawn the background maintenance loops (vote draining, cementation,
    /// expired-election cleanup). Returns immediately; tasks run until
    /// [`Self::shutdown`] fires. Takes `Arc<Self>` so each spawned task can
    /// clone its own handle to the whole node instead of a hand-picked
    /// subset of fields.
    pub async fn start(self: &Arc<Self>) {
        let mut handles = Vec::with_capacity(3);
        handles.push(self.spawn_vote_loop());
        handles.push(self.spawn_cementation_loop());
        handles.push(self.spawn_election_cleanup_loop());
        self.task_handles.lock().await.extend(handles);
    }

    fn spawn_vote_loop(self: &Arc<Self>) -> JoinHandle<()> {
        let node = self.clone();
        let mut shutdown = self.shutdown.subscribe();
        tokio::spawn(async move {
            loop {
                tokio::select! {
                    _ = tokio::time::sleep(std::time::Duration::from_millis(50)) => {
                        if let Err(e) = node.process_vote_batch().await {
                            tracing::warn!(error = %e, "vote batch processing failed");
                        }
                    }
                    _ = shutdown.recv() => break,
                }
            }
        })
    }

    fn spawn_cementation_loop(self: &Arc<Self>) -> JoinHandle<()> {
        let node = self.clone();
        let mut shutdown = self.shutdown.subscribe();
        tokio::spawn(async move {
            loop {
                tokio::select! {
                    _ = tokio::time::sleep(std::time::Duration::from_millis(100)) => {
                        if let Err(e) = node.cement_next_batch().await {
                            tracing::warn!(error = %e, "cementation batch failed");
                        }
                        node.confirming_set.lock().await.retry_deferred();
                    }
                    _ = shutdown.recv() => break,
                }
            }
        })
    }

    fn spawn_election_cleanup_loop(self: &Arc<Self>) -> JoinHandle<()> {
        let node = self.clone();
        let mut shutdown = self.shutdown.subscribe();
        tokio::spawn(async move {
            loop {
                tokio::select! {
                    _ = tokio::time::sleep(std::time::Duration::from_secs(1)) => {
                        let expired = node
                            .active_elections
                            .write()
                            .await
                            .cleanup_expired(ELECTION_TIMEOUT_MS, now());
                        if !expired.is_empty() {
                            tracing::debug!(count = expired.len(), "expired stale elections");
                        }
                    }
                    _ = shutdown.recv() => break,
                }
            }
        })
    }

    /// Join every background task, waiting at most until the shutdown
    /// controller's signal has propagated.
    pub async fn shutdown(&self) {
        self.shutdown.shutdown();
        for handle in self.task_handles.lock().await.drain(..) {
            let _ = handle.await;
        }
    }
}

/// Basis points (out of 10,000) equivalent to a 0-100 percent quorum.
fn quorum_bps(quorum_pct: u8) -> u128 {
    (quorum_pct as u128).min(100) * 100
}

fn wall_clock_ms() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        .unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn quorum_bps_converts_percent_to_basis_points() {
        assert_eq!(quorum_bps(67), 6_700);
        assert_eq!(quorum_bps(100), 10_000);
        assert_eq!(quorum_bps(0), 0);
    }

    #[test]
    fn quorum_bps_clamps_above_100_percent() {
        assert_eq!(quorum_bps(255), 10_000);
    }
}
