//! Active elections container — manages all ongoing consensus elections.
//!
//! This is the top-level coordinator for the ORV election system. It holds a
//! bounded set of active elections, routes incoming votes to the correct
//! election, and handles cleanup of expired elections.

use crate::election::{Election, ElectionState, ElectionStatus};
use crate::error::ConsensusError;
use crate::vote_info::VoteResult;
use burst_types::{BlockHash, Timestamp, WalletAddress};
use std::collections::HashMap;

/// Container for all active consensus elections.
///
/// Elections are keyed by their root block hash. The container enforces a
/// maximum capacity to prevent resource exhaustion during spam attacks.
#[derive(Clone, Debug)]
pub struct ActiveElections {
    /// Root block hash -> election.
    elections: HashMap<BlockHash, Election>,
    /// Maximum number of concurrent elections.
    max_elections: usize,
    /// Effective online voting weight used for new elections.
    /// Should be `max(current_online, trended_ema, min_floor)` to prevent
    /// quorum collapse on temporary online weight dips.
    effective_weight: u128,
    /// Confirmation threshold (basis points of `effective_weight`) applied
    /// to elections started from here on, configurable via `quorum_pct`.
    quorum_bps: u128,
    /// Minimum total cast weight an election needs before it can confirm
    /// anything (§4.4 `confirm_if_quorum`'s `sum >= online_weight_minimum`
    /// gate), applied to elections started from here on. Defaults to 0.
    online_weight_minimum: u128,
}

impl ActiveElections {
    pub fn new(max_elections: usize, online_weight: u128) -> Self {
        Self {
            elections: HashMap::new(),
            max_elections,
            effective_weight: online_weight,
            quorum_bps: crate::election::QUORUM_BPS,
            online_weight_minimum: 0,
        }
    }

    /// Same as [`Self::new`] but with an explicit quorum (basis points of
    /// online weight) instead of the 67% default.
    pub fn with_quorum_bps(max_elections: usize, online_weight: u128, quorum_bps: u128) -> Self {
        Self {
            elections: HashMap::new(),
            max_elections,
            effective_weight: online_weight,
            quorum_bps,
            online_weight_minimum: 0,
        }
    }

    pub fn set_quorum_bps(&mut self, quorum_bps: u128) {
        self.quorum_bps = quorum_bps;
    }

    /// Set the floor below which no election started from here on can
    /// confirm, regardless of margin (§4.4, §6 "online weight minimum").
    pub fn set_online_weight_minimum(&mut self, online_weight_minimum: u128) {
        self.online_weight_minimum = online_weight_minimum;
    }

    /// Start a new election for the given root block.
    ///
    /// Returns an error if the container is at capacity or if an election
    /// for this root already exists.
    pub fn start_election(
        &mut self,
        root: BlockHash,
        now: Timestamp,
    ) -> Result<(), ConsensusError> {
        if self.elections.len() >= self.max_elections {
            return Err(ConsensusError::ElectionCapacityReached(self.max_elections));
        }
        if self.elections.contains_key(&root) {
            return Ok(());
        }

        let mut election = Election::with_quorum_bps(root, self.effective_weight, self.quorum_bps, now);
        election.set_online_weight_minimum(self.online_weight_minimum);
        self.elections.insert(root, election);
        Ok(())
    }

    /// Route a vote to the appropriate election.
    ///
    /// Returns the election status if the vote caused the election to confirm.
    pub fn process_vote(
        &mut self,
        root: &BlockHash,
        voter: &WalletAddress,
        block: BlockHash,
        weight: u128,
        is_final: bool,
        now: Timestamp,
    ) -> Result<Option<ElectionStatus>, ConsensusError> {
        let election = self
            .elections
            .get_mut(root)
            .ok_or_else(|| ConsensusError::ElectionNotFound(format!("{}", root)))?;

        if election.is_confirmed() {
            return Err(ConsensusError::ElectionAlreadyConfirmed);
        }

        let vote_result = election.vote(voter, block, weight, is_final, now);

        match vote_result {
            VoteResult::Error(msg) => {
                Err(ConsensusError::FinalVoteAlreadyCast(msg))
            }
            _ => {
                let status = election.try_confirm(now);
                Ok(status)
            }
        }
    }

    /// Cascade a just-confirmed block's confirmation onto still-open
    /// elections for its `previous`/`source`/`link` roots (§4.4
    /// `confirm_if_quorum`, §8 "Cascade correctness").
    ///
    /// This crate has no notion of block contents, so the caller — which
    /// does, via the ledger — supplies the dependent roots to check. Each
    /// one is force-confirmed only if its election is still open and has
    /// exactly one candidate: with no competing fork, the parent's fate is
    /// already settled by the child confirming, so there's nothing left to
    /// vote on. Returns the statuses of every election cascaded this way,
    /// so the caller can cement them alongside the triggering confirmation.
    pub fn cascade_confirm(
        &mut self,
        dependent_roots: &[BlockHash],
        now: Timestamp,
    ) -> Vec<ElectionStatus> {
        let mut cascaded = Vec::new();
        for root in dependent_roots {
            if let Some(election) = self.elections.get_mut(root) {
                if let Some(status) = election.force_confirm(now) {
                    cascaded.push(status);
                }
            }
        }
        cascaded
    }

    /// Remove all elections that have timed out.
    ///
    /// Returns the root hashes of expired elections.
    pub fn cleanup_expired(
        &mut self,
        timeout_ms: u64,
        now: Timestamp,
    ) -> Vec<BlockHash> {
        let mut expired = Vec::new();

        for (root, election) in &mut self.elections {
            if election.check_timeout(timeout_ms, now) {
                expired.push(*root);
            }
        }

        for root in &expired {
            self.elections.remove(root);
        }

        expired
    }

    /// Remove confirmed elections after their results have been processed.
    ///
    /// Should be called after `confirmed_elections()` so the caller can
    /// collect and cement the results, then free the slots.
    pub fn cleanup_confirmed(&mut self) -> Vec<BlockHash> {
        let confirmed: Vec<BlockHash> = self
            .elections
            .iter()
            .filter(|(_, e)| e.state == ElectionState::Confirmed)
            .map(|(root, _)| *root)
            .collect();

        for root in &confirmed {
            self.elections.remove(root);
        }

        confirmed
    }

    /// Get a reference to an election by its root.
    pub fn get_election(&self, root: &BlockHash) -> Option<&Election> {
        self.elections.get(root)
    }

    /// Get a mutable reference to an election by its root.
    pub fn get_election_mut(&mut self, root: &BlockHash) -> Option<&mut Election> {
        self.elections.get_mut(root)
    }

    /// Number of active elections.
    pub fn election_count(&self) -> usize {
        self.elections.len()
    }

    /// Collect status for all confirmed elections.
    pub fn confirmed_elections(&self) -> Vec<ElectionStatus> {
        self.elections
            .values()
            .filter(|e| e.state == ElectionState::Confirmed)
            .filter_map(|e| {
                let (winner, tally) = e.leading_block()?;
                let duration_ms = e
                    .state_changed_at
                    .as_secs()
                    .saturating_sub(e.created_at.as_secs())
                    .saturating_mul(1000);
                Some(ElectionStatus {
                    winner,
                    tally,
                    final_tally: tally,
                    election_duration_ms: duration_ms,
                })
            })
            .collect()
    }

    /// Update the effective weight used for new elections.
    ///
    /// Callers should pass `OnlineWeightSampler::effective_weight()` which is
    /// `max(current_online, trended_ema, min_floor)`. This prevents quorum
    /// collapse when online weight dips temporarily.
    pub fn set_online_weight(&mut self, weight: u128) {
        self.effective_weight = weight;
    }

    /// Whether the container has reached its capacity limit.
    pub fn is_at_capacity(&self) -> bool {
        self.elections.len() >= self.max_elections
    }

    /// Resolve a fork by expiring the losing block's election.
    ///
    /// When two blocks share the same previous (a fork), both enter elections.
    /// The losing block's election is cancelled and its data can be rolled back.
    /// Returns the fork block hash if the election was successfully expired.
    pub fn resolve_fork(
        &mut self,
        _confirmed_block: BlockHash,
        fork_block: BlockHash,
    ) -> Option<BlockHash> {
        if let Some(election) = self.elections.get_mut(&fork_block) {
            if !election.is_confirmed() {
                election.state = ElectionState::Expired;
                return Some(fork_block);
            }
        }
        None
    }

    /// Get all block hashes that lost to the confirmed winner in an election.
    ///
    /// These losers are candidates for rollback from the ledger.
    pub fn get_fork_losers(&self, confirmed_root: &BlockHash) -> Vec<BlockHash> {
        if let Some(election) = self.elections.get(confirmed_root) {
            if election.is_confirmed() {
                if let Some((winner, _)) = election.leading_block() {
                    return election
                        .tally
                        .keys()
                        .filter(|hash| **hash != winner)
                        .copied()
                        .collect();
                }
            }
        }
        Vec::new()
    }
}
