//! Election state machine — manages the lifecycle of a consensus election.
//!
//! Inspired by rsnano-node's election lifecycle. An election is created when a
//! fork is detected (two blocks sharing the same previous). Representatives
//! vote on which block to confirm. A block is confirmed when it accumulates
//! ≥ 67% of the total online voting weight.

use crate::vote_info::{VoteInfo, VoteResult};
use burst_types::{BlockHash, Timestamp, WalletAddress};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Default confirmation threshold: 67% expressed as basis points (6700 / 10000).
pub const QUORUM_BPS: u128 = 6700;
const BPS_DENOMINATOR: u128 = 10_000;

/// Maximum age of an election (in seconds) before new votes are rejected.
const MAX_ELECTION_AGE_SECS: u64 = 300;

/// Once ≥ 10 blocks are contesting a root, a fresh alternative is only
/// admitted if it already carries at least this share of online stake
/// (basis points), otherwise it's cheap spam noise that would blow up the
/// tally map for no chance of winning (§4.4 "publish admission").
const PUBLISH_CANDIDATE_CAP: usize = 10;
const PUBLISH_MIN_TALLY_BPS: u128 = 1_000;

/// Minimum seconds a representative must wait between votes, tiered by its
/// share of online stake (basis points): the smaller a voter's weight, the
/// longer it must wait before its vote can be replaced, so a swarm of
/// low-weight accounts can't flip-flop an election's tally every tick
/// (§4.4 "voter cooldown").
pub fn cooldown_secs_for_weight(voter_weight: u128, online_stake: u128) -> u64 {
    if online_stake == 0 {
        return 1;
    }
    let bps = voter_weight.saturating_mul(BPS_DENOMINATOR) / online_stake;
    if bps >= 500 {
        1
    } else if bps >= 100 {
        5
    } else {
        15
    }
}

/// The lifecycle state of an election.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum ElectionState {
    /// Created, waiting for votes to arrive.
    Passive,
    /// Actively soliciting votes from representatives.
    Active,
    /// Reached quorum (≥ 67% of online weight). Terminal state.
    Confirmed,
    /// Timed out without reaching confirmation. Terminal state.
    Expired,
}

/// Summary of a confirmed election.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ElectionStatus {
    /// The winning block hash.
    pub winner: BlockHash,
    /// The weight tally of the winning block at confirmation time.
    pub tally: u128,
    /// The final tally after all votes are counted.
    pub final_tally: u128,
    /// How long the election took, in milliseconds.
    pub election_duration_ms: u64,
}

/// A single consensus election for a root block.
///
/// Tracks votes from representatives and determines when a block reaches the
/// confirmation threshold (≥ 67% of total online voting weight).
#[derive(Clone, Debug)]
pub struct Election {
    /// The root block hash that triggered this election (e.g., the `previous` of forking blocks).
    pub id: BlockHash,
    /// Current lifecycle state.
    pub state: ElectionState,
    /// Latest vote per representative (keyed by voter address).
    pub last_votes: HashMap<WalletAddress, VoteInfo>,
    /// Per-block weight tally.
    pub tally: HashMap<BlockHash, u128>,
    /// When the election was created.
    pub created_at: Timestamp,
    /// When the state last changed.
    pub state_changed_at: Timestamp,
    /// Weight needed to confirm (`quorum_bps` / 10000 of online weight).
    confirmation_threshold: u128,
    /// Total online voting weight this election was opened against, kept
    /// around to classify voter cooldown tiers and publish admission.
    online_weight: u128,
    /// Floor under which the total weight cast in this election is not
    /// enough to confirm anything, regardless of margin (§4.4
    /// `confirm_if_quorum`'s `sum >= online_weight_minimum` gate).
    online_weight_minimum: u128,
}

impl Election {
    /// Create a new election in the Passive state, confirming at the
    /// default 67% quorum.
    ///
    /// `online_weight` is the total voting weight of all online representatives.
    pub fn new(root: BlockHash, online_weight: u128, now: Timestamp) -> Self {
        Self::with_quorum_bps(root, online_weight, QUORUM_BPS, now)
    }

    /// Create a new election with a configurable quorum (basis points of
    /// `online_weight`), for deployments that tune `quorum_pct` away from
    /// the 67% default.
    pub fn with_quorum_bps(
        root: BlockHash,
        online_weight: u128,
        quorum_bps: u128,
        now: Timestamp,
    ) -> Self {
        let confirmation_threshold = online_weight.saturating_mul(quorum_bps) / BPS_DENOMINATOR;

        Self {
            id: root,
            state: ElectionState::Passive,
            last_votes: HashMap::new(),
            tally: HashMap::new(),
            created_at: now,
            state_changed_at: now,
            confirmation_threshold,
            online_weight,
            online_weight_minimum: 0,
        }
    }

    /// Set the minimum total cast weight required before confirmation is
    /// even considered (§4.4). Defaults to 0 (no floor) so existing
    /// single-candidate tests are unaffected unless a caller opts in.
    pub fn set_online_weight_minimum(&mut self, online_weight_minimum: u128) {
        self.online_weight_minimum = online_weight_minimum;
    }

    /// Whether a brand-new candidate block for this root should be admitted
    /// once the tally map is already crowded. Below [`PUBLISH_CANDIDATE_CAP`]
    /// candidates, anything goes; at or above it, a newcomer needs at least
    /// `PUBLISH_MIN_TALLY_BPS` of online stake behind it already (§4.4).
    pub fn can_publish(&self, candidate_tally: u128) -> bool {
        if self.tally.len() < PUBLISH_CANDIDATE_CAP {
            return true;
        }
        if self.online_weight == 0 {
            return true;
        }
        candidate_tally.saturating_mul(BPS_DENOMINATOR) / self.online_weight >= PUBLISH_MIN_TALLY_BPS
    }

    /// Process a vote from a representative.
    ///
    /// Rules:
    /// - If the election is already confirmed or expired, the vote is ignored.
    /// - If the voter already cast a final vote, the new vote is rejected.
    /// - If the voter already cast a non-final vote, it can be replaced (re-vote).
    /// - Final votes cannot be changed once cast.
    pub fn vote(
        &mut self,
        voter: &WalletAddress,
        block: BlockHash,
        weight: u128,
        is_final: bool,
        now: Timestamp,
    ) -> VoteResult {
        if self.state == ElectionState::Confirmed {
            return VoteResult::Ignored;
        }
        if self.state == ElectionState::Expired {
            return VoteResult::Ignored;
        }

        let election_age_secs = now
            .as_secs()
            .saturating_sub(self.created_at.as_secs());
        if election_age_secs > MAX_ELECTION_AGE_SECS {
            return VoteResult::Ignored;
        }

        if let Some(existing) = self.last_votes.get(voter) {
            if existing.is_final {
                return VoteResult::Error(format!(
                    "final vote already cast by {}",
                    voter.as_str()
                ));
            }

            // Replay protection: reject votes with timestamps not strictly newer
            if now.as_secs() <= existing.timestamp.as_secs() {
                return VoteResult::Ignored;
            }

            // Voter cooldown: a re-vote for a different block must wait out
            // its weight tier's cooldown since the previous vote (§4.4).
            if existing.block_hash != block {
                let cooldown = cooldown_secs_for_weight(existing.weight, self.online_weight);
                if now.as_secs().saturating_sub(existing.timestamp.as_secs()) < cooldown {
                    return VoteResult::Ignored;
                }
            }

            // Re-vote: subtract the old vote's weight from its block tally
            let old_block = existing.block_hash;
            let old_weight = existing.weight;
            if let Some(w) = self.tally.get_mut(&old_block) {
                *w = w.saturating_sub(old_weight);
                if *w == 0 {
                    self.tally.remove(&old_block);
                }
            }

            let new_sequence = existing.sequence + 1;

            // Record the new vote
            let info = VoteInfo::new(
                voter.clone(),
                block,
                weight,
                is_final,
                now,
                new_sequence,
            );
            self.last_votes.insert(voter.clone(), info);
            *self.tally.entry(block).or_insert(0) += weight;

            // Transition from Passive to Active on first vote activity
            if self.state == ElectionState::Passive {
                self.state = ElectionState::Active;
                self.state_changed_at = now;
            }

            VoteResult::Updated
        } else {
            // First vote from this representative
            let info = VoteInfo::new(voter.clone(), block, weight, is_final, now, 1);
            self.last_votes.insert(voter.clone(), info);
            *self.tally.entry(block).or_insert(0) += weight;

            if self.state == ElectionState::Passive {
                self.state = ElectionState::Active;
                self.state_changed_at = now;
            }

            VoteResult::Accepted
        }
    }

    /// Check if any block has reached quorum: enough total weight cast
    /// (`sum >= online_weight_minimum`) and the leader clear of the
    /// runner-up by at least `confirmation_threshold` (§4.4
    /// `confirm_if_quorum`). For a single-candidate election the runner-up
    /// tally is 0, so this reduces to the plain threshold check.
    ///
    /// If so, transitions the election to Confirmed and returns the status.
    /// Returns `None` if no block has reached quorum yet.
    pub fn try_confirm(&mut self, now: Timestamp) -> Option<ElectionStatus> {
        if self.state == ElectionState::Confirmed {
            return None;
        }
        if self.state == ElectionState::Expired {
            return None;
        }

        let (winner, winner_tally) = self.leading_block()?;

        let sum: u128 = self.tally.values().sum();
        if sum < self.online_weight_minimum {
            return None;
        }

        let runner_up = self
            .tally
            .iter()
            .filter(|(hash, _)| **hash != winner)
            .map(|(_, w)| *w)
            .max()
            .unwrap_or(0);

        if winner_tally.saturating_sub(runner_up) >= self.confirmation_threshold {
            self.state = ElectionState::Confirmed;
            self.state_changed_at = now;

            let duration_ms = now
                .as_secs()
                .saturating_sub(self.created_at.as_secs())
                .saturating_mul(1000);

            Some(ElectionStatus {
                winner,
                tally: winner_tally,
                final_tally: winner_tally,
                election_duration_ms: duration_ms,
            })
        } else {
            None
        }
    }

    /// Number of distinct candidate blocks with at least one vote.
    pub fn candidate_count(&self) -> usize {
        self.tally.len()
    }

    /// Force-confirm the sole surviving candidate, bypassing the quorum
    /// gate entirely. Used only for the §4.4 cascade: a still-open election
    /// with exactly one candidate inherits confirmation from a just-
    /// confirmed child election (§8 "Cascade correctness"), since there is
    /// no other outcome it could reach. Returns `None` if the election
    /// already has a terminal state or more than one candidate.
    pub fn force_confirm(&mut self, now: Timestamp) -> Option<ElectionStatus> {
        if self.state == ElectionState::Confirmed || self.state == ElectionState::Expired {
            return None;
        }
        if self.candidate_count() != 1 {
            return None;
        }
        let (winner, winner_tally) = self.leading_block()?;

        self.state = ElectionState::Confirmed;
        self.state_changed_at = now;

        let duration_ms = now
            .as_secs()
            .saturating_sub(self.created_at.as_secs())
            .saturating_mul(1000);

        Some(ElectionStatus {
            winner,
            tally: winner_tally,
            final_tally: winner_tally,
            election_duration_ms: duration_ms,
        })
    }

    /// Check if the election has timed out.
    ///
    /// If `now - created_at >= timeout_ms`, transitions to Expired and returns true.
    pub fn check_timeout(&mut self, timeout_ms: u64, now: Timestamp) -> bool {
        if self.state == ElectionState::Confirmed || self.state == ElectionState::Expired {
            return false;
        }

        let elapsed_ms = now
            .as_secs()
            .saturating_sub(self.created_at.as_secs())
            .saturating_mul(1000);

        if elapsed_ms >= timeout_ms {
            self.state = ElectionState::Expired;
            self.state_changed_at = now;
            true
        } else {
            false
        }
    }

    /// Whether the election has been confirmed.
    pub fn is_confirmed(&self) -> bool {
        self.state == ElectionState::Confirmed
    }

    /// Whether the election has expired.
    pub fn is_expired(&self) -> bool {
        self.state == ElectionState::Expired
    }

    /// Returns the block with the most voting weight, along with its tally.
    pub fn leading_block(&self) -> Option<(BlockHash, u128)> {
        self.tally
            .iter()
            .max_by_key(|(_, w)| *w)
            .map(|(hash, w)| (*hash, *w))
    }

    /// Returns the confirmation threshold for this election.
    pub fn confirmation_threshold(&self) -> u128 {
        self.confirmation_threshold
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn make_hash(byte: u8) -> BlockHash {
        BlockHash::new([byte; 32])
    }

    fn make_voter(name: &str) -> WalletAddress {
        WalletAddress::new(format!("brst_{name}"))
    }

    fn ts(secs: u64) -> Timestamp {
        Timestamp::new(secs)
    }

    #[test]
    fn new_election_is_passive() {
        let e = Election::new(make_hash(1), 1000, ts(100));
        assert_eq!(e.state, ElectionState::Passive);
        assert_eq!(e.id, make_hash(1));
        assert!(e.last_votes.is_empty());
        assert!(e.tally.is_empty());
        // 67% of 1000 = 670
        assert_eq!(e.confirmation_threshold(), 670);
    }

    #[test]
    fn first_vote_transitions_to_active() {
        let mut e = Election::new(make_hash(1), 1000, ts(100));
        let result = e.vote(&make_voter("alice"), make_hash(2), 100, false, ts(101));

        assert_eq!(result, VoteResult::Accepted);
        assert_eq!(e.state, ElectionState::Active);
        assert_eq!(e.tally.get(&make_hash(2)), Some(&100));
    }

    #[test]
    fn multiple_votes_accumulate_tally() {
        let mut e = Election::new(make_hash(1), 1000, ts(100));
        e.vote(&make_voter("alice"), make_hash(2), 300, false, ts(101));
        e.vote(&make_voter("bob"), make_hash(2), 400, false, ts(102));

        assert_eq!(e.tally.get(&make_hash(2)), Some(&700));
        assert_eq!(e.leading_block(), Some((make_hash(2), 700)));
    }

    #[test]
    fn non_final_vote_can_be_updated() {
        let mut e = Election::new(make_hash(1), 1000, ts(100));
        e.vote(&make_voter("alice"), make_hash(2), 300, false, ts(101));

        // Alice changes her vote from block 2 to block 3
        let result = e.vote(&make_voter("alice"), make_hash(3), 300, false, ts(102));

        assert_eq!(result, VoteResult::Updated);
        // Block 2 should have been removed (tally dropped to 0)
        assert!(e.tally.get(&make_hash(2)).is_none());
        assert_eq!(e.tally.get(&make_hash(3)), Some(&300));
        // Sequence should have incremented
        assert_eq!(e.last_votes.get(&make_voter("alice")).unwrap().sequence, 2);
    }

    #[test]
    fn final_vote_cannot_be_changed() {
        let mut e = Election::new(make_hash(1), 1000, ts(100));
        e.vote(&make_voter("alice"), make_hash(2), 300, true, ts(101));

        let result = e.vote(&make_voter("alice"), make_hash(3), 300, false, ts(102));

        match result {
            VoteResult::Error(msg) => assert!(msg.contains("final vote already cast")),
            other => panic!("expected Error, got {:?}", other),
        }
        // Original vote should remain
        assert_eq!(e.tally.get(&make_hash(2)), Some(&300));
    }

    #[test]
    fn non_final_upgraded_to_final() {
        let mut e = Election::new(make_hash(1), 1000, ts(100));
        e.vote(&make_voter("alice"), make_hash(2), 300, false, ts(101));
        let result = e.vote(&make_voter("alice"), make_hash(2), 300, true, ts(102));

        assert_eq!(result, VoteResult::Updated);
        assert!(e.last_votes.get(&make_voter("alice")).unwrap().is_final);
    }

    #[test]
    fn try_confirm_reaches_quorum() {
        let mut e = Election::new(make_hash(1), 1000, ts(100));
        // Need 670 to confirm
        e.vote(&make_voter("alice"), make_hash(2), 400, true, ts(101));
        assert!(e.try_confirm(ts(102)).is_none());

        e.vote(&make_voter("bob"), make_hash(2), 300, true, ts(103));
        // Now at 700 >= 670
        let status = e.try_confirm(ts(104)).expect("should confirm");

        assert_eq!(status.winner, make_hash(2));
        assert_eq!(status.tally, 700);
        assert_eq!(e.state, ElectionState::Confirmed);
    }

    #[test]
    fn try_confirm_returns_none_when_already_confirmed() {
        let mut e = Election::new(make_hash(1), 1000, ts(100));
        e.vote(&make_voter("alice"), make_hash(2), 700, true, ts(101));
        e.try_confirm(ts(102));

        assert!(e.try_confirm(ts(103)).is_none());
    }

    #[test]
    fn votes_ignored_on_confirmed_election() {
        let mut e = Election::new(make_hash(1), 1000, ts(100));
        e.vote(&make_voter("alice"), make_hash(2), 700, true, ts(101));
        e.try_confirm(ts(102));

        let result = e.vote(&make_voter("bob"), make_hash(3), 200, false, ts(103));
        assert_eq!(result, VoteResult::Ignored);
    }

    #[test]
    fn check_timeout_expires_election() {
        let mut e = Election::new(make_hash(1), 1000, ts(100));
        e.vote(&make_voter("alice"), make_hash(2), 100, false, ts(101));

        // 30 seconds = 30_000ms timeout, now at 100 + 31 = 131
        assert!(!e.check_timeout(30_000, ts(120))); // only 20s elapsed
        assert!(e.check_timeout(30_000, ts(131)));   // 31s elapsed >= 30s
        assert_eq!(e.state, ElectionState::Expired);
    }

    #[test]
    fn check_timeout_noop_on_confirmed() {
        let mut e = Election::new(make_hash(1), 1000, ts(100));
        e.vote(&make_voter("alice"), make_hash(2), 700, true, ts(101));
        e.try_confirm(ts(102));

        assert!(!e.check_timeout(1, ts(200)));
        assert_eq!(e.state, ElectionState::Confirmed);
    }

    #[test]
    fn votes_ignored_on_expired_election() {
        let mut e = Election::new(make_hash(1), 1000, ts(100));
        e.check_timeout(1, ts(200)); // Force expire

        let result = e.vote(&make_voter("alice"), make_hash(2), 500, false, ts(201));
        assert_eq!(result, VoteResult::Ignored);
    }

    #[test]
    fn leading_block_returns_highest_tally() {
        let mut e = Election::new(make_hash(1), 1000, ts(100));
        e.vote(&make_voter("alice"), make_hash(2), 300, false, ts(101));
        e.vote(&make_voter("bob"), make_hash(3), 500, false, ts(102));

        let (leader, weight) = e.leading_block().unwrap();
        assert_eq!(leader, make_hash(3));
        assert_eq!(weight, 500);
    }

    #[test]
    fn leading_block_none_on_empty() {
        let e = Election::new(make_hash(1), 1000, ts(100));
        assert!(e.leading_block().is_none());
    }

    #[test]
    fn competing_blocks_tracked_separately() {
        let mut e = Election::new(make_hash(1), 1000, ts(100));
        e.vote(&make_voter("alice"), make_hash(2), 300, false, ts(101));
        e.vote(&make_voter("bob"), make_hash(3), 200, false, ts(102));
        e.vote(&make_voter("carol"), make_hash(2), 100, false, ts(103));

        assert_eq!(e.tally.get(&make_hash(2)), Some(&400));
        assert_eq!(e.tally.get(&make_hash(3)), Some(&200));
    }

    #[test]
    fn re_vote_to_different_block() {
        let mut e = Election::new(make_hash(1), 1000, ts(100));
        e.vote(&make_voter("alice"), make_hash(2), 300, false, ts(101));
        e.vote(&make_voter("bob"), make_hash(3), 400, false, ts(102));

        // Bob switches from block 3 to block 2
        let result = e.vote(&make_voter("bob"), make_hash(2), 400, false, ts(103));
        assert_eq!(result, VoteResult::Updated);

        assert_eq!(e.tally.get(&make_hash(2)), Some(&700));
        assert!(e.tally.get(&make_hash(3)).is_none());
    }

    #[test]
    fn election_duration_calculated_correctly() {
        let mut e = Election::new(make_hash(1), 1000, ts(100));
        e.vote(&make_voter("alice"), make_hash(2), 700, true, ts(105));
        let status = e.try_confirm(ts(110)).unwrap();

        // 110 - 100 = 10 seconds = 10_000 ms
        assert_eq!(status.election_duration_ms, 10_000);
    }

    #[test]
    fn zero_online_weight_election() {
        let mut e = Election::new(make_hash(1), 0, ts(100));
        // Threshold is 0, so any vote should confirm
        assert_eq!(e.confirmation_threshold(), 0);
        e.vote(&make_voter("alice"), make_hash(2), 1, true, ts(101));
        let status = e.try_confirm(ts(102));
        assert!(status.is_some());
    }

    #[test]
    fn re_vote_with_different_weight() {
        let mut e = Election::new(make_hash(1), 1000, ts(100));
        e.vote(&make_voter("alice"), make_hash(2), 300, false, ts(101));

        // Alice re-votes for the same block but with different weight
        let result = e.vote(&make_voter("alice"), make_hash(2), 500, false, ts(102));
        assert_eq!(result, VoteResult::Updated);
        assert_eq!(e.tally.get(&make_hash(2)), Some(&500));
    }

    // --- Quorum margin tests ---

    #[test]
    fn quorum_confirms_when_winner_exceeds_threshold() {
        let mut e = Election::new(make_hash(1), 1000, ts(100));

        // Block A gets 680 and clears the runner-up (100) by 580 < threshold
        // (670), so this does NOT confirm yet...
        e.vote(&make_voter("alice"), make_hash(2), 680, true, ts(101));
        e.vote(&make_voter("bob"), make_hash(3), 100, true, ts(102));
        assert!(e.try_confirm(ts(103)).is_none());

        // ...but once the runner-up's vote is withdrawn the margin over the
        // (now zero) runner-up clears the threshold and it confirms.
        e.vote(&make_voter("bob"), make_hash(2), 100, true, ts(108));
        let status = e.try_confirm(ts(109)).expect("should confirm at 78% quorum, no runner-up");
        assert_eq!(status.winner, make_hash(2));
        assert_eq!(status.tally, 780);
    }

    #[test]
    fn quorum_margin_blocks_confirmation_despite_threshold() {
        let mut e = Election::new(make_hash(1), 1000, ts(100));

        // Winner clears the raw threshold (670) but its margin over the
        // runner-up (680 - 300 = 380) does not, so it must not confirm.
        e.vote(&make_voter("alice"), make_hash(2), 680, true, ts(101));
        e.vote(&make_voter("bob"), make_hash(3), 300, true, ts(102));

        assert!(e.try_confirm(ts(103)).is_none());
        assert_ne!(e.state, ElectionState::Confirmed);
    }

    #[test]
    fn online_weight_minimum_blocks_confirmation_below_floor() {
        // Low quorum (10%) so the raw threshold is never the blocker here —
        // only the `online_weight_minimum` floor is under test.
        let mut e = Election::with_quorum_bps(make_hash(1), 1000, 100, ts(100));
        e.set_online_weight_minimum(500);

        // Single candidate clears the 100-bps threshold but total cast
        // weight (300) is below the configured floor.
        e.vote(&make_voter("alice"), make_hash(2), 300, true, ts(101));
        assert!(e.try_confirm(ts(102)).is_none());

        // More weight arrives, clearing the floor; now it confirms.
        e.vote(&make_voter("bob"), make_hash(2), 300, true, ts(103));
        let status = e.try_confirm(ts(104)).expect("should confirm once floor is cleared");
        assert_eq!(status.tally, 600);
    }

    #[test]
    fn quorum_does_not_confirm_below_threshold() {
        let mut e = Election::new(make_hash(1), 1000, ts(100));

        // Block A gets 660 < threshold 670 → does NOT confirm
        e.vote(&make_voter("alice"), make_hash(2), 660, true, ts(101));

        assert!(e.try_confirm(ts(102)).is_none());
        assert_ne!(e.state, ElectionState::Confirmed);
    }

    #[test]
    fn quorum_single_candidate_confirms_normally() {
        let mut e = Election::new(make_hash(1), 1000, ts(100));
        e.vote(&make_voter("alice"), make_hash(2), 700, true, ts(101));

        let status = e.try_confirm(ts(102)).expect("single candidate should confirm");
        assert_eq!(status.winner, make_hash(2));
    }

    // --- Replay protection (election age) tests ---

    #[test]
    fn vote_rejected_after_max_election_age() {
        let mut e = Election::new(make_hash(1), 1000, ts(100));

        // Vote at 100 + 301 = 401 seconds → age = 301 > 300
        let result = e.vote(&make_voter("alice"), make_hash(2), 500, false, ts(401));
        assert_eq!(result, VoteResult::Ignored);
        assert!(e.tally.is_empty());
    }

    #[test]
    fn vote_accepted_within_max_election_age() {
        let mut e = Election::new(make_hash(1), 1000, ts(100));

        // Vote at 100 + 300 = 400 seconds → age = 300, NOT > 300
        let result = e.vote(&make_voter("alice"), make_hash(2), 500, false, ts(400));
        assert_eq!(result, VoteResult::Accepted);
        assert_eq!(e.tally.get(&make_hash(2)), Some(&500));
    }

    #[test]
    fn vote_rejected_just_past_max_election_age() {
        let mut e = Election::new(make_hash(1), 1000, ts(100));

        // First vote within window
        let r1 = e.vote(&make_voter("alice"), make_hash(2), 500, false, ts(200));
        assert_eq!(r1, VoteResult::Accepted);

        // Second vote just past the 300s window
        let r2 = e.vote(&make_voter("bob"), make_hash(2), 300, false, ts(401));
        assert_eq!(r2, VoteResult::Ignored);
        // Only alice's vote should be tallied
        assert_eq!(e.tally.get(&make_hash(2)), Some(&500));
    }

    // --- Configurable quorum ---

    #[test]
    fn with_quorum_bps_uses_custom_threshold() {
        let e = Election::with_quorum_bps(make_hash(1), 1000, 5000, ts(100));
        assert_eq!(e.confirmation_threshold(), 500);
    }

    // --- Voter cooldown tiers ---

    #[test]
    fn low_weight_voter_change_blocked_within_cooldown() {
        let mut e = Election::new(make_hash(1), 1000, ts(100));
        // 5 / 1000 = 0.5% -> low tier, 15s cooldown
        e.vote(&make_voter("alice"), make_hash(2), 5, false, ts(101));

        let result = e.vote(&make_voter("alice"), make_hash(3), 5, false, ts(103));
        assert_eq!(result, VoteResult::Ignored);
        assert_eq!(e.tally.get(&make_hash(2)), Some(&5));
    }

    #[test]
    fn low_weight_voter_change_allowed_after_cooldown() {
        let mut e = Election::new(make_hash(1), 1000, ts(100));
        e.vote(&make_voter("alice"), make_hash(2), 5, false, ts(101));

        let result = e.vote(&make_voter("alice"), make_hash(3), 5, false, ts(116));
        assert_eq!(result, VoteResult::Updated);
        assert_eq!(e.tally.get(&make_hash(3)), Some(&5));
    }

    #[test]
    fn principal_voter_change_not_subject_to_multi_second_cooldown() {
        let mut e = Election::new(make_hash(1), 1000, ts(100));
        // 600 / 1000 = 60% -> principal tier, 1s cooldown
        e.vote(&make_voter("alice"), make_hash(2), 600, false, ts(101));

        let result = e.vote(&make_voter("alice"), make_hash(3), 600, false, ts(102));
        assert_eq!(result, VoteResult::Updated);
    }

    #[test]
    fn same_block_revote_ignores_cooldown() {
        let mut e = Election::new(make_hash(1), 1000, ts(100));
        e.vote(&make_voter("alice"), make_hash(2), 5, false, ts(101));
        // Upgrading to final for the same block shouldn't be blocked by cooldown.
        let result = e.vote(&make_voter("alice"), make_hash(2), 5, true, ts(102));
        assert_eq!(result, VoteResult::Updated);
    }

    // --- Publish admission ---

    #[test]
    fn can_publish_below_candidate_cap() {
        let mut e = Election::new(make_hash(1), 1000, ts(100));
        for i in 0..9u8 {
            e.vote(&make_voter(&format!("v{i}")), make_hash(i + 10), 1, false, ts(101));
        }
        assert!(e.can_publish(0));
    }

    #[test]
    fn can_publish_rejects_low_tally_once_crowded() {
        let mut e = Election::new(make_hash(1), 1000, ts(100));
        for i in 0..10u8 {
            e.vote(&make_voter(&format!("v{i}")), make_hash(i + 10), 1, false, ts(101));
        }
        assert!(!e.can_publish(5));
        assert!(e.can_publish(100));
    }
}
