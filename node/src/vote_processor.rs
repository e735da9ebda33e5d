//! Vote processor — bounded admission queue plus batched signature
//! verification for representative votes (§4.5).
//!
//! A vote carries an account, a monotonically increasing sequence number,
//! and one or more block hashes it covers (a representative batches votes
//! for several roots it's actively voting on into one signed message).
//! Admission into the queue is tiered by the voter's share of online
//! stake so a handful of high-weight representatives can never be crowded
//! out by a flood of low-weight ones; the actual signature check happens
//! once per drained batch rather than per vote.

use std::collections::VecDeque;

use burst_crypto::verify_batch;
use burst_types::{BlockHash, PublicKey, Signature, WalletAddress};

/// A representative's vote, covering one or more block hashes sharing a
/// signature over `account ∥ sequence ∥ hashes`.
#[derive(Clone, Debug)]
pub struct Vote {
    pub account: WalletAddress,
    pub sequence: u64,
    pub hashes: Vec<BlockHash>,
    pub is_final: bool,
    pub signature: Signature,
}

impl Vote {
    /// The message digest signed over: `account ∥ sequence ∥ hashes`.
    pub fn digest(&self) -> Vec<u8> {
        let mut buf = Vec::with_capacity(32 + 8 + self.hashes.len() * 32);
        buf.extend_from_slice(self.account.as_str().as_bytes());
        buf.extend_from_slice(&self.sequence.to_le_bytes());
        for hash in &self.hashes {
            buf.extend_from_slice(hash.as_bytes());
        }
        buf
    }
}

/// Which admission tier a vote was queued under, by the voter's share of
/// online stake (basis points out of 10_000).
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord)]
pub enum VoteQueueTier {
    /// < 0.1% of online stake.
    Low,
    /// >= 0.1%, < 1%.
    Medium,
    /// >= 1%, < 5%.
    High,
    /// >= 5% of online stake — never turned away while any lower tier has room.
    Principal,
}

impl VoteQueueTier {
    /// Classify a voter's weight against total online stake, in basis points.
    pub fn classify(voter_weight: u128, online_stake: u128) -> Self {
        if online_stake == 0 {
            return VoteQueueTier::Low;
        }
        let bps = voter_weight.saturating_mul(10_000) / online_stake;
        if bps >= 500 {
            VoteQueueTier::Principal
        } else if bps >= 100 {
            VoteQueueTier::High
        } else if bps >= 10 {
            VoteQueueTier::Medium
        } else {
            VoteQueueTier::Low
        }
    }
}

struct QueuedVote {
    vote: Vote,
    sender_pubkey: PublicKey,
    tier: VoteQueueTier,
}

/// Outcome of routing one verified vote into the election/root indices.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum VoteRouteResult {
    /// Recorded as the new max-sequence vote and forwarded to a live election.
    Processed,
    /// Recorded, but no election exists yet for any of the vote's hashes.
    Unmatched,
    /// A strictly newer vote from this account was already on file; ignored.
    Stale,
}

/// Per-hash outcome produced while applying a verified vote, reported back
/// to the caller so it can route into elections and the vote cache.
pub struct VoteOutcome {
    pub hash: BlockHash,
    pub result: VoteRouteResult,
}

/// Bounded FIFO of pending votes with weight-tiered admission (§4.5).
///
/// Each tier gets its own sub-queue so a burst of low-weight votes can
/// never push out votes from principal representatives; `drain_batch`
/// pulls from the highest tier down, oldest first within a tier.
pub struct VoteProcessor {
    queues: [VecDeque<QueuedVote>; 4],
    max_per_tier: usize,
    /// Sender's sequence must lag by at least this much behind our recorded
    /// max for this account before we bother replying with it — keeps a
    /// slow-syncing peer from triggering a reply storm (§4.5 "amplification-safe").
    amplification_lag_threshold: u64,
}

impl VoteProcessor {
    pub fn new(max_per_tier: usize) -> Self {
        Self {
            queues: [
                VecDeque::new(),
                VecDeque::new(),
                VecDeque::new(),
                VecDeque::new(),
            ],
            max_per_tier,
            amplification_lag_threshold: 10_000,
        }
    }

    fn tier_index(tier: VoteQueueTier) -> usize {
        match tier {
            VoteQueueTier::Low => 0,
            VoteQueueTier::Medium => 1,
            VoteQueueTier::High => 2,
            VoteQueueTier::Principal => 3,
        }
    }

    /// Offer a vote for admission. Returns `false` if its tier's queue is
    /// full and the vote was dropped.
    pub fn enqueue(
        &mut self,
        vote: Vote,
        sender_pubkey: PublicKey,
        voter_weight: u128,
        online_stake: u128,
    ) -> bool {
        let tier = VoteQueueTier::classify(voter_weight, online_stake);
        let idx = Self::tier_index(tier);
        if self.queues[idx].len() >= self.max_per_tier && tier != VoteQueueTier::Principal {
            return false;
        }
        self.queues[idx].push_back(QueuedVote {
            vote,
            sender_pubkey,
            tier,
        });
        true
    }

    /// Total votes currently queued across all tiers.
    pub fn len(&self) -> usize {
        self.queues.iter().map(VecDeque::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.queues.iter().all(VecDeque::is_empty)
    }

    /// Drain up to `batch_size` votes (Principal first, then High, Medium,
    /// Low), batch-verify their signatures, and return only the ones that
    /// checked out.
    pub fn drain_verified_batch(&mut self, batch_size: usize) -> Vec<Vote> {
        let mut drained = Vec::with_capacity(batch_size);
        for idx in (0..4).rev() {
            while drained.len() < batch_size {
                match self.queues[idx].pop_front() {
                    Some(q) => drained.push(q),
                    None => break,
                }
            }
            if drained.len() >= batch_size {
                break;
            }
        }

        let digests: Vec<Vec<u8>> = drained.iter().map(|q| q.vote.digest()).collect();
        let items: Vec<(&[u8], &Signature, &PublicKey)> = drained
            .iter()
            .zip(digests.iter())
            .map(|(q, digest)| (digest.as_slice(), &q.vote.signature, &q.sender_pubkey))
            .collect();
        let verdicts = verify_batch(&items);

        drained
            .into_iter()
            .zip(verdicts)
            .filter_map(|(q, ok)| ok.then_some(q.vote))
            .collect()
    }

    /// Whether `sender_sequence` lags far enough behind `our_max_sequence`
    /// that we should proactively reply with our max vote (§4.5).
    pub fn should_reply_with_max(&self, sender_sequence: u64, our_max_sequence: u64) -> bool {
        our_max_sequence.saturating_sub(sender_sequence) >= self.amplification_lag_threshold
    }
}
