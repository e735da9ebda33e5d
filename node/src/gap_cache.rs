//! Gap cache — accumulates voter weight behind hashes nobody has a block
//! for yet, and schedules a bootstrap request once enough weight vouches
//! for them (§4.7).
//!
//! Bootstrap itself — the pull/push protocol that actually fetches the
//! missing block — is explicitly out of scope (§1); this module owns only
//! the decision of *when* to ask, expressed as a trait so a real bootstrap
//! client can be plugged in by the network layer.

use std::collections::{HashMap, HashSet};

use burst_types::{Timestamp, WalletAddress};

/// External collaborator that actually performs a bootstrap pull for a
/// hash this node doesn't have. Implemented outside this crate (§1).
pub trait BootstrapRequester: Send + Sync {
    /// Schedule (not necessarily synchronous) a bootstrap pull for `hash`.
    fn request(&self, hash: burst_types::BlockHash);
}

/// Which threshold a gap-cache entry is evaluated against.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum GapKind {
    /// Legacy bootstrap: `online_stake * numerator / 256`.
    Legacy,
    /// Lazy bootstrap: flat `online_weight_minimum`.
    Lazy,
}

struct GapEntry {
    voters: HashSet<WalletAddress>,
    weight: u128,
    first_seen: Timestamp,
    scheduled: bool,
}

/// Tracks votes for block hashes this node has never seen a block for.
pub struct GapCache {
    entries: HashMap<burst_types::BlockHash, GapEntry>,
    /// `bootstrap_fraction_numerator` from config (1-256), for [`GapKind::Legacy`].
    bootstrap_fraction_numerator: u32,
    online_weight_minimum: u128,
    /// Small delay (seconds) between crossing threshold and actually
    /// requesting, so a block arriving through normal propagation in the
    /// meantime can cancel it.
    request_delay_secs: u64,
}

impl GapCache {
    pub fn new(bootstrap_fraction_numerator: u32, online_weight_minimum: u128) -> Self {
        Self {
            entries: HashMap::new(),
            bootstrap_fraction_numerator,
            online_weight_minimum,
            request_delay_secs: 5,
        }
    }

    /// Record a vote for an unknown hash from `voter` carrying `voter_weight`.
    /// Returns `true` if this vote just pushed the entry over threshold for
    /// the first time (caller should schedule a delayed bootstrap request).
    pub fn observe_vote(
        &mut self,
        hash: burst_types::BlockHash,
        voter: WalletAddress,
        voter_weight: u128,
        online_stake: u128,
        kind: GapKind,
        now: Timestamp,
    ) -> bool {
        let entry = self.entries.entry(hash).or_insert_with(|| GapEntry {
            voters: HashSet::new(),
            weight: 0,
            first_seen: now,
            scheduled: false,
        });

        if entry.voters.insert(voter) {
            entry.weight = entry.weight.saturating_add(voter_weight);
        }

        if entry.scheduled {
            return false;
        }

        let threshold = match kind {
            GapKind::Legacy => {
                online_stake.saturating_mul(self.bootstrap_fraction_numerator as u128) / 256
            }
            GapKind::Lazy => self.online_weight_minimum,
        };

        if entry.weight >= threshold {
            entry.scheduled = true;
            true
        } else {
            false
        }
    }

    /// Whether `hash`'s scheduled request is still due (i.e. the block has
    /// not since arrived and been removed via [`Self::resolve`]).
    pub fn is_still_pending(&self, hash: &burst_types::BlockHash) -> bool {
        self.entries.get(hash).is_some_and(|e| e.scheduled)
    }

    pub fn request_delay_secs(&self) -> u64 {
        self.request_delay_secs
    }

    /// The block for `hash` was learned (arrived through normal processing,
    /// not bootstrap) — drop it from the cache so no request fires.
    pub fn resolve(&mut self, hash: &burst_types::BlockHash) {
        self.entries.remove(hash);
    }

    /// Evict entries older than `max_age_secs`.
    pub fn clear_expired(&mut self, max_age_secs: u64, now: Timestamp) {
        self.entries.retain(|_, e| {
            now.as_secs().saturating_sub(e.first_seen.as_secs()) < max_age_secs
        });
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
