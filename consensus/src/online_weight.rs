//! Online weight sampling — track which representatives are actively voting.
//!
//! Consensus quorum is calculated against *online* voting weight, not total
//! delegated weight. A representative is considered online if it has cast a
//! vote within the sampling window (default 5 minutes). This prevents
//! permanently-offline representatives from inflating the quorum denominator.
//!
//! Additional features:
//! - **Minimum weight floor**: prevents quorum from collapsing when very few
//!   representatives are online.
//! - **Trended (EMA) weight**: smooths temporary dips so quorum doesn't
//!   fluctuate wildly.
//! - **Principal rep classification**: identifies representatives with ≥0.1%
//!   of online weight.

use std::collections::HashMap;

use burst_types::WalletAddress;

/// Minimum online weight floor — prevents quorum from collapsing
/// when very few representatives are online.
/// Set to 60 million TRST (in raw units for the protocol).
const MIN_ONLINE_WEIGHT: u128 = 60_000_000;

/// Decay percentage for EMA trending (95 = 0.95, slow decay).
const TREND_DECAY_PCT: u128 = 95;

/// Tracks recently-active representatives for online weight calculation.
pub struct OnlineWeightSampler {
    /// Representative → timestamp of their most recent vote.
    recent_voters: HashMap<WalletAddress, u64>,
    /// Sampling window in seconds (representatives that voted within this
    /// window are considered online).
    window_secs: u64,
    /// Trended (smoothed) online weight — EMA of recent samples.
    trended_weight: u128,
    /// Minimum online weight floor.
    min_weight: u128,
}

impl OnlineWeightSampler {
    /// Create a new sampler with the given window (in seconds).
    pub fn new(window_secs: u64) -> Self {
        Self {
            recent_voters: HashMap::new(),
            window_secs,
            trended_weight: 0,
            min_weight: MIN_ONLINE_WEIGHT,
        }
    }

    /// Record that a representative cast a vote at the given timestamp.
    pub fn record_vote(&mut self, rep: &WalletAddress, timestamp: u64) {
        let entry = self.recent_voters.entry(rep.clone()).or_insert(0);
        // Only update if this is a more recent vote.
        if timestamp > *entry {
            *entry = timestamp;
        }
    }

    /// Return the list of representatives that voted within the window.
    pub fn online_representatives(&self, now: u64) -> Vec<WalletAddress> {
        let cutoff = now.saturating_sub(self.window_secs);
        self.recent_voters
            .iter()
            .filter(|(_, &last_vote)| last_vote >= cutoff)
            .map(|(addr, _)| addr.clone())
            .collect()
    }

    /// Calculate the total delegated weight of online representatives.
    ///
    /// `weights` maps each representative to the total weight delegated to it
    /// (sum of balances of accounts that selected it as their representative).
    pub fn online_weight(
        &self,
        now: u64,
        weights: &HashMap<WalletAddress, u128>,
    ) -> u128 {
        let cutoff = now.saturating_sub(self.window_secs);
        self.recent_voters
            .iter()
            .filter(|(_, &last_vote)| last_vote >= cutoff)
            .map(|(addr, _)| weights.get(addr).copied().unwrap_or(0))
            .sum()
    }

    /// Compute online weight from a weight map (convenience for internal use).
    fn compute_online_weight(
        &self,
        now: u64,
        weight_map: &HashMap<WalletAddress, u128>,
    ) -> u128 {
        self.online_weight(now, weight_map)
    }

    /// Update the trended weight using exponential moving average.
    pub fn update_trend(&mut self, current_online_weight: u128) {
        if self.trended_weight == 0 {
            self.trended_weight = current_online_weight;
        } else {
            // EMA: trended = decay * trended + (1-decay) * current
            self.trended_weight = (self.trended_weight * TREND_DECAY_PCT / 100)
                + (current_online_weight * (100 - TREND_DECAY_PCT) / 100);
        }
    }

    /// Get the effective online weight (max of current, trended, or floor).
    ///
    /// This ensures quorum never drops below the floor, and temporary dips
    /// in online weight are smoothed by the EMA trend.
    pub fn effective_weight(
        &self,
        now: u64,
        weight_map: &HashMap<WalletAddress, u128>,
    ) -> u128 {
        let current = self.compute_online_weight(now, weight_map);
        current
            .max(self.trended_weight)
            .max(self.min_weight)
    }

    /// Whether a representative is a "principal" rep (≥0.1% of online weight).
    ///
    /// Principal reps are the ones whose votes matter for quorum. This
    /// classification avoids counting dust-weight reps as relevant voters.
    pub fn is_principal(&self, rep_weight: u128, total_online: u128) -> bool {
        if total_online == 0 {
            return false;
        }
        // 0.1% = 10 basis points out of 10_000
        rep_weight * 10_000 / total_online >= 10
    }

    /// Get the trended weight.
    pub fn trended_weight(&self) -> u128 {
        self.trended_weight
    }

    /// Get the minimum weight floor.
    pub fn min_weight(&self) -> u128 {
        self.min_weight
    }

    /// Override the minimum weight floor (useful for testing or configuration).
    pub fn set_min_weight(&mut self, floor: u128) {
        self.min_weight = floor;
    }

    /// Remove representatives that haven't voted within the window.
    pub fn prune(&mut self, now: u64) {
        let cutoff = now.saturating_sub(self.window_secs);
        self.recent_voters.retain(|_, &mut last_vote| last_vote >= cutoff);
    }

    /// Number of tracked representatives (including stale ones not yet pruned).
    pub fn tracked_count(&self) -> usize {
        self.recent_voters.len()
    }
}
