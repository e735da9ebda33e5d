//! Online weight sample storage trait.
//!
//! A rolling window of periodic samples of total online representative
//! weight, used to derive the quorum threshold (§4.4 "Online weight
//! minimum").

use crate::StoreError;
use burst_types::{Amount, Timestamp};

/// Trait for the online-weight sample history.
pub trait OnlineWeightStore {
    /// Record a sample of total online weight at the given time.
    fn put_sample(&self, timestamp: Timestamp, weight: Amount) -> Result<(), StoreError>;

    /// Most recent samples, newest first, capped at `limit`.
    fn recent_samples(&self, limit: usize) -> Result<Vec<(Timestamp, Amount)>, StoreError>;

    /// Drop samples older than `cutoff`.
    fn trim_older_than(&self, cutoff: Timestamp) -> Result<usize, StoreError>;
}
