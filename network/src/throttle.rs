//! Per-peer bandwidth limiter using the token bucket algorithm.
//!
//! Each peer connection gets its own `BandwidthThrottle` to prevent any
//! single peer from consuming excessive bandwidth.

use std::time::Instant;

/// Default bandwidth limit: 5 MiB/s per peer.
pub const DEFAULT_MAX_BYTES_PER_SEC: u64 = 5 * 1024 * 1024;

/// Per-peer bandwidth limiter using the token bucket algorithm.
///
/// Tokens represent available bytes. Tokens refill over time at
/// `max_bytes_per_sec` rate. The bucket can hold at most 2× the rate
/// to allow short bursts.
pub struct BandwidthThrottle {
    /// Maximum bytes per second.
    max_bytes_per_sec: u64,
    /// Available tokens (bytes).
    tokens: u64,
    /// Last refill time.
    last_refill: Instant,
}

impl BandwidthThrottle {
    /// Create a new throttle with the given bytes-per-second limit.
    ///
    /// The token bucket starts full at the per-second rate, allowing an
    /// initial burst of up to `max_bytes_per_sec` bytes.
    pub fn new(max_bytes_per_sec: u64) -> Self {
        Self {
            max_bytes_per_sec,
            tokens: max_bytes_per_sec,
            last_refill: Instant::now(),
        }
    }

    /// Try to consume `bytes` of bandwidth.
    ///
    /// Returns `true` if sufficient tokens are available (and consumes them).
    /// Returns `false` if throttled — the caller should back off or drop the message.
    pub fn try_consume(&mut self, bytes: u64) -> bool {
        self.refill();
        if self.tokens >= bytes {
            self.tokens -= bytes;
            true
        } else {
            false
        }
    }

    /// Refill tokens based on elapsed time since last refill.
    fn refill(&mut self) {
        let now = Instant::now();
        let elapsed = now.duration_since(self.last_refill);
        let new_tokens = (elapsed.as_millis() as u64 * self.max_bytes_per_sec) / 1000;
        // Cap at 2× rate to limit burst size
        self.tokens = (self.tokens + new_tokens).min(self.max_bytes_per_sec * 2);
        self.last_refill = now;
    }

    /// The configured maximum bytes-per-second rate.
    pub fn max_bytes_per_sec(&self) -> u64 {
        self.max_bytes_per_sec
    }

    /// Current available tokens (bytes). Useful for diagnostics.
    pub fn available_tokens(&self) -> u64 {
        self.tokens
    }
}

impl Default for BandwidthThrottle {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_BYTES_PER_SEC)
    }
}
