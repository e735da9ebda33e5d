//! Clock synchronization — required for BRN computation.
//!
//! BRN is a function of time, so nodes must agree on the current time.
//! Uses NTP or peer-to-peer time comparison with a tolerance threshold.

use crate::NetworkError;
use burst_types::Timestamp;

/// Clock synchronization service.
pub struct ClockSync {
    /// Maximum acceptable clock drift in milliseconds.
    pub max_drift_ms: i64,
    /// Current estimated offset from true UTC in milliseconds.
    pub offset_ms: i64,
    /// Unix timestamp (seconds) of the last successful sync.
    pub last_sync_secs: u64,
    /// Number of sync operations performed.
    pub sync_count: u32,
}

impl ClockSync {
    pub fn new(max_drift_ms: i64) -> Self {
        Self {
            max_drift_ms,
            offset_ms: 0,
            last_sync_secs: 0,
            sync_count: 0,
        }
    }

    /// Sync with NTP servers to determine clock offset.
    ///
    /// Queries pool.ntp.org using a minimal SNTPv4 implementation.
    /// Falls back to zero offset if the query fails (graceful degradation).
    pub async fn sync_ntp(&mut self) -> Result<(), NetworkError> {
        match Self::query_ntp_offset().await {
            Ok(offset_ms) => {
                // Apply EMA: blend new NTP offset with existing
                if self.sync_count == 0 {
                    self.offset_ms = offset_ms;
                } else {
                    self.offset_ms = (self.offset_ms * 7 + offset_ms) / 8;
                }
            }
            Err(_) => {
                // Graceful degradation: keep existing offset
                tracing::warn!(
                    "NTP sync failed, keeping existing offset of {}ms",
                    self.offset_ms
                );
            }
        }
        self.last_sync_secs = Timestamp::now().as_secs();
        self.sync_count += 1;
        Ok(())
    }

    /// Query NTP server and return offset in milliseconds.
    ///
    /// Implements a minimal SNTPv4 client (RFC 4330):
    /// - Sends a 48-byte request to pool.ntp.org:123
    /// - Parses the transmit timestamp from the response
    /// - Computes offset as (server_time - local_time)
    async fn query_ntp_offset() -> Result<i64, NetworkError> {
        use std::time::{SystemTime, UNIX_EPOCH};

        let socket = tokio::net::UdpSocket::bind("0.0.0.0:0")
            .await
            .map_err(|e| NetworkError::ConnectionFailed(format!("NTP bind failed: {e}")))?;

        // NTP uses epoch of 1900-01-01; Unix epoch is 1970-01-01
        // Difference: 70 years = 2208988800 seconds
        const NTP_EPOCH_OFFSET: u64 = 2_208_988_800;

        // Build SNTPv4 request: 48 bytes, LI=0, VN=4, Mode=3 (client)
        let mut request = [0u8; 48];
        request[0] = 0x23; // LI=0, VN=4, Mode=3

        // Record local time before sending
        let t1 = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap_or_default();

        socket
            .send_to(&request, "pool.ntp.org:123")
            .await
            .map_err(|e| NetworkError::ConnectionFailed(format!("NTP send failed: {e}")))?;

        let mut response = [0u8; 48];
        let recv_future = socket.recv_from(&mut response);
        let nbytes =
            match tokio::time::timeout(std::time::Duration::from_secs(5), recv_future).await {
                Ok(Ok((n, _addr))) => n,
                Ok(Err(e)) => {
                    return Err(NetworkError::ConnectionFailed(format!(
                        "NTP recv failed: {e}"
                    )));
                }
                Err(_elapsed) => {
                    return Err(NetworkError::ConnectionFailed("NTP timeout".into()));
                }
            };

        if nbytes < 48 {
            return Err(NetworkError::ConnectionFailed(
                "NTP response too short".into(),
            ));
        }

        // Parse transmit timestamp (bytes 40-47): seconds since NTP epoch (big-endian u32)
        let ntp_secs = u32::from_be_bytes([response[40], response[41], response[42], response[43]]);
        if (ntp_secs as u64) < NTP_EPOCH_OFFSET {
            return Err(NetworkError::ConnectionFailed(
                "NTP response contains invalid timestamp".into(),
            ));
        }
        let server_unix_secs = ntp_secs as u64 - NTP_EPOCH_OFFSET;

        // Record local time after receiving
        let t4 = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap_or_default();

        // Simple offset calculation: server_time - midpoint_of_local_times
        let local_midpoint_ms = ((t1.as_millis() + t4.as_millis()) / 2) as i64;
        let server_ms = (server_unix_secs * 1000) as i64;
        let offset = server_ms - local_midpoint_ms;

        Ok(offset)
    }

    /// Sync with a peer by comparing timestamps.
    ///
    /// Computes the drift between local time and the peer's reported time,
    /// then updates the offset using an exponential moving average (EMA)
    /// with a weight of 7/8 on the old value, 1/8 on the new observation.
    /// This smooths out individual peer discrepancies while still tracking
    /// the true offset over time.
    ///
    /// Returns an error if the peer's drift exceeds `max_drift_ms`.
    pub async fn sync_with_peer(&mut self, peer_timestamp: Timestamp) -> Result<(), NetworkError> {
        let local_now = Timestamp::now();
        let peer_secs = peer_timestamp.as_secs() as i64;
        let local_secs = local_now.as_secs() as i64;
        let drift = peer_secs - local_secs;

        // Update offset using exponential moving average
        self.offset_ms = (self.offset_ms * 7 + drift * 1000) / 8;
        self.last_sync_secs = local_now.as_secs();
        self.sync_count += 1;

        if drift.abs() * 1000 > self.max_drift_ms {
            return Err(NetworkError::ClockDrift {
                drift_ms: drift * 1000,
                max_ms: self.max_drift_ms,
            });
        }
        Ok(())
    }

    /// Get the current adjusted timestamp.
    pub fn now(&self) -> Timestamp {
        let raw = Timestamp::now();
        Timestamp::new((raw.as_secs() as i64 + self.offset_ms / 1000) as u64)
    }

    /// Validate that a timestamp is within acceptable drift.
    pub fn validate_timestamp(&self, ts: Timestamp) -> bool {
        let now = self.now();
        let diff_secs = if now.as_secs() > ts.as_secs() {
            now.as_secs() - ts.as_secs()
        } else {
            ts.as_secs() - now.as_secs()
        };
        (diff_secs as i64 * 1000) <= self.max_drift_ms
    }
}
