//! Core node configuration (§6 "Configuration").
//!
//! The spec calls for a versioned JSON document; the teacher's original
//! `NodeConfig` used TOML with per-field `#[serde(default = "...")]`
//! helpers. That shape is kept, the format is switched to JSON (see
//! `DESIGN.md` Open Question decision 4).

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use burst_types::{NetworkId, WalletAddress};

use crate::NodeError;

/// Current config schema version. Bumped when a field is added/removed in a
/// way that needs a migration (see `upgrade` below).
pub const CURRENT_CONFIG_VERSION: u32 = 1;

/// Core node configuration, loaded from a JSON document on disk.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct CoreConfig {
    #[serde(default = "default_version")]
    pub version: u32,

    /// Which network to connect to.
    #[serde(default = "default_network")]
    pub network: NetworkId,

    /// Data directory for ledger storage.
    #[serde(default = "default_data_dir")]
    pub data_dir: PathBuf,

    /// Peering port and I/O thread count (§6).
    #[serde(default = "default_p2p_port")]
    pub peering_port: u16,
    #[serde(default = "default_io_threads")]
    pub io_thread_count: usize,

    /// Signature-check thread count — size of the batch-verification pool
    /// used by the vote processor (§4.5) and the block processor's
    /// state-block lane (§4.6).
    #[serde(default = "default_signature_threads")]
    pub signature_check_thread_count: usize,

    /// Minimum delegated weight (as a fraction of online stake, in basis
    /// points out of 10_000) for an account to be treated as a
    /// representative worth soliciting votes from.
    #[serde(default = "default_vote_minimum_weight_bps")]
    pub vote_minimum_weight_bps: u32,

    /// Floor under which online weight is never allowed to fall, so quorum
    /// doesn't collapse to near-zero when few representatives are visible.
    #[serde(default = "default_online_weight_minimum")]
    pub online_weight_minimum: u128,

    /// Quorum percentage (0-100) — see `quorum_delta` in `burst_consensus`.
    #[serde(default = "default_quorum_pct")]
    pub quorum_pct: u8,

    /// Proof-of-work difficulty threshold (§3.1 "Proof-of-work nonce").
    #[serde(default = "default_work_threshold")]
    pub work_threshold: u64,

    /// The fixed `link` marker and signing account for epoch-upgrade blocks
    /// (§4.3 "state: ... epoch block").
    #[serde(default = "default_epoch_v1_link")]
    pub epoch_v1_link: burst_types::BlockHash,
    pub epoch_v1_authority: WalletAddress,

    /// Bootstrap fraction numerator (1-256) — the legacy gap-cache
    /// threshold fraction of online stake that triggers a bootstrap
    /// request for an unknown hash (§4.7).
    #[serde(default = "default_bootstrap_fraction_numerator")]
    pub bootstrap_fraction_numerator: u32,

    /// Age (seconds) after which an unchecked/gap entry is dropped rather
    /// than retried indefinitely.
    #[serde(default = "default_unchecked_cutoff_age_secs")]
    pub unchecked_cutoff_age_secs: u64,

    /// Maximum number of peer connections.
    #[serde(default = "default_max_peers")]
    pub max_peers: usize,

    /// Log format: "human" or "json".
    #[serde(default = "default_log_format")]
    pub log_format: String,
    /// Log level filter: "trace", "debug", "info", "warn", "error".
    #[serde(default = "default_log_level")]
    pub log_level: String,

    /// Whether to enable the Prometheus metrics endpoint.
    #[serde(default)]
    pub enable_metrics: bool,
}

// ── Serde default helpers ──────────────────────────────────────────────

fn default_version() -> u32 {
    CURRENT_CONFIG_VERSION
}

fn default_network() -> NetworkId {
    NetworkId::Dev
}

fn default_data_dir() -> PathBuf {
    PathBuf::from("./burst_data")
}

fn default_p2p_port() -> u16 {
    NetworkId::Dev.default_port()
}

fn default_io_threads() -> usize {
    4
}

fn default_signature_threads() -> usize {
    2
}

fn default_vote_minimum_weight_bps() -> u32 {
    10 // 0.1%
}

fn default_online_weight_minimum() -> u128 {
    60_000 * 1_000_000_000_000_000_000_000_000u128
}

fn default_quorum_pct() -> u8 {
    67
}

fn default_work_threshold() -> u64 {
    0xffff_ffc0_0000_0000
}

fn default_epoch_v1_link() -> burst_types::BlockHash {
    burst_types::BlockHash::new([0xaa; 32])
}

fn default_bootstrap_fraction_numerator() -> u32 {
    16
}

fn default_unchecked_cutoff_age_secs() -> u64 {
    4 * 60 * 60
}

fn default_max_peers() -> usize {
    50
}

fn default_log_format() -> String {
    "human".to_string()
}

fn default_log_level() -> String {
    "info".to_string()
}

// ── Impl ───────────────────────────────────────────────────────────────

impl CoreConfig {
    /// Load configuration from a JSON file, applying schema upgrades if the
    /// on-disk document predates [`CURRENT_CONFIG_VERSION`].
    pub fn from_json_file(path: &std::path::Path) -> Result<Self, NodeError> {
        let content =
            std::fs::read_to_string(path).map_err(|e| NodeError::Config(e.to_string()))?;
        Self::from_json_str(&content)
    }

    /// Parse configuration from a JSON string.
    pub fn from_json_str(s: &str) -> Result<Self, NodeError> {
        let mut value: serde_json::Value =
            serde_json::from_str(s).map_err(|e| NodeError::Config(e.to_string()))?;
        upgrade(&mut value);
        serde_json::from_value(value).map_err(|e| NodeError::Config(e.to_string()))
    }

    /// Serialize the configuration to a pretty-printed JSON string.
    pub fn to_json_string(&self) -> String {
        serde_json::to_string_pretty(self).expect("CoreConfig is always serializable to JSON")
    }
}

/// Apply forward-only migrations to a raw JSON document, in sequence, up to
/// [`CURRENT_CONFIG_VERSION`]. There is currently only version 1, so this is
/// a no-op placeholder for the next migration step.
fn upgrade(value: &mut serde_json::Value) {
    let version = value
        .get("version")
        .and_then(|v| v.as_u64())
        .unwrap_or(0);
    if version < 1 {
        if let Some(obj) = value.as_object_mut() {
            obj.insert("version".into(), serde_json::json!(1));
        }
    }
}

impl Default for CoreConfig {
    fn default() -> Self {
        Self {
            version: default_version(),
            network: default_network(),
            data_dir: default_data_dir(),
            peering_port: default_p2p_port(),
            io_thread_count: default_io_threads(),
            signature_check_thread_count: default_signature_threads(),
            vote_minimum_weight_bps: default_vote_minimum_weight_bps(),
            online_weight_minimum: default_online_weight_minimum(),
            quorum_pct: default_quorum_pct(),
            work_threshold: default_work_threshold(),
            epoch_v1_link: default_epoch_v1_link(),
            epoch_v1_authority: WalletAddress::new(
                "brst_1111111111111111111111111111111111111111111111111111epoch1a",
            ),
            bootstrap_fraction_numerator: default_bootstrap_fraction_numerator(),
            unchecked_cutoff_age_secs: default_unchecked_cutoff_age_secs(),
            max_peers: default_max_peers(),
            log_format: default_log_format(),
            log_level: default_log_level(),
            enable_metrics: false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_round_trips_through_json() {
        let config = CoreConfig::default();
        let json = config.to_json_string();
        let parsed = CoreConfig::from_json_str(&json).expect("should parse");
        assert_eq!(parsed.peering_port, config.peering_port);
        assert_eq!(parsed.max_peers, config.max_peers);
        assert_eq!(parsed.quorum_pct, config.quorum_pct);
    }

    #[test]
    fn minimal_json_uses_defaults() {
        let config = CoreConfig::from_json_str("{}").expect("empty json should use defaults");
        assert_eq!(config.max_peers, 50);
        assert_eq!(config.log_format, "human");
        assert_eq!(config.bootstrap_fraction_numerator, 16);
    }

    #[test]
    fn partial_json_overrides() {
        let json = r#"{"peering_port": 9999, "max_peers": 100}"#;
        let config = CoreConfig::from_json_str(json).expect("should parse");
        assert_eq!(config.peering_port, 9999);
        assert_eq!(config.max_peers, 100);
        assert_eq!(config.log_format, "human"); // default
    }

    #[test]
    fn missing_file_returns_config_error() {
        let result = CoreConfig::from_json_file(std::path::Path::new("/nonexistent/core.json"));
        assert!(result.is_err());
        assert!(matches!(result.unwrap_err(), NodeError::Config(_)));
    }

    #[test]
    fn upgrades_unversioned_document() {
        let config = CoreConfig::from_json_str(r#"{"max_peers": 5}"#).unwrap();
        assert_eq!(config.version, CURRENT_CONFIG_VERSION);
        assert_eq!(config.max_peers, 5);
    }
}
