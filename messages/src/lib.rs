//! Network message types for BURST node-to-node communication (§6 "Block
//! wire format", "Vote wire format"). UDP framing and the bootstrap
//! pull/push protocol are out of scope (§1); this crate only defines the
//! message payloads the ledger-core's observers and consensus layer hand to
//! and receive from that external transport.

use burst_types::{BlockHash, Timestamp, WalletAddress};
use serde::{Deserialize, Serialize};

/// Header present on every network message.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct MessageHeader {
    pub message_type: MessageType,
    pub network_id: burst_types::NetworkId,
    pub protocol_version: u16,
    pub timestamp: Timestamp,
}

/// All message types in the protocol.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum MessageType {
    // Block propagation
    Keepalive,
    Publish,
    ConfirmReq,
    ConfirmAck,

    // Sync
    FrontierReq,
    FrontierResp,
    BulkPull,
    BulkPush,

    // Handshake
    NodeIdHandshake,

    // Telemetry
    TelemetryReq,
    TelemetryAck,
}

/// A block publish message. `block` is the canonical wire-encoded block
/// (§6 "Block wire format") — this crate doesn't depend on `burst-ledger`'s
/// `Block` enum, so the payload travels as opaque bytes until the block
/// processor decodes it.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct PublishMessage {
    pub header: MessageHeader,
    pub block: Vec<u8>,
}

/// Request confirmation of a block.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ConfirmReqMessage {
    pub header: MessageHeader,
    /// One or more `(root, hash)` pairs, coalesced per §4.4's confirm-request
    /// batching (at most 6 pairs per message).
    pub roots: Vec<(BlockHash, BlockHash)>,
}

/// Confirmation acknowledgment — a representative's vote (§6 "Vote wire
/// format"): `account ∥ signature ∥ sequence ∥ payload`, where `payload` is
/// either a single full block or a list of hashes.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ConfirmAckMessage {
    pub header: MessageHeader,
    pub account: WalletAddress,
    pub signature: burst_types::Signature,
    pub sequence: u64,
    pub payload: VotePayload,
}

/// The body of a vote: either a full block (for a brand-new candidate the
/// voter wants to introduce) or a list of hashes the voter is endorsing.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub enum VotePayload {
    Block(Vec<u8>),
    Hashes(Vec<BlockHash>),
}

/// Keepalive message with peer addresses.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct KeepaliveMessage {
    pub header: MessageHeader,
    pub peers: Vec<PeerAddress>,
}

/// A peer's network address.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct PeerAddress {
    pub ip: String,
    pub port: u16,
}

/// Frontier request — ask for account chain heads.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct FrontierReqMessage {
    pub header: MessageHeader,
    pub start_account: WalletAddress,
    pub count: u32,
}

/// Frontier response.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct FrontierRespMessage {
    pub header: MessageHeader,
    pub frontiers: Vec<(WalletAddress, BlockHash)>,
}

/// Bulk pull request — ask for blocks from an account.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct BulkPullMessage {
    pub header: MessageHeader,
    pub account: WalletAddress,
    pub end_hash: BlockHash,
}

/// Node ID handshake for peer authentication.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct NodeIdHandshakeMessage {
    pub header: MessageHeader,
    pub node_id: burst_types::PublicKey,
    pub signature: burst_types::Signature,
}

/// Telemetry data shared between nodes.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct TelemetryData {
    pub block_count: u64,
    pub account_count: u64,
    pub peer_count: u32,
    pub protocol_version: u16,
    pub uptime_secs: u64,
    pub timestamp: Timestamp,
}
