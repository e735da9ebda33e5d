//! Ledger processor error taxonomy (§4.3, §7).
//!
//! Validation outcomes are never exceptions for control flow — `process`
//! returns a [`ProcessReturn`] whose `code` is one of [`ProcessCode`]'s
//! variants. `LedgerError` is reserved for conditions the caller cannot route
//! around: storage failures and malformed blocks that fail to decode at all.

use burst_types::{Amount, WalletAddress};
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum LedgerError {
    #[error("block gap: previous block {previous} not found")]
    BlockGap { previous: String },

    #[error("fork detected: account {account} has conflicting blocks")]
    Fork { account: String },

    #[error("invalid block: {reason}")]
    InvalidBlock { reason: String },

    #[error("account not found: {0}")]
    AccountNotFound(String),

    #[error("storage error: {0}")]
    Storage(#[from] burst_store::StoreError),
}

/// The full set of outcomes `process` can report (§4.3 table).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ProcessCode {
    /// Accepted and committed.
    Progress,
    /// Already in store.
    Old,
    /// Signature does not verify.
    BadSignature,
    /// Send decreases own balance below zero or increases it.
    NegativeSpend,
    /// Conflicts with an existing block at the same (account, height) or (account, open) position.
    Fork,
    /// Receive/state-receive targets a nonexistent or already-claimed pending.
    Unreceivable,
    /// `previous` not present.
    GapPrevious,
    /// Referenced source/link block not present.
    GapSource,
    /// Epoch-open requires a pending credit first.
    GapEpochOpenPending,
    /// Account field equals the all-zero burn address.
    OpenedBurnAccount,
    /// Claimed amount does not match pending or prior balance.
    BalanceMismatch,
    /// Epoch block changes representative.
    RepresentativeMismatch,
    /// Variant invalid as successor of current head.
    BlockPosition,
    /// PoW below threshold for this block's root.
    InsufficientWork,
}

impl ProcessCode {
    pub fn is_progress(self) -> bool {
        matches!(self, ProcessCode::Progress)
    }
}

/// The result of one `process` call (§4.3).
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ProcessReturn {
    pub code: ProcessCode,
    /// Whether the signature was checked (false when rejected before reaching
    /// the signature-verification step, e.g. `old` or `gap_previous`).
    pub verified: bool,
    /// The amount moved by this block: the send/receive delta, or zero for
    /// change/representative-only operations.
    pub amount: Amount,
    /// The resolved owning account, once known.
    pub account: Option<WalletAddress>,
    /// For a send-classified block, the destination account credited.
    pub pending_account: Option<WalletAddress>,
    /// Whether this was a `state` block classified as a send.
    pub is_send_state: bool,
}

impl ProcessReturn {
    pub fn rejected(code: ProcessCode) -> Self {
        Self {
            code,
            verified: false,
            amount: Amount::ZERO,
            account: None,
            pending_account: None,
            is_send_state: false,
        }
    }
}
