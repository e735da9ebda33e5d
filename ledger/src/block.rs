//! The five block variants of the block-lattice and their canonical hashing.
//!
//! `Open`/`Send`/`Receive`/`Change` are the legacy per-purpose blocks; `State`
//! is the universal form that has superseded them (§3.1). The ledger
//! processor (`crate::process`) accepts any of the five as a successor to an
//! account's current head, subject to §4.3's block-position rules.

use burst_crypto::{blake2b_256, blake2b_256_multi};
use burst_types::{Amount, BlockHash, WalletAddress};
use serde::{Deserialize, Serialize};

use crate::error::LedgerError;

/// Which of the five variants a block is.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BlockType {
    Open,
    Send,
    Receive,
    Change,
    State,
}

/// A signed block in the block-lattice (§3.1).
///
/// Every variant carries `previous` (zero for an opening block), a
/// `signature`, and a PoW `work` nonce. The universal `State` variant is
/// self-describing (carries its own `account`); the legacy variants are not —
/// their owning account is resolved from context (the frontier table, or the
/// `account` field for `Open`).
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Block {
    Open {
        account: WalletAddress,
        representative: WalletAddress,
        source: BlockHash,
        signature: burst_types::Signature,
        work: u64,
    },
    Send {
        previous: BlockHash,
        destination: WalletAddress,
        balance: Amount,
        signature: burst_types::Signature,
        work: u64,
    },
    Receive {
        previous: BlockHash,
        source: BlockHash,
        signature: burst_types::Signature,
        work: u64,
    },
    Change {
        previous: BlockHash,
        representative: WalletAddress,
        signature: burst_types::Signature,
        work: u64,
    },
    State {
        account: WalletAddress,
        previous: BlockHash,
        representative: WalletAddress,
        balance: Amount,
        link: BlockHash,
        signature: burst_types::Signature,
        work: u64,
    },
}

impl Block {
    pub fn block_type(&self) -> BlockType {
        match self {
            Block::Open { .. } => BlockType::Open,
            Block::Send { .. } => BlockType::Send,
            Block::Receive { .. } => BlockType::Receive,
            Block::Change { .. } => BlockType::Change,
            Block::State { .. } => BlockType::State,
        }
    }

    /// Zero for an opening block (`Open` and an opening `State`).
    pub fn previous(&self) -> BlockHash {
        match self {
            Block::Open { .. } => BlockHash::ZERO,
            Block::Send { previous, .. }
            | Block::Receive { previous, .. }
            | Block::Change { previous, .. }
            | Block::State { previous, .. } => *previous,
        }
    }

    pub fn is_opening(&self) -> bool {
        self.previous().is_zero()
    }

    /// The block's self-described account, where one exists (`Open`, `State`).
    /// Legacy `Send`/`Receive`/`Change` blocks carry no account field — the
    /// ledger processor resolves theirs from the frontier of `previous`.
    pub fn account(&self) -> Option<&WalletAddress> {
        match self {
            Block::Open { account, .. } => Some(account),
            Block::State { account, .. } => Some(account),
            _ => None,
        }
    }

    pub fn representative(&self) -> Option<&WalletAddress> {
        match self {
            Block::Open { representative, .. } => Some(representative),
            Block::Change { representative, .. } => Some(representative),
            Block::State { representative, .. } => Some(representative),
            _ => None,
        }
    }

    /// The new balance this block claims, for variants that carry one.
    pub fn claimed_balance(&self) -> Option<Amount> {
        match self {
            Block::Send { balance, .. } => Some(*balance),
            Block::State { balance, .. } => Some(*balance),
            _ => None,
        }
    }

    pub fn signature(&self) -> &burst_types::Signature {
        match self {
            Block::Open { signature, .. }
            | Block::Send { signature, .. }
            | Block::Receive { signature, .. }
            | Block::Change { signature, .. }
            | Block::State { signature, .. } => signature,
        }
    }

    pub fn set_signature(&mut self, sig: burst_types::Signature) {
        match self {
            Block::Open { signature, .. }
            | Block::Send { signature, .. }
            | Block::Receive { signature, .. }
            | Block::Change { signature, .. }
            | Block::State { signature, .. } => *signature = sig,
        }
    }

    pub fn work(&self) -> u64 {
        match self {
            Block::Open { work, .. }
            | Block::Send { work, .. }
            | Block::Receive { work, .. }
            | Block::Change { work, .. }
            | Block::State { work, .. } => *work,
        }
    }

    pub fn set_work(&mut self, work: u64) {
        match self {
            Block::Open { work: w, .. }
            | Block::Send { work: w, .. }
            | Block::Receive { work: w, .. }
            | Block::Change { work: w, .. }
            | Block::State { work: w, .. } => *w = work,
        }
    }

    /// The PoW root: the value the work nonce is validated against.
    /// Opening blocks use the account itself; successors use `previous`
    /// (§3.1 "Proof-of-work nonce").
    pub fn pow_root(&self) -> BlockHash {
        if self.is_opening() {
            match self.account() {
                Some(account) => account_hash(account),
                None => BlockHash::ZERO,
            }
        } else {
            self.previous()
        }
    }

    /// Canonical hash over this block's hashable fields (§6 "Block wire
    /// format"), excluding `signature` and `work`.
    pub fn hash(&self) -> BlockHash {
        match self {
            Block::Open {
                account,
                representative,
                source,
                ..
            } => {
                let acc = account_bytes(account);
                let rep = account_bytes(representative);
                BlockHash::new(blake2b_256_multi(&[
                    source.as_bytes(),
                    &rep,
                    &acc,
                ]))
            }
            Block::Send {
                previous,
                destination,
                balance,
                ..
            } => {
                let dest = account_bytes(destination);
                BlockHash::new(blake2b_256_multi(&[
                    previous.as_bytes(),
                    &dest,
                    &balance.raw().to_be_bytes(),
                ]))
            }
            Block::Receive {
                previous, source, ..
            } => BlockHash::new(blake2b_256_multi(&[
                previous.as_bytes(),
                source.as_bytes(),
            ])),
            Block::Change {
                previous,
                representative,
                ..
            } => {
                let rep = account_bytes(representative);
                BlockHash::new(blake2b_256_multi(&[previous.as_bytes(), &rep]))
            }
            Block::State {
                account,
                previous,
                representative,
                balance,
                link,
                ..
            } => {
                // Domain-separated by 32 zero bytes (§6).
                let acc = account_bytes(account);
                let rep = account_bytes(representative);
                BlockHash::new(blake2b_256_multi(&[
                    &[0u8; 32],
                    &acc,
                    previous.as_bytes(),
                    &rep,
                    &balance.raw().to_be_bytes(),
                    link.as_bytes(),
                ]))
            }
        }
    }
}

/// Canonical serialized bytes for a block, stored verbatim as
/// `StoredBlock::bytes` (§4.1 "send/receive/open/change", "state_v0, state_v1").
pub fn encode(block: &Block) -> Vec<u8> {
    bincode::serialize(block).expect("block serialization is infallible")
}

/// Inverse of [`encode`]. Used when a predecessor block must be read back to
/// resolve its owning account (legacy variants carry no account field of
/// their own — see `crate::process::resolve_account`).
pub fn decode(bytes: &[u8]) -> Result<Block, LedgerError> {
    bincode::deserialize(bytes).map_err(|e| LedgerError::InvalidBlock {
        reason: format!("block decode failed: {e}"),
    })
}

/// Resolve an account's 32-byte public key for hashing purposes.
///
/// Accounts are stored textually (`brst_...`); hashing needs the underlying
/// bytes, so this decodes through the address codec. Falls back to hashing
/// the text form itself if the address doesn't decode (e.g. a test fixture
/// using a non-canonical string) so hashing never panics.
pub(crate) fn account_bytes(account: &WalletAddress) -> [u8; 32] {
    burst_crypto::decode_address(account.as_str())
        .unwrap_or_else(|| blake2b_256(account.as_str().as_bytes()))
}

pub(crate) fn account_hash(account: &WalletAddress) -> BlockHash {
    BlockHash::new(account_bytes(account))
}

/// The `link` value a state-send block uses to reference its destination:
/// the destination account's public key, reinterpreted as a 32-byte hash
/// (§3.1 "link field reused as destination/source/epoch-marker").
pub fn account_link(account: &WalletAddress) -> BlockHash {
    account_hash(account)
}

/// Inverse of [`account_link`]: recover the destination account a state-send
/// block's `link` refers to (`crate::process` resolves pending destinations
/// this way, since the store only ever sees account strings, not links).
pub fn link_to_address(link: &BlockHash) -> WalletAddress {
    burst_crypto::derive_address(&burst_types::PublicKey(*link.as_bytes()))
}

/// Whether `account` is the all-zero burn address (§4.3 `opened_burn_account`).
pub fn is_burn_account(account: &WalletAddress) -> bool {
    burst_crypto::decode_address(account.as_str())
        .map(|bytes| bytes == [0u8; 32])
        .unwrap_or(false)
}

/// The contested root for an election: `(account, previous)` for a
/// non-opening block, `account` alone for an opening one (§4.4).
pub fn election_root(account: &WalletAddress, block: &Block) -> BlockHash {
    if block.is_opening() {
        account_hash(account)
    } else {
        BlockHash::new(blake2b_256_multi(&[
            &account_bytes(account),
            block.previous().as_bytes(),
        ]))
    }
}

/// Validate a block's proof-of-work against its root (§3.1).
pub fn verify_work(block: &Block, difficulty: u64) -> bool {
    burst_work::validate_work(&block.pow_root(), block.work(), difficulty)
}

/// Verify a block's signature against the resolved signing account.
pub fn verify_signature(block: &Block, account: &WalletAddress) -> Result<(), LedgerError> {
    let pk = burst_crypto::decode_address(account.as_str()).ok_or_else(|| {
        LedgerError::InvalidBlock {
            reason: "account does not decode to a public key".into(),
        }
    })?;
    let hash = block.hash();
    let ok = burst_crypto::verify_signature(
        hash.as_bytes(),
        block.signature(),
        &burst_types::PublicKey(pk),
    );
    if ok {
        Ok(())
    } else {
        Err(LedgerError::InvalidBlock {
            reason: "bad_signature".into(),
        })
    }
}
