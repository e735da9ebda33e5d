//! Fluent block builders with field-presence validation (§4.2).
//!
//! One builder per variant, mirroring the five builder classes in the
//! original implementation. Every field setter marks its bit present in a
//! `u16` mask; `build()` fails on the first *missing* field, checked in a
//! fixed precedence order regardless of the order fields were actually set:
//! account, balance, link, previous, representative, signature, work. A
//! hex/address alternate setter that fails to parse records an error instead
//! of setting the field, but still marks the bit present (the field was
//! *attempted*, so a later `build()` reports the parse error rather than a
//! confusing "missing field"); only the first such error is kept.

use burst_types::{Amount, BlockHash, PublicKey, WalletAddress};

use crate::block::Block;

const ACCOUNT_PRESENT: u16 = 1 << 0;
const BALANCE_PRESENT: u16 = 1 << 1;
const LINK_PRESENT: u16 = 1 << 2;
const PREVIOUS_PRESENT: u16 = 1 << 3;
const REPRESENTATIVE_PRESENT: u16 = 1 << 4;
const SIGNATURE_PRESENT: u16 = 1 << 5;
const WORK_PRESENT: u16 = 1 << 6;

/// Precedence order for the first-missing-field error (§4.2).
const FIELD_PRECEDENCE: [(u16, BuildError); 7] = [
    (ACCOUNT_PRESENT, BuildError::MissingAccount),
    (BALANCE_PRESENT, BuildError::MissingBalance),
    (LINK_PRESENT, BuildError::MissingLink),
    (PREVIOUS_PRESENT, BuildError::MissingPrevious),
    (REPRESENTATIVE_PRESENT, BuildError::MissingRepresentative),
    (SIGNATURE_PRESENT, BuildError::MissingSignature),
    (WORK_PRESENT, BuildError::MissingWork),
];

fn first_missing_field(required: u16, present: u16) -> Option<BuildError> {
    let missing = required & !present;
    FIELD_PRECEDENCE
        .iter()
        .find(|(bit, _)| missing & bit != 0)
        .map(|(_, err)| *err)
}

/// Decode a hex-encoded 32-byte public key and derive its address.
fn account_from_hex(account_hex: &str) -> Option<WalletAddress> {
    let bytes: [u8; 32] = hex::decode(account_hex).ok()?.try_into().ok()?;
    Some(burst_crypto::derive_address(&PublicKey(bytes)))
}

/// Validate a `brst_...` address string without re-deriving it.
fn account_from_address(address: &str) -> Option<WalletAddress> {
    burst_crypto::decode_address(address).map(|_| WalletAddress::new(address.to_string()))
}

fn hash_from_hex(hash_hex: &str) -> Option<BlockHash> {
    let bytes: [u8; 32] = hex::decode(hash_hex).ok()?.try_into().ok()?;
    Some(BlockHash::new(bytes))
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum BuildError {
    #[error("account not set")]
    MissingAccount,
    #[error("balance not set")]
    MissingBalance,
    #[error("link not set")]
    MissingLink,
    #[error("previous not set")]
    MissingPrevious,
    #[error("representative not set")]
    MissingRepresentative,
    #[error("signature not set")]
    MissingSignature,
    #[error("work not set")]
    MissingWork,
    #[error("account does not decode to a valid address")]
    BadAccount,
    #[error("representative does not decode to a valid address")]
    BadRepresentative,
    #[error("link/source/destination does not decode to a 32-byte hash")]
    BadLink,
    #[error("previous does not decode to a 32-byte hash")]
    BadPrevious,
    #[error("balance does not parse as a raw amount")]
    BadBalance,
}

macro_rules! record_once {
    ($self:expr, $err:expr) => {
        if $self.error.is_none() {
            $self.error = Some($err);
        }
    };
}

/// Builder for [`Block::State`]. All seven fields are required.
#[derive(Debug, Default)]
pub struct StateBlockBuilder {
    account: Option<WalletAddress>,
    previous: Option<BlockHash>,
    representative: Option<WalletAddress>,
    balance: Option<Amount>,
    link: Option<BlockHash>,
    signature: Option<burst_types::Signature>,
    work: Option<u64>,
    present: u16,
    error: Option<BuildError>,
}

const STATE_REQUIRED: u16 = ACCOUNT_PRESENT
    | BALANCE_PRESENT
    | LINK_PRESENT
    | PREVIOUS_PRESENT
    | REPRESENTATIVE_PRESENT
    | SIGNATURE_PRESENT
    | WORK_PRESENT;

impl StateBlockBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Reset every field and presence bit, as if freshly constructed.
    pub fn zero(self) -> Self {
        Self::default()
    }

    pub fn account(mut self, account: WalletAddress) -> Self {
        self.present |= ACCOUNT_PRESENT;
        self.account = Some(account);
        self
    }

    pub fn account_hex(mut self, account_hex: &str) -> Self {
        self.present |= ACCOUNT_PRESENT;
        match account_from_hex(account_hex) {
            Some(a) => self.account = Some(a),
            None => record_once!(self, BuildError::BadAccount),
        }
        self
    }

    pub fn account_address(mut self, address: &str) -> Self {
        self.present |= ACCOUNT_PRESENT;
        match account_from_address(address) {
            Some(a) => self.account = Some(a),
            None => record_once!(self, BuildError::BadAccount),
        }
        self
    }

    pub fn previous(mut self, previous: BlockHash) -> Self {
        self.present |= PREVIOUS_PRESENT;
        self.previous = Some(previous);
        self
    }

    pub fn previous_hex(mut self, previous_hex: &str) -> Self {
        self.present |= PREVIOUS_PRESENT;
        match hash_from_hex(previous_hex) {
            Some(h) => self.previous = Some(h),
            None => record_once!(self, BuildError::BadPrevious),
        }
        self
    }

    pub fn representative(mut self, representative: WalletAddress) -> Self {
        self.present |= REPRESENTATIVE_PRESENT;
        self.representative = Some(representative);
        self
    }

    pub fn representative_hex(mut self, account_hex: &str) -> Self {
        self.present |= REPRESENTATIVE_PRESENT;
        match account_from_hex(account_hex) {
            Some(a) => self.representative = Some(a),
            None => record_once!(self, BuildError::BadRepresentative),
        }
        self
    }

    pub fn representative_address(mut self, address: &str) -> Self {
        self.present |= REPRESENTATIVE_PRESENT;
        match account_from_address(address) {
            Some(a) => self.representative = Some(a),
            None => record_once!(self, BuildError::BadRepresentative),
        }
        self
    }

    pub fn balance(mut self, balance: Amount) -> Self {
        self.present |= BALANCE_PRESENT;
        self.balance = Some(balance);
        self
    }

    pub fn balance_dec(mut self, balance_decimal: &str) -> Self {
        self.present |= BALANCE_PRESENT;
        match balance_decimal.parse::<u128>() {
            Ok(raw) => self.balance = Some(Amount::new(raw)),
            Err(_) => record_once!(self, BuildError::BadBalance),
        }
        self
    }

    pub fn balance_hex(mut self, balance_hex: &str) -> Self {
        self.present |= BALANCE_PRESENT;
        match u128::from_str_radix(balance_hex, 16) {
            Ok(raw) => self.balance = Some(Amount::new(raw)),
            Err(_) => record_once!(self, BuildError::BadBalance),
        }
        self
    }

    pub fn link(mut self, link: BlockHash) -> Self {
        self.present |= LINK_PRESENT;
        self.link = Some(link);
        self
    }

    pub fn link_hex(mut self, link_hex: &str) -> Self {
        self.present |= LINK_PRESENT;
        match hash_from_hex(link_hex) {
            Some(h) => self.link = Some(h),
            None => record_once!(self, BuildError::BadLink),
        }
        self
    }

    /// Set `link` to a destination account's public key, reinterpreted as a
    /// hash (the state-send convention, §3.1).
    pub fn link_address(mut self, address: &str) -> Self {
        self.present |= LINK_PRESENT;
        match burst_crypto::decode_address(address) {
            Some(bytes) => self.link = Some(BlockHash::new(bytes)),
            None => record_once!(self, BuildError::BadLink),
        }
        self
    }

    pub fn signature(mut self, signature: burst_types::Signature) -> Self {
        self.present |= SIGNATURE_PRESENT;
        self.signature = Some(signature);
        self
    }

    pub fn work(mut self, work: u64) -> Self {
        self.present |= WORK_PRESENT;
        self.work = Some(work);
        self
    }

    pub fn build(self) -> Result<Block, BuildError> {
        if let Some(err) = self.error {
            return Err(err);
        }
        if let Some(err) = first_missing_field(STATE_REQUIRED, self.present) {
            return Err(err);
        }
        Ok(Block::State {
            account: self.account.unwrap(),
            previous: self.previous.unwrap(),
            representative: self.representative.unwrap(),
            balance: self.balance.unwrap(),
            link: self.link.unwrap(),
            signature: self.signature.unwrap(),
            work: self.work.unwrap(),
        })
    }
}

/// Builder for [`Block::Open`]: account, representative, source, signature,
/// work. `source` fills the link bit — an open block has no `link` field of
/// its own, but it plays the same structural role.
#[derive(Debug, Default)]
pub struct OpenBlockBuilder {
    account: Option<WalletAddress>,
    representative: Option<WalletAddress>,
    source: Option<BlockHash>,
    signature: Option<burst_types::Signature>,
    work: Option<u64>,
    present: u16,
    error: Option<BuildError>,
}

const OPEN_REQUIRED: u16 =
    ACCOUNT_PRESENT | LINK_PRESENT | REPRESENTATIVE_PRESENT | SIGNATURE_PRESENT | WORK_PRESENT;

impl OpenBlockBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn zero(self) -> Self {
        Self::default()
    }

    pub fn account(mut self, account: WalletAddress) -> Self {
        self.present |= ACCOUNT_PRESENT;
        self.account = Some(account);
        self
    }

    pub fn account_hex(mut self, account_hex: &str) -> Self {
        self.present |= ACCOUNT_PRESENT;
        match account_from_hex(account_hex) {
            Some(a) => self.account = Some(a),
            None => record_once!(self, BuildError::BadAccount),
        }
        self
    }

    pub fn account_address(mut self, address: &str) -> Self {
        self.present |= ACCOUNT_PRESENT;
        match account_from_address(address) {
            Some(a) => self.account = Some(a),
            None => record_once!(self, BuildError::BadAccount),
        }
        self
    }

    pub fn representative(mut self, representative: WalletAddress) -> Self {
        self.present |= REPRESENTATIVE_PRESENT;
        self.representative = Some(representative);
        self
    }

    pub fn representative_hex(mut self, account_hex: &str) -> Self {
        self.present |= REPRESENTATIVE_PRESENT;
        match account_from_hex(account_hex) {
            Some(a) => self.representative = Some(a),
            None => record_once!(self, BuildError::BadRepresentative),
        }
        self
    }

    pub fn representative_address(mut self, address: &str) -> Self {
        self.present |= REPRESENTATIVE_PRESENT;
        match account_from_address(address) {
            Some(a) => self.representative = Some(a),
            None => record_once!(self, BuildError::BadRepresentative),
        }
        self
    }

    pub fn source(mut self, source: BlockHash) -> Self {
        self.present |= LINK_PRESENT;
        self.source = Some(source);
        self
    }

    pub fn source_hex(mut self, source_hex: &str) -> Self {
        self.present |= LINK_PRESENT;
        match hash_from_hex(source_hex) {
            Some(h) => self.source = Some(h),
            None => record_once!(self, BuildError::BadLink),
        }
        self
    }

    pub fn signature(mut self, signature: burst_types::Signature) -> Self {
        self.present |= SIGNATURE_PRESENT;
        self.signature = Some(signature);
        self
    }

    pub fn work(mut self, work: u64) -> Self {
        self.present |= WORK_PRESENT;
        self.work = Some(work);
        self
    }

    pub fn build(self) -> Result<Block, BuildError> {
        if let Some(err) = self.error {
            return Err(err);
        }
        if let Some(err) = first_missing_field(OPEN_REQUIRED, self.present) {
            return Err(err);
        }
        Ok(Block::Open {
            account: self.account.unwrap(),
            representative: self.representative.unwrap(),
            source: self.source.unwrap(),
            signature: self.signature.unwrap(),
            work: self.work.unwrap(),
        })
    }
}

/// Builder for [`Block::Send`]: previous, destination, balance, signature,
/// work. `destination` fills the link bit.
#[derive(Debug, Default)]
pub struct SendBlockBuilder {
    previous: Option<BlockHash>,
    destination: Option<WalletAddress>,
    balance: Option<Amount>,
    signature: Option<burst_types::Signature>,
    work: Option<u64>,
    present: u16,
    error: Option<BuildError>,
}

const SEND_REQUIRED: u16 =
    LINK_PRESENT | PREVIOUS_PRESENT | BALANCE_PRESENT | SIGNATURE_PRESENT | WORK_PRESENT;

impl SendBlockBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn zero(self) -> Self {
        Self::default()
    }

    pub fn previous(mut self, previous: BlockHash) -> Self {
        self.present |= PREVIOUS_PRESENT;
        self.previous = Some(previous);
        self
    }

    pub fn previous_hex(mut self, previous_hex: &str) -> Self {
        self.present |= PREVIOUS_PRESENT;
        match hash_from_hex(previous_hex) {
            Some(h) => self.previous = Some(h),
            None => record_once!(self, BuildError::BadPrevious),
        }
        self
    }

    pub fn destination(mut self, destination: WalletAddress) -> Self {
        self.present |= LINK_PRESENT;
        self.destination = Some(destination);
        self
    }

    pub fn destination_hex(mut self, account_hex: &str) -> Self {
        self.present |= LINK_PRESENT;
        match account_from_hex(account_hex) {
            Some(a) => self.destination = Some(a),
            None => record_once!(self, BuildError::BadLink),
        }
        self
    }

    pub fn destination_address(mut self, address: &str) -> Self {
        self.present |= LINK_PRESENT;
        match account_from_address(address) {
            Some(a) => self.destination = Some(a),
            None => record_once!(self, BuildError::BadLink),
        }
        self
    }

    pub fn balance(mut self, balance: Amount) -> Self {
        self.present |= BALANCE_PRESENT;
        self.balance = Some(balance);
        self
    }

    pub fn balance_dec(mut self, balance_decimal: &str) -> Self {
        self.present |= BALANCE_PRESENT;
        match balance_decimal.parse::<u128>() {
            Ok(raw) => self.balance = Some(Amount::new(raw)),
            Err(_) => record_once!(self, BuildError::BadBalance),
        }
        self
    }

    pub fn balance_hex(mut self, balance_hex: &str) -> Self {
        self.present |= BALANCE_PRESENT;
        match u128::from_str_radix(balance_hex, 16) {
            Ok(raw) => self.balance = Some(Amount::new(raw)),
            Err(_) => record_once!(self, BuildError::BadBalance),
        }
        self
    }

    pub fn signature(mut self, signature: burst_types::Signature) -> Self {
        self.present |= SIGNATURE_PRESENT;
        self.signature = Some(signature);
        self
    }

    pub fn work(mut self, work: u64) -> Self {
        self.present |= WORK_PRESENT;
        self.work = Some(work);
        self
    }

    pub fn build(self) -> Result<Block, BuildError> {
        if let Some(err) = self.error {
            return Err(err);
        }
        if let Some(err) = first_missing_field(SEND_REQUIRED, self.present) {
            return Err(err);
        }
        Ok(Block::Send {
            previous: self.previous.unwrap(),
            destination: self.destination.unwrap(),
            balance: self.balance.unwrap(),
            signature: self.signature.unwrap(),
            work: self.work.unwrap(),
        })
    }
}

/// Builder for [`Block::Receive`]: previous, source, signature, work.
/// `source` fills the link bit.
#[derive(Debug, Default)]
pub struct ReceiveBlockBuilder {
    previous: Option<BlockHash>,
    source: Option<BlockHash>,
    signature: Option<burst_types::Signature>,
    work: Option<u64>,
    present: u16,
    error: Option<BuildError>,
}

const RECEIVE_REQUIRED: u16 = LINK_PRESENT | PREVIOUS_PRESENT | SIGNATURE_PRESENT | WORK_PRESENT;

impl ReceiveBlockBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn zero(self) -> Self {
        Self::default()
    }

    pub fn previous(mut self, previous: BlockHash) -> Self {
        self.present |= PREVIOUS_PRESENT;
        self.previous = Some(previous);
        self
    }

    pub fn previous_hex(mut self, previous_hex: &str) -> Self {
        self.present |= PREVIOUS_PRESENT;
        match hash_from_hex(previous_hex) {
            Some(h) => self.previous = Some(h),
            None => record_once!(self, BuildError::BadPrevious),
        }
        self
    }

    pub fn source(mut self, source: BlockHash) -> Self {
        self.present |= LINK_PRESENT;
        self.source = Some(source);
        self
    }

    pub fn source_hex(mut self, source_hex: &str) -> Self {
        self.present |= LINK_PRESENT;
        match hash_from_hex(source_hex) {
            Some(h) => self.source = Some(h),
            None => record_once!(self, BuildError::BadLink),
        }
        self
    }

    pub fn signature(mut self, signature: burst_types::Signature) -> Self {
        self.present |= SIGNATURE_PRESENT;
        self.signature = Some(signature);
        self
    }

    pub fn work(mut self, work: u64) -> Self {
        self.present |= WORK_PRESENT;
        self.work = Some(work);
        self
    }

    pub fn build(self) -> Result<Block, BuildError> {
        if let Some(err) = self.error {
            return Err(err);
        }
        if let Some(err) = first_missing_field(RECEIVE_REQUIRED, self.present) {
            return Err(err);
        }
        Ok(Block::Receive {
            previous: self.previous.unwrap(),
            source: self.source.unwrap(),
            signature: self.signature.unwrap(),
            work: self.work.unwrap(),
        })
    }
}

/// Builder for [`Block::Change`]: previous, representative, signature, work.
#[derive(Debug, Default)]
pub struct ChangeBlockBuilder {
    previous: Option<BlockHash>,
    representative: Option<WalletAddress>,
    signature: Option<burst_types::Signature>,
    work: Option<u64>,
    present: u16,
    error: Option<BuildError>,
}

const CHANGE_REQUIRED: u16 =
    PREVIOUS_PRESENT | REPRESENTATIVE_PRESENT | SIGNATURE_PRESENT | WORK_PRESENT;

impl ChangeBlockBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn zero(self) -> Self {
        Self::default()
    }

    pub fn previous(mut self, previous: BlockHash) -> Self {
        self.present |= PREVIOUS_PRESENT;
        self.previous = Some(previous);
        self
    }

    pub fn previous_hex(mut self, previous_hex: &str) -> Self {
        self.present |= PREVIOUS_PRESENT;
        match hash_from_hex(previous_hex) {
            Some(h) => self.previous = Some(h),
            None => record_once!(self, BuildError::BadPrevious),
        }
        self
    }

    pub fn representative(mut self, representative: WalletAddress) -> Self {
        self.present |= REPRESENTATIVE_PRESENT;
        self.representative = Some(representative);
        self
    }

    pub fn representative_hex(mut self, account_hex: &str) -> Self {
        self.present |= REPRESENTATIVE_PRESENT;
        match account_from_hex(account_hex) {
            Some(a) => self.representative = Some(a),
            None => record_once!(self, BuildError::BadRepresentative),
        }
        self
    }

    pub fn representative_address(mut self, address: &str) -> Self {
        self.present |= REPRESENTATIVE_PRESENT;
        match account_from_address(address) {
            Some(a) => self.representative = Some(a),
            None => record_once!(self, BuildError::BadRepresentative),
        }
        self
    }

    pub fn signature(mut self, signature: burst_types::Signature) -> Self {
        self.present |= SIGNATURE_PRESENT;
        self.signature = Some(signature);
        self
    }

    pub fn work(mut self, work: u64) -> Self {
        self.present |= WORK_PRESENT;
        self.work = Some(work);
        self
    }

    pub fn build(self) -> Result<Block, BuildError> {
        if let Some(err) = self.error {
            return Err(err);
        }
        if let Some(err) = first_missing_field(CHANGE_REQUIRED, self.present) {
            return Err(err);
        }
        Ok(Block::Change {
            previous: self.previous.unwrap(),
            representative: self.representative.unwrap(),
            signature: self.signature.unwrap(),
            work: self.work.unwrap(),
        })
    }
}
