//! Fundamental types shared across every crate in the workspace: account
//! addresses, block hashes, amounts, epochs, keys, and timestamps.

pub mod address;
pub mod amount;
pub mod block;
pub mod epoch;
pub mod keys;
pub mod network;
pub mod time;

pub use address::WalletAddress;
pub use amount::Amount;
pub use block::BlockHash;
pub use epoch::Epoch;
pub use keys::{KeyPair, PrivateKey, PublicKey, Signature};
pub use network::NetworkId;
pub use time::Timestamp;
