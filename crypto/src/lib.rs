//! Cryptographic primitives for the BURST protocol.
//!
//! - **Ed25519** for signing and signature verification (same as Nano)
//! - **Blake2b** for hashing (block hashes, proof-of-work)
//! - Address derivation with `brst_` prefix

pub mod address;
pub mod hash;
pub mod keys;
pub mod sign;

pub use address::{decode_address, derive_address, validate_address};
pub use hash::{blake2b_256, blake2b_256_multi, hash_block};
pub use keys::{generate_keypair, keypair_from_private, keypair_from_seed, public_from_private};
pub use sign::{sign_message, verify_batch, verify_signature};
