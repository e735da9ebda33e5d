//! Genesis block creation — the first block on each network (§8 scenario 1).
//!
//! The genesis block is an opening `State` block: `previous` and `link` are
//! zero, the account is its own representative, and it carries the entire
//! fixed supply. Each network (`live`/`test`/`dev`) has its own deterministic
//! creator keypair so the genesis hash differs per network without needing
//! any out-of-band coordination.

use burst_crypto::{derive_address, keypair_from_seed, sign_message};
use burst_types::{Amount, BlockHash, NetworkId, WalletAddress};
use burst_work::WorkGenerator;

use crate::block::{verify_signature, Block};

/// Configuration for creating a genesis block.
pub struct GenesisConfig {
    /// Which network this genesis is for.
    pub network: NetworkId,
    /// The wallet address of the genesis account.
    pub creator: WalletAddress,
}

/// The entire fixed supply, assigned to the genesis account at network start.
pub fn genesis_amount() -> Amount {
    Amount::MAX_SUPPLY
}

/// Create the genesis block for a given configuration.
///
/// The block is a self-representing, self-opening `State` block
/// (`previous == BlockHash::ZERO`, `link == BlockHash::ZERO`) holding the
/// full supply, signed by the network's canonical genesis keypair.
pub fn create_genesis_block(config: &GenesisConfig) -> Block {
    let keypair = genesis_keypair(&config.network);
    let mut block = Block::State {
        account: config.creator.clone(),
        previous: BlockHash::ZERO,
        representative: config.creator.clone(),
        balance: genesis_amount(),
        link: BlockHash::ZERO,
        signature: burst_types::Signature([0u8; 64]),
        work: 0,
    };
    let hash = block.hash();
    let signature = sign_message(hash.as_bytes(), &keypair.private);
    let nonce = WorkGenerator
        .generate(&hash, 0)
        .expect("zero-difficulty PoW always succeeds");
    if let Block::State { signature: sig, work, .. } = &mut block {
        *sig = signature;
        *work = nonce.0;
    }
    block
}

/// The deterministic genesis block hash for a network.
pub fn genesis_hash(network: NetworkId) -> BlockHash {
    let config = GenesisConfig {
        network,
        creator: genesis_creator(network),
    };
    create_genesis_block(&config).hash()
}

/// Canonical genesis creator address per network, derived from a
/// network-specific deterministic seed.
///
/// - Live: the seed is generated once at launch and the private key
///   discarded; only the resulting address is hardcoded here.
/// - Test/Dev: published seeds, so anyone can stand up a compatible network.
pub fn genesis_creator(network: NetworkId) -> WalletAddress {
    derive_address(&genesis_keypair(&network).public)
}

fn genesis_keypair(network: &NetworkId) -> burst_types::KeyPair {
    let mut seed = [0u8; 32];
    seed[0..4].copy_from_slice(b"GNSS");
    seed[4..4 + network.as_str().len()].copy_from_slice(network.as_str().as_bytes());
    keypair_from_seed(&seed)
}
