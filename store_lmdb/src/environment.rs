//! LMDB environment setup.
//!
//! Opens one `heed::Env` and hands out a `Database` handle per logical table.
//! Tables that are split by epoch (§4.1) are simply two named LMDB databases
//! within the same environment — there is no cross-database transaction
//! boundary to worry about since heed transactions span the whole `Env`.

use std::path::Path;
use std::sync::Arc;

use heed::types::Bytes;
use heed::{Database, Env, EnvOpenOptions};

use crate::LmdbError;

/// Number of named databases the environment must be able to hold.
const MAX_DBS: u32 = 24;

/// Wraps the LMDB environment and every database handle the store crate
/// hands out to its per-table sub-stores.
#[derive(Clone)]
pub struct LmdbEnvironment {
    pub(crate) env: Arc<Env>,
    pub(crate) accounts_v0: Database<Bytes, Bytes>,
    pub(crate) accounts_v1: Database<Bytes, Bytes>,
    pub(crate) pending_v0: Database<Bytes, Bytes>,
    pub(crate) pending_v1: Database<Bytes, Bytes>,
    pub(crate) blocks_open: Database<Bytes, Bytes>,
    pub(crate) blocks_send: Database<Bytes, Bytes>,
    pub(crate) blocks_receive: Database<Bytes, Bytes>,
    pub(crate) blocks_change: Database<Bytes, Bytes>,
    pub(crate) blocks_state_v0: Database<Bytes, Bytes>,
    pub(crate) blocks_state_v1: Database<Bytes, Bytes>,
    pub(crate) frontiers: Database<Bytes, Bytes>,
    pub(crate) representation: Database<Bytes, Bytes>,
    pub(crate) online_weight: Database<Bytes, Bytes>,
    pub(crate) votes: Database<Bytes, Bytes>,
    pub(crate) unchecked: Database<Bytes, Bytes>,
    pub(crate) meta: Database<Bytes, Bytes>,
    pub(crate) peers: Database<Bytes, Bytes>,
    /// `account_bytes ∥ height_be(8) → hash`. Maintained alongside block
    /// writes so `BlockStore::get_account_blocks` doesn't need to replay a
    /// chain walk through opaque block bytes the store can't parse.
    pub(crate) heights: Database<Bytes, Bytes>,
}

impl LmdbEnvironment {
    /// Open or create an LMDB environment at the given path, creating every
    /// named database on first use.
    pub fn open(path: &Path, map_size: usize) -> Result<Self, LmdbError> {
        std::fs::create_dir_all(path)
            .map_err(|e| LmdbError::Heed(format!("creating data directory: {e}")))?;

        let env = unsafe {
            EnvOpenOptions::new()
                .map_size(map_size)
                .max_dbs(MAX_DBS)
                .open(path)
        }
        .map_err(LmdbError::from)?;
        let env = Arc::new(env);

        let mut wtxn = env.write_txn().map_err(LmdbError::from)?;
        let open_db = |wtxn: &mut heed::RwTxn<'_>, name: &str| -> Result<Database<Bytes, Bytes>, LmdbError> {
            env.create_database(wtxn, Some(name)).map_err(LmdbError::from)
        };

        let accounts_v0 = open_db(&mut wtxn, "accounts_v0")?;
        let accounts_v1 = open_db(&mut wtxn, "accounts_v1")?;
        let pending_v0 = open_db(&mut wtxn, "pending_v0")?;
        let pending_v1 = open_db(&mut wtxn, "pending_v1")?;
        let blocks_open = open_db(&mut wtxn, "blocks_open")?;
        let blocks_send = open_db(&mut wtxn, "blocks_send")?;
        let blocks_receive = open_db(&mut wtxn, "blocks_receive")?;
        let blocks_change = open_db(&mut wtxn, "blocks_change")?;
        let blocks_state_v0 = open_db(&mut wtxn, "blocks_state_v0")?;
        let blocks_state_v1 = open_db(&mut wtxn, "blocks_state_v1")?;
        let frontiers = open_db(&mut wtxn, "frontiers")?;
        let representation = open_db(&mut wtxn, "representation")?;
        let online_weight = open_db(&mut wtxn, "online_weight")?;
        let votes = open_db(&mut wtxn, "votes")?;
        let unchecked = open_db(&mut wtxn, "unchecked")?;
        let meta = open_db(&mut wtxn, "meta")?;
        let peers = open_db(&mut wtxn, "peers")?;
        let heights = open_db(&mut wtxn, "heights")?;
        wtxn.commit().map_err(LmdbError::from)?;

        Ok(Self {
            env,
            accounts_v0,
            accounts_v1,
            pending_v0,
            pending_v1,
            blocks_open,
            blocks_send,
            blocks_receive,
            blocks_change,
            blocks_state_v0,
            blocks_state_v1,
            frontiers,
            representation,
            online_weight,
            votes,
            unchecked,
            meta,
            peers,
            heights,
        })
    }

    pub fn read_txn(&self) -> Result<heed::RoTxn<'_>, LmdbError> {
        self.env.read_txn().map_err(LmdbError::from)
    }

    pub fn write_txn(&self) -> Result<heed::RwTxn<'_>, LmdbError> {
        self.env.write_txn().map_err(LmdbError::from)
    }
}
