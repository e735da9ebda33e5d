//! LMDB implementation of `BlockStore` — one physical table per non-state
//! variant plus epoch-split `state_v0`/`state_v1` tables (§4.1).

use heed::types::Bytes;
use heed::Database;

use burst_store::block::{BlockStore, BlockVariant, StoredBlock};
use burst_store::StoreError;
use burst_types::{BlockHash, Epoch, WalletAddress};

use crate::{LmdbEnvironment, LmdbError};

fn encode(block: &StoredBlock) -> Result<Vec<u8>, LmdbError> {
    bincode::serialize(block).map_err(LmdbError::from)
}

fn decode(bytes: &[u8]) -> Result<StoredBlock, LmdbError> {
    bincode::deserialize(bytes).map_err(LmdbError::from)
}

/// `account_bytes ∥ height_be(8)` composite key for the `heights` index.
pub(crate) fn height_key(account: &WalletAddress, height: u64) -> Vec<u8> {
    let mut key = account.as_str().as_bytes().to_vec();
    key.extend_from_slice(&height.to_be_bytes());
    key
}

impl LmdbEnvironment {
    pub(crate) fn db_for_variant(&self, variant: BlockVariant, epoch: Epoch) -> Database<Bytes, Bytes> {
        match variant {
            BlockVariant::Open => self.blocks_open,
            BlockVariant::Send => self.blocks_send,
            BlockVariant::Receive => self.blocks_receive,
            BlockVariant::Change => self.blocks_change,
            BlockVariant::State => match epoch {
                Epoch::V0 => self.blocks_state_v0,
                Epoch::V1 => self.blocks_state_v1,
            },
        }
    }

    /// Probe order matching §4.1 "Block raw get": state_v0/v1 first (state
    /// blocks dominate at steady state), then send, receive, open, change.
    fn probe_order(&self) -> [Database<Bytes, Bytes>; 6] {
        [
            self.blocks_state_v0,
            self.blocks_state_v1,
            self.blocks_send,
            self.blocks_receive,
            self.blocks_open,
            self.blocks_change,
        ]
    }
}

impl BlockStore for LmdbEnvironment {
    fn put_block(&self, hash: &BlockHash, block: &StoredBlock) -> Result<(), StoreError> {
        let bytes = encode(block)?;
        let db = self.db_for_variant(block.sideband.variant, block.sideband.epoch);
        let mut wtxn = self.write_txn().map_err(LmdbError::from)?;
        db.put(&mut wtxn, hash.as_bytes(), &bytes).map_err(LmdbError::from)?;
        if let Some(account) = &block.sideband.account {
            let hk = height_key(account, block.sideband.height);
            self.heights.put(&mut wtxn, &hk, hash.as_bytes()).map_err(LmdbError::from)?;
        }
        wtxn.commit().map_err(LmdbError::from)?;
        Ok(())
    }

    fn get_block(&self, hash: &BlockHash) -> Result<Option<StoredBlock>, StoreError> {
        let rtxn = self.read_txn().map_err(LmdbError::from)?;
        for db in self.probe_order() {
            if let Some(bytes) = db.get(&rtxn, hash.as_bytes()).map_err(LmdbError::from)? {
                return Ok(Some(decode(bytes)?));
            }
        }
        Ok(None)
    }

    fn delete_block(&self, hash: &BlockHash) -> Result<(), StoreError> {
        let existing = self.get_block(hash)?;
        let mut wtxn = self.write_txn().map_err(LmdbError::from)?;
        for db in self.probe_order() {
            db.delete(&mut wtxn, hash.as_bytes()).map_err(LmdbError::from)?;
        }
        if let Some(stored) = existing {
            if let Some(account) = &stored.sideband.account {
                let hk = height_key(account, stored.sideband.height);
                self.heights.delete(&mut wtxn, &hk).map_err(LmdbError::from)?;
            }
        }
        wtxn.commit().map_err(LmdbError::from)?;
        Ok(())
    }

    fn set_successor(&self, hash: &BlockHash, successor: BlockHash) -> Result<(), StoreError> {
        let Some(mut stored) = self.get_block(hash)? else {
            return Err(StoreError::NotFound(format!("block {hash} has no record to update successor on")));
        };
        stored.sideband.successor = successor;
        self.put_block(hash, &stored)
    }

    fn block_count(&self) -> Result<u64, StoreError> {
        let rtxn = self.read_txn().map_err(LmdbError::from)?;
        let mut total = 0u64;
        for db in self.probe_order() {
            total += db.len(&rtxn).map_err(LmdbError::from)?;
        }
        Ok(total)
    }

    fn count_by_variant(&self, variant: BlockVariant, epoch: Option<Epoch>) -> Result<u64, StoreError> {
        let rtxn = self.read_txn().map_err(LmdbError::from)?;
        match variant {
            BlockVariant::State => {
                let e = epoch.unwrap_or(Epoch::V0);
                Ok(self.db_for_variant(variant, e).len(&rtxn).map_err(LmdbError::from)?)
            }
            other => Ok(self.db_for_variant(other, Epoch::V0).len(&rtxn).map_err(LmdbError::from)?),
        }
    }

    fn random_block(&self, seed: [u8; 32]) -> Result<Option<(BlockHash, StoredBlock)>, StoreError> {
        let rtxn = self.read_txn().map_err(LmdbError::from)?;
        let counts: Vec<(Database<Bytes, Bytes>, u64)> = self
            .probe_order()
            .into_iter()
            .map(|db| db.len(&rtxn).map(|n| (db, n)).map_err(LmdbError::from))
            .collect::<Result<_, _>>()?;
        let total: u64 = counts.iter().map(|(_, n)| n).sum();
        if total == 0 {
            return Ok(None);
        }
        // Choose a variant proportionally to its count using the seed's
        // first 8 bytes as a uniform draw over [0, total) (§4.1 "Random
        // block sampling").
        let mut draw = u64::from_le_bytes(seed[..8].try_into().expect("8 bytes")) % total;
        let mut chosen = counts[0].0;
        for (db, n) in &counts {
            if draw < *n {
                chosen = *db;
                break;
            }
            draw -= n;
        }
        // Seek to the random 256-bit key, take the next existing entry,
        // wrapping to the first past the end.
        let mut iter = chosen.range(&rtxn, &(seed.to_vec()..)).map_err(LmdbError::from)?;
        let found = match iter.next() {
            Some(entry) => Some(entry.map_err(LmdbError::from)?),
            None => None,
        };
        drop(iter);
        let (key, val) = match found {
            Some((k, v)) => (k.to_vec(), v.to_vec()),
            None => match chosen.first(&rtxn).map_err(LmdbError::from)? {
                Some((k, v)) => (k.to_vec(), v.to_vec()),
                None => return Ok(None),
            },
        };
        let hash_bytes: [u8; 32] = key
            .try_into()
            .map_err(|_| LmdbError::Serialization("bad key length".into()))?;
        Ok(Some((BlockHash::new(hash_bytes), decode(&val)?)))
    }

    fn get_account_blocks(&self, address: &WalletAddress) -> Result<Vec<BlockHash>, StoreError> {
        let rtxn = self.read_txn().map_err(LmdbError::from)?;
        let prefix = address.as_str().as_bytes().to_vec();
        let mut hashes = Vec::new();
        let iter = self
            .heights
            .prefix_iter(&rtxn, &prefix)
            .map_err(LmdbError::from)?;
        for entry in iter {
            let (_, hash_bytes) = entry.map_err(LmdbError::from)?;
            let arr: [u8; 32] = hash_bytes
                .try_into()
                .map_err(|_| LmdbError::Serialization("bad hash length in heights index".into()))?;
            hashes.push(BlockHash::new(arr));
        }
        Ok(hashes)
    }
}
