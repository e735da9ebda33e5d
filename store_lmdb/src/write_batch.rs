//! Write batching — one LMDB write transaction spanning every table the
//! ledger processor touches, so a whole `process`/`rollback` call commits
//! atomically (§4.1 "Transactions", `burst_store::LedgerWriteTxn`).
//!
//! If the batch is dropped without calling [`WriteBatch::commit`], every
//! operation performed through it is rolled back (the underlying LMDB write
//! transaction is aborted).

use heed::RwTxn;

use burst_store::account::AccountInfo;
use burst_store::block::StoredBlock;
use burst_store::pending::{PendingInfo, PendingKey};
use burst_store::{LedgerWriteTxn, StoreError};
use burst_types::{Amount, BlockHash, Epoch, WalletAddress};

use crate::block::height_key;
use crate::pending::pending_key_raw;
use crate::environment::LmdbEnvironment;
use crate::LmdbError;

pub struct WriteBatch<'a> {
    txn: RwTxn<'a>,
    env: &'a LmdbEnvironment,
}

impl<'a> WriteBatch<'a> {
    pub(crate) fn new(env: &'a LmdbEnvironment) -> Result<Self, StoreError> {
        let txn = env.env.write_txn().map_err(LmdbError::from)?;
        Ok(Self { txn, env })
    }

    fn accounts_db_for(&self, epoch: Epoch) -> heed::Database<heed::types::Bytes, heed::types::Bytes> {
        match epoch {
            Epoch::V0 => self.env.accounts_v0,
            Epoch::V1 => self.env.accounts_v1,
        }
    }

    fn pending_db_for(&self, epoch: Epoch) -> heed::Database<heed::types::Bytes, heed::types::Bytes> {
        match epoch {
            Epoch::V0 => self.env.pending_v0,
            Epoch::V1 => self.env.pending_v1,
        }
    }
}

impl<'a> LedgerWriteTxn for WriteBatch<'a> {
    fn get_account(&self, address: &WalletAddress) -> Result<Option<AccountInfo>, StoreError> {
        let key = address.as_str().as_bytes();
        for db in [self.env.accounts_v1, self.env.accounts_v0] {
            if let Some(val) = db.get(&self.txn, key).map_err(LmdbError::from)? {
                return Ok(Some(bincode::deserialize(val).map_err(LmdbError::from)?));
            }
        }
        Ok(None)
    }

    fn put_account(&mut self, address: &WalletAddress, info: &AccountInfo) -> Result<(), StoreError> {
        let bytes = bincode::serialize(info).map_err(LmdbError::from)?;
        let key = address.as_str().as_bytes().to_vec();
        let target = self.accounts_db_for(info.epoch);
        let other = self.accounts_db_for(match info.epoch {
            Epoch::V0 => Epoch::V1,
            Epoch::V1 => Epoch::V0,
        });
        other.delete(&mut self.txn, &key).map_err(LmdbError::from)?;
        target.put(&mut self.txn, &key, &bytes).map_err(LmdbError::from)?;
        Ok(())
    }

    fn delete_account(&mut self, address: &WalletAddress) -> Result<(), StoreError> {
        let key = address.as_str().as_bytes().to_vec();
        self.env.accounts_v0.delete(&mut self.txn, &key).map_err(LmdbError::from)?;
        self.env.accounts_v1.delete(&mut self.txn, &key).map_err(LmdbError::from)?;
        Ok(())
    }

    fn get_block(&self, hash: &BlockHash) -> Result<Option<StoredBlock>, StoreError> {
        for db in [
            self.env.blocks_state_v0,
            self.env.blocks_state_v1,
            self.env.blocks_send,
            self.env.blocks_receive,
            self.env.blocks_open,
            self.env.blocks_change,
        ] {
            if let Some(bytes) = db.get(&self.txn, hash.as_bytes()).map_err(LmdbError::from)? {
                return Ok(Some(bincode::deserialize(bytes).map_err(LmdbError::from)?));
            }
        }
        Ok(None)
    }

    fn put_block(&mut self, hash: &BlockHash, block: &StoredBlock) -> Result<(), StoreError> {
        let bytes = bincode::serialize(block).map_err(LmdbError::from)?;
        let db = self.env.db_for_variant(block.sideband.variant, block.sideband.epoch);
        db.put(&mut self.txn, hash.as_bytes(), &bytes).map_err(LmdbError::from)?;
        if let Some(account) = &block.sideband.account {
            let hk = height_key(account, block.sideband.height);
            self.env.heights.put(&mut self.txn, &hk, hash.as_bytes()).map_err(LmdbError::from)?;
        }
        Ok(())
    }

    fn delete_block(&mut self, hash: &BlockHash) -> Result<(), StoreError> {
        let existing = self.get_block(hash)?;
        for db in [
            self.env.blocks_state_v0,
            self.env.blocks_state_v1,
            self.env.blocks_send,
            self.env.blocks_receive,
            self.env.blocks_open,
            self.env.blocks_change,
        ] {
            db.delete(&mut self.txn, hash.as_bytes()).map_err(LmdbError::from)?;
        }
        if let Some(stored) = existing {
            if let Some(account) = &stored.sideband.account {
                let hk = height_key(account, stored.sideband.height);
                self.env.heights.delete(&mut self.txn, &hk).map_err(LmdbError::from)?;
            }
        }
        Ok(())
    }

    fn set_successor(&mut self, hash: &BlockHash, successor: BlockHash) -> Result<(), StoreError> {
        let Some(mut stored) = self.get_block(hash)? else {
            return Err(StoreError::NotFound(format!("block {hash} has no record to update successor on")));
        };
        stored.sideband.successor = successor;
        self.put_block(hash, &stored)
    }

    fn get_pending(&self, key: &PendingKey) -> Result<Option<PendingInfo>, StoreError> {
        let raw = pending_key_raw(key);
        for db in [self.env.pending_v0, self.env.pending_v1] {
            if let Some(bytes) = db.get(&self.txn, &raw).map_err(LmdbError::from)? {
                return Ok(Some(bincode::deserialize(bytes).map_err(LmdbError::from)?));
            }
        }
        Ok(None)
    }

    fn put_pending(&mut self, key: &PendingKey, info: &PendingInfo) -> Result<(), StoreError> {
        let raw = pending_key_raw(key);
        let bytes = bincode::serialize(info).map_err(LmdbError::from)?;
        self.pending_db_for(info.epoch)
            .put(&mut self.txn, &raw, &bytes)
            .map_err(LmdbError::from)?;
        Ok(())
    }

    fn delete_pending(&mut self, key: &PendingKey) -> Result<(), StoreError> {
        let raw = pending_key_raw(key);
        self.env.pending_v0.delete(&mut self.txn, &raw).map_err(LmdbError::from)?;
        self.env.pending_v1.delete(&mut self.txn, &raw).map_err(LmdbError::from)?;
        Ok(())
    }

    fn get_frontier(&self, hash: &BlockHash) -> Result<Option<WalletAddress>, StoreError> {
        let val = self.env.frontiers.get(&self.txn, hash.as_bytes()).map_err(LmdbError::from)?;
        match val {
            Some(bytes) => {
                let s = std::str::from_utf8(bytes).map_err(|e| LmdbError::Serialization(e.to_string()))?;
                Ok(Some(WalletAddress::new(s.to_string())))
            }
            None => Ok(None),
        }
    }

    fn put_frontier(&mut self, hash: &BlockHash, account: &WalletAddress) -> Result<(), StoreError> {
        self.env
            .frontiers
            .put(&mut self.txn, hash.as_bytes(), account.as_str().as_bytes())
            .map_err(LmdbError::from)?;
        Ok(())
    }

    fn delete_frontier(&mut self, hash: &BlockHash) -> Result<(), StoreError> {
        self.env.frontiers.delete(&mut self.txn, hash.as_bytes()).map_err(LmdbError::from)?;
        Ok(())
    }

    fn get_weight(&self, rep: &WalletAddress) -> Result<Amount, StoreError> {
        let val = self
            .env
            .representation
            .get(&self.txn, rep.as_str().as_bytes())
            .map_err(LmdbError::from)?;
        match val {
            Some(bytes) => {
                let arr: [u8; 16] = bytes
                    .try_into()
                    .map_err(|_| LmdbError::Serialization("bad weight length".into()))?;
                Ok(Amount::new(u128::from_le_bytes(arr)))
            }
            None => Ok(Amount::ZERO),
        }
    }

    fn add_weight(&mut self, rep: &WalletAddress, delta: i128) -> Result<(), StoreError> {
        let key = rep.as_str().as_bytes().to_vec();
        let current = self.get_weight(rep)?.raw() as i128;
        let updated = current
            .checked_add(delta)
            .filter(|v| *v >= 0)
            .ok_or_else(|| LmdbError::Serialization(format!("representation underflow for {rep}")))?
            as u128;
        if updated == 0 {
            self.env.representation.delete(&mut self.txn, &key).map_err(LmdbError::from)?;
        } else {
            self.env
                .representation
                .put(&mut self.txn, &key, &updated.to_le_bytes())
                .map_err(LmdbError::from)?;
        }
        Ok(())
    }

    fn get_account_blocks(&self, account: &WalletAddress) -> Result<Vec<BlockHash>, StoreError> {
        let prefix = account.as_str().as_bytes().to_vec();
        let mut hashes = Vec::new();
        for entry in self.env.heights.prefix_iter(&self.txn, &prefix).map_err(LmdbError::from)? {
            let (_, hash_bytes) = entry.map_err(LmdbError::from)?;
            let arr: [u8; 32] = hash_bytes
                .try_into()
                .map_err(|_| LmdbError::Serialization("bad hash length in heights index".into()))?;
            hashes.push(BlockHash::new(arr));
        }
        Ok(hashes)
    }

    fn commit(self) -> Result<(), StoreError> {
        self.txn.commit().map_err(LmdbError::from)?;
        Ok(())
    }
}

impl LmdbEnvironment {
    /// Begin a new atomic write transaction for the ledger processor
    /// (§4.1 "Transactions": at most one write transaction open at a time).
    pub fn write_batch(&self) -> Result<WriteBatch<'_>, StoreError> {
        WriteBatch::new(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use burst_store::account::AccountStore;
    use burst_store::block::{BlockVariant, Sideband};
    use burst_types::Timestamp;

    fn temp_env() -> (tempfile::TempDir, LmdbEnvironment) {
        let dir = tempfile::tempdir().expect("tempdir");
        let env = LmdbEnvironment::open(dir.path(), 10 * 1024 * 1024).expect("open env");
        (dir, env)
    }

    fn addr(n: u8) -> WalletAddress {
        WalletAddress::new(format!("brst_test_account_{n:060}"))
    }

    #[test]
    fn batch_commits_account_and_block_atomically() {
        let (_dir, env) = temp_env();
        let a = addr(1);
        let hash = BlockHash::new([7u8; 32]);

        let mut batch = env.write_batch().expect("write_batch");
        let info = AccountInfo {
            head: hash,
            rep_block: hash,
            open_block: hash,
            representative: a.clone(),
            balance: Amount::new(100),
            modified_timestamp: Timestamp::new(1),
            block_count: 1,
            epoch: Epoch::V0,
        };
        batch.put_account(&a, &info).expect("put_account");
        batch
            .put_block(
                &hash,
                &StoredBlock {
                    bytes: vec![1, 2, 3],
                    sideband: Sideband {
                        variant: BlockVariant::Open,
                        account: Some(a.clone()),
                        successor: BlockHash::ZERO,
                        balance_after: Amount::new(100),
                        height: 1,
                        timestamp: Timestamp::new(1),
                        epoch: Epoch::V0,
                    },
                },
            )
            .expect("put_block");
        batch.commit().expect("commit");

        let loaded = env.get_account(&a).expect("get_account").expect("present");
        assert_eq!(loaded.balance, Amount::new(100));
    }

    #[test]
    fn dropped_batch_does_not_persist() {
        let (_dir, env) = temp_env();
        let a = addr(2);
        {
            let mut batch = env.write_batch().expect("write_batch");
            let info = AccountInfo {
                head: BlockHash::ZERO,
                rep_block: BlockHash::ZERO,
                open_block: BlockHash::ZERO,
                representative: a.clone(),
                balance: Amount::new(5),
                modified_timestamp: Timestamp::new(1),
                block_count: 1,
                epoch: Epoch::V0,
            };
            batch.put_account(&a, &info).expect("put_account");
        }
        assert!(env.get_account(&a).expect("get_account").is_none());
    }
}
