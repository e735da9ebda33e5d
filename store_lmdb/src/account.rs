//! LMDB implementation of AccountStore — binary serialized, epoch-split.

use burst_store::account::{AccountInfo, AccountStore};
use burst_store::StoreError;
use burst_types::{Epoch, WalletAddress};

use crate::{LmdbEnvironment, LmdbError};

impl LmdbEnvironment {
    fn accounts_db_for(&self, epoch: Epoch) -> heed::Database<heed::types::Bytes, heed::types::Bytes> {
        match epoch {
            Epoch::V0 => self.accounts_v0,
            Epoch::V1 => self.accounts_v1,
        }
    }
}

impl AccountStore for LmdbEnvironment {
    fn get_account(&self, address: &WalletAddress) -> Result<Option<AccountInfo>, StoreError> {
        let rtxn = self.read_txn().map_err(LmdbError::from)?;
        let key = address.as_str().as_bytes();
        for db in [self.accounts_v1, self.accounts_v0] {
            if let Some(val) = db.get(&rtxn, key).map_err(LmdbError::from)? {
                let info: AccountInfo = bincode::deserialize(val).map_err(LmdbError::from)?;
                return Ok(Some(info));
            }
        }
        Ok(None)
    }

    fn put_account(&self, address: &WalletAddress, info: &AccountInfo) -> Result<(), StoreError> {
        let bytes = bincode::serialize(info).map_err(LmdbError::from)?;
        let key = address.as_str().as_bytes();
        let mut wtxn = self.write_txn().map_err(LmdbError::from)?;

        let target = self.accounts_db_for(info.epoch);
        let other = self.accounts_db_for(match info.epoch {
            Epoch::V0 => Epoch::V1,
            Epoch::V1 => Epoch::V0,
        });
        other.delete(&mut wtxn, key).map_err(LmdbError::from)?;
        target.put(&mut wtxn, key, &bytes).map_err(LmdbError::from)?;

        wtxn.commit().map_err(LmdbError::from)?;
        Ok(())
    }

    fn delete_account(&self, address: &WalletAddress) -> Result<(), StoreError> {
        let key = address.as_str().as_bytes();
        let mut wtxn = self.write_txn().map_err(LmdbError::from)?;
        self.accounts_v0.delete(&mut wtxn, key).map_err(LmdbError::from)?;
        self.accounts_v1.delete(&mut wtxn, key).map_err(LmdbError::from)?;
        wtxn.commit().map_err(LmdbError::from)?;
        Ok(())
    }

    fn account_count(&self) -> Result<u64, StoreError> {
        let rtxn = self.read_txn().map_err(LmdbError::from)?;
        let v0 = self.accounts_v0.len(&rtxn).map_err(LmdbError::from)?;
        let v1 = self.accounts_v1.len(&rtxn).map_err(LmdbError::from)?;
        Ok(v0 + v1)
    }

    fn iter_accounts(&self) -> Result<Vec<(WalletAddress, AccountInfo)>, StoreError> {
        let rtxn = self.read_txn().map_err(LmdbError::from)?;
        let mut v0 = Vec::new();
        for entry in self.accounts_v0.iter(&rtxn).map_err(LmdbError::from)? {
            let (k, v) = entry.map_err(LmdbError::from)?;
            v0.push((k.to_vec(), v.to_vec()));
        }
        let mut v1 = Vec::new();
        for entry in self.accounts_v1.iter(&rtxn).map_err(LmdbError::from)? {
            let (k, v) = entry.map_err(LmdbError::from)?;
            v1.push((k.to_vec(), v.to_vec()));
        }

        // Merge the two key-ordered sequences, preferring v0 on a tie (an
        // account should never exist in both, but a tie is resolved
        // deterministically rather than relying on that invariant).
        let mut merged = Vec::with_capacity(v0.len() + v1.len());
        let (mut i, mut j) = (0, 0);
        while i < v0.len() && j < v1.len() {
            match v0[i].0.cmp(&v1[j].0) {
                std::cmp::Ordering::Less | std::cmp::Ordering::Equal => {
                    merged.push(v0[i].clone());
                    i += 1;
                }
                std::cmp::Ordering::Greater => {
                    merged.push(v1[j].clone());
                    j += 1;
                }
            }
        }
        merged.extend_from_slice(&v0[i..]);
        merged.extend_from_slice(&v1[j..]);

        merged
            .into_iter()
            .map(|(k, v)| {
                let addr_str = std::str::from_utf8(&k)
                    .map_err(|e| LmdbError::Serialization(e.to_string()))?
                    .to_string();
                let info: AccountInfo = bincode::deserialize(&v).map_err(LmdbError::from)?;
                Ok((WalletAddress::new(addr_str), info))
            })
            .collect::<Result<Vec<_>, LmdbError>>()
            .map_err(Into::into)
    }
}
