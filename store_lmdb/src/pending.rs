//! LMDB implementation of `PendingStore` — epoch-split `pending_v0`/`pending_v1`
//! tables keyed by `(destination, source_hash)` (§4.1).

use burst_store::pending::{PendingInfo, PendingKey, PendingStore};
use burst_store::StoreError;
use burst_types::{Epoch, WalletAddress};

use crate::{LmdbEnvironment, LmdbError};

/// Binary composite key: `destination ∥ source_hash`.
pub(crate) fn pending_key_raw(key: &PendingKey) -> Vec<u8> {
    let mut out = key.destination.as_str().as_bytes().to_vec();
    out.extend_from_slice(key.source_hash.as_bytes());
    out
}

impl LmdbEnvironment {
    fn pending_db_for(&self, epoch: Epoch) -> heed::Database<heed::types::Bytes, heed::types::Bytes> {
        match epoch {
            Epoch::V0 => self.pending_v0,
            Epoch::V1 => self.pending_v1,
        }
    }
}

impl PendingStore for LmdbEnvironment {
    fn put_pending(&self, key: &PendingKey, info: &PendingInfo) -> Result<(), StoreError> {
        let raw_key = pending_key_raw(key);
        let bytes = bincode::serialize(info).map_err(LmdbError::from)?;
        let mut wtxn = self.write_txn().map_err(LmdbError::from)?;
        self.pending_db_for(info.epoch)
            .put(&mut wtxn, &raw_key, &bytes)
            .map_err(LmdbError::from)?;
        wtxn.commit().map_err(LmdbError::from)?;
        Ok(())
    }

    fn get_pending(&self, key: &PendingKey) -> Result<Option<PendingInfo>, StoreError> {
        let raw_key = pending_key_raw(key);
        let rtxn = self.read_txn().map_err(LmdbError::from)?;
        for db in [self.pending_v0, self.pending_v1] {
            if let Some(bytes) = db.get(&rtxn, &raw_key).map_err(LmdbError::from)? {
                let info: PendingInfo = bincode::deserialize(bytes).map_err(LmdbError::from)?;
                return Ok(Some(info));
            }
        }
        Ok(None)
    }

    fn delete_pending(&self, key: &PendingKey) -> Result<(), StoreError> {
        let raw_key = pending_key_raw(key);
        let mut wtxn = self.write_txn().map_err(LmdbError::from)?;
        self.pending_v0.delete(&mut wtxn, &raw_key).map_err(LmdbError::from)?;
        self.pending_v1.delete(&mut wtxn, &raw_key).map_err(LmdbError::from)?;
        wtxn.commit().map_err(LmdbError::from)?;
        Ok(())
    }

    fn get_pending_for_account(
        &self,
        destination: &WalletAddress,
    ) -> Result<Vec<(PendingKey, PendingInfo)>, StoreError> {
        let rtxn = self.read_txn().map_err(LmdbError::from)?;
        let prefix = destination.as_str().as_bytes().to_vec();
        let mut v0 = Vec::new();
        for entry in self.pending_v0.prefix_iter(&rtxn, &prefix).map_err(LmdbError::from)? {
            let (k, v) = entry.map_err(LmdbError::from)?;
            v0.push((k.to_vec(), v.to_vec()));
        }
        let mut v1 = Vec::new();
        for entry in self.pending_v1.prefix_iter(&rtxn, &prefix).map_err(LmdbError::from)? {
            let (k, v) = entry.map_err(LmdbError::from)?;
            v1.push((k.to_vec(), v.to_vec()));
        }
        drop(rtxn);

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
                if k.len() < 32 {
                    return Err(LmdbError::Serialization("pending key too short".into()));
                }
                let split = k.len() - 32;
                let dest_str = std::str::from_utf8(&k[..split])
                    .map_err(|e| LmdbError::Serialization(e.to_string()))?
                    .to_string();
                let hash_bytes: [u8; 32] = k[split..]
                    .try_into()
                    .map_err(|_| LmdbError::Serialization("bad source hash length".into()))?;
                let info: PendingInfo = bincode::deserialize(&v).map_err(LmdbError::from)?;
                Ok((
                    PendingKey {
                        destination: WalletAddress::new(dest_str),
                        source_hash: burst_types::BlockHash::new(hash_bytes),
                    },
                    info,
                ))
            })
            .collect::<Result<Vec<_>, LmdbError>>()
            .map_err(Into::into)
    }

    fn pending_count(&self) -> Result<u64, StoreError> {
        let rtxn = self.read_txn().map_err(LmdbError::from)?;
        let v0 = self.pending_v0.len(&rtxn).map_err(LmdbError::from)?;
        let v1 = self.pending_v1.len(&rtxn).map_err(LmdbError::from)?;
        Ok(v0 + v1)
    }
}
