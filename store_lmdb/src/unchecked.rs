//! LMDB implementation of `UncheckedStore` — the gap cache's persisted
//! holding table, keyed on the dependency hash a block is waiting for
//! (§4.1 "unchecked").

use burst_store::unchecked::{UncheckedInfo, UncheckedStore};
use burst_store::StoreError;
use burst_types::{BlockHash, Timestamp};

use crate::{LmdbEnvironment, LmdbError};

/// Composite key: `waiting_on ∥ arrival_order(8)`, so multiple blocks can
/// wait on the same dependency and `take` drains them in arrival order.
fn entry_key(waiting_on: &BlockHash, seq: u64) -> Vec<u8> {
    let mut key = waiting_on.as_bytes().to_vec();
    key.extend_from_slice(&seq.to_be_bytes());
    key
}

impl UncheckedStore for LmdbEnvironment {
    fn put(&self, waiting_on: &BlockHash, info: &UncheckedInfo) -> Result<(), StoreError> {
        let prefix = waiting_on.as_bytes().to_vec();
        let mut wtxn = self.write_txn().map_err(LmdbError::from)?;
        let next_seq = {
            let mut count = 0u64;
            for entry in self.unchecked.prefix_iter(&wtxn, &prefix).map_err(LmdbError::from)? {
                entry.map_err(LmdbError::from)?;
                count += 1;
            }
            count
        };
        let key = entry_key(waiting_on, next_seq);
        let bytes = bincode::serialize(info).map_err(LmdbError::from)?;
        self.unchecked.put(&mut wtxn, &key, &bytes).map_err(LmdbError::from)?;
        wtxn.commit().map_err(LmdbError::from)?;
        Ok(())
    }

    fn take(&self, waiting_on: &BlockHash) -> Result<Vec<UncheckedInfo>, StoreError> {
        let prefix = waiting_on.as_bytes().to_vec();
        let rtxn = self.read_txn().map_err(LmdbError::from)?;
        let mut entries = Vec::new();
        for entry in self.unchecked.prefix_iter(&rtxn, &prefix).map_err(LmdbError::from)? {
            let (k, v) = entry.map_err(LmdbError::from)?;
            entries.push((k.to_vec(), v.to_vec()));
        }
        drop(rtxn);
        if entries.is_empty() {
            return Ok(Vec::new());
        }
        let mut wtxn = self.write_txn().map_err(LmdbError::from)?;
        let mut out = Vec::with_capacity(entries.len());
        for (k, v) in entries {
            self.unchecked.delete(&mut wtxn, &k).map_err(LmdbError::from)?;
            out.push(bincode::deserialize(&v).map_err(LmdbError::from)?);
        }
        wtxn.commit().map_err(LmdbError::from)?;
        Ok(out)
    }

    fn exists(&self, waiting_on: &BlockHash) -> Result<bool, StoreError> {
        let prefix = waiting_on.as_bytes().to_vec();
        let rtxn = self.read_txn().map_err(LmdbError::from)?;
        Ok(self
            .unchecked
            .prefix_iter(&rtxn, &prefix)
            .map_err(LmdbError::from)?
            .next()
            .is_some())
    }

    fn count(&self) -> Result<u64, StoreError> {
        let rtxn = self.read_txn().map_err(LmdbError::from)?;
        Ok(self.unchecked.len(&rtxn).map_err(LmdbError::from)?)
    }

    fn trim_older_than(&self, cutoff: Timestamp) -> Result<usize, StoreError> {
        let rtxn = self.read_txn().map_err(LmdbError::from)?;
        let mut to_delete = Vec::new();
        for entry in self.unchecked.iter(&rtxn).map_err(LmdbError::from)? {
            let (k, v) = entry.map_err(LmdbError::from)?;
            let info: UncheckedInfo = bincode::deserialize(v).map_err(LmdbError::from)?;
            if info.received < cutoff {
                to_delete.push(k.to_vec());
            }
        }
        drop(rtxn);
        let count = to_delete.len();
        if !to_delete.is_empty() {
            let mut wtxn = self.write_txn().map_err(LmdbError::from)?;
            for k in &to_delete {
                self.unchecked.delete(&mut wtxn, k).map_err(LmdbError::from)?;
            }
            wtxn.commit().map_err(LmdbError::from)?;
        }
        Ok(count)
    }
}
