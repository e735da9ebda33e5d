//! LMDB implementation of `OnlineWeightStore` — rolling sample window keyed
//! by big-endian timestamp (§4.1 "online_weight").

use burst_store::online_weight::OnlineWeightStore;
use burst_store::StoreError;
use burst_types::{Amount, Timestamp};

use crate::{LmdbEnvironment, LmdbError};

impl OnlineWeightStore for LmdbEnvironment {
    fn put_sample(&self, timestamp: Timestamp, weight: Amount) -> Result<(), StoreError> {
        let mut wtxn = self.write_txn().map_err(LmdbError::from)?;
        self.online_weight
            .put(&mut wtxn, &timestamp.as_secs().to_be_bytes(), &weight.raw().to_le_bytes())
            .map_err(LmdbError::from)?;
        wtxn.commit().map_err(LmdbError::from)?;
        Ok(())
    }

    fn recent_samples(&self, limit: usize) -> Result<Vec<(Timestamp, Amount)>, StoreError> {
        let rtxn = self.read_txn().map_err(LmdbError::from)?;
        let mut all = Vec::new();
        for entry in self.online_weight.iter(&rtxn).map_err(LmdbError::from)? {
            let (k, v) = entry.map_err(LmdbError::from)?;
            let ts_bytes: [u8; 8] = k
                .try_into()
                .map_err(|_| LmdbError::Serialization("bad timestamp key length".into()))?;
            let amt_bytes: [u8; 16] = v
                .try_into()
                .map_err(|_| LmdbError::Serialization("bad weight value length".into()))?;
            all.push((
                Timestamp::new(u64::from_be_bytes(ts_bytes)),
                Amount::new(u128::from_le_bytes(amt_bytes)),
            ));
        }
        all.reverse(); // newest first, since keys are stored ascending
        all.truncate(limit);
        Ok(all)
    }

    fn trim_older_than(&self, cutoff: Timestamp) -> Result<usize, StoreError> {
        let rtxn = self.read_txn().map_err(LmdbError::from)?;
        let mut to_delete = Vec::new();
        for entry in self.online_weight.iter(&rtxn).map_err(LmdbError::from)? {
            let (k, _) = entry.map_err(LmdbError::from)?;
            let ts_bytes: [u8; 8] = k
                .try_into()
                .map_err(|_| LmdbError::Serialization("bad timestamp key length".into()))?;
            if u64::from_be_bytes(ts_bytes) < cutoff.as_secs() {
                to_delete.push(k.to_vec());
            }
        }
        drop(rtxn);
        let count = to_delete.len();
        if !to_delete.is_empty() {
            let mut wtxn = self.write_txn().map_err(LmdbError::from)?;
            for k in &to_delete {
                self.online_weight.delete(&mut wtxn, k).map_err(LmdbError::from)?;
            }
            wtxn.commit().map_err(LmdbError::from)?;
        }
        Ok(count)
    }
}
