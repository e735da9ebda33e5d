//! LMDB implementation of `RepresentationStore` — materialized delegated
//! weight per representative (§4.1).

use burst_store::representation::RepresentationStore;
use burst_store::StoreError;
use burst_types::{Amount, WalletAddress};

use crate::{LmdbEnvironment, LmdbError};

impl RepresentationStore for LmdbEnvironment {
    fn add_weight(&self, rep: &WalletAddress, delta: i128) -> Result<(), StoreError> {
        let key = rep.as_str().as_bytes();
        let mut wtxn = self.write_txn().map_err(LmdbError::from)?;
        let current = self
            .representation
            .get(&wtxn, key)
            .map_err(LmdbError::from)?
            .map(|bytes| -> Result<u128, LmdbError> {
                let arr: [u8; 16] = bytes
                    .try_into()
                    .map_err(|_| LmdbError::Serialization("bad weight length".into()))?;
                Ok(u128::from_le_bytes(arr))
            })
            .transpose()?
            .unwrap_or(0);
        let updated = (current as i128)
            .checked_add(delta)
            .filter(|v| *v >= 0)
            .ok_or_else(|| LmdbError::Serialization(format!("representation underflow for {rep}")))?
            as u128;
        if updated == 0 {
            self.representation.delete(&mut wtxn, key).map_err(LmdbError::from)?;
        } else {
            self.representation
                .put(&mut wtxn, key, &updated.to_le_bytes())
                .map_err(LmdbError::from)?;
        }
        wtxn.commit().map_err(LmdbError::from)?;
        Ok(())
    }

    fn get_weight(&self, rep: &WalletAddress) -> Result<Amount, StoreError> {
        let rtxn = self.read_txn().map_err(LmdbError::from)?;
        let val = self
            .representation
            .get(&rtxn, rep.as_str().as_bytes())
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

    fn iter_weights(&self) -> Result<Vec<(WalletAddress, Amount)>, StoreError> {
        let rtxn = self.read_txn().map_err(LmdbError::from)?;
        let mut out = Vec::new();
        for entry in self.representation.iter(&rtxn).map_err(LmdbError::from)? {
            let (k, v) = entry.map_err(LmdbError::from)?;
            let addr = std::str::from_utf8(k).map_err(|e| LmdbError::Serialization(e.to_string()))?;
            let arr: [u8; 16] = v
                .try_into()
                .map_err(|_| LmdbError::Serialization("bad weight length".into()))?;
            out.push((WalletAddress::new(addr.to_string()), Amount::new(u128::from_le_bytes(arr))));
        }
        Ok(out)
    }

    fn total_weight(&self) -> Result<Amount, StoreError> {
        let weights = self.iter_weights()?;
        let mut total = Amount::ZERO;
        for (_, w) in weights {
            total = total
                .checked_add(w)
                .ok_or_else(|| StoreError::Corruption("representation total overflow".into()))?;
        }
        Ok(total)
    }
}
