//! LMDB implementation of `FrontierStore` — the legacy non-state
//! hash-to-account lookup table (§4.1).

use burst_store::frontier::FrontierStore;
use burst_store::StoreError;
use burst_types::{BlockHash, WalletAddress};

use crate::{LmdbEnvironment, LmdbError};

impl FrontierStore for LmdbEnvironment {
    fn put_frontier(&self, hash: &BlockHash, account: &WalletAddress) -> Result<(), StoreError> {
        let mut wtxn = self.write_txn().map_err(LmdbError::from)?;
        self.frontiers
            .put(&mut wtxn, hash.as_bytes(), account.as_str().as_bytes())
            .map_err(LmdbError::from)?;
        wtxn.commit().map_err(LmdbError::from)?;
        Ok(())
    }

    fn get_frontier(&self, hash: &BlockHash) -> Result<Option<WalletAddress>, StoreError> {
        let rtxn = self.read_txn().map_err(LmdbError::from)?;
        let val = self.frontiers.get(&rtxn, hash.as_bytes()).map_err(LmdbError::from)?;
        match val {
            Some(bytes) => {
                let s = std::str::from_utf8(bytes)
                    .map_err(|e| LmdbError::Serialization(e.to_string()))?;
                Ok(Some(WalletAddress::new(s.to_string())))
            }
            None => Ok(None),
        }
    }

    fn delete_frontier(&self, hash: &BlockHash) -> Result<(), StoreError> {
        let mut wtxn = self.write_txn().map_err(LmdbError::from)?;
        self.frontiers.delete(&mut wtxn, hash.as_bytes()).map_err(LmdbError::from)?;
        wtxn.commit().map_err(LmdbError::from)?;
        Ok(())
    }

    fn iter_frontiers(&self) -> Result<Vec<(BlockHash, WalletAddress)>, StoreError> {
        let rtxn = self.read_txn().map_err(LmdbError::from)?;
        let mut out = Vec::new();
        for entry in self.frontiers.iter(&rtxn).map_err(LmdbError::from)? {
            let (k, v) = entry.map_err(LmdbError::from)?;
            let hash: [u8; 32] = k
                .try_into()
                .map_err(|_| LmdbError::Serialization("bad frontier key length".into()))?;
            let s = std::str::from_utf8(v).map_err(|e| LmdbError::Serialization(e.to_string()))?;
            out.push((BlockHash::new(hash), WalletAddress::new(s.to_string())));
        }
        Ok(out)
    }

    fn frontier_count(&self) -> Result<u64, StoreError> {
        let rtxn = self.read_txn().map_err(LmdbError::from)?;
        Ok(self.frontiers.len(&rtxn).map_err(LmdbError::from)?)
    }
}
