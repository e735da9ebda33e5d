//! LMDB implementation of `VoteStore` — latest vote per `(root, representative)`
//! (§4.1 "vote" table, §4.5).

use burst_store::vote::VoteStore;
use burst_store::StoreError;
use burst_types::{BlockHash, WalletAddress};

use crate::{LmdbEnvironment, LmdbError};

fn vote_key(root: &BlockHash, rep: &WalletAddress) -> Vec<u8> {
    let mut key = root.as_bytes().to_vec();
    key.extend_from_slice(rep.as_str().as_bytes());
    key
}

impl VoteStore for LmdbEnvironment {
    fn record_vote(
        &self,
        root: &BlockHash,
        rep: &WalletAddress,
        hash: &BlockHash,
        sequence: u64,
    ) -> Result<bool, StoreError> {
        let key = vote_key(root, rep);
        let mut wtxn = self.write_txn().map_err(LmdbError::from)?;
        let existing = self.votes.get(&wtxn, &key).map_err(LmdbError::from)?;
        if let Some(bytes) = existing {
            if bytes.len() == 40 {
                let seq_bytes: [u8; 8] = bytes[32..40].try_into().expect("checked length");
                let prev_seq = u64::from_le_bytes(seq_bytes);
                if sequence <= prev_seq {
                    return Ok(false);
                }
            }
        }
        let mut val = [0u8; 40];
        val[..32].copy_from_slice(hash.as_bytes());
        val[32..].copy_from_slice(&sequence.to_le_bytes());
        self.votes.put(&mut wtxn, &key, &val).map_err(LmdbError::from)?;
        wtxn.commit().map_err(LmdbError::from)?;
        Ok(true)
    }

    fn last_vote(&self, root: &BlockHash, rep: &WalletAddress) -> Result<Option<(BlockHash, u64)>, StoreError> {
        let key = vote_key(root, rep);
        let rtxn = self.read_txn().map_err(LmdbError::from)?;
        let val = self.votes.get(&rtxn, &key).map_err(LmdbError::from)?;
        match val {
            Some(bytes) if bytes.len() == 40 => {
                let hash: [u8; 32] = bytes[..32].try_into().expect("checked length");
                let seq: [u8; 8] = bytes[32..40].try_into().expect("checked length");
                Ok(Some((BlockHash::new(hash), u64::from_le_bytes(seq))))
            }
            _ => Ok(None),
        }
    }

    fn clear_root(&self, root: &BlockHash) -> Result<(), StoreError> {
        let rtxn = self.read_txn().map_err(LmdbError::from)?;
        let prefix = root.as_bytes().to_vec();
        let mut keys = Vec::new();
        for entry in self.votes.prefix_iter(&rtxn, &prefix).map_err(LmdbError::from)? {
            let (k, _) = entry.map_err(LmdbError::from)?;
            keys.push(k.to_vec());
        }
        drop(rtxn);
        if keys.is_empty() {
            return Ok(());
        }
        let mut wtxn = self.write_txn().map_err(LmdbError::from)?;
        for k in &keys {
            self.votes.delete(&mut wtxn, k).map_err(LmdbError::from)?;
        }
        wtxn.commit().map_err(LmdbError::from)?;
        Ok(())
    }
}
