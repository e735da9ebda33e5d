//! Nullable store — in-memory storage for testing.
//!
//! Implements the same `AccountStore`/`BlockStore` traits the real LMDB
//! backend does, so code under test can't tell the difference except for
//! speed and the absence of a transaction boundary.

use burst_store::account::{AccountInfo, AccountStore};
use burst_store::block::{BlockStore, BlockVariant, StoredBlock};
use burst_store::StoreError;
use burst_types::{BlockHash, Epoch, WalletAddress};
use std::cell::RefCell;
use std::collections::HashMap;

/// An in-memory account and block store for testing.
pub struct NullStore {
    accounts: RefCell<HashMap<WalletAddress, AccountInfo>>,
    blocks: RefCell<HashMap<BlockHash, StoredBlock>>,
}

impl NullStore {
    pub fn new() -> Self {
        Self {
            accounts: RefCell::new(HashMap::new()),
            blocks: RefCell::new(HashMap::new()),
        }
    }
}

impl Default for NullStore {
    fn default() -> Self {
        Self::new()
    }
}

impl AccountStore for NullStore {
    fn get_account(&self, address: &WalletAddress) -> Result<Option<AccountInfo>, StoreError> {
        Ok(self.accounts.borrow().get(address).cloned())
    }

    fn put_account(&self, address: &WalletAddress, info: &AccountInfo) -> Result<(), StoreError> {
        self.accounts
            .borrow_mut()
            .insert(address.clone(), info.clone());
        Ok(())
    }

    fn delete_account(&self, address: &WalletAddress) -> Result<(), StoreError> {
        self.accounts.borrow_mut().remove(address);
        Ok(())
    }

    fn account_count(&self) -> Result<u64, StoreError> {
        Ok(self.accounts.borrow().len() as u64)
    }

    fn iter_accounts(&self) -> Result<Vec<(WalletAddress, AccountInfo)>, StoreError> {
        let mut entries: Vec<_> = self
            .accounts
            .borrow()
            .iter()
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect();
        entries.sort_by(|a, b| a.0.as_str().cmp(b.0.as_str()));
        Ok(entries)
    }
}

impl BlockStore for NullStore {
    fn put_block(&self, hash: &BlockHash, block: &StoredBlock) -> Result<(), StoreError> {
        self.blocks.borrow_mut().insert(*hash, block.clone());
        Ok(())
    }

    fn get_block(&self, hash: &BlockHash) -> Result<Option<StoredBlock>, StoreError> {
        Ok(self.blocks.borrow().get(hash).cloned())
    }

    fn delete_block(&self, hash: &BlockHash) -> Result<(), StoreError> {
        self.blocks.borrow_mut().remove(hash);
        Ok(())
    }

    fn set_successor(&self, hash: &BlockHash, successor: BlockHash) -> Result<(), StoreError> {
        if let Some(stored) = self.blocks.borrow_mut().get_mut(hash) {
            stored.sideband.successor = successor;
        }
        Ok(())
    }

    fn block_count(&self) -> Result<u64, StoreError> {
        Ok(self.blocks.borrow().len() as u64)
    }

    fn count_by_variant(
        &self,
        variant: BlockVariant,
        epoch: Option<Epoch>,
    ) -> Result<u64, StoreError> {
        Ok(self
            .blocks
            .borrow()
            .values()
            .filter(|b| {
                b.sideband.variant == variant
                    && epoch.map(|e| b.sideband.epoch == e).unwrap_or(true)
            })
            .count() as u64)
    }

    fn random_block(&self, seed: [u8; 32]) -> Result<Option<(BlockHash, StoredBlock)>, StoreError> {
        let blocks = self.blocks.borrow();
        if blocks.is_empty() {
            return Ok(None);
        }
        let mut entries: Vec<_> = blocks.iter().collect();
        entries.sort_by_key(|(hash, _)| *hash.as_bytes());
        let pick = entries
            .iter()
            .find(|(hash, _)| hash.as_bytes() >= &seed)
            .or_else(|| entries.first())
            .map(|(hash, block)| (**hash, (*block).clone()));
        Ok(pick)
    }

    fn get_account_blocks(&self, address: &WalletAddress) -> Result<Vec<BlockHash>, StoreError> {
        let blocks = self.blocks.borrow();
        let mut matching: Vec<_> = blocks
            .iter()
            .filter(|(_, b)| b.sideband.account.as_ref() == Some(address))
            .map(|(hash, b)| (b.sideband.height, *hash))
            .collect();
        matching.sort_by_key(|(height, _)| *height);
        Ok(matching.into_iter().map(|(_, hash)| hash).collect())
    }
}
