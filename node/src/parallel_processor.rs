use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::Mutex;

/// Per-account lock for parallel block processing.
/// Blocks on different accounts can be processed concurrently.
/// Blocks on the same account are serialized.
pub struct ParallelBlockProcessor {
    /// Per-account mutexes
    account_locks: Arc<Mutex<HashMap<String, Arc<Mutex<()>>>>>,
    /// Maximum concurrent processing tasks
    max_concurrent: usize,
    /// Semaphore for limiting total concurrency
    semaphore: Arc<tokio::sync::Semaphore>,
}

impl ParallelBlockProcessor {
    pub fn new(max_concurrent: usize) -> Self {
        Self {
            account_locks: Arc::new(Mutex::new(HashMap::new())),
            max_concurrent,
            semaphore: Arc::new(tokio::sync::Semaphore::new(max_concurrent)),
        }
    }

    /// Get or create a lock for a specific account.
    async fn get_account_lock(&self, account: &str) -> Arc<Mutex<()>> {
        let mut locks = self.account_locks.lock().await;
        locks
            .entry(account.to_string())
            .or_insert_with(|| Arc::new(Mutex::new(())))
            .clone()
    }

    /// Process a block with per-account serialization.
    /// Different accounts can be processed in parallel.
    pub async fn process<F, R>(&self, account: &str, f: F) -> R
    where
        F: FnOnce() -> R + Send + 'static,
        R: Send + 'static,
    {
        let _global_permit = self.semaphore.acquire().await.unwrap();
        let lock = self.get_account_lock(account).await;
        let _account_guard = lock.lock().await;

        tokio::task::spawn_blocking(f).await.unwrap()
    }

    /// Returns the maximum concurrency limit.
    pub fn max_concurrent(&self) -> usize {
        self.max_concurrent
    }

    /// Get the number of accounts currently being processed.
    pub async fn active_accounts(&self) -> usize {
        let locks = self.account_locks.lock().await;
        locks.len()
    }

    /// Clean up locks for accounts no longer being processed.
    pub async fn cleanup(&self) {
        let mut locks = self.account_locks.lock().await;
        locks.retain(|_, lock| Arc::strong_count(lock) > 1);
    }
}
