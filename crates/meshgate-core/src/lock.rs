//! Per-account mutual exclusion.
//!
//! One async mutex per account ID, created on first use and never
//! removed. Holding an [`AccountLockGuard`] grants exclusive access to
//! that account; dropping it releases the lock.

use std::sync::Arc;

use dashmap::DashMap;
use tokio::sync::{Mutex, OwnedMutexGuard};
use tracing::trace;

/// Registry of account locks, keyed by account ID.
#[derive(Debug, Clone, Default)]
pub struct AccountLocks {
    locks: Arc<DashMap<String, Arc<Mutex<()>>>>,
}

impl AccountLocks {
    pub fn new() -> Self {
        Self::default()
    }

    /// Wait until the account's lock is free and take it.
    pub async fn acquire(&self, account_id: &str) -> AccountLockGuard {
        // The map shard guard must be dropped before awaiting the mutex.
        let lock = self
            .locks
            .entry(account_id.to_owned())
            .or_insert_with(|| Arc::new(Mutex::new(())))
            .clone();

        let guard = lock.lock_owned().await;
        trace!(account_id, "account lock acquired");

        AccountLockGuard {
            account_id: account_id.to_owned(),
            _guard: guard,
        }
    }

    /// Number of accounts that have ever been locked.
    pub fn len(&self) -> usize {
        self.locks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.locks.is_empty()
    }
}

/// Exclusive access to one account. Released on drop.
#[derive(Debug)]
pub struct AccountLockGuard {
    account_id: String,
    _guard: OwnedMutexGuard<()>,
}

impl AccountLockGuard {
    pub fn account_id(&self) -> &str {
        &self.account_id
    }
}

impl Drop for AccountLockGuard {
    fn drop(&mut self) {
        trace!(account_id = %self.account_id, "account lock released");
    }
}
