//! Collaborator trait definitions.
//!
//! The account coordinator depends only on these traits: storage of the
//! account aggregate (with its lock), the append-only activity log, the
//! peer configuration push and DNS domain resolution.

use crate::error::MeshResult;
use crate::lock::AccountLockGuard;
use crate::models::{account::Account, activity::ActivityEvent};

/// Pagination parameters for list queries.
#[derive(Debug, Clone)]
pub struct Pagination {
    pub offset: u64,
    pub limit: u64,
}

impl Default for Pagination {
    fn default() -> Self {
        Self {
            offset: 0,
            limit: 50,
        }
    }
}

// ---------------------------------------------------------------------------
// Account aggregate
// ---------------------------------------------------------------------------

pub trait AccountStore: Send + Sync {
    /// Block until the account's exclusive lock is held.
    fn acquire_account_lock(
        &self,
        account_id: &str,
    ) -> impl Future<Output = AccountLockGuard> + Send;
    /// Load the full aggregate. Fails with `NotFound` if absent.
    fn get_account(&self, account_id: &str) -> impl Future<Output = MeshResult<Account>> + Send;
    /// Persist the full aggregate. No partial writes.
    fn save_account(&self, account: &Account) -> impl Future<Output = MeshResult<()>> + Send;
}

// ---------------------------------------------------------------------------
// Activity log (append-only)
// ---------------------------------------------------------------------------

pub trait ActivityStore: Send + Sync {
    /// Append an event. Returns a copy carrying the store-assigned ID.
    fn save(
        &self,
        event: &ActivityEvent,
    ) -> impl Future<Output = MeshResult<ActivityEvent>> + Send;
    /// One page of an account's events ordered by timestamp, ties broken
    /// by ID.
    fn get(
        &self,
        account_id: &str,
        pagination: Pagination,
        descending: bool,
    ) -> impl Future<Output = MeshResult<Vec<ActivityEvent>>> + Send;
    /// Release underlying resources. Later calls fail with `StoreClosed`.
    fn close(&self) -> impl Future<Output = MeshResult<()>> + Send;
}

// ---------------------------------------------------------------------------
// Peer propagation & DNS
// ---------------------------------------------------------------------------

pub trait PeersUpdater: Send + Sync {
    /// Push the account's current configuration generation to its peers.
    fn update_account_peers(&self, account: &Account)
    -> impl Future<Output = MeshResult<()>> + Send;
}

pub trait DnsDomainResolver: Send + Sync {
    /// Domain appended to peer labels in audit metadata.
    fn dns_domain(&self) -> MeshResult<String>;
}
