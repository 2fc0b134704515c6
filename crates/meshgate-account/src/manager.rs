//! Account manager: the lock, load, mutate, persist, propagate and
//! audit pipeline shared by every account operation.

use meshgate_core::error::{MeshError, MeshResult};
use meshgate_core::lock::AccountLockGuard;
use meshgate_core::models::account::Account;
use meshgate_core::models::activity::ActivityEvent;
use meshgate_core::repository::{
    AccountStore, ActivityStore, DnsDomainResolver, Pagination, PeersUpdater,
};
use tracing::{debug, error, warn};

use crate::audit::{AuditOrder, AuditTicket};
use crate::config::ManagerConfig;

/// Coordinates all mutations of account aggregates.
///
/// Generic over its collaborators so that the coordinator has no
/// dependency on the database crate or the peer transport.
pub struct AccountManager<S, A, P, D>
where
    S: AccountStore,
    A: ActivityStore,
    P: PeersUpdater,
    D: DnsDomainResolver,
{
    pub(crate) store: S,
    events: A,
    peers: P,
    dns: D,
    config: ManagerConfig,
    audit_order: AuditOrder,
}

impl<S, A, P, D> AccountManager<S, A, P, D>
where
    S: AccountStore,
    A: ActivityStore,
    P: PeersUpdater,
    D: DnsDomainResolver,
{
    pub fn new(store: S, events: A, peers: P, dns: D, config: ManagerConfig) -> Self {
        Self {
            store,
            events,
            peers,
            dns,
            config,
            audit_order: AuditOrder::default(),
        }
    }

    pub fn account_store(&self) -> &S {
        &self.store
    }

    pub fn activity_store(&self) -> &A {
        &self.events
    }

    /// One page of the account's activity log.
    pub async fn get_events(
        &self,
        account_id: &str,
        pagination: Pagination,
        descending: bool,
    ) -> MeshResult<Vec<ActivityEvent>> {
        self.events.get(account_id, pagination, descending).await
    }

    /// Take the account lock, honouring the configured timeout.
    pub(crate) async fn lock_account(&self, account_id: &str) -> MeshResult<AccountLockGuard> {
        let Some(limit) = self.config.lock_timeout() else {
            return Ok(self.store.acquire_account_lock(account_id).await);
        };
        tokio::time::timeout(limit, self.store.acquire_account_lock(account_id))
            .await
            .map_err(|_| {
                warn!(account_id, timeout_secs = limit.as_secs(), "account lock wait timed out");
                MeshError::LockTimeout {
                    account_id: account_id.to_owned(),
                }
            })
    }

    /// Bump the generation, persist the aggregate and push it to peers.
    ///
    /// Must run under the account lock. A persistence failure leaves
    /// nothing behind; a propagation failure is reported after the
    /// state is already durable.
    pub(crate) async fn commit(&self, account: &mut Account) -> MeshResult<()> {
        account.network.inc_serial();
        self.store.save_account(account).await?;

        self.peers
            .update_account_peers(account)
            .await
            .map_err(|e| match e {
                MeshError::Propagation(_) => e,
                other => MeshError::Propagation(other.to_string()),
            })?;

        debug!(
            account_id = %account.id,
            serial = account.network.serial,
            "account change committed"
        );
        Ok(())
    }

    /// Build the audit events of a mutation while its account lock is
    /// still held, so event timestamps follow mutation order.
    pub(crate) fn build_events<F>(&self, build: F) -> Vec<ActivityEvent>
    where
        F: FnOnce(&str) -> Vec<ActivityEvent>,
    {
        let dns_domain = self.dns.dns_domain().unwrap_or_else(|err| {
            warn!(error = %err, "failed to resolve DNS domain for activity metadata");
            String::new()
        });
        let mut events = build(&dns_domain);
        self.audit_order.order_timestamps(&mut events);
        events
    }

    /// Reserve this mutation's audit slot, then release the account lock.
    pub(crate) fn release(&self, guard: AccountLockGuard) -> AuditTicket {
        let ticket = self.audit_order.ticket(guard.account_id());
        drop(guard);
        ticket
    }

    /// Store events once earlier mutations of the account have stored
    /// theirs. Failures are logged, never returned.
    pub(crate) async fn emit(&self, ticket: AuditTicket, events: Vec<ActivityEvent>) {
        ticket.wait_turn().await;
        for event in &events {
            self.store_event(event).await;
        }
        ticket.complete();
    }

    async fn store_event(&self, event: &ActivityEvent) {
        match self.events.save(event).await {
            Ok(stored) => debug!(
                id = stored.id,
                account_id = %stored.account_id,
                target_id = %stored.target_id,
                activity = stored.activity.string_code(),
                "{}",
                stored.activity.message()
            ),
            Err(err) => error!(
                error = %err,
                account_id = %event.account_id,
                target_id = %event.target_id,
                activity = event.activity.string_code(),
                "failed to store activity event"
            ),
        }
    }
}
