//! Group operations of the account manager.

use meshgate_core::error::{MeshError, MeshResult};
use meshgate_core::models::activity::Activity;
use meshgate_core::models::group::{Group, GroupUpdateOperation};
use meshgate_core::models::peer::Peer;
use meshgate_core::repository::{AccountStore, ActivityStore, DnsDomainResolver, PeersUpdater};
use tracing::info;

use crate::event_meta::EventBuilder;
use crate::integrity::check_group_links;
use crate::manager::AccountManager;
use crate::membership::{PeerDiff, apply_operations};

impl<S, A, P, D> AccountManager<S, A, P, D>
where
    S: AccountStore,
    A: ActivityStore,
    P: PeersUpdater,
    D: DnsDomainResolver,
{
    pub async fn get_group(&self, account_id: &str, group_id: &str) -> MeshResult<Group> {
        let _guard = self.lock_account(account_id).await?;
        let account = self.store.get_account(account_id).await?;

        account
            .groups
            .get(group_id)
            .cloned()
            .ok_or_else(|| MeshError::not_found("group", group_id))
    }

    pub async fn list_groups(&self, account_id: &str) -> MeshResult<Vec<Group>> {
        let _guard = self.lock_account(account_id).await?;
        let account = self.store.get_account(account_id).await?;

        Ok(account.groups.into_values().collect())
    }

    /// Peers of the group that exist in the account. Dangling IDs are
    /// left out.
    pub async fn group_list_peers(&self, account_id: &str, group_id: &str) -> MeshResult<Vec<Peer>> {
        let _guard = self.lock_account(account_id).await?;
        let account = self.store.get_account(account_id).await?;

        let group = account
            .groups
            .get(group_id)
            .ok_or_else(|| MeshError::not_found("group", group_id))?;

        Ok(group
            .peers
            .iter()
            .filter_map(|id| account.peers.get(id).cloned())
            .collect())
    }

    /// Insert or wholesale replace a group.
    ///
    /// A new group records `GroupCreated` and treats all its peers as
    /// added. Otherwise peer-level changes are derived from the set
    /// difference between the stored and the new peer list.
    pub async fn save_group(&self, account_id: &str, user_id: &str, new_group: Group) -> MeshResult<()> {
        if new_group.id.is_empty() {
            return Err(MeshError::validation("group ID must not be empty"));
        }

        let guard = self.lock_account(account_id).await?;
        let mut account = self.store.get_account(account_id).await?;

        let old_group = account
            .groups
            .insert(new_group.id.clone(), new_group.clone());
        self.commit(&mut account).await?;

        let diff = match &old_group {
            Some(old) => PeerDiff::between(&old.peers, &new_group.peers),
            None => PeerDiff::created(&new_group.peers),
        };
        let events = self.build_events(|dns_domain| {
            let mut events = EventBuilder::new(&account, user_id, dns_domain);
            if old_group.is_none() {
                events = events.group_event(Activity::GroupCreated, &new_group);
            }
            events.peer_events(&new_group, &diff).build()
        });
        let ticket = self.release(guard);
        self.emit(ticket, events).await;

        Ok(())
    }

    /// Apply a batch of operations to a copy of the group and commit it
    /// only if every operation succeeds.
    pub async fn update_group(
        &self,
        account_id: &str,
        user_id: &str,
        group_id: &str,
        operations: &[GroupUpdateOperation],
    ) -> MeshResult<Group> {
        let guard = self.lock_account(account_id).await?;
        let mut account = self.store.get_account(account_id).await?;

        let existing = account
            .groups
            .get(group_id)
            .ok_or_else(|| MeshError::not_found("group", group_id))?;
        let updated = apply_operations(existing, operations)?;
        let diff = PeerDiff::between(&existing.peers, &updated.peers);

        account.groups.insert(group_id.to_owned(), updated.clone());
        self.commit(&mut account).await?;

        let events = self.build_events(|dns_domain| {
            EventBuilder::new(&account, user_id, dns_domain)
                .group_event(Activity::GroupUpdated, &updated)
                .peer_events(&updated, &diff)
                .build()
        });
        let ticket = self.release(guard);
        self.emit(ticket, events).await;

        Ok(updated)
    }

    /// Remove a group unless something still references it.
    ///
    /// Deleting an unknown group succeeds without any change.
    pub async fn delete_group(&self, account_id: &str, user_id: &str, group_id: &str) -> MeshResult<()> {
        let guard = self.lock_account(account_id).await?;
        let mut account = self.store.get_account(account_id).await?;

        let Some(group) = account.groups.get(group_id).cloned() else {
            return Ok(());
        };
        check_group_links(&account, group_id)?;

        account.groups.remove(group_id);
        self.commit(&mut account).await?;
        info!(account_id, group_id, "group deleted");

        let events = self.build_events(|dns_domain| {
            EventBuilder::new(&account, user_id, dns_domain)
                .group_event(Activity::GroupDeleted, &group)
                .build()
        });
        let ticket = self.release(guard);
        self.emit(ticket, events).await;

        Ok(())
    }

    /// Add one peer to a group. Adding a present peer changes nothing
    /// but still commits a new generation.
    pub async fn group_add_peer(
        &self,
        account_id: &str,
        user_id: &str,
        group_id: &str,
        peer_id: &str,
    ) -> MeshResult<()> {
        let guard = self.lock_account(account_id).await?;
        let mut account = self.store.get_account(account_id).await?;

        let group = account
            .groups
            .get_mut(group_id)
            .ok_or_else(|| MeshError::not_found("group", group_id))?;
        let diff = if group.add_peer(peer_id) {
            PeerDiff {
                added: vec![peer_id.to_owned()],
                removed: Vec::new(),
            }
        } else {
            PeerDiff::default()
        };
        let group = group.clone();

        self.commit(&mut account).await?;

        let events = self.build_events(|dns_domain| {
            EventBuilder::new(&account, user_id, dns_domain)
                .peer_events(&group, &diff)
                .build()
        });
        let ticket = self.release(guard);
        self.emit(ticket, events).await;

        Ok(())
    }

    /// Remove one peer from a group. Removing an absent peer changes
    /// nothing but still commits a new generation.
    pub async fn group_delete_peer(
        &self,
        account_id: &str,
        user_id: &str,
        group_id: &str,
        peer_id: &str,
    ) -> MeshResult<()> {
        let guard = self.lock_account(account_id).await?;
        let mut account = self.store.get_account(account_id).await?;

        let group = account
            .groups
            .get_mut(group_id)
            .ok_or_else(|| MeshError::not_found("group", group_id))?;
        let diff = if group.remove_peer(peer_id) {
            PeerDiff {
                added: Vec::new(),
                removed: vec![peer_id.to_owned()],
            }
        } else {
            PeerDiff::default()
        };
        let group = group.clone();

        self.commit(&mut account).await?;

        let events = self.build_events(|dns_domain| {
            EventBuilder::new(&account, user_id, dns_domain)
                .peer_events(&group, &diff)
                .build()
        });
        let ticket = self.release(guard);
        self.emit(ticket, events).await;

        Ok(())
    }
}
