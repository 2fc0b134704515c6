//! Audit metadata and event construction for group mutations.

use meshgate_core::models::account::Account;
use meshgate_core::models::activity::{Activity, ActivityEvent, EventMeta};
use meshgate_core::models::group::Group;
use meshgate_core::models::peer::Peer;
use tracing::warn;

use crate::membership::PeerDiff;

/// Metadata for a peer joining or leaving `group`.
pub fn peer_membership_meta(group: &Group, peer: &Peer, dns_domain: &str) -> EventMeta {
    let mut meta = EventMeta::new();
    meta.insert("group".into(), group.name.clone().into());
    meta.insert("group_id".into(), group.id.clone().into());
    meta.insert("peer_ip".into(), peer.ip.to_string().into());
    meta.insert("peer_fqdn".into(), peer.fqdn(dns_domain).into());
    meta
}

/// Builds the ordered audit events of one mutation.
pub(crate) struct EventBuilder<'a> {
    account: &'a Account,
    initiator_id: &'a str,
    dns_domain: &'a str,
    events: Vec<ActivityEvent>,
}

impl<'a> EventBuilder<'a> {
    pub(crate) fn new(account: &'a Account, initiator_id: &'a str, dns_domain: &'a str) -> Self {
        Self {
            account,
            initiator_id,
            dns_domain,
            events: Vec::new(),
        }
    }

    pub(crate) fn group_event(mut self, activity: Activity, group: &Group) -> Self {
        self.events.push(ActivityEvent::new(
            activity,
            self.initiator_id,
            &group.id,
            &self.account.id,
            group.event_meta(),
        ));
        self
    }

    /// One event per added peer, then one per removed peer. Peers
    /// missing from the account are skipped with a warning.
    pub(crate) fn peer_events(mut self, group: &Group, diff: &PeerDiff) -> Self {
        let changes = diff
            .added
            .iter()
            .map(|p| (p, Activity::GroupAddedToPeer))
            .chain(
                diff.removed
                    .iter()
                    .map(|p| (p, Activity::GroupRemovedFromPeer)),
            );

        for (peer_id, activity) in changes {
            let Some(peer) = self.account.peers.get(peer_id) else {
                warn!(
                    peer_id = %peer_id,
                    account_id = %self.account.id,
                    group_id = %group.id,
                    "peer not found under account while recording group change"
                );
                continue;
            };
            self.events.push(ActivityEvent::new(
                activity,
                self.initiator_id,
                &peer.id,
                &self.account.id,
                peer_membership_meta(group, peer, self.dns_domain),
            ));
        }
        self
    }

    pub(crate) fn build(self) -> Vec<ActivityEvent> {
        self.events
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use meshgate_core::models::group::GroupIssued;
    use std::net::{IpAddr, Ipv4Addr};

    fn peer(id: &str, last_octet: u8) -> Peer {
        Peer {
            id: id.into(),
            name: id.into(),
            ip: IpAddr::V4(Ipv4Addr::new(100, 64, 0, last_octet)),
            dns_label: format!("{id}-host"),
        }
    }

    fn fixture() -> (Account, Group) {
        let mut account = Account::new("acc");
        account.peers.insert("p1".into(), peer("p1", 1));
        account.peers.insert("p3".into(), peer("p3", 3));
        let group = Group {
            id: "g1".into(),
            name: "G1".into(),
            issued: GroupIssued::Api,
            peers: vec!["p1".into()],
        };
        (account, group)
    }

    #[test]
    fn membership_meta_fields() {
        let (account, group) = fixture();
        let meta = peer_membership_meta(&group, &account.peers["p1"], "mesh.cloud");
        assert_eq!(meta["group"], "G1");
        assert_eq!(meta["group_id"], "g1");
        assert_eq!(meta["peer_ip"], "100.64.0.1");
        assert_eq!(meta["peer_fqdn"], "p1-host.mesh.cloud");
    }

    #[test]
    fn created_event_precedes_peer_events() {
        let (account, group) = fixture();
        let events = EventBuilder::new(&account, "user", "")
            .group_event(Activity::GroupCreated, &group)
            .peer_events(&group, &PeerDiff::created(&group.peers))
            .build();

        let kinds: Vec<Activity> = events.iter().map(|e| e.activity).collect();
        assert_eq!(kinds, vec![Activity::GroupCreated, Activity::GroupAddedToPeer]);
        assert_eq!(events[0].target_id, "g1");
        assert_eq!(events[1].target_id, "p1");
        assert_eq!(events[1].meta["peer_fqdn"], "");
    }

    #[test]
    fn dangling_peers_are_skipped() {
        let (account, group) = fixture();
        let diff = PeerDiff {
            added: vec!["ghost".into(), "p3".into()],
            removed: vec!["p1".into()],
        };
        let events = EventBuilder::new(&account, "user", "")
            .peer_events(&group, &diff)
            .build();

        let targets: Vec<(&str, Activity)> = events
            .iter()
            .map(|e| (e.target_id.as_str(), e.activity))
            .collect();
        assert_eq!(
            targets,
            vec![
                ("p3", Activity::GroupAddedToPeer),
                ("p1", Activity::GroupRemovedFromPeer),
            ]
        );
    }
}
