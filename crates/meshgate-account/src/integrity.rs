//! Referential integrity checks run before a group is removed.

use meshgate_core::error::GroupLinkError;
use meshgate_core::models::account::Account;

fn references(list: &[String], group_id: &str) -> bool {
    list.iter().any(|g| g == group_id)
}

/// Return the first entity of `account` that still references
/// `group_id`.
///
/// Checked in a fixed order: routes, name server groups, policies
/// (sources then destinations of each rule), setup keys, users, and
/// the DNS management exclusion list. Only the first link found is
/// reported.
pub fn check_group_links(account: &Account, group_id: &str) -> Result<(), GroupLinkError> {
    if let Some(route) = account
        .routes
        .values()
        .find(|r| references(&r.groups, group_id))
    {
        return Err(GroupLinkError::new("route", &route.net_id));
    }

    if let Some(ns) = account
        .name_server_groups
        .values()
        .find(|ns| references(&ns.groups, group_id))
    {
        return Err(GroupLinkError::new("name server groups", &ns.name));
    }

    for policy in &account.policies {
        for rule in &policy.rules {
            if references(&rule.sources, group_id) || references(&rule.destinations, group_id) {
                return Err(GroupLinkError::new("policy", &policy.name));
            }
        }
    }

    if let Some(key) = account
        .setup_keys
        .values()
        .find(|k| references(&k.auto_groups, group_id))
    {
        return Err(GroupLinkError::new("setup key", &key.name));
    }

    if let Some(user) = account
        .users
        .values()
        .find(|u| references(&u.auto_groups, group_id))
    {
        return Err(GroupLinkError::new("user", &user.id));
    }

    if references(&account.dns_settings.disabled_management_groups, group_id) {
        // Reported under the group's own name.
        let name = account
            .groups
            .get(group_id)
            .map(|g| g.name.as_str())
            .unwrap_or(group_id);
        return Err(GroupLinkError::new("disabled DNS management groups", name));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use meshgate_core::models::account::{
        NameServerGroup, Policy, PolicyRule, Route, SetupKey, User,
    };
    use meshgate_core::models::group::{Group, GroupIssued};

    fn account_with_group() -> Account {
        let mut account = Account::new("acc");
        account.groups.insert(
            "g1".into(),
            Group {
                id: "g1".into(),
                name: "Devs".into(),
                issued: GroupIssued::Api,
                peers: vec![],
            },
        );
        account
    }

    fn link(account: &Account) -> (String, String) {
        let err = check_group_links(account, "g1").unwrap_err();
        (err.resource, err.name)
    }

    #[test]
    fn unreferenced_group_passes() {
        assert!(check_group_links(&account_with_group(), "g1").is_ok());
    }

    #[test]
    fn route_link() {
        let mut account = account_with_group();
        account.routes.insert(
            "r1".into(),
            Route {
                id: "r1".into(),
                net_id: "office".into(),
                network: "10.0.0.0/24".into(),
                groups: vec!["g1".into()],
            },
        );
        assert_eq!(link(&account), ("route".into(), "office".into()));
    }

    #[test]
    fn name_server_group_link() {
        let mut account = account_with_group();
        account.name_server_groups.insert(
            "ns1".into(),
            NameServerGroup {
                id: "ns1".into(),
                name: "corp-dns".into(),
                groups: vec!["g1".into()],
            },
        );
        assert_eq!(
            link(&account),
            ("name server groups".into(), "corp-dns".into())
        );
    }

    #[test]
    fn policy_destination_link() {
        let mut account = account_with_group();
        account.policies.push(Policy {
            id: "pol1".into(),
            name: "allow-ssh".into(),
            rules: vec![PolicyRule {
                id: "rule1".into(),
                sources: vec!["other".into()],
                destinations: vec!["g1".into()],
            }],
        });
        assert_eq!(link(&account), ("policy".into(), "allow-ssh".into()));
    }

    #[test]
    fn setup_key_link() {
        let mut account = account_with_group();
        account.setup_keys.insert(
            "k1".into(),
            SetupKey {
                id: "k1".into(),
                name: "ci-key".into(),
                auto_groups: vec!["g1".into()],
            },
        );
        assert_eq!(link(&account), ("setup key".into(), "ci-key".into()));
    }

    #[test]
    fn user_link_uses_user_id() {
        let mut account = account_with_group();
        account.users.insert(
            "u1".into(),
            User {
                id: "u1".into(),
                auto_groups: vec!["g1".into()],
            },
        );
        assert_eq!(link(&account), ("user".into(), "u1".into()));
    }

    #[test]
    fn dns_exclusion_link_uses_group_name() {
        let mut account = account_with_group();
        account
            .dns_settings
            .disabled_management_groups
            .push("g1".into());
        assert_eq!(
            link(&account),
            ("disabled DNS management groups".into(), "Devs".into())
        );
    }

    #[test]
    fn first_link_in_check_order_wins() {
        let mut account = account_with_group();
        account
            .dns_settings
            .disabled_management_groups
            .push("g1".into());
        account.users.insert(
            "u1".into(),
            User {
                id: "u1".into(),
                auto_groups: vec!["g1".into()],
            },
        );
        account.name_server_groups.insert(
            "ns1".into(),
            NameServerGroup {
                id: "ns1".into(),
                name: "corp-dns".into(),
                groups: vec!["g1".into()],
            },
        );
        assert_eq!(
            link(&account),
            ("name server groups".into(), "corp-dns".into())
        );
    }
}
