//! Account aggregate and the dependent entities that may reference
//! groups.
//!
//! The whole aggregate is loaded, mutated in memory and persisted as a
//! single value under the account lock.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::group::Group;
use super::peer::Peer;

/// Network state shared by every peer of an account.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct Network {
    pub identifier: String,
    /// Configuration generation. Peers refetch configuration when it
    /// moves forward.
    pub serial: u64,
}

impl Network {
    pub fn inc_serial(&mut self) {
        self.serial += 1;
    }

    pub fn current_serial(&self) -> u64 {
        self.serial
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Route {
    pub id: String,
    /// Network identifier shown to users.
    pub net_id: String,
    pub network: String,
    /// Groups whose peers receive the route.
    pub groups: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct NameServerGroup {
    pub id: String,
    pub name: String,
    pub groups: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct PolicyRule {
    pub id: String,
    pub sources: Vec<String>,
    pub destinations: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Policy {
    pub id: String,
    pub name: String,
    pub rules: Vec<PolicyRule>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct SetupKey {
    pub id: String,
    pub name: String,
    /// Groups assigned to peers enrolled with this key.
    pub auto_groups: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct User {
    pub id: String,
    /// Groups assigned to peers this user adds.
    pub auto_groups: Vec<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct DnsSettings {
    /// Groups whose peers do not get DNS management.
    pub disabled_management_groups: Vec<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct Account {
    pub id: String,
    pub network: Network,
    pub groups: BTreeMap<String, Group>,
    pub peers: BTreeMap<String, Peer>,
    pub routes: BTreeMap<String, Route>,
    pub name_server_groups: BTreeMap<String, NameServerGroup>,
    pub policies: Vec<Policy>,
    pub setup_keys: BTreeMap<String, SetupKey>,
    pub users: BTreeMap<String, User>,
    pub dns_settings: DnsSettings,
}

impl Account {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            ..Default::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn serial_only_moves_forward() {
        let mut network = Network::default();
        network.inc_serial();
        network.inc_serial();
        assert_eq!(network.current_serial(), 2);
    }

    #[test]
    fn account_survives_json_encoding() {
        let mut account = Account::new("acc-1");
        account.setup_keys.insert(
            "k1".into(),
            SetupKey {
                id: "k1".into(),
                name: "default".into(),
                auto_groups: vec!["g1".into()],
            },
        );
        let json = serde_json::to_string(&account).unwrap();
        let decoded: Account = serde_json::from_str(&json).unwrap();
        assert_eq!(decoded, account);
    }
}
