//! Peer domain model.

use std::net::IpAddr;

use serde::{Deserialize, Serialize};

/// A network endpoint registered under an account.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Peer {
    pub id: String,
    pub name: String,
    /// Overlay IP assigned by the control plane.
    pub ip: IpAddr,
    /// Host label used to build the peer's fully-qualified name.
    pub dns_label: String,
}

impl Peer {
    /// Fully-qualified name under `dns_domain`; empty when no domain
    /// is configured.
    pub fn fqdn(&self, dns_domain: &str) -> String {
        if dns_domain.is_empty() {
            return String::new();
        }
        format!("{}.{}", self.dns_label, dns_domain)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::net::Ipv4Addr;

    fn peer() -> Peer {
        Peer {
            id: "p1".into(),
            name: "laptop".into(),
            ip: IpAddr::V4(Ipv4Addr::new(100, 64, 0, 1)),
            dns_label: "laptop".into(),
        }
    }

    #[test]
    fn fqdn_joins_label_and_domain() {
        assert_eq!(peer().fqdn("mesh.cloud"), "laptop.mesh.cloud");
    }

    #[test]
    fn fqdn_is_empty_without_domain() {
        assert_eq!(peer().fqdn(""), "");
    }
}
