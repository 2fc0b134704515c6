//! DNS domain resolution for audit metadata.

use meshgate_core::error::MeshResult;
use meshgate_core::repository::DnsDomainResolver;

/// Resolver that always answers with a configured domain.
#[derive(Debug, Clone, Default)]
pub struct StaticDnsDomain(pub String);

impl StaticDnsDomain {
    pub fn new(domain: impl Into<String>) -> Self {
        Self(domain.into())
    }
}

impl DnsDomainResolver for StaticDnsDomain {
    fn dns_domain(&self) -> MeshResult<String> {
        Ok(self.0.clone())
    }
}
