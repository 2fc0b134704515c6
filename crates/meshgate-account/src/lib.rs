//! Meshgate Account: the account mutation coordinator.
//!
//! Serializes every mutation of an account aggregate behind the
//! account lock, applies group membership changes, vetoes deletion of
//! referenced groups, pushes new configuration generations to peers and
//! records the resulting activity events.

mod audit;
pub mod config;
pub mod dns;
pub mod event_meta;
mod group;
pub mod integrity;
pub mod manager;
pub mod membership;
pub mod propagation;

pub use config::ManagerConfig;
pub use dns::StaticDnsDomain;
pub use manager::AccountManager;
pub use membership::PeerDiff;
pub use propagation::{BroadcastPeersUpdater, NetworkMapUpdate};
