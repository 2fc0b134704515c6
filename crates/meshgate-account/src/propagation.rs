//! Peer propagation over an in-process broadcast channel.

use meshgate_core::error::MeshResult;
use meshgate_core::models::account::Account;
use meshgate_core::repository::PeersUpdater;
use tokio::sync::broadcast;
use tracing::debug;

/// Signal that an account's peers must fetch a new configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NetworkMapUpdate {
    pub account_id: String,
    pub serial: u64,
    pub peer_ids: Vec<String>,
}

/// Publishes a [`NetworkMapUpdate`] for every account change.
/// Subscribers (peer connection handlers) deliver it to the peers.
#[derive(Debug, Clone)]
pub struct BroadcastPeersUpdater {
    tx: broadcast::Sender<NetworkMapUpdate>,
}

impl BroadcastPeersUpdater {
    pub fn new(capacity: usize) -> Self {
        let (tx, _) = broadcast::channel(capacity);
        Self { tx }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<NetworkMapUpdate> {
        self.tx.subscribe()
    }
}

impl PeersUpdater for BroadcastPeersUpdater {
    async fn update_account_peers(&self, account: &Account) -> MeshResult<()> {
        let update = NetworkMapUpdate {
            account_id: account.id.clone(),
            serial: account.network.serial,
            peer_ids: account.peers.keys().cloned().collect(),
        };
        // No subscribers means no connected peers to notify.
        match self.tx.send(update) {
            Ok(receivers) => debug!(
                account_id = %account.id,
                serial = account.network.serial,
                receivers,
                "Network map update published"
            ),
            Err(_) => debug!(account_id = %account.id, "No peer subscribers"),
        }
        Ok(())
    }
}
